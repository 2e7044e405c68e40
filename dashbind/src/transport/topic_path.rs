use std::fmt;

/// A `/`-delimited topic key. Segments appended through [`TopicPath::join`]
/// have their own `/` characters rewritten to `+` so a name can never
/// introduce extra levels into the hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPath(String);

impl TopicPath {
    pub const SEPARATOR: char = '/';
    const ESCAPE: char = '+';

    /// Takes `path` verbatim; separators inside it are kept as levels.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn escape_segment(segment: &str) -> String {
        segment.replace(Self::SEPARATOR, &Self::ESCAPE.to_string())
    }

    pub fn join(&self, segment: &str) -> Self {
        let segment = Self::escape_segment(segment);
        if self.0.is_empty() {
            Self(segment)
        } else if self.0.ends_with(Self::SEPARATOR) {
            Self(format!("{}{}", self.0, segment))
        } else {
            Self(format!("{}{}{}", self.0, Self::SEPARATOR, segment))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last level of the path, or the whole path when it has no separator
    pub fn name(&self) -> &str {
        self.0
            .rsplit(Self::SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TopicPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for TopicPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
