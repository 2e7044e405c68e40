use super::{Binding, BindingError, EnableCount};
use crate::core::prelude::*;
use crate::transport::TopicPath;

/// Ordered child bindings with the fan-out every composite shares.
#[derive(Default)]
pub struct Children {
    bindings: Vec<Box<dyn Binding>>,
}

impl Children {
    pub fn new(bindings: Vec<Box<dyn Binding>>) -> Self {
        Self { bindings }
    }

    pub fn push(&mut self, binding: Box<dyn Binding>) {
        self.bindings.push(binding);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Box<dyn Binding>> {
        self.bindings.iter()
    }

    /// Enables in declaration order. If a child fails, the children enabled
    /// by this call are disabled again before the error is returned.
    pub fn enable(&mut self) -> Result<(), BindingError> {
        for index in 0..self.bindings.len() {
            if let Err(err) = self.bindings[index].enable() {
                for enabled in self.bindings[..index].iter_mut().rev() {
                    if let Err(rollback_err) = enabled.disable() {
                        warn!("rollback failed: {}", rollback_err);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Disables every child and returns the first error encountered
    pub fn disable(&mut self) -> Result<(), BindingError> {
        let mut first_err = None;
        for binding in &mut self.bindings {
            if let Err(err) = binding.disable() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// [`Self::enable`] under the owning composite's own `count`, which is
    /// left untouched when a child fails
    pub fn enable_counted(
        &mut self,
        count: &mut EnableCount,
    ) -> Result<(), BindingError> {
        count.acquire();
        if let Err(err) = self.enable() {
            count.rollback();
            return Err(err);
        }
        Ok(())
    }

    /// Releases `count` first, so an unbalanced disable fails even when
    /// there are no children to report it
    pub fn disable_counted(
        &mut self,
        count: &mut EnableCount,
        path: &str,
    ) -> Result<(), BindingError> {
        count.release(path)?;
        self.disable()
    }

    pub fn update(&mut self) {
        for binding in &mut self.bindings {
            binding.update();
        }
    }

    pub fn close(&mut self) {
        for binding in &mut self.bindings {
            binding.close();
        }
    }
}

impl FromIterator<Box<dyn Binding>> for Children {
    fn from_iter<I: IntoIterator<Item = Box<dyn Binding>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Groups the bindings of a nested record. Has no topic of its own; its
/// children are already named under the layout's path by the [`Binder`] that
/// built them.
///
/// [`Binder`]: super::Binder
pub struct LayoutBinding {
    name: String,
    children: Children,
    count: EnableCount,
}

impl LayoutBinding {
    pub fn new(name: impl Into<String>, children: Children) -> Self {
        Self {
            name: name.into(),
            children,
            count: EnableCount::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &Children {
        &self.children
    }
}

impl Binding for LayoutBinding {
    fn enable(&mut self) -> Result<(), BindingError> {
        self.children.enable_counted(&mut self.count)
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        self.children.disable_counted(&mut self.count, &self.name)
    }

    fn update(&mut self) {
        self.children.update();
    }

    fn close(&mut self) {
        self.children.close();
    }

    fn is_enabled(&self) -> bool {
        self.count.is_enabled()
    }
}

/// Top-level unit of the binding tree, owned by the
/// [`TabRegistry`](crate::runtime::TabRegistry).
pub struct TabBinding {
    title: String,
    path: TopicPath,
    children: Children,
    count: EnableCount,
}

impl TabBinding {
    pub fn new(
        title: impl Into<String>,
        path: TopicPath,
        children: Children,
    ) -> Self {
        Self {
            title: title.into(),
            path,
            children,
            count: EnableCount::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> &TopicPath {
        &self.path
    }

    pub fn children(&self) -> &Children {
        &self.children
    }
}

impl Binding for TabBinding {
    fn enable(&mut self) -> Result<(), BindingError> {
        debug!("enabling tab '{}'", self.title);
        self.children.enable_counted(&mut self.count)
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        debug!("disabling tab '{}'", self.title);
        self.children
            .disable_counted(&mut self.count, self.path.as_str())
    }

    fn update(&mut self) {
        self.children.update();
    }

    fn close(&mut self) {
        self.children.close();
    }

    fn is_enabled(&self) -> bool {
        self.count.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Calls {
        log: Vec<String>,
    }

    struct Probe {
        name: &'static str,
        fail_enable: bool,
        enabled: usize,
        calls: Rc<RefCell<Calls>>,
    }

    fn probe(
        name: &'static str,
        calls: &Rc<RefCell<Calls>>,
    ) -> Box<dyn Binding> {
        Box::new(Probe {
            name,
            fail_enable: false,
            enabled: 0,
            calls: calls.clone(),
        })
    }

    impl Binding for Probe {
        fn enable(&mut self) -> Result<(), BindingError> {
            if self.fail_enable {
                return Err(BindingError::NotEnabled {
                    path: self.name.to_string(),
                });
            }
            self.enabled += 1;
            self.calls.borrow_mut().log.push(format!("enable {}", self.name));
            Ok(())
        }

        fn disable(&mut self) -> Result<(), BindingError> {
            if self.enabled == 0 {
                return Err(BindingError::NotEnabled {
                    path: self.name.to_string(),
                });
            }
            self.enabled -= 1;
            self.calls
                .borrow_mut()
                .log
                .push(format!("disable {}", self.name));
            Ok(())
        }

        fn update(&mut self) {
            self.calls.borrow_mut().log.push(format!("update {}", self.name));
        }

        fn close(&mut self) {
            self.calls.borrow_mut().log.push(format!("close {}", self.name));
        }

        fn is_enabled(&self) -> bool {
            self.enabled > 0
        }
    }

    #[test]
    fn fans_out_in_declaration_order() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut layout = LayoutBinding::new(
            "pose",
            Children::new(vec![
                probe("x", &calls),
                probe("y", &calls),
            ]),
        );

        layout.enable().unwrap();
        layout.update();
        layout.close();

        assert_eq!(
            calls.borrow().log,
            vec![
                "enable x", "enable y", "update x", "update y", "close x",
                "close y"
            ]
        );
        assert!(layout.is_enabled());
    }

    #[test]
    fn failed_enable_rolls_back_earlier_children() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let failing: Box<dyn Binding> = Box::new(Probe {
            name: "bad",
            fail_enable: true,
            enabled: 0,
            calls: calls.clone(),
        });
        let mut tab = TabBinding::new(
            "Drive",
            TopicPath::new("Drive"),
            Children::new(vec![
                probe("a", &calls),
                probe("b", &calls),
                failing,
            ]),
        );

        assert!(tab.enable().is_err());
        assert!(!tab.is_enabled());
        assert_eq!(
            calls.borrow().log,
            vec!["enable a", "enable b", "disable b", "disable a"]
        );
    }

    #[test]
    fn disable_visits_all_children_and_reports_first_error() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut children =
            Children::new(vec![probe("a", &calls), probe("b", &calls)]);
        children.iter().for_each(|child| assert!(!child.is_enabled()));

        let err = children.disable().unwrap_err();
        assert_eq!(
            err,
            BindingError::NotEnabled {
                path: "a".to_string()
            }
        );
    }

    #[test]
    fn empty_layout_rejects_unbalanced_disable() {
        let mut layout = LayoutBinding::new("empty", Children::default());
        assert_eq!(
            layout.disable(),
            Err(BindingError::NotEnabled {
                path: "empty".to_string()
            })
        );

        layout.enable().unwrap();
        assert!(layout.is_enabled());
        layout.disable().unwrap();
        assert!(!layout.is_enabled());
    }

    #[test]
    fn empty_tab_counts_its_own_enables() {
        let mut tab = TabBinding::new(
            "Blank",
            TopicPath::new("Blank"),
            Children::default(),
        );
        assert!(tab.disable().is_err());

        tab.enable().unwrap();
        tab.enable().unwrap();
        assert!(tab.is_enabled());

        tab.disable().unwrap();
        assert!(tab.is_enabled());
        tab.disable().unwrap();
        assert!(!tab.is_enabled());
        assert!(tab.disable().is_err());
    }

    #[test]
    fn failed_child_enable_leaves_count_at_zero() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let failing: Box<dyn Binding> = Box::new(Probe {
            name: "bad",
            fail_enable: true,
            enabled: 0,
            calls: calls.clone(),
        });
        let mut layout =
            LayoutBinding::new("pose", Children::new(vec![failing]));

        assert!(layout.enable().is_err());
        assert!(layout.disable().is_err());
    }
}
