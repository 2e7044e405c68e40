//! Enumerations are exposed as a chooser: a small namespace of topics the
//! dashboard renders as a drop-down.
//!
//! ```text
//! <topic>/.type          "String Chooser"   constant
//! <topic>/.controllable  true               constant
//! <topic>/options        ["A", "B", ...]    constant
//! <topic>/default        label at enable    constant
//! <topic>/selected       label              dashboard -> program
//! <topic>/active         label              program -> dashboard
//! ```
use std::rc::Rc;

use super::{
    Binder, Binding, BindingError, Children, ConstantBinding, EnableCount,
};
use crate::core::prelude::*;
use crate::transport::TopicPath;

pub const CHOOSER_TYPE: &str = "String Chooser";

/// A fieldless enum the dashboard can pick from by label.
///
/// # Example
/// ```rust
/// #[derive(Clone, Copy, PartialEq)]
/// enum DriveMode { Arcade, Tank }
///
/// impl BindEnum for DriveMode {
///     fn variants() -> &'static [Self] {
///         &[Self::Arcade, Self::Tank]
///     }
///     fn label(self) -> &'static str {
///         match self {
///             Self::Arcade => "Arcade",
///             Self::Tank => "Tank",
///         }
///     }
/// }
/// ```
pub trait BindEnum: Copy + PartialEq + 'static {
    fn variants() -> &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::variants()
            .iter()
            .copied()
            .find(|variant| variant.label() == label)
    }

    fn labels() -> Vec<String> {
        Self::variants()
            .iter()
            .map(|variant| variant.label().to_string())
            .collect()
    }
}

pub struct ChooserBinding {
    path: TopicPath,
    children: Children,
    count: EnableCount,
}

impl ChooserBinding {
    /// `binder` must already be nested at the chooser's topic. Selections
    /// that are not one of `options` are logged and dropped.
    pub fn new(
        binder: &Binder,
        options: Vec<String>,
        get: impl Fn() -> String + 'static,
        mut select: impl FnMut(String) + 'static,
    ) -> Self {
        let path = binder.prefix().clone();
        let get = Rc::new(get);
        let mut children = Children::default();

        children.push(
            ConstantBinding::of(
                binder.topic(".type"),
                CHOOSER_TYPE.to_string(),
            )
            .boxed(),
        );
        children.push(
            ConstantBinding::of(binder.topic(".controllable"), true).boxed(),
        );
        children.push(
            ConstantBinding::of(binder.topic("options"), options.clone())
                .boxed(),
        );

        let default_get = get.clone();
        children.push(
            ConstantBinding::new(
                binder.topic("default"),
                Box::new(move || default_get()),
            )
            .boxed(),
        );

        let selected_path = path.clone();
        children.push(
            binder
                .value_binding::<String>(
                    "selected",
                    None,
                    Some(Box::new(move |label: String| {
                        if options.contains(&label) {
                            select(label);
                        } else {
                            warn!(
                                "ignoring unknown option '{}' for {}",
                                label, selected_path
                            );
                        }
                    })),
                )
                .boxed(),
        );

        children.push(
            binder
                .value_binding(
                    "active",
                    Some(Box::new(move || get())),
                    None,
                )
                .boxed(),
        );

        Self {
            path,
            children,
            count: EnableCount::default(),
        }
    }

    pub fn path(&self) -> &TopicPath {
        &self.path
    }
}

impl Binding for ChooserBinding {
    fn enable(&mut self) -> Result<(), BindingError> {
        self.children.enable_counted(&mut self.count)
    }

    fn disable(&mut self) -> Result<(), BindingError> {
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
