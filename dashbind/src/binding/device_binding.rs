//! Adapts self-describing objects into a namespace of child bindings.
//!
//! A type implementing [`Describe`] lists its own properties on a
//! [`DeviceBuilder`]. The builder turns each property into a value or
//! constant binding rooted at `<topic>/<name>` right away, so the resulting
//! [`DeviceBinding`] never needs to know the concrete device type beyond the
//! accessors it captured.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use super::{
    BindValue, Binder, Binding, BindingError, Children, ConstantBinding,
    EnableCount,
};
use crate::core::prelude::*;
use crate::transport::TopicPath;

pub type UpdateCallback<D> =
    Box<dyn FnMut(&mut D) -> Result<(), Box<dyn Error>>>;
pub type CloseAction<D> =
    Box<dyn FnOnce(&mut D) -> Result<(), Box<dyn Error>>>;

pub trait Describe: 'static {
    fn describe(&self, builder: &mut DeviceBuilder<Self>)
    where
        Self: Sized;
}

pub struct DeviceBuilder<D> {
    binder: Binder,
    device: Rc<RefCell<D>>,
    children: Children,
    callbacks: Vec<UpdateCallback<D>>,
    close_actions: Vec<CloseAction<D>>,
    type_name: Option<String>,
}

impl<D: 'static> DeviceBuilder<D> {
    fn new(binder: Binder, device: Rc<RefCell<D>>) -> Self {
        Self {
            binder,
            device,
            children: Children::default(),
            callbacks: Vec::new(),
            close_actions: Vec::new(),
            type_name: None,
        }
    }

    /// Publishes `<topic>/.type` so the dashboard can pick a widget
    pub fn set_type(&mut self, name: &str) -> &mut Self {
        if let Some(existing) = &self.type_name {
            warn!(
                "{} already has type '{}'; ignoring '{}'",
                self.binder.prefix(),
                existing,
                name
            );
            return self;
        }
        self.type_name = Some(name.to_string());
        self.children.push(
            ConstantBinding::of(self.binder.topic(".type"), name.to_string())
                .boxed(),
        );
        self
    }

    pub fn property<T: BindValue>(
        &mut self,
        name: &str,
        getter: impl Fn(&D) -> T + 'static,
    ) -> &mut Self {
        let device = self.device.clone();
        self.children.push(
            self.binder
                .value_binding(
                    name,
                    Some(Box::new(move || getter(&*device.borrow()))),
                    None,
                )
                .boxed(),
        );
        self
    }

    pub fn property_rw<T: BindValue>(
        &mut self,
        name: &str,
        getter: impl Fn(&D) -> T + 'static,
        setter: impl Fn(&mut D, T) + 'static,
    ) -> &mut Self {
        let reader = self.device.clone();
        let writer = self.device.clone();
        self.children.push(
            self.binder
                .value_binding(
                    name,
                    Some(Box::new(move || getter(&*reader.borrow()))),
                    Some(Box::new(move |value| {
                        setter(&mut *writer.borrow_mut(), value)
                    })),
                )
                .boxed(),
        );
        self
    }

    /// Read once per enable, like [`Binder::bind_constant`]
    pub fn constant<T: BindValue>(
        &mut self,
        name: &str,
        getter: impl Fn(&D) -> T + 'static,
    ) -> &mut Self {
        let device = self.device.clone();
        self.children.push(
            ConstantBinding::new(
                self.binder.topic(name),
                Box::new(move || getter(&*device.borrow())),
            )
            .boxed(),
        );
        self
    }

    /// Runs after the properties on every tick while enabled. Errors are
    /// logged and do not stop the remaining callbacks.
    pub fn on_update(
        &mut self,
        callback: impl FnMut(&mut D) -> Result<(), Box<dyn Error>> + 'static,
    ) -> &mut Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Runs once when the device binding is closed
    pub fn on_close(
        &mut self,
        action: impl FnOnce(&mut D) -> Result<(), Box<dyn Error>> + 'static,
    ) -> &mut Self {
        self.close_actions.push(Box::new(action));
        self
    }
}

pub struct DeviceBinding<D> {
    path: TopicPath,
    device: Rc<RefCell<D>>,
    children: Children,
    count: EnableCount,
    callbacks: Vec<UpdateCallback<D>>,
    close_actions: Vec<CloseAction<D>>,
    type_name: Option<String>,
}

impl<D: Describe> DeviceBinding<D> {
    /// `binder` must already be nested at the device's topic
    pub fn new(binder: &Binder, device: Rc<RefCell<D>>) -> Self {
        let mut builder = DeviceBuilder::new(binder.clone(), device.clone());
        builder.children.push(
            ConstantBinding::of(binder.topic(".controllable"), true).boxed(),
        );
        device.borrow().describe(&mut builder);

        debug!(
            "bound device {} with {} topics",
            binder.prefix(),
            builder.children.len()
        );

        Self {
            path: binder.prefix().clone(),
            device,
            children: builder.children,
            count: EnableCount::default(),
            callbacks: builder.callbacks,
            close_actions: builder.close_actions,
            type_name: builder.type_name,
        }
    }
}

impl<D> DeviceBinding<D> {
    pub fn path(&self) -> &TopicPath {
        &self.path
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn children(&self) -> &Children {
        &self.children
    }
}

impl<D: 'static> Binding for DeviceBinding<D> {
    fn enable(&mut self) -> Result<(), BindingError> {
        self.children.enable_counted(&mut self.count)
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        self.children
            .disable_counted(&mut self.count, self.path.as_str())
    }

    fn update(&mut self) {
        if !self.count.is_enabled() {
            return;
        }

        self.children.update();

        let mut device = self.device.borrow_mut();
        for callback in &mut self.callbacks {
            if let Err(err) = callback(&mut *device) {
                warn!("update callback on {} failed: {}", self.path, err);
            }
        }
    }

    fn close(&mut self) {
        self.children.close();

        let mut device = self.device.borrow_mut();
        for action in self.close_actions.drain(..) {
            if let Err(err) = action(&mut *device) {
                warn!("closing resource on {} failed: {}", self.path, err);
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.count.is_enabled()
    }
}
