use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{
    BindEnum, BindValue, Binding, ChooserBinding, Children, ConstantBinding,
    DeviceBinding, Describe, LayoutBinding, Reader, TabBinding, ValueBinding,
    Writer,
};
use crate::runtime::{TabId, TabRegistry};
use crate::transport::{Topic, TopicPath, Transport};

/// Builds bindings under a topic prefix.
///
/// Container-bound calls take the owning object as `Rc<RefCell<C>>` and plain
/// accessor closures over `C`; the `*_static` calls take closures that capture
/// whatever they need. Names are single path segments: a `/` inside a name is
/// rewritten to `+`.
///
/// ```rust
/// let binder = Binder::new(Rc::new(bus), TopicPath::new("/Dashboard"));
/// binder.bind_tab(&mut registry, "Drive", &drive, |b, drive| {
///     vec![
///         b.bind_rw("Enabled", drive, |d| d.enabled, |d, v| d.enabled = v)
///             .boxed(),
///         b.bind_constant("Wheels", drive, |d| d.wheels.len() as i64)
///             .boxed(),
///     ]
/// });
/// ```
#[derive(Clone)]
pub struct Binder {
    transport: Rc<dyn Transport>,
    prefix: TopicPath,
    queue_depth: Option<usize>,
}

impl Binder {
    pub fn new(transport: Rc<dyn Transport>, prefix: TopicPath) -> Self {
        Self {
            transport,
            prefix,
            queue_depth: None,
        }
    }

    /// Applies to every subscribing binding created from here on, including
    /// those of nested binders
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = Some(depth);
        self
    }

    pub fn prefix(&self) -> &TopicPath {
        &self.prefix
    }

    pub fn path(&self, name: &str) -> TopicPath {
        self.prefix.join(name)
    }

    pub fn topic(&self, name: &str) -> Box<dyn Topic> {
        self.transport.topic(&self.path(name))
    }

    pub fn nested(&self, name: &str) -> Self {
        Self {
            transport: self.transport.clone(),
            prefix: self.path(name),
            queue_depth: self.queue_depth,
        }
    }

    pub fn value_binding<T: BindValue>(
        &self,
        name: &str,
        reader: Option<Reader<T>>,
        writer: Option<Writer<T>>,
    ) -> ValueBinding<T> {
        let binding = ValueBinding::new(self.topic(name), reader, writer);
        match self.queue_depth {
            Some(depth) => binding.with_queue_depth(depth),
            None => binding,
        }
    }

    /// Publish-only binding reading from `container`
    pub fn bind<C: 'static, T: BindValue>(
        &self,
        name: &str,
        container: &Rc<RefCell<C>>,
        getter: impl Fn(&C) -> T + 'static,
    ) -> ValueBinding<T> {
        let container = container.clone();
        self.value_binding(
            name,
            Some(Box::new(move || getter(&*container.borrow()))),
            None,
        )
    }

    /// Two-way binding; dashboard edits are applied through `setter`
    pub fn bind_rw<C: 'static, T: BindValue>(
        &self,
        name: &str,
        container: &Rc<RefCell<C>>,
        getter: impl Fn(&C) -> T + 'static,
        setter: impl Fn(&mut C, T) + 'static,
    ) -> ValueBinding<T> {
        let reader = container.clone();
        let writer = container.clone();
        self.value_binding(
            name,
            Some(Box::new(move || getter(&*reader.borrow()))),
            Some(Box::new(move |value| {
                setter(&mut *writer.borrow_mut(), value)
            })),
        )
    }

    pub fn bind_static<T: BindValue>(
        &self,
        name: &str,
        getter: impl Fn() -> T + 'static,
    ) -> ValueBinding<T> {
        self.value_binding(name, Some(Box::new(getter)), None)
    }

    pub fn bind_static_rw<T: BindValue>(
        &self,
        name: &str,
        getter: impl Fn() -> T + 'static,
        setter: impl FnMut(T) + 'static,
    ) -> ValueBinding<T> {
        self.value_binding(
            name,
            Some(Box::new(getter)),
            Some(Box::new(setter)),
        )
    }

    /// Read once per enable and never republished
    pub fn bind_constant<C: 'static, T: BindValue>(
        &self,
        name: &str,
        container: &Rc<RefCell<C>>,
        getter: impl Fn(&C) -> T + 'static,
    ) -> ConstantBinding<T> {
        let container = container.clone();
        ConstantBinding::new(
            self.topic(name),
            Box::new(move || getter(&*container.borrow())),
        )
    }

    pub fn bind_static_constant<T: BindValue>(
        &self,
        name: &str,
        getter: impl Fn() -> T + 'static,
    ) -> ConstantBinding<T> {
        ConstantBinding::new(self.topic(name), Box::new(getter))
    }

    pub fn bind_enum<C: 'static, E: BindEnum>(
        &self,
        name: &str,
        container: &Rc<RefCell<C>>,
        getter: impl Fn(&C) -> E + 'static,
        setter: impl Fn(&mut C, E) + 'static,
    ) -> ChooserBinding {
        let reader = container.clone();
        let writer = container.clone();
        self.bind_static_enum(
            name,
            move || getter(&*reader.borrow()),
            move |value| setter(&mut *writer.borrow_mut(), value),
        )
    }

    pub fn bind_static_enum<E: BindEnum>(
        &self,
        name: &str,
        getter: impl Fn() -> E + 'static,
        mut setter: impl FnMut(E) + 'static,
    ) -> ChooserBinding {
        ChooserBinding::new(
            &self.nested(name),
            E::labels(),
            move || getter().label().to_string(),
            move |label| {
                if let Some(value) = E::from_label(&label) {
                    setter(value);
                }
            },
        )
    }

    pub fn bind_device<D: Describe>(
        &self,
        name: &str,
        device: &Rc<RefCell<D>>,
    ) -> DeviceBinding<D> {
        DeviceBinding::new(&self.nested(name), device.clone())
    }

    /// Groups the bindings `bind_children` creates. The binder it receives is
    /// nested at `name`.
    pub fn bind_layout<C: 'static, F>(
        &self,
        name: &str,
        container: &Rc<RefCell<C>>,
        bind_children: F,
    ) -> LayoutBinding
    where
        F: FnOnce(&Binder, &Rc<RefCell<C>>) -> Vec<Box<dyn Binding>>,
    {
        let children = bind_children(&self.nested(name), container);
        LayoutBinding::new(name, Children::new(children))
    }

    /// Builds a tab rooted at `<prefix>/<title>` and hands it to `registry`
    pub fn bind_tab<C: 'static, F>(
        &self,
        registry: &mut TabRegistry,
        title: &str,
        container: &Rc<RefCell<C>>,
        bind_children: F,
    ) -> TabId
    where
        F: FnOnce(&Binder, &Rc<RefCell<C>>) -> Vec<Box<dyn Binding>>,
    {
        let binder = self.nested(title);
        let children = bind_children(&binder, container);
        registry.register(TabBinding::new(
            title,
            binder.prefix,
            Children::new(children),
        ))
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("prefix", &self.prefix)
            .field("queue_depth", &self.queue_depth)
            .finish()
    }
}
