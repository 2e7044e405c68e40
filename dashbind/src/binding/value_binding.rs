use std::fmt;
use std::marker::PhantomData;

use super::{BindValue, Binding, BindingError, EnableCount};
use crate::core::prelude::*;
use crate::transport::{
    Publisher, SubscribeOptions, Subscriber, Topic, TopicPath,
    TransportError,
};

pub type Reader<T> = Box<dyn Fn() -> T>;
pub type Writer<T> = Box<dyn FnMut(T)>;

/// Binds one topic to a local value.
///
/// With a reader the binding publishes the local value every tick; with a
/// writer it applies dashboard edits. With both, its subscriber excludes its
/// own publisher so published values never come back as edits.
pub struct ValueBinding<T: BindValue> {
    topic: Box<dyn Topic>,
    count: EnableCount,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    publisher: Option<Box<dyn Publisher>>,
    subscriber: Option<Box<dyn Subscriber>>,
    queue_depth: Option<usize>,
    _kind: PhantomData<T>,
}

impl<T: BindValue> ValueBinding<T> {
    pub fn new(
        topic: Box<dyn Topic>,
        reader: Option<Reader<T>>,
        writer: Option<Writer<T>>,
    ) -> Self {
        Self {
            topic,
            count: EnableCount::default(),
            reader,
            writer,
            publisher: None,
            subscriber: None,
            queue_depth: None,
            _kind: PhantomData,
        }
    }

    pub fn read_only(topic: Box<dyn Topic>, reader: Reader<T>) -> Self {
        Self::new(topic, Some(reader), None)
    }

    pub fn read_write(
        topic: Box<dyn Topic>,
        reader: Reader<T>,
        writer: Writer<T>,
    ) -> Self {
        Self::new(topic, Some(reader), Some(writer))
    }

    /// Overrides the transport's default subscriber queue depth
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = Some(depth);
        self
    }

    pub fn path(&self) -> &TopicPath {
        self.topic.path()
    }

    pub fn enabled_count(&self) -> usize {
        self.count.get()
    }

    pub fn has_publisher(&self) -> bool {
        self.publisher.is_some()
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    fn acquire(&mut self) -> Result<(), TransportError> {
        if self.reader.is_some() {
            self.publisher = Some(self.topic.publish(T::KIND)?);
        }

        if self.writer.is_some() {
            let mut options = match &self.publisher {
                Some(publisher) => SubscribeOptions::excluding(publisher.id()),
                None => SubscribeOptions::default(),
            };
            if let Some(depth) = self.queue_depth {
                options.queue_depth = depth;
            }
            self.subscriber =
                Some(self.topic.subscribe(T::default_value(), options)?);
        }

        Ok(())
    }

    fn release(&mut self) {
        let path = self.topic.path();
        if let Some(mut publisher) = self.publisher.take() {
            if let Err(err) = publisher.close() {
                warn!("failed to close publisher on {}: {}", path, err);
            }
        }
        if let Some(mut subscriber) = self.subscriber.take() {
            if let Err(err) = subscriber.close() {
                warn!("failed to close subscriber on {}: {}", path, err);
            }
        }
    }
}

impl<T: BindValue> Binding for ValueBinding<T> {
    fn enable(&mut self) -> Result<(), BindingError> {
        if !self.count.acquire() {
            return Ok(());
        }

        if let Err(err) = self.acquire() {
            self.release();
            self.count.rollback();
            return Err(err.into());
        }

        trace!("enabled {}", self.topic.path());
        Ok(())
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        if self.count.release(self.topic.path().as_str())? {
            self.release();
            trace!("disabled {}", self.topic.path());
        }
        Ok(())
    }

    fn update(&mut self) {
        if !self.count.is_enabled() {
            return;
        }

        if let (Some(subscriber), Some(writer)) =
            (self.subscriber.as_mut(), self.writer.as_mut())
        {
            for value in subscriber.drain_queued() {
                let kind = value.kind();
                match T::from_value(value) {
                    Some(value) => writer(value),
                    None if kind == T::KIND => warn!(
                        "ignoring edit on {}: value out of range for the \
                         bound type",
                        self.topic.path()
                    ),
                    None => warn!(
                        "ignoring {} edit on {} topic {}",
                        kind,
                        T::KIND,
                        self.topic.path()
                    ),
                }
            }
        }

        if let (Some(publisher), Some(reader)) =
            (self.publisher.as_mut(), self.reader.as_ref())
        {
            publisher.set(reader().into_value());
        }
    }

    fn close(&mut self) {
        self.release();
    }

    fn is_enabled(&self) -> bool {
        self.count.is_enabled()
    }
}

impl<T: BindValue> fmt::Debug for ValueBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBinding")
            .field("path", self.topic.path())
            .field("kind", &T::KIND)
            .field("count", &self.count)
            .field("reader", &self.reader.as_ref().map(|_| "<function>"))
            .field("writer", &self.writer.as_ref().map(|_| "<function>"))
            .field("publisher", &self.publisher.is_some())
            .field("subscriber", &self.subscriber.is_some())
            .finish()
    }
}
