use super::{BindValue, Binding, BindingError, EnableCount, Reader};
use crate::core::prelude::*;
use crate::transport::{Publisher, Topic, TopicPath};

/// Publishes a single snapshot when enabled and never again. Used for values
/// that cannot change while the program runs, such as type tags, option lists
/// and array lengths.
pub struct ConstantBinding<T: BindValue> {
    topic: Box<dyn Topic>,
    count: EnableCount,
    reader: Reader<T>,
    publisher: Option<Box<dyn Publisher>>,
}

impl<T: BindValue> ConstantBinding<T> {
    pub fn new(topic: Box<dyn Topic>, reader: Reader<T>) -> Self {
        Self {
            topic,
            count: EnableCount::default(),
            reader,
            publisher: None,
        }
    }

    pub fn of(topic: Box<dyn Topic>, value: T) -> Self {
        Self::new(topic, Box::new(move || value.clone()))
    }

    pub fn path(&self) -> &TopicPath {
        self.topic.path()
    }

    pub fn has_publisher(&self) -> bool {
        self.publisher.is_some()
    }

    fn release(&mut self) {
        if let Some(mut publisher) = self.publisher.take() {
            if let Err(err) = publisher.close() {
                warn!(
                    "failed to close constant on {}: {}",
                    self.topic.path(),
                    err
                );
            }
        }
    }
}

impl<T: BindValue> Binding for ConstantBinding<T> {
    fn enable(&mut self) -> Result<(), BindingError> {
        if !self.count.acquire() {
            return Ok(());
        }

        let mut publisher = match self.topic.publish(T::KIND) {
            Ok(publisher) => publisher,
            Err(err) => {
                self.count.rollback();
                return Err(err.into());
            }
        };
        publisher.set((self.reader)().into_value());
        self.publisher = Some(publisher);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        if self.count.release(self.topic.path().as_str())? {
            self.release();
        }
        Ok(())
    }

    fn update(&mut self) {}

    fn close(&mut self) {
        self.release();
    }

    fn is_enabled(&self) -> bool {
        self.count.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::transport::{LocalBus, Transport, Value};

    #[test]
    fn reads_once_per_enable_cycle() {
        let bus = LocalBus::new();
        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let mut binding = ConstantBinding::new(
            bus.topic(&TopicPath::new("len")),
            Box::new(move || {
                counter.set(counter.get() + 1);
                3_i64
            }),
        );

        binding.enable().unwrap();
        binding.enable().unwrap();
        binding.update();
        assert_eq!(reads.get(), 1);

        binding.disable().unwrap();
        binding.disable().unwrap();
        binding.enable().unwrap();
        assert_eq!(reads.get(), 2);
        assert_eq!(
            bus.published("len"),
            vec![Value::Integer(3), Value::Integer(3)]
        );
    }

    #[test]
    fn value_stays_visible_while_enabled() {
        let bus = LocalBus::new();
        let mut binding =
            ConstantBinding::of(bus.topic(&TopicPath::new("t")), true);

        binding.enable().unwrap();
        assert!(binding.has_publisher());
        assert_eq!(bus.publisher_count("t"), 1);
        assert_eq!(bus.latest("t"), Some(Value::Boolean(true)));

        binding.disable().unwrap();
        assert_eq!(bus.publisher_count("t"), 0);
    }

    #[test]
    fn failed_publish_restores_count() {
        let bus = LocalBus::new();
        bus.refuse_publishers("t");
        let mut binding =
            ConstantBinding::of(bus.topic(&TopicPath::new("t")), 1.0_f64);

        assert!(binding.enable().is_err());
        assert!(!binding.is_enabled());
        assert!(binding.disable().is_err());
    }
}
