//! In-process [`Transport`]. Every topic keeps its latest value, a history of
//! locally published values and one bounded queue per subscriber. Values
//! written from the dashboard side go through [`LocalBus::set_remote`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::IndexMap;

use super::*;
use crate::core::prelude::*;

/// Publisher id used for writes arriving from the dashboard
pub const REMOTE_PUBLISHER_ID: PublisherId = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    pub publishers_opened: usize,
    pub publishers_closed: usize,
    pub subscribers_opened: usize,
    pub subscribers_closed: usize,
}

impl BusStats {
    pub fn open_handles(&self) -> usize {
        self.publishers_opened + self.subscribers_opened
            - self.publishers_closed
            - self.subscribers_closed
    }
}

#[derive(Clone, Default)]
pub struct LocalBus {
    state: Rc<RefCell<BusState>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a dashboard edit. The value is queued for every subscriber
    /// on `path` regardless of kind.
    pub fn set_remote(&self, path: impl Into<TopicPath>, value: Value) {
        let path = path.into();
        trace!("remote write {} = {:?}", path, value);
        self.state
            .borrow_mut()
            .write(path.as_str(), REMOTE_PUBLISHER_ID, value, false);
    }

    pub fn latest(&self, path: &str) -> Option<Value> {
        self.state
            .borrow()
            .topics
            .get(path)
            .and_then(|topic| topic.latest.clone())
    }

    /// Every value a local publisher has written to `path`, oldest first
    pub fn published(&self, path: &str) -> Vec<Value> {
        self.state
            .borrow()
            .topics
            .get(path)
            .map(|topic| topic.history.clone())
            .unwrap_or_default()
    }

    pub fn kind(&self, path: &str) -> Option<ValueKind> {
        self.state
            .borrow()
            .topics
            .get(path)
            .and_then(|topic| topic.kind)
    }

    pub fn publisher_count(&self, path: &str) -> usize {
        self.state
            .borrow()
            .topics
            .get(path)
            .map_or(0, |topic| topic.publishers.len())
    }

    pub fn subscriber_count(&self, path: &str) -> usize {
        self.state
            .borrow()
            .topics
            .get(path)
            .map_or(0, |topic| topic.subscribers.len())
    }

    pub fn topics(&self) -> Vec<String> {
        self.state.borrow().topics.keys().cloned().collect()
    }

    pub fn stats(&self) -> BusStats {
        self.state.borrow().stats
    }

    /// Makes every later publish on `path` fail with
    /// [`TransportError::Unavailable`]
    pub fn refuse_publishers(&self, path: &str) {
        self.state
            .borrow_mut()
            .refused_publishers
            .insert(path.to_string());
    }

    /// Makes every later subscribe on `path` fail with
    /// [`TransportError::Unavailable`]
    pub fn refuse_subscribers(&self, path: &str) {
        self.state
            .borrow_mut()
            .refused_subscribers
            .insert(path.to_string());
    }

    /// Latest value of every topic keyed by path, for dumping to the console
    pub fn snapshot(&self) -> serde_json::Value {
        let state = self.state.borrow();
        let map = state
            .topics
            .iter()
            .filter_map(|(path, topic)| {
                topic.latest.as_ref().map(|value| {
                    (
                        path.clone(),
                        serde_json::to_value(value)
                            .unwrap_or(serde_json::Value::Null),
                    )
                })
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Transport for LocalBus {
    fn topic(&self, path: &TopicPath) -> Box<dyn Topic> {
        Box::new(LocalTopic {
            bus: self.clone(),
            path: path.clone(),
        })
    }
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    topics: IndexMap<String, TopicState>,
    stats: BusStats,
    refused_publishers: HashSet<String>,
    refused_subscribers: HashSet<String>,
}

impl BusState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_kind(
        &mut self,
        path: &str,
        kind: ValueKind,
    ) -> Result<(), TransportError> {
        let topic = self.topics.entry(path.to_string()).or_default();
        let in_use =
            !topic.publishers.is_empty() || !topic.subscribers.is_empty();
        match topic.kind {
            Some(found) if in_use && found != kind => {
                Err(TransportError::KindMismatch {
                    path: path.to_string(),
                    expected: kind,
                    found,
                })
            }
            _ => {
                topic.kind = Some(kind);
                Ok(())
            }
        }
    }

    fn write(
        &mut self,
        path: &str,
        source: PublisherId,
        value: Value,
        record: bool,
    ) {
        let topic = self.topics.entry(path.to_string()).or_default();
        for queue in topic.subscribers.values_mut() {
            if queue.options.exclude_publisher == Some(source) {
                continue;
            }
            if queue.values.len() >= queue.options.queue_depth.max(1) {
                queue.values.pop_front();
            }
            queue.values.push_back(value.clone());
        }
        if record {
            topic.history.push(value.clone());
        }
        topic.latest = Some(value);
    }
}

#[derive(Default)]
struct TopicState {
    kind: Option<ValueKind>,
    latest: Option<Value>,
    history: Vec<Value>,
    publishers: HashSet<PublisherId>,
    subscribers: IndexMap<u64, SubscriberQueue>,
}

struct SubscriberQueue {
    values: VecDeque<Value>,
    options: SubscribeOptions,
}

struct LocalTopic {
    bus: LocalBus,
    path: TopicPath,
}

impl Topic for LocalTopic {
    fn path(&self) -> &TopicPath {
        &self.path
    }

    fn publish(
        &self,
        kind: ValueKind,
    ) -> Result<Box<dyn Publisher>, TransportError> {
        let mut state = self.bus.state.borrow_mut();
        let path = self.path.as_str();

        if state.refused_publishers.contains(path) {
            return Err(TransportError::Unavailable {
                path: path.to_string(),
                reason: "publisher refused".to_string(),
            });
        }

        state.check_kind(path, kind)?;
        let id = state.next_id();
        state
            .topics
            .entry(path.to_string())
            .or_default()
            .publishers
            .insert(id);
        state.stats.publishers_opened += 1;
        debug!("opened publisher {} on {} ({})", id, path, kind);

        Ok(Box::new(LocalPublisher {
            bus: self.bus.clone(),
            path: self.path.clone(),
            id,
            kind,
            open: true,
        }))
    }

    fn subscribe(
        &self,
        default: Value,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscriber>, TransportError> {
        let mut state = self.bus.state.borrow_mut();
        let path = self.path.as_str();

        if state.refused_subscribers.contains(path) {
            return Err(TransportError::Unavailable {
                path: path.to_string(),
                reason: "subscriber refused".to_string(),
            });
        }

        state.check_kind(path, default.kind())?;
        let id = state.next_id();
        state.topics.entry(path.to_string()).or_default().subscribers.insert(
            id,
            SubscriberQueue {
                values: VecDeque::new(),
                options,
            },
        );
        state.stats.subscribers_opened += 1;
        debug!("opened subscriber {} on {}", id, path);

        Ok(Box::new(LocalSubscriber {
            bus: self.bus.clone(),
            path: self.path.clone(),
            id,
            default,
            open: true,
        }))
    }
}

struct LocalPublisher {
    bus: LocalBus,
    path: TopicPath,
    id: PublisherId,
    kind: ValueKind,
    open: bool,
}

impl Publisher for LocalPublisher {
    fn id(&self) -> PublisherId {
        self.id
    }

    fn set(&mut self, value: Value) {
        if !self.open {
            warn!("dropping write to closed publisher on {}", self.path);
            return;
        }
        if value.kind() != self.kind {
            warn!(
                "dropping {} write to {} publisher on {}",
                value.kind(),
                self.kind,
                self.path
            );
            return;
        }
        self.bus
            .state
            .borrow_mut()
            .write(self.path.as_str(), self.id, value, true);
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed {
                path: self.path.to_string(),
            });
        }
        self.open = false;

        let mut state = self.bus.state.borrow_mut();
        if let Some(topic) = state.topics.get_mut(self.path.as_str()) {
            topic.publishers.remove(&self.id);
        }
        state.stats.publishers_closed += 1;
        debug!("closed publisher {} on {}", self.id, self.path);
        Ok(())
    }
}

struct LocalSubscriber {
    bus: LocalBus,
    path: TopicPath,
    id: u64,
    default: Value,
    open: bool,
}

impl Subscriber for LocalSubscriber {
    fn drain_queued(&mut self) -> Vec<Value> {
        if !self.open {
            return Vec::new();
        }
        self.bus
            .state
            .borrow_mut()
            .topics
            .get_mut(self.path.as_str())
            .and_then(|topic| topic.subscribers.get_mut(&self.id))
            .map(|queue| queue.values.drain(..).collect())
            .unwrap_or_default()
    }

    fn latest(&self) -> Value {
        self.bus
            .latest(self.path.as_str())
            .filter(|value| value.kind() == self.default.kind())
            .unwrap_or_else(|| self.default.clone())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed {
                path: self.path.to_string(),
            });
        }
        self.open = false;

        let mut state = self.bus.state.borrow_mut();
        if let Some(topic) = state.topics.get_mut(self.path.as_str()) {
            topic.subscribers.shift_remove(&self.id);
        }
        state.stats.subscribers_closed += 1;
        debug!("closed subscriber {} on {}", self.id, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(bus: &LocalBus, path: &str) -> Box<dyn Topic> {
        bus.topic(&TopicPath::new(path))
    }

    #[test]
    fn subscriber_skips_excluded_publisher() {
        let bus = LocalBus::new();
        let topic = topic(&bus, "a");
        let mut publisher = topic.publish(ValueKind::Double).unwrap();
        let mut own = topic
            .subscribe(
                Value::Double(0.0),
                SubscribeOptions::excluding(publisher.id()),
            )
            .unwrap();
        let mut other = topic
            .subscribe(Value::Double(0.0), SubscribeOptions::default())
            .unwrap();

        publisher.set(Value::Double(1.0));

        assert!(own.drain_queued().is_empty());
        assert_eq!(other.drain_queued(), vec![Value::Double(1.0)]);
        assert_eq!(own.latest(), Value::Double(1.0));
    }

    #[test]
    fn remote_writes_reach_every_subscriber_in_order() {
        let bus = LocalBus::new();
        let topic = topic(&bus, "a");
        let mut sub = topic
            .subscribe(Value::Integer(0), SubscribeOptions::default())
            .unwrap();

        bus.set_remote("a", Value::Integer(1));
        bus.set_remote("a", Value::Integer(2));

        assert_eq!(
            sub.drain_queued(),
            vec![Value::Integer(1), Value::Integer(2)]
        );
        assert!(sub.drain_queued().is_empty());
        assert!(bus.published("a").is_empty());
    }

    #[test]
    fn queue_drops_oldest_past_depth() {
        let bus = LocalBus::new();
        let topic = topic(&bus, "a");
        let mut sub = topic
            .subscribe(
                Value::Integer(0),
                SubscribeOptions {
                    queue_depth: 2,
                    ..SubscribeOptions::default()
                },
            )
            .unwrap();

        for i in 0..5 {
            bus.set_remote("a", Value::Integer(i));
        }

        assert_eq!(
            sub.drain_queued(),
            vec![Value::Integer(3), Value::Integer(4)]
        );
    }

    #[test]
    fn publish_rejects_conflicting_kind() {
        let bus = LocalBus::new();
        let topic = topic(&bus, "a");
        let _first = topic.publish(ValueKind::Boolean).unwrap();

        let err = topic.publish(ValueKind::String).err().unwrap();
        assert!(matches!(err, TransportError::KindMismatch { .. }));
    }

    #[test]
    fn close_twice_reports_closed() {
        let bus = LocalBus::new();
        let mut publisher =
            topic(&bus, "a").publish(ValueKind::Boolean).unwrap();

        publisher.close().unwrap();
        assert!(matches!(
            publisher.close(),
            Err(TransportError::Closed { .. })
        ));
        assert_eq!(bus.stats().publishers_closed, 1);
        assert_eq!(bus.publisher_count("a"), 0);
    }

    #[test]
    fn refused_paths_fail_acquisition() {
        let bus = LocalBus::new();
        bus.refuse_subscribers("a");

        let result = topic(&bus, "a")
            .subscribe(Value::Boolean(false), SubscribeOptions::default());
        assert!(matches!(result, Err(TransportError::Unavailable { .. })));
        assert_eq!(bus.stats(), BusStats::default());
    }

    #[test]
    fn snapshot_lists_latest_values() {
        let bus = LocalBus::new();
        let mut publisher =
            topic(&bus, "a/b").publish(ValueKind::String).unwrap();
        publisher.set(Value::from("hi"));

        let snapshot = bus.snapshot();
        assert_eq!(snapshot["a/b"]["value"], "hi");
    }
}
