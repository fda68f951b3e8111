//! Deferred publish/subscribe
//!
//! `publish` only queues; subscribers see events on the next [`EventBus::flush`].

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::debug;

/// Sink for entity events
pub trait Publisher {
    /// Publish `payload` on `topic`; `false` when nobody listens to the topic
    fn publish(&mut self, topic: &str, payload: Value) -> bool;
}

type Handler = Box<dyn FnMut(&str, &Value)>;

struct Subscription {
    token: String,
    handler: Handler,
}

/// In-process event bus with deferred delivery
#[derive(Default)]
pub struct EventBus {
    topics: HashMap<String, Vec<Subscription>>,
    pending: VecDeque<(String, Value)>,
    next_token: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, returning a token for [`EventBus::remove`]
    pub fn subscribe<F>(&mut self, topic: &str, handler: F) -> String
    where
        F: FnMut(&str, &Value) + 'static,
    {
        let token = self.next_token.to_string();
        self.next_token += 1;
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscription {
                token: token.clone(),
                handler: Box::new(handler),
            });
        token
    }

    /// Drop a subscription; returns the token if one was removed
    pub fn remove(&mut self, token: &str) -> Option<String> {
        for subscriptions in self.topics.values_mut() {
            if let Some(index) = subscriptions.iter().position(|s| s.token == token) {
                return Some(subscriptions.remove(index).token);
            }
        }
        None
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Deliver every queued event, newest subscriber first
    ///
    /// Returns the number of events delivered.
    pub fn flush(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((topic, payload)) = self.pending.pop_front() {
            if let Some(subscriptions) = self.topics.get_mut(&topic) {
                for subscription in subscriptions.iter_mut().rev() {
                    (subscription.handler)(&topic, &payload);
                }
            }
            delivered += 1;
        }
        delivered
    }
}

impl Publisher for EventBus {
    fn publish(&mut self, topic: &str, payload: Value) -> bool {
        if !self.topics.contains_key(topic) {
            debug!("No subscribers for '{}'", topic);
            return false;
        }
        self.pending.push_back((topic.to_string(), payload));
        true
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: HashMap<&str, usize> = self
            .topics
            .iter()
            .map(|(topic, subs)| (topic.as_str(), subs.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("topics", &topics)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_unknown_topic() {
        let mut bus = EventBus::new();
        assert!(!bus.publish("onMove", json!({})));
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_tokens_increase() {
        let mut bus = EventBus::new();
        let a = bus.subscribe("a", |_, _| {});
        let b = bus.subscribe("b", |_, _| {});
        assert_eq!(a, "0");
        assert_eq!(b, "1");
    }

    #[test]
    fn test_delivery_is_deferred_and_reversed() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in ["first", "second"] {
            let order = order.clone();
            bus.subscribe("tick", move |topic, payload| {
                order.borrow_mut().push(format!("{}:{}:{}", id, topic, payload));
            });
        }

        assert!(bus.publish("tick", json!(1)));
        assert!(order.borrow().is_empty());
        assert_eq!(bus.pending(), 1);

        assert_eq!(bus.flush(), 1);
        assert_eq!(*order.borrow(), vec!["second:tick:1", "first:tick:1"]);
        assert_eq!(bus.flush(), 0);
    }

    #[test]
    fn test_remove() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let token = bus.subscribe("tick", move |_, _| *counter.borrow_mut() += 1);

        assert_eq!(bus.remove(&token), Some(token.clone()));
        assert_eq!(bus.remove(&token), None);

        // Topic stays known after its last subscriber leaves
        assert!(bus.publish("tick", json!(null)));
        bus.flush();
        assert_eq!(*count.borrow(), 0);
    }
}
