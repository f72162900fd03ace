use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use mostro_protocol::event::Event;
use serde_json::Value;

use crate::error::RelayError;
use crate::pool::RelayPool;

/// An in-process stand-in for a multi-relay websocket client, used in
/// tests for everything above the relay port. Publishing always succeeds;
/// querying supports the `kinds`, `authors`, and `#tag` filter shapes the
/// rest of this workspace emits.
#[derive(Default)]
pub struct InMemoryRelayPool {
    events: Mutex<Vec<Event>>,
}

impl InMemoryRelayPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, event: Event) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}

fn matches(event: &Event, filter: &Value) -> bool {
    let Some(obj) = filter.as_object() else {
        return true;
    };

    if let Some(kinds) = obj.get("kinds").and_then(Value::as_array) {
        let ok = kinds
            .iter()
            .any(|k| k.as_u64() == Some(u64::from(event.kind)));
        if !ok {
            return false;
        }
    }

    if let Some(authors) = obj.get("authors").and_then(Value::as_array) {
        let ok = authors
            .iter()
            .any(|a| a.as_str() == Some(event.signer_pubkey.as_str()));
        if !ok {
            return false;
        }
    }

    for (key, wanted) in obj {
        let Some(tag_name) = key.strip_prefix('#') else {
            continue;
        };
        let Some(wanted_values) = wanted.as_array() else {
            continue;
        };
        let event_values = event.tag_values(tag_name);
        let ok = wanted_values
            .iter()
            .filter_map(Value::as_str)
            .any(|wanted_value| event_values.contains(&wanted_value));
        if !ok {
            return false;
        }
    }

    true
}

#[async_trait]
impl RelayPool for InMemoryRelayPool {
    async fn publish(&self, event: Event) -> Result<usize, RelayError> {
        self.events.lock().expect("lock poisoned").push(event);
        Ok(1)
    }

    async fn query(&self, filter: Value) -> Vec<Event> {
        let mut seen = HashSet::new();
        self.events
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|event| matches(event, &filter))
            .filter(|event| seen.insert(event.id.clone()))
            .cloned()
            .collect()
    }

    async fn close(&self) {}
}
