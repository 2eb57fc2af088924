//! Listener registry.
//!
//! Two independent collections, persistent and one-shot, each mapping an
//! event name to a set of listeners. Sets are keyed by [`ListenerId`], so
//! registering the same handle twice is a no-op.
//!
//! All methods take `&self`. The registry lock is never held while a
//! listener runs, so listeners may subscribe, unsubscribe or emit from inside
//! a callback.

use crate::error::{EmitterError, Result};
use crate::listener::{ErasedListener, Listener, ListenerId};
use crate::schema::{Event, EventName, EventSchema};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct ListenerSet {
    entries: Vec<ErasedListener>,
}

impl ListenerSet {
    fn insert(&mut self, listener: ErasedListener) -> bool {
        if self.contains(listener.id()) {
            return false;
        }
        self.entries.push(listener);
        true
    }

    fn remove(&mut self, id: ListenerId) -> Option<ErasedListener> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        Some(self.entries.remove(index))
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Registry<N> {
    persistent: HashMap<N, ListenerSet>,
    one_shot: HashMap<N, ListenerSet>,
}

impl<N: EventName> Registry<N> {
    fn new() -> Self {
        Self {
            persistent: HashMap::new(),
            one_shot: HashMap::new(),
        }
    }

    // Removal hands entries back to the caller so they are dropped after the
    // registry lock is released; a listener's captured state may re-enter it.
    fn remove(&mut self, name: N, id: ListenerId) -> Vec<ErasedListener> {
        remove_from(&mut self.persistent, name, id)
            .into_iter()
            .chain(remove_from(&mut self.one_shot, name, id))
            .collect()
    }

    fn clear(&mut self, name: Option<N>) -> Vec<ListenerSet> {
        match name {
            Some(name) => [self.persistent.remove(&name), self.one_shot.remove(&name)]
                .into_iter()
                .flatten()
                .collect(),
            None => std::mem::take(&mut self.persistent)
                .into_values()
                .chain(std::mem::take(&mut self.one_shot).into_values())
                .collect(),
        }
    }

    /// Union of both collections for `name`, one-shot entries removed.
    fn snapshot(&mut self, name: N) -> Vec<ErasedListener> {
        let mut snapshot: Vec<ErasedListener> = self
            .persistent
            .get(&name)
            .map(|set| set.entries.clone())
            .unwrap_or_default();

        if let Some(once) = self.one_shot.remove(&name) {
            for entry in once.entries {
                if !snapshot.iter().any(|s| s.id() == entry.id()) {
                    snapshot.push(entry);
                }
            }
        }

        snapshot
    }

    fn count(&self, name: N) -> usize {
        let persistent = self.persistent.get(&name);
        let one_shot = self.one_shot.get(&name);

        let mut count = persistent.map_or(0, |set| set.entries.len());
        if let Some(once) = one_shot {
            count += once
                .entries
                .iter()
                .filter(|entry| !persistent.is_some_and(|set| set.contains(entry.id())))
                .count();
        }
        count
    }
}

fn remove_from<N: EventName>(
    map: &mut HashMap<N, ListenerSet>,
    name: N,
    id: ListenerId,
) -> Option<ErasedListener> {
    let set = map.get_mut(&name)?;
    let removed = set.remove(id);
    if set.is_empty() {
        map.remove(&name);
    }
    removed
}

/// The subscriber-facing half of an emitter.
pub struct Subscriptions<S: EventSchema> {
    registry: Mutex<Registry<S::Name>>,
}

impl<S: EventSchema> Subscriptions<S> {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
        }
    }

    /// Listen for every future `E`.
    pub fn on<E: Event<S>>(&self, _event: E, listener: Listener<E::Args>) -> &Self {
        let id = listener.id();
        let added = self
            .registry
            .lock()
            .persistent
            .entry(E::NAME)
            .or_default()
            .insert(ErasedListener::new(listener));

        tracing::trace!(event = E::NAME.as_str(), %id, added, "persistent listener registered");
        self
    }

    /// Listen for the next `E` only.
    pub fn once<E: Event<S>>(&self, _event: E, listener: Listener<E::Args>) -> &Self {
        let id = listener.id();
        let added = self
            .registry
            .lock()
            .one_shot
            .entry(E::NAME)
            .or_default()
            .insert(ErasedListener::new(listener));

        tracing::trace!(event = E::NAME.as_str(), %id, added, "one-shot listener registered");
        self
    }

    /// Remove `listener` from both collections of `E`. Unknown listeners are ignored.
    pub fn remove_listener<E: Event<S>>(&self, _event: E, listener: &Listener<E::Args>) {
        let id = listener.id();
        let removed = self.registry.lock().remove(E::NAME, id);
        tracing::trace!(
            event = E::NAME.as_str(),
            %id,
            removed = !removed.is_empty(),
            "listener removed"
        );
    }

    /// Remove every listener of `event`, or of every event when `None`.
    pub fn remove_all_listeners(&self, event: Option<S::Name>) {
        let removed = self.registry.lock().clear(event);
        drop(removed);
        match event {
            Some(name) => tracing::trace!(event = name.as_str(), "listeners cleared"),
            None => tracing::trace!("all listeners cleared"),
        }
    }

    /// [`remove_all_listeners`](Self::remove_all_listeners) for untyped call
    /// sites: a JSON string names one event, `null` clears everything.
    pub fn remove_all_listeners_value(&self, event: &serde_json::Value) -> Result<()> {
        let name = match event {
            serde_json::Value::Null => None,
            serde_json::Value::String(raw) => Some(parse_name::<S>(raw)?),
            other => {
                return Err(EmitterError::InvalidArgument(format!(
                    "expected string or null, got {}",
                    json_type_name(other)
                )))
            }
        };
        self.remove_all_listeners(name);
        Ok(())
    }

    /// Distinct listeners of `event` across both collections.
    pub fn listener_count(&self, event: S::Name) -> usize {
        self.registry.lock().count(event)
    }

    pub fn has_listeners(&self, event: S::Name) -> bool {
        self.listener_count(event) > 0
    }

    /// Events with at least one listener.
    pub fn event_names(&self) -> Vec<S::Name> {
        let registry = self.registry.lock();
        let mut names: Vec<S::Name> = registry.persistent.keys().copied().collect();
        for name in registry.one_shot.keys() {
            if !names.contains(name) {
                names.push(*name);
            }
        }
        names
    }

    pub(crate) fn take_snapshot(&self, event: S::Name) -> Vec<ErasedListener> {
        self.registry.lock().snapshot(event)
    }
}

impl<S: EventSchema> Default for Subscriptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_name<S: EventSchema>(raw: &str) -> Result<S::Name> {
    raw.parse::<S::Name>()
        .map_err(|_| EmitterError::InvalidArgument(format!("unknown event `{raw}`")))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Ping, Pong, TestEventName, TestEvents};
    use serde_json::json;

    #[test]
    fn test_same_handle_registered_once() {
        let subs = Subscriptions::<TestEvents>::new();
        let listener = Listener::new(|_: &u32| {});

        subs.on(Ping, listener.clone()).on(Ping, listener.clone());
        subs.once(Ping, listener.clone());

        assert_eq!(subs.listener_count(TestEventName::Ping), 1);
        let snapshot = subs.take_snapshot(TestEventName::Ping);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_snapshot_clears_one_shot() {
        let subs = Subscriptions::<TestEvents>::new();
        subs.on(Ping, Listener::new(|_: &u32| {}));
        subs.once(Ping, Listener::new(|_: &u32| {}));

        assert_eq!(subs.take_snapshot(TestEventName::Ping).len(), 2);
        assert_eq!(subs.take_snapshot(TestEventName::Ping).len(), 1);
        assert_eq!(subs.listener_count(TestEventName::Ping), 1);
    }

    #[test]
    fn test_remove_listener_from_both_collections() {
        let subs = Subscriptions::<TestEvents>::new();
        let listener = Listener::new(|_: &u32| {});
        subs.on(Ping, listener.clone()).once(Ping, listener.clone());

        subs.remove_listener(Ping, &listener);

        assert!(!subs.has_listeners(TestEventName::Ping));
        assert!(subs.event_names().is_empty());
    }

    #[test]
    fn test_remove_unknown_listener_is_noop() {
        let subs = Subscriptions::<TestEvents>::new();
        let kept = Listener::new(|_: &u32| {});
        subs.on(Ping, kept);

        subs.remove_listener(Ping, &Listener::new(|_: &u32| {}));
        subs.remove_listener(Pong, &Listener::new(|_: &String| {}));

        assert_eq!(subs.listener_count(TestEventName::Ping), 1);
    }

    #[test]
    fn test_remove_all_scoped_and_global() {
        let subs = Subscriptions::<TestEvents>::new();
        subs.on(Ping, Listener::new(|_: &u32| {}));
        subs.once(Pong, Listener::new(|_: &String| {}));

        subs.remove_all_listeners(Some(TestEventName::Ping));
        assert!(!subs.has_listeners(TestEventName::Ping));
        assert!(subs.has_listeners(TestEventName::Pong));

        subs.on(Ping, Listener::new(|_: &u32| {}));
        subs.remove_all_listeners(None);
        assert!(subs.event_names().is_empty());
    }

    #[test]
    fn test_remove_all_listeners_value() {
        let subs = Subscriptions::<TestEvents>::new();
        subs.on(Ping, Listener::new(|_: &u32| {}));
        subs.on(Pong, Listener::new(|_: &String| {}));

        subs.remove_all_listeners_value(&json!("ping")).unwrap();
        assert_eq!(subs.event_names(), vec![TestEventName::Pong]);

        subs.remove_all_listeners_value(&json!(null)).unwrap();
        assert!(subs.event_names().is_empty());
    }

    #[test]
    fn test_remove_all_listeners_value_rejects_other_types() {
        let subs = Subscriptions::<TestEvents>::new();
        subs.on(Ping, Listener::new(|_: &u32| {}));

        let err = subs.remove_all_listeners_value(&json!(42)).unwrap_err();
        assert!(matches!(err, EmitterError::InvalidArgument(_)));
        assert_eq!(
            err.to_string(),
            "invalid argument: expected string or null, got number"
        );

        let err = subs.remove_all_listeners_value(&json!("nope")).unwrap_err();
        assert!(matches!(err, EmitterError::InvalidArgument(_)));

        assert!(subs.remove_all_listeners_value(&json!(["ping"])).is_err());
        assert!(subs.remove_all_listeners_value(&json!({})).is_err());
        assert!(subs.has_listeners(TestEventName::Ping));
    }
}
