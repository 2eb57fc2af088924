//! EventEmitter<S> and the Notifier surface.
//!
//! A concrete notifier keeps an [`EventEmitter`] in a private field and
//! implements [`Notifier`] to hand subscribers the [`Subscriptions`] half.
//! Only the notifier's own methods can reach [`EventEmitter::emit`].
//!
//! Dispatch is snapshot-based:
//!   - the listeners of an event are collected when `emit` starts, and the
//!     event's one-shot set is cleared right away;
//!   - a listener removed during the pass is still called in that pass;
//!   - a listener added during the pass is not called until the next emit.
//!
//! Panics inside a listener propagate to the caller. One-shot listeners of
//! that event have already been dropped by then.

use crate::config::EmitterConfig;
use crate::error::{EmitterError, Payload, Result};
use crate::listener::Listener;
use crate::registry::Subscriptions;
use crate::schema::{Event, EventName, EventSchema};
use std::any::type_name;
use std::ops::Deref;

/// Listener registry plus the right to fire events.
pub struct EventEmitter<S: EventSchema> {
    subscriptions: Subscriptions<S>,
    throw_uncaught_errors: bool,
}

impl<S: EventSchema> EventEmitter<S> {
    /// A strict emitter: unheard error events escalate.
    pub fn new() -> Self {
        Self::with_config(&EmitterConfig::default())
    }

    /// An emitter that drops error events nobody listens to.
    pub fn lenient() -> Self {
        Self::with_config(&EmitterConfig {
            throw_uncaught_errors: false,
        })
    }

    pub fn with_config(config: &EmitterConfig) -> Self {
        Self {
            subscriptions: Subscriptions::new(),
            throw_uncaught_errors: config.throw_uncaught_errors,
        }
    }

    pub fn throws_uncaught_errors(&self) -> bool {
        self.throw_uncaught_errors
    }

    pub fn subscriptions(&self) -> &Subscriptions<S> {
        &self.subscriptions
    }

    /// Fire `E` with `args`.
    ///
    /// Fails only when `E` is the schema's error channel, nobody listened and
    /// the emitter is strict; the error then carries `args` as its payload.
    pub fn emit<E: Event<S>>(&self, _event: E, args: E::Args) -> Result<()> {
        let name = E::NAME;
        let snapshot = self.subscriptions.take_snapshot(name);

        tracing::debug!(event = name.as_str(), listeners = snapshot.len(), "emitting event");

        let mut invoked = 0usize;
        for entry in &snapshot {
            match entry.downcast::<E::Args>() {
                Some(listener) => {
                    listener.call(&args);
                    invoked += 1;
                }
                None => tracing::warn!(
                    event = name.as_str(),
                    listener = %entry.id(),
                    expected = type_name::<E::Args>(),
                    "listener argument type does not match event, skipping"
                ),
            }
        }

        // Skipped listeners did not hear the error.
        if invoked == 0 && name == S::ERROR && self.throw_uncaught_errors {
            let payload = Payload::new(args);
            let message = payload
                .downcast_ref::<S::Error>()
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("unhandled {} payload", type_name::<E::Args>()));

            tracing::warn!(event = name.as_str(), error = %message, "error event has no listeners");
            return Err(EmitterError::UncaughtEvent {
                event: name.as_str(),
                message,
                payload,
            });
        }

        Ok(())
    }
}

impl<S: EventSchema> Default for EventEmitter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSchema> Deref for EventEmitter<S> {
    type Target = Subscriptions<S>;

    fn deref(&self) -> &Subscriptions<S> {
        &self.subscriptions
    }
}

/// Subscription surface of a type that fires events of `Self::Schema`.
pub trait Notifier {
    type Schema: EventSchema;

    fn events(&self) -> &Subscriptions<Self::Schema>;

    fn on<E: Event<Self::Schema>>(&self, event: E, listener: Listener<E::Args>) -> &Self {
        self.events().on(event, listener);
        self
    }

    fn once<E: Event<Self::Schema>>(&self, event: E, listener: Listener<E::Args>) -> &Self {
        self.events().once(event, listener);
        self
    }

    fn remove_listener<E: Event<Self::Schema>>(&self, event: E, listener: &Listener<E::Args>) {
        self.events().remove_listener(event, listener);
    }

    fn remove_all_listeners(&self, event: Option<<Self::Schema as EventSchema>::Name>) {
        self.events().remove_all_listeners(event);
    }

    fn remove_all_listeners_value(&self, event: &serde_json::Value) -> Result<()> {
        self.events().remove_all_listeners_value(event)
    }

    fn listener_count(&self, event: <Self::Schema as EventSchema>::Name) -> usize {
        self.events().listener_count(event)
    }

    fn has_listeners(&self, event: <Self::Schema as EventSchema>::Name) -> bool {
        self.events().has_listeners(event)
    }

    fn event_names(&self) -> Vec<<Self::Schema as EventSchema>::Name> {
        self.events().event_names()
    }
}
