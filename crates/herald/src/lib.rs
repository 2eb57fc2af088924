//! herald: a typed, in-process event emitter.
//!
//! A notifier composes an [`EventEmitter`], exposes its [`Subscriptions`]
//! through the [`Notifier`] trait, and fires its own events with
//! [`EventEmitter::emit`]. Listeners are persistent ([`Notifier::on`]) or
//! one-shot ([`Notifier::once`]).

mod config;
mod emitter;
mod error;
mod listener;
mod registry;
mod schema;

#[cfg(test)]
mod testing;

pub use config::EmitterConfig;
pub use emitter::{EventEmitter, Notifier};
pub use error::{ConfigError, EmitterError, Payload, Result};
pub use listener::{Listener, ListenerFn, ListenerId};
pub use registry::Subscriptions;
pub use schema::{ErrorEvent, Event, EventName, EventSchema};
