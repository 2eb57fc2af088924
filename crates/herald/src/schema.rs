//! Event schemas.
//!
//! A schema is a closed set of event names plus the argument type each event
//! carries. Names are a plain enum implementing [`EventName`]; each event is
//! a zero-sized marker implementing [`Event`], which pins the listener
//! argument type at compile time:
//!
//! ```
//! use herald::{Event, EventName, EventSchema};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum DoorEventName {
//!     Error,
//!     Opened,
//! }
//!
//! impl EventName for DoorEventName {
//!     fn as_str(&self) -> &'static str {
//!         match self {
//!             Self::Error => "error",
//!             Self::Opened => "opened",
//!         }
//!     }
//! }
//!
//! impl std::str::FromStr for DoorEventName {
//!     type Err = ();
//!     fn from_str(s: &str) -> Result<Self, ()> {
//!         match s {
//!             "error" => Ok(Self::Error),
//!             "opened" => Ok(Self::Opened),
//!             _ => Err(()),
//!         }
//!     }
//! }
//!
//! struct DoorEvents;
//!
//! impl EventSchema for DoorEvents {
//!     type Name = DoorEventName;
//!     type Error = std::io::Error;
//!     const ERROR: DoorEventName = DoorEventName::Error;
//! }
//!
//! struct Opened;
//!
//! impl Event<DoorEvents> for Opened {
//!     type Args = (String, u32);
//!     const NAME: DoorEventName = DoorEventName::Opened;
//! }
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Identifier of one event in a schema.
///
/// `as_str` is used in logs and errors; `FromStr` backs the dynamic
/// boundary (`remove_all_listeners_value`).
pub trait EventName: Copy + Eq + Hash + fmt::Debug + FromStr + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;
}

/// The set of events a notifier can fire.
pub trait EventSchema: 'static {
    type Name: EventName;

    /// Payload of the error channel.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reserved error channel. Firing it with no listeners on a strict
    /// emitter escalates the payload to the caller.
    const ERROR: Self::Name;
}

/// A single event of schema `S`.
///
/// Every marker bound to the same `NAME` must use the same `Args`; a stored
/// listener whose argument type does not match is skipped with a warning.
pub trait Event<S: EventSchema>: 'static {
    type Args: Send + Sync + 'static;

    const NAME: S::Name;
}

/// The reserved error channel of any schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorEvent;

impl<S: EventSchema> Event<S> for ErrorEvent {
    type Args = S::Error;

    const NAME: S::Name = S::ERROR;
}
