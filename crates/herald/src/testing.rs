//! Schema shared by the unit tests.

use crate::schema::{Event, EventName, EventSchema};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestEventName {
    Error,
    Ping,
    Pong,
}

impl EventName for TestEventName {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

impl FromStr for TestEventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "ping" => Ok(Self::Ping),
            "pong" => Ok(Self::Pong),
            other => Err(format!("unknown event: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub String);

pub struct TestEvents;

impl EventSchema for TestEvents {
    type Name = TestEventName;
    type Error = TestError;

    const ERROR: TestEventName = TestEventName::Error;
}

pub struct Ping;

impl Event<TestEvents> for Ping {
    type Args = u32;

    const NAME: TestEventName = TestEventName::Ping;
}

pub struct Pong;

impl Event<TestEvents> for Pong {
    type Args = String;

    const NAME: TestEventName = TestEventName::Pong;
}

/// Shares the error channel's name but not its payload type.
pub struct MislabeledError;

impl Event<TestEvents> for MislabeledError {
    type Args = u32;

    const NAME: TestEventName = TestEventName::Error;
}
