//! Emitter error types

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("uncaught `{event}` event: {message}")]
    UncaughtEvent {
        event: &'static str,
        message: String,
        payload: Payload,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EmitterError {
    /// Borrow the payload of an [`EmitterError::UncaughtEvent`] as `T`.
    pub fn downcast_payload<T: Any>(&self) -> Option<&T> {
        match self {
            Self::UncaughtEvent { payload, .. } => payload.downcast_ref(),
            _ => None,
        }
    }

    /// Take the payload of an [`EmitterError::UncaughtEvent`] back out.
    ///
    /// Returns `Err(self)` when this is not an uncaught event or the payload
    /// is not a `T`.
    pub fn into_payload<T: Any>(self) -> Result<T, Self> {
        match self {
            Self::UncaughtEvent {
                event,
                message,
                payload,
            } => match payload.0.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(inner) => Err(Self::UncaughtEvent {
                    event,
                    message,
                    payload: Payload(inner),
                }),
            },
            other => Err(other),
        }
    }

    pub fn is_uncaught(&self) -> bool {
        matches!(self, Self::UncaughtEvent { .. })
    }
}

/// Type-erased value carried out of an escalated error-channel dispatch.
pub struct Payload(Box<dyn Any + Send + Sync>);

impl Payload {
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid emitter config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T, E = EmitterError> = std::result::Result<T, E>;
