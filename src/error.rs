// Sensify - Error taxonomy
//
// Every failure is handled at the screen/reducer boundary; nothing here is
// meant to abort the process.

use thiserror::Error;

use crate::events::{Effect, SensorKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensifyError {
    /// Availability probe returned false, or subscribing failed.
    #[error("{0} is not available on this device")]
    SensorUnavailable(SensorKind),
    /// Platform permission prompt was rejected.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// A single sample could not be processed; the subscription survives.
    #[error("dropped sample: {0}")]
    TransientSample(String),
    #[error("could not persist emergency contact: {0}")]
    Persistence(String),
    #[error("emergency contact must contain at least {min} digits")]
    InvalidContact { min: usize },
    #[error("state table must contain at least one state")]
    EmptyStateTable,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SensifyError>;

impl SensifyError {
    /// The one-time alert shown for this failure, if it warrants one.
    /// Unavailable sensors only degrade the screen to a static view.
    pub fn user_alert(&self) -> Option<Effect> {
        match self {
            Self::PermissionDenied(detail) => Some(Effect::alert("Permission Denied", detail.clone())),
            Self::InvalidContact { .. } => Some(Effect::alert("Invalid Number", self.to_string())),
            Self::Persistence(_) => Some(Effect::alert("Error", "Failed to save emergency contact")),
            _ => None,
        }
    }
}
