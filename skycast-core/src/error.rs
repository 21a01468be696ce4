use thiserror::Error;

/// The only failure the forecast adapter can report.
///
/// Anything short of a structurally unusable payload is absorbed with a
/// default value instead of surfacing here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Malformed upstream payload: {reason}")]
    MalformedUpstreamPayload { reason: String },
}

impl AdapterError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        AdapterError::MalformedUpstreamPayload { reason: reason.into() }
    }
}

/// Rejected settings input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid update period {0}. Allowed values: 1, 2, 3.")]
    InvalidUpdatePeriod(u8),

    #[error("Unknown unit system '{0}'. Supported: metric, imperial.")]
    UnknownUnitSystem(String),

    #[error("Unknown widget '{0}'.")]
    UnknownWidget(String),

    #[error("Unknown activity '{0}'. Supported: running, jogging, cycling, hiking.")]
    UnknownActivity(String),
}
