use thiserror::Error;

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    #[error("malformed data in {source_name}: {reason}")]
    MalformedData { source_name: String, reason: String },
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
    /// Selected country has no rows. Callers treat this as an empty result.
    #[error("country `{0}` is not in the catalog")]
    EmptySelection(String),
}

impl DashboardError {
    pub(crate) fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedData {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
