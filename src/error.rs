use std::fmt;

/// Failure kinds surfaced by the indicator engine, the chain summarizer and the
/// data feeds. All of them are recoverable at the calling layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    InvalidInput(String),
    InsufficientData { required: usize, available: usize },
    EmptySnapshot,
    FeedUnavailable(String),
}

impl AnalysisError {
    /// Stable name of the variant, used by the API envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "InvalidInput",
            AnalysisError::InsufficientData { .. } => "InsufficientData",
            AnalysisError::EmptySnapshot => "EmptySnapshot",
            AnalysisError::FeedUnavailable(_) => "FeedUnavailable",
        }
    }

    /// Short message meant for the end user rather than the log.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidInput(_) => {
                "The data received looks malformed; indicators were skipped.".to_string()
            }
            AnalysisError::InsufficientData { .. } => {
                "Not enough clean data to calculate indicators.".to_string()
            }
            AnalysisError::EmptySnapshot => "The option chain came back empty.".to_string(),
            AnalysisError::FeedUnavailable(_) => {
                "Live data is unavailable right now. Try again later.".to_string()
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::InsufficientData { required, available } => write!(
                f,
                "Insufficient data: need {} usable closes, got {}",
                required, available
            ),
            AnalysisError::EmptySnapshot => write!(f, "Empty option chain snapshot"),
            AnalysisError::FeedUnavailable(msg) => write!(f, "Feed unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::FeedUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::FeedUnavailable(format!("malformed payload: {}", err))
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::FeedUnavailable(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(AnalysisError::EmptySnapshot.kind(), "EmptySnapshot");
        assert_eq!(
            AnalysisError::InsufficientData { required: 30, available: 3 }.kind(),
            "InsufficientData"
        );
        assert_eq!(AnalysisError::FeedUnavailable("x".into()).kind(), "FeedUnavailable");
    }

    #[test]
    fn test_display_includes_counts() {
        let err = AnalysisError::InsufficientData { required: 30, available: 12 };
        assert_eq!(err.to_string(), "Insufficient data: need 30 usable closes, got 12");
    }

    #[test]
    fn test_serde_error_maps_to_feed_unavailable() {
        let err: AnalysisError = serde_json::from_str::<Vec<u8>>("{oops").unwrap_err().into();
        assert_eq!(err.kind(), "FeedUnavailable");
    }
}
