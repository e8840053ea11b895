use crate::types::Severity;

/// Validation errors raised by the unified model and by adapters.
///
/// Backend and transport failures are not represented here; they propagate
/// unwrapped from the client layer.
///
/// # Examples
///
/// ```
/// use unimon_common::error::UnimonError;
///
/// let err = UnimonError::UnsupportedOs("Android".to_string());
/// assert_eq!(err.to_string(), "Unsupported OS \"Android\"");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum UnimonError {
    /// A severity label outside the defined scale.
    #[error("Unsupported event severity \"{0}\"")]
    UnsupportedSeverity(String),

    /// An event kind label other than `problem` or `resolution`.
    #[error("Unsupported event type \"{0}\"")]
    UnsupportedEventKind(String),

    /// A severity that cannot be counted as a problem
    /// (only `Info`, `Warning` and `Critical` can).
    #[error("Unsupported problem severity \"{0}\"")]
    UnsupportedProblemSeverity(Severity),

    /// An OS family label with no configured installer script.
    #[error("Unsupported OS \"{0}\"")]
    UnsupportedOs(String),

    /// Discovery-range retrieval expects the backend to hold exactly one
    /// discovery rule; any other count is a configuration inconsistency.
    #[error("Expected exactly one discovery rule, found {0}")]
    DiscoveryRuleCount(usize),

    /// Starting or stopping discovery with no discovery rules configured.
    #[error("No discovery rules found")]
    NoDiscoveryRules,

    /// An error raised while handling another error. The cause stays
    /// structurally attached and is only formatted into the message at
    /// display time.
    #[error("{message}: {source}")]
    Derived {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl UnimonError {
    /// Wraps `source` under a message prefix, preserving it as a structured
    /// cause.
    ///
    /// # Examples
    ///
    /// ```
    /// use unimon_common::error::UnimonError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such script");
    /// let err = UnimonError::derived("Failed to run installer", io);
    /// assert_eq!(err.to_string(), "Failed to run installer: no such script");
    /// ```
    pub fn derived(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Derived {
            message: message.into(),
            source: source.into(),
        }
    }
}
