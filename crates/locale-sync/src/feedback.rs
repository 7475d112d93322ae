/// Structured feedback from operations that touch many files.
///
/// Callers decide how to present it: the CLI prints to stderr, tests record
/// it, library consumers can log or ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Informational message (progress, status updates).
    Info(String),
    /// A file was transferred.
    Success(String),
    /// Warning - operation continued but something noteworthy occurred.
    Warning(String),
    /// Error - something failed (may or may not be fatal depending on context).
    Error(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn is_info(&self) -> bool {
        matches!(self, Self::Info(_))
    }

    /// Get the message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Success(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info(msg) | Self::Success(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Receives feedback as it happens. Reporting never fails.
pub trait Reporter: Send + Sync {
    fn report(&self, feedback: Feedback);
}

impl<F> Reporter for F
where
    F: Fn(Feedback) + Send + Sync,
{
    fn report(&self, feedback: Feedback) {
        self(feedback)
    }
}
