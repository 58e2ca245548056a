use std::fmt;

/// Classified domain error: tells the caller *what class* of failure occurred
/// so the presenting layer can pick the right inline message.
#[derive(Debug)]
pub struct CoachError {
    pub kind: CoachErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachErrorKind {
    /// A habit or tracking record that should exist does not.
    NotFound,
    /// Input rejected before any write (wrong-length task list, empty habit
    /// name, habit cap exceeded).
    Validation,
    /// The backing store was unreachable or rejected the write.
    Storage,
    /// Bad configuration that could not be defaulted away.
    Config,
}

impl CoachError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self {
            kind: CoachErrorKind::NotFound,
            message: what.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CoachErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            kind: CoachErrorKind::Storage,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: CoachErrorKind::Config,
            message: message.into(),
        }
    }

    /// Inline status message for the UI. Every failure surfaces as one of
    /// these; the session itself never dies on a failed operation.
    pub fn user_message(&self) -> String {
        match self.kind {
            CoachErrorKind::NotFound => format!("Not found: {}", self.message),
            CoachErrorKind::Validation => self.message.clone(),
            CoachErrorKind::Storage => {
                format!("Storage problem: {}. Try again.", self.message)
            }
            CoachErrorKind::Config => format!("Configuration problem: {}", self.message),
        }
    }
}

/// Inline text for any failure that reaches the presentation layer. Classified
/// errors keep their specific wording; a raw database error is labelled as a
/// storage problem; everything else falls back to its own message.
pub fn user_facing_message(err: &anyhow::Error) -> String {
    if let Some(coach) = err.downcast_ref::<CoachError>() {
        return coach.user_message();
    }
    if let Some(provider) = err.downcast_ref::<crate::providers::ProviderError>() {
        return provider.user_message();
    }
    if let Some(db) = err.downcast_ref::<sqlx::Error>() {
        return CoachError::storage(db.to_string()).user_message();
    }
    format!("Something went wrong: {}. Try again.", err)
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CoachError {}
