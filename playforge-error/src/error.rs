//! `Error`: kind, message, retry status, and where it happened.

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// Error returned by every fallible playforge operation.
///
/// Besides the kind and message, an error records the operation that raised
/// it, a list of `key: value` pairs picked up on the way out, and an optional
/// wrapped cause.
///
/// ```rust
/// use playforge_error::{Error, ErrorKind};
///
/// let err = Error::new(ErrorKind::InferenceFailed, "model returned no choices")
///     .with_operation("universal::execute")
///     .with_context("model", "qwen-plus")
///     .with_context("session_id", "s-42");
///
/// assert_eq!(err.kind(), ErrorKind::InferenceFailed);
/// assert!(err.is_retryable());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// The status starts out as the kind's default: temporary for kinds
    /// that are worth resubmitting, permanent for the rest.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: if kind.is_retryable() {
                ErrorStatus::Temporary
            } else {
                ErrorStatus::Permanent
            },
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable text without kind, operation or context. This is what
    /// ends up in a failed generation result.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Empty when no operation was recorded.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }

    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Record the operation. A previously recorded one is kept as a
    /// `called` context entry, so the chain reads innermost first.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            let inner = std::mem::replace(&mut self.operation, operation);
            self.context.push(("called", inner.to_string()));
        } else {
            self.operation = operation;
        }
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Wrap the underlying cause. Setting it twice is a bug (debug assert).
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    /// Called once retries are exhausted: temporary becomes persistent.
    pub fn persist(mut self) -> Self {
        self.status = self.status.persist();
        self
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn agent_not_found(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(ErrorKind::AgentNotFound, format!("agent '{}' not registered", key))
            .with_context("key", key)
    }

    /// No agent resolved for `category`, universal fallback included.
    pub fn dispatch_failed(category: impl Into<String>) -> Self {
        let category = category.into();
        let message = format!("no game agent available for category '{}'", category);
        Self::new(ErrorKind::DispatchFailed, message).with_context("category", category)
    }

    /// The agent's own reason becomes the message verbatim.
    pub fn handler_failed(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::HandlerFailed, reason).with_context("agent", agent)
    }

    pub fn handler_panicked(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        let agent = agent.into();
        let message = format!("agent '{}' panicked: {}", agent, reason.into());
        Self::new(ErrorKind::HandlerPanicked, message).with_context("agent", agent)
    }

    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InferenceFailed, message)
    }
}

/// Single line, suited to log fields and CLI output:
/// `message [Kind, status] at op (key: value, ...)`.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}, {}]", self.kind, self.status)?;
        } else {
            write!(f, "{} [{}, {}]", self.message, self.kind, self.status)?;
        }
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }
        if let Some(((first_key, first_value), rest)) = self.context.split_first() {
            write!(f, " ({}: {}", first_key, first_value)?;
            for (key, value) in rest {
                write!(f, ", {}: {}", key, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Error");
        debug
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("message", &self.message);
        if !self.operation.is_empty() {
            debug.field("operation", &self.operation);
        }
        if !self.context.is_empty() {
            debug.field("context", &self.context);
        }
        if let Some(source) = &self.source {
            debug.field("source", source);
        }
        debug.finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_kind() {
        assert_eq!(Error::agent_not_found("math").status(), ErrorStatus::Permanent);
        assert_eq!(Error::inference_failed("timeout").status(), ErrorStatus::Temporary);
        assert!(!Error::dispatch_failed("puzzle").is_retryable());
    }

    #[test]
    fn test_operation_chain() {
        let err = Error::handler_failed("数学游戏Agent", "render failed")
            .with_operation("math::render")
            .with_operation("lifecycle::run_agent");

        assert_eq!(err.operation(), "lifecycle::run_agent");
        assert_eq!(
            err.context(),
            &[
                ("agent", "数学游戏Agent".to_string()),
                ("called", "math::render".to_string())
            ]
        );
    }

    #[test]
    fn test_persist_stops_retries() {
        let err = Error::new(ErrorKind::RateLimited, "slow down");
        assert!(err.is_retryable());

        let err = err.persist();
        assert_eq!(err.status(), ErrorStatus::Persistent);
        assert!(!err.is_retryable());

        let err = Error::config_invalid("bad").with_status(ErrorStatus::Temporary);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = Error::inference_failed("model unavailable")
            .with_operation("provider::complete")
            .with_context("model", "deepseek-v3.1")
            .with_context("session_id", "s-1");
        assert_eq!(
            err.to_string(),
            "model unavailable [InferenceFailed, temporary] at provider::complete \
             (model: deepseek-v3.1, session_id: s-1)"
        );

        let err = Error::invalid_argument("agent key must not be blank");
        assert_eq!(
            err.to_string(),
            "agent key must not be blank [InvalidArgument, permanent]"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::dispatch_failed("math").message(),
            "no game agent available for category 'math'"
        );
        assert_eq!(
            Error::handler_panicked("memory", "index out of bounds").message(),
            "agent 'memory' panicked: index out of bounds"
        );
        assert_eq!(Error::handler_failed("math", "template missing").message(), "template missing");
    }

    #[test]
    fn test_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "playforge.toml");
        let err = Error::new(ErrorKind::FileNotFound, "settings file missing").set_source(io_err);

        assert!(err.source_ref().is_some());
        assert!(err.source().is_some());
        assert!(format!("{:?}", err).contains("FileNotFound"));
    }
}
