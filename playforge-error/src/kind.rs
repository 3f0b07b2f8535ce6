//! `ErrorKind`: what went wrong.

use std::fmt;

/// Category of a failure. Callers match on it to decide how to surface the
/// error; the generation pipeline itself only reports errors through its
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Catch-all for states that should not happen
    Unexpected,
    /// Settings failed to load or validate
    ConfigInvalid,
    /// A caller passed a malformed value (blank agent key, bad `k=v` option)
    InvalidArgument,

    /// No agent registered under the requested key
    AgentNotFound,
    /// No agent resolved for a game category, fallback included
    DispatchFailed,
    /// A game agent returned an error from `execute`
    HandlerFailed,
    /// A game agent panicked inside `execute`
    HandlerPanicked,

    /// The model call failed or returned nothing usable
    InferenceFailed,
    /// The requested model does not exist on the backend
    ProviderUnavailable,
    RateLimited,
    AuthenticationFailed,

    NetworkFailed,
    /// Malformed input or backend response
    ParseFailed,
    SerializationFailed,
    IoFailed,
    FileNotFound,
    PermissionDenied,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;

        match self {
            Unexpected => "Unexpected",
            ConfigInvalid => "ConfigInvalid",
            InvalidArgument => "InvalidArgument",
            AgentNotFound => "AgentNotFound",
            DispatchFailed => "DispatchFailed",
            HandlerFailed => "HandlerFailed",
            HandlerPanicked => "HandlerPanicked",
            InferenceFailed => "InferenceFailed",
            ProviderUnavailable => "ProviderUnavailable",
            RateLimited => "RateLimited",
            AuthenticationFailed => "AuthenticationFailed",
            NetworkFailed => "NetworkFailed",
            ParseFailed => "ParseFailed",
            SerializationFailed => "SerializationFailed",
            IoFailed => "IoFailed",
            FileNotFound => "FileNotFound",
            PermissionDenied => "PermissionDenied",
        }
    }

    /// Whether resubmitting the same request may succeed. Nothing in the
    /// pipeline retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::InferenceFailed
                | ErrorKind::ProviderUnavailable
                | ErrorKind::RateLimited
                | ErrorKind::NetworkFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_variant() {
        assert_eq!(ErrorKind::DispatchFailed.to_string(), "DispatchFailed");
        assert_eq!(format!("{}", ErrorKind::HandlerPanicked), "HandlerPanicked");
    }

    #[test]
    fn test_only_transient_kinds_retry() {
        let retryable: Vec<_> = [
            ErrorKind::InferenceFailed,
            ErrorKind::RateLimited,
            ErrorKind::DispatchFailed,
            ErrorKind::HandlerFailed,
            ErrorKind::HandlerPanicked,
            ErrorKind::AuthenticationFailed,
        ]
        .into_iter()
        .filter(ErrorKind::is_retryable)
        .collect();
        assert_eq!(retryable, vec![ErrorKind::InferenceFailed, ErrorKind::RateLimited]);
    }
}
