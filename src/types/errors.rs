//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Configuration errors are fatal at
//! startup; everything else ends up inside a result envelope.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// A facade action that points at a tool the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub facade: String,
    pub action: String,
    pub tool: String,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} -> {}", self.facade, self.action, self.tool)
    }
}

/// Main error enum for the tool kernel.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid catalog or runtime configuration (fatal at startup).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A tool or facade name was registered twice.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Facade actions referencing unregistered tools.
    #[error("dangling facade references: {}", join_refs(.0))]
    DanglingReferences(Vec<DanglingReference>),

    /// Name matches neither a facade nor a registered tool.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Facade exists but the requested action is not mapped.
    #[error("unknown action '{action}' for '{facade}' (expected one of: {})", .valid.join(", "))]
    UnknownAction {
        facade: String,
        action: String,
        valid: Vec<String>,
    },

    /// Arguments rejected by the resolved tool's input schema.
    #[error("invalid arguments for '{tool}': {}", .problems.join("; "))]
    InvalidArguments { tool: String, problems: Vec<String> },

    /// The resolved handler failed or panicked.
    #[error("handler '{tool}' failed: {message}")]
    Handler { tool: String, message: String },

    /// Network-level failure talking to the daemon.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Malformed request at the protocol layer.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors (boxed to reduce Result size).
    #[error("http error: {0}")]
    Http(#[from] Box<reqwest::Error>),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_refs(refs: &[DanglingReference]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Taxonomy name surfaced to clients in error envelopes.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) | Error::DuplicateName(_) | Error::DanglingReferences(_) => {
                "ConfigurationError"
            }
            Error::UnknownTool(_) => "UnknownToolError",
            Error::UnknownAction { .. } => "UnknownActionError",
            Error::InvalidArguments { .. } => "InvalidArgumentsError",
            Error::Handler { .. } => "HandlerError",
            Error::Transport(_) | Error::Http(_) => "TransportFailure",
            Error::Validation(_) => "ValidationError",
            Error::Serialization(_) => "SerializationError",
            Error::Io(_) => "IoError",
        }
    }

    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::Validation(_) | Error::InvalidArguments { .. } => -32602,
            Error::UnknownTool(_) | Error::UnknownAction { .. } => -32601,
            Error::Serialization(_) => -32700,
            _ => -32603,
        }
    }

    /// Whether a failed proxy attempt with this error may be retried locally.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Http(_))
    }
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn handler(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Handler {
            tool: tool.into(),
            message: msg.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Box::new(err))
    }
}
