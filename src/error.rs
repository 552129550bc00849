//! Error kinds.
//!
//! Two families exist and they never mix:
//!
//! - [`SchemaError`] is raised while the API is being built (doc blocks parsed,
//!   schemas compiled, directives applied). It is fatal: the application must not
//!   start serving with a broken declaration.
//! - [`ApiError`] is raised while a request is being handled and is turned into an
//!   HTTP response by the server (400 for client mistakes, 500 for handler faults).

use thiserror::Error;

/// Declaration error raised at startup or route registration.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The structured-data block of a doc comment is not valid YAML.
    #[error("invalid YAML in doc block: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The structured-data block parsed, but not into a mapping with string keys.
    #[error("doc block must be a mapping with string keys")]
    NotAMapping,

    /// A key of a shared or directive block is missing its sigil.
    #[error("invalid {kind} {key:?}: key must start with {sigil:?}")]
    InvalidKey {
        kind: &'static str,
        sigil: char,
        key: String,
    },

    /// A handler declares a directive nobody registered.
    #[error("unknown directive {0:?}")]
    UnknownDirective(String),

    /// A schema references a shared entry that does not exist.
    #[error("unknown shared schema {0:?}")]
    UnknownShared(String),

    /// Shared entries reference each other in a loop.
    #[error("shared schema {0:?} references itself")]
    SharedCycle(String),

    /// A shorthand expression names a type that is neither built in nor registered.
    #[error("unknown validator {0:?}")]
    UnknownValidator(String),

    /// A shorthand expression carries a parameter its type does not understand.
    #[error("unknown parameter {param:?} for validator {validator:?}")]
    UnknownParam { validator: String, param: String },

    /// Any other malformed schema declaration.
    #[error("invalid schema: {0}")]
    Invalid(String),

    /// Two routes resolve to the same URL.
    #[error("route {0} is already registered")]
    DuplicateRoute(String),

    /// An error with the declaration site it came from (endpoint, directive).
    #[error("{location}: {source}")]
    At {
        location: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Attach the declaration site to this error.
    #[must_use]
    pub fn at(self, location: impl Into<String>) -> Self {
        SchemaError::At {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every location wrapper removed.
    #[must_use]
    pub fn root(&self) -> &SchemaError {
        match self {
            SchemaError::At { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A value did not conform to a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Request-time failure produced by a handler chain.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client error; answered with status 400 and the message as a JSON string.
    #[error("{0}")]
    BadRequest(String),

    /// The handler returned data that breaks its own `output` declaration.
    #[error("output validation failed: {0}")]
    Output(#[source] ValidationError),

    /// Anything else that went wrong inside a handler.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Abort the request with a 400 response whose body is `message`.
    pub fn abort(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// HTTP status this error is answered with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Output(_) | ApiError::Internal(_) => 500,
        }
    }
}
