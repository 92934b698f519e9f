use thiserror::Error;

/// A malformed declaration.
/// Raised while building the grammar; there is no partial schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A field was declared without a type annotation.
    #[error("Schema error: field '{0}' is missing a type annotation.")]
    MissingAnnotation(String),

    /// Two fields (or a field and the help switch) resolve to the same external flag.
    #[error("Schema error: cannot duplicate the argument '{0}'.")]
    DuplicateArgumentName(String),

    /// A union of multiple kinds was declared without an explicit converter.
    #[error("Schema error: field '{0}' is a union type; an explicit converter must be registered for it.")]
    AmbiguousUnion(String),

    /// No resolution rule applies to the annotation.
    #[error("Schema error: field '{field}' has the unsupported type '{annotation}'.")]
    UnsupportedType {
        /// The field name.
        field: String,
        /// The rendered annotation.
        annotation: String,
    },

    /// A fixed tuple without any element types.
    #[error("Schema error: field '{0}' is an empty tuple, which has nothing to parse.")]
    EmptyTuple(String),

    /// Two literal members share the same canonical string form.
    #[error("Schema error: field '{field}' has the duplicate literal '{literal}'.")]
    DuplicateLiteral {
        /// The field name.
        field: String,
        /// The canonical string form shared by the members.
        literal: String,
    },

    /// Two sub-commands share the same name.
    #[error("Schema error: cannot duplicate the sub-command '{0}'.")]
    DuplicateSubcommand(String),
}

/// A per-token parse failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The element converter rejected the token.
    #[error("argument '{field}': cannot convert '{token}' ({reason}).")]
    ArgumentConversion {
        /// The field name.
        field: String,
        /// The offending token.
        token: String,
        /// The converter's failure message.
        reason: String,
    },

    /// The token is not a recognised boolean literal.
    #[error("argument '{field}': invalid boolean '{token}' (expected a prefix of 'true' or 'false', or '1' or '0').")]
    InvalidBooleanLiteral {
        /// The field name.
        field: String,
        /// The offending token.
        token: String,
    },

    /// The token matches none of the declared literal members.
    #[error("argument '{field}': invalid choice '{token}' (choose from {choices}).")]
    InvalidChoice {
        /// The field name.
        field: String,
        /// The offending token.
        token: String,
        /// The rendered literal members.
        choices: String,
    },

    /// A fixed arity was not met.
    #[error("argument '{field}': expected {expected} value(s) but {provided} were provided.")]
    ArityMismatch {
        /// The field name.
        field: String,
        /// The declared arity.
        expected: usize,
        /// The number of tokens supplied.
        provided: usize,
    },
}

/// A command line that does not fit the grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The token matcher rejected the command line.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The sub-command discriminator names no sub-command.
    #[error("Parse error: unknown sub-command '{0}'.")]
    UnknownSubcommand(String),

    /// A required sub-command was not selected.
    #[error("Parse error: a sub-command is required (choose from {0}).")]
    MissingSubcommand(String),

    /// Every field whose tokens failed to convert, reported together.
    #[error("Parse error: {}", render_conversions(.0))]
    Conversions(Vec<ConversionError>),
}

fn render_conversions(errors: &[ConversionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

impl From<ConversionError> for UsageError {
    fn from(error: ConversionError) -> Self {
        UsageError::Conversions(vec![error])
    }
}

/// Raised after parsing; lists every missing field at once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Parse error: the following arguments are required: {}.", .0.join(", "))]
pub struct MissingRequiredArgumentError(pub Vec<String>);

/// Raised by a user `process` hook; propagated verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation error: {0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Create a validation error with the message.
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}

/// A config file could not be turned into flag tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("Config error: cannot read '{path}' ({reason}).")]
    Io {
        /// The config file path.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// A quote was opened but never closed.
    #[error("Config error: '{path}' contains an unterminated quote.")]
    UnterminatedQuote {
        /// The config file path.
        path: String,
    },

    /// A trailing backslash escapes nothing.
    #[error("Config error: '{path}' ends with a dangling escape.")]
    DanglingEscape {
        /// The config file path.
        path: String,
    },

    /// A `.json` config file is not a flat object of representable values.
    #[error("Config error: '{path}' is not a valid JSON config ({reason}).")]
    Json {
        /// The config file path.
        path: String,
        /// What was wrong with the document.
        reason: String,
    },
}

/// Persisting or restoring an instance failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// The document could not be read or written.
    #[error("Serialization error: I/O on '{path}' ({reason}).")]
    Io {
        /// The document path.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// The document is not valid JSON, or not an object.
    #[error("Serialization error: malformed document ({0}).")]
    Json(String),

    /// A field's encoded value could not be decoded.
    #[error("Serialization error: malformed value for '{field}' ({reason}).")]
    Value {
        /// The field name.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },
}

/// The byte envelope was encountered while decoding an untrusted document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Refusing to decode the opaque value of '{field}' (tag '{tag}') from an untrusted document; only load documents you produced with Trust::Trusted.")]
pub struct UnsafeDeserializationError {
    /// The field carrying the envelope.
    pub field: String,
    /// The envelope's type tag.
    pub tag: String,
}

/// The saved reproducibility record does not match the current source-control state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReproducibilityError {
    /// The document carries no reproducibility record.
    #[error("Reproducibility not guaranteed: the saved arguments carry no reproducibility record.")]
    MissingRecord,

    /// The saved record has no source-control URL.
    #[error("Reproducibility not guaranteed: the saved record has no source-control URL.")]
    MissingSavedUrl,

    /// The current working directory is not under source control.
    #[error("Reproducibility not guaranteed: the current directory has no source-control URL.")]
    MissingCurrentUrl,

    /// Repository or revision differ.
    #[error("Reproducibility not guaranteed: saved URL '{saved}' differs from current URL '{current}'.")]
    UrlMismatch {
        /// The saved URL (including the revision).
        saved: String,
        /// The current URL (including the revision).
        current: String,
    },

    /// The saved or the current working tree had uncommitted changes.
    #[error("Reproducibility not guaranteed: the {0} working tree has uncommitted changes.")]
    UncommittedChanges(&'static str),
}

/// A [`crate::Value`] did not have the shape the target type expects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Value error: expected {expected}, found '{found}'.")]
pub struct ValueError {
    /// What the target type accepts.
    pub expected: String,
    /// The rendered value that was found.
    pub found: String,
}

/// Any failure surfaced by `schemarg`.
#[derive(Debug, Error)]
pub enum Error {
    #[allow(missing_docs)]
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[allow(missing_docs)]
    #[error(transparent)]
    MissingRequired(#[from] MissingRequiredArgumentError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[allow(missing_docs)]
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[allow(missing_docs)]
    #[error(transparent)]
    UnsafeDeserialization(#[from] UnsafeDeserializationError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Reproducibility(#[from] ReproducibilityError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Call-site keyword values that name no parameter of the target.
    #[error("Unknown keyword argument(s): {}.", .0.join(", "))]
    UnknownKeyword(Vec<String>),

    /// `-h`/`--help` was requested; carries the rendered help.
    #[error("{0}")]
    HelpRequested(String),
}

impl From<ConversionError> for Error {
    fn from(error: ConversionError) -> Self {
        Error::Usage(UsageError::from(error))
    }
}

impl Error {
    /// The process exit status for this error: `0` for help, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::HelpRequested(_) => 0,
            _ => 1,
        }
    }
}
