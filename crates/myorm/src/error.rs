//! Error types for myorm

use thiserror::Error;

/// Result type alias for myorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// SQLSTATE MySQL reports for "table doesn't exist".
const SQLSTATE_NO_SUCH_TABLE: &str = "42S02";

/// Coarse classification of an [`OrmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The model or its options are unusable (missing table name, bad index, ...).
    Configuration,
    /// The caller passed an argument the statement cannot use.
    Argument,
    /// The live schema cannot be reconciled with the model.
    SchemaConflict,
    /// A required element (increment field, row) is absent.
    NotFound,
    /// The executor reported a failure.
    Execution,
    /// A result row could not be mapped back into a value.
    Decode,
}

/// Error types for ORM operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// No table name was configured for the statement
    #[error("table name is required")]
    MissingTableName,

    /// String and float fields need an explicit SQL type
    #[error("field '{0}' requires a `type` annotation")]
    MissingTypeAnnotation(String),

    /// Index or unique declaration without fields
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// More than one auto-increment field declared
    #[error("multiple auto-increment fields: '{first}' and '{second}'")]
    MultipleIncrementFields { first: String, second: String },

    /// Configuration could not be loaded or rendered
    #[error("configuration error: {0}")]
    Config(String),

    /// Argument kind not accepted by the statement
    #[error("unsupported argument for {statement}: {argument}")]
    UnsupportedArgument {
        statement: &'static str,
        argument: &'static str,
    },

    /// Operator not in the accepted set
    #[error("invalid operator: '{0}'")]
    InvalidOperator(String),

    /// LIKE value that is neither a string nor a list of string parts
    #[error("invalid LIKE value for column '{0}'")]
    InvalidLikeValue(String),

    /// IN / NOT IN with an empty list
    #[error("empty IN set for column '{0}'")]
    EmptyInSet(String),

    /// Condition without a column
    #[error("condition column name is empty")]
    EmptyColumnName,

    /// Value kind not encodable in this position
    #[error("unsupported value type for column '{column}': {kind}")]
    UnsupportedValueType { column: String, kind: &'static str },

    /// Temporal condition on a column the model does not declare
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// UPDATE assignment for a column the model does not declare
    #[error("field not recognized: '{0}'")]
    UnrecognizedField(String),

    /// UPDATE with nothing to assign
    #[error("no value specified")]
    NoValueSpecified,

    /// Conditional statement without conditions
    #[error("no conditions given")]
    NoConditionsGiven,

    /// Batch insert without records
    #[error("no records provided")]
    NoRecordsProvided,

    /// Reconciliation would add a new auto-increment primary key
    #[error("cannot add new primary key '{column}' to existing table '{table}'")]
    NewPrimaryKeyNotAllowed { table: String, column: String },

    /// The model declares no auto-increment field
    #[error("no auto-increment field declared for table '{0}'")]
    NoIncrementField(String),

    /// Row not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Executor failure
    #[error("execution error: {message}")]
    Execution {
        message: String,
        sql: Option<String>,
        sqlstate: Option<String>,
    },

    /// Row decode/mapping error
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl OrmError {
    /// Create an execution error from an executor message
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql: None,
            sqlstate: None,
        }
    }

    /// Create an execution error carrying the server's SQLSTATE
    pub fn execution_with_state(message: impl Into<String>, sqlstate: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql: None,
            sqlstate: Some(sqlstate.into()),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unsupported value error
    pub fn unsupported_value(column: impl Into<String>, kind: &'static str) -> Self {
        Self::UnsupportedValueType {
            column: column.into(),
            kind,
        }
    }

    /// Attach the statement text to an execution error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_sql(self, statement: impl Into<String>) -> Self {
        match self {
            Self::Execution {
                message,
                sql: None,
                sqlstate,
            } => Self::Execution {
                message,
                sql: Some(statement.into()),
                sqlstate,
            },
            other => other,
        }
    }

    /// The statement that failed, if this is an execution error.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTableName
            | Self::MissingTypeAnnotation(_)
            | Self::InvalidIndex(_)
            | Self::MultipleIncrementFields { .. }
            | Self::Config(_) => ErrorKind::Configuration,
            Self::UnsupportedArgument { .. }
            | Self::InvalidOperator(_)
            | Self::InvalidLikeValue(_)
            | Self::EmptyInSet(_)
            | Self::EmptyColumnName
            | Self::UnsupportedValueType { .. }
            | Self::UnknownColumn(_)
            | Self::UnrecognizedField(_)
            | Self::NoValueSpecified
            | Self::NoConditionsGiven
            | Self::NoRecordsProvided => ErrorKind::Argument,
            Self::NewPrimaryKeyNotAllowed { .. } => ErrorKind::SchemaConflict,
            Self::NoIncrementField(_) | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if the executor reported that the table does not exist.
    pub fn is_table_missing(&self) -> bool {
        match self {
            Self::Execution {
                message, sqlstate, ..
            } => {
                sqlstate.as_deref() == Some(SQLSTATE_NO_SUCH_TABLE)
                    || message.contains("doesn't exist")
            }
            _ => false,
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if let Some(code) = db_err.code() {
                return Self::execution_with_state(db_err.message(), code.into_owned());
            }
            return Self::execution(db_err.message());
        }
        Self::execution(err.to_string())
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for OrmError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}
