/// Storage-layer errors for SQLite access to the log.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("no row found for {what}")]
    NotFound { what: String },

    #[error("expected exactly one row for {what}, found {count}")]
    Ambiguous { what: String, count: usize },

    #[error("unknown collection {node}/{collection}")]
    UnknownCollection { node: String, collection: String },

    #[error("column {column} is not declared on {collection}")]
    UnknownColumn { column: String, collection: String },

    #[error("column {column} of {collection} holds {found}, expected {expected}")]
    ColumnType {
        column: String,
        collection: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },

    #[error("invalid collection spec for {collection}: {reason}")]
    InvalidSpec {
        collection: String,
        reason: &'static str,
    },
}
