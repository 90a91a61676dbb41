//! Database error types.

/// Errors produced by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Could not reach the database.
    #[error("database connection error: {0}")]
    Connection(String),

    /// A query failed to execute.
    #[error("query error: {0}")]
    Query(String),

    /// The requested row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A uniqueness or foreign-key constraint was violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored value could not be decoded into its domain type.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// No connection could be acquired from the pool in time.
    #[error("connection pool exhausted: {0}")]
    PoolExhausted(String),

    /// The database configuration is invalid.
    #[error("database configuration error: {0}")]
    Configuration(String),
}

impl DbError {
    /// Shorthand for a `NotFound` over a numeric id.
    pub fn not_found(entity: &str, id: i64) -> Self {
        DbError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "row".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted("acquire timed out".to_string()),
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation => {
                    DbError::Constraint(db.to_string())
                }
                _ => DbError::Query(db.to_string()),
            },
            sqlx::Error::Io(io) => DbError::Connection(io.to_string()),
            sqlx::Error::Configuration(cfg) => DbError::Configuration(cfg.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}
