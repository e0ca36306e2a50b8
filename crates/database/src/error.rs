use thiserror::Error;

/// Postgres SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";
/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection is not configured: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    Query(sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("'{0}' is not a valid table name.")]
    InvalidTableName(String),

    #[error("Table '{0}' does not exist.")]
    MissingTable(String),

    #[error("A row with the same {0} already exists.")]
    Duplicate(String),

    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return DbError::NotFound;
        }
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("key").to_string();
            match db_err.code().as_deref() {
                Some(UNDEFINED_TABLE) => return DbError::MissingTable(db_err.message().to_string()),
                Some(UNIQUE_VIOLATION) => return DbError::Duplicate(constraint),
                Some(FOREIGN_KEY_VIOLATION) => return DbError::MissingReference(constraint),
                _ => {}
            }
        }
        DbError::Query(err)
    }
}
