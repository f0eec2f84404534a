use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failure taxonomy of the repository core.
///
/// Absence of rows is never an error here; repositories report it through
/// `Option` results and zero affected-row counts, and the caller decides
/// what that means.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write conflicted with a uniqueness or foreign-key constraint,
    /// e.g. a document batch referencing an unknown transfer.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("serialize document data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Database(sqlx::Error),

    /// The rollback after a failed operation failed itself. The original
    /// triggering error stays attached as `source`.
    #[error("rollback failed: {rollback} (while handling: {source})")]
    Rollback {
        source: Box<StoreError>,
        rollback: Box<StoreError>,
    },
}

impl StoreError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, StoreError::Integrity(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &error {
            match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return StoreError::Integrity(db.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(error)
    }
}
