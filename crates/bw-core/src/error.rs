//! Error types for the core breach workflow.

use crate::db::DbError;

/// Errors surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Caller-supplied input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A send was requested for a notification type the renderer does not
    /// know. The stored row is left untouched.
    #[error("unknown notification type: {0}")]
    UnknownNotificationType(String),

    /// The storage layer failed.
    #[error("database error: {0}")]
    Db(DbError),
}

impl CoreError {
    /// Shorthand for a `NotFound` over a numeric id.
    pub fn not_found(entity: &str, id: i64) -> Self {
        CoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            other => CoreError::Db(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_core_not_found() {
        let err = CoreError::from(DbError::NotFound {
            entity: "incident".to_string(),
            id: "42".to_string(),
        });
        assert!(matches!(err, CoreError::NotFound { ref entity, ref id } if entity == "incident" && id == "42"));
    }

    #[test]
    fn test_other_db_errors_stay_db() {
        let err = CoreError::from(DbError::Query("boom".to_string()));
        assert!(matches!(err, CoreError::Db(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CoreError::Validation("incident_type is required".to_string()).to_string(),
            "validation error: incident_type is required"
        );
        assert_eq!(
            CoreError::not_found("notification", 7).to_string(),
            "notification not found: 7"
        );
        assert_eq!(
            CoreError::UnknownNotificationType("state_ag".to_string()).to_string(),
            "unknown notification type: state_ag"
        );
    }
}
