//! Typed failure shared by every service operation.

use crate::db::DbError;
use crate::model::key::EntityKey;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error taxonomy.
///
/// Business failures (`Validation`, `DuplicateKey`, `NotFound`) are decided
/// before anything is committed. `Transport` is only produced by remote
/// handles; local services never return it.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Malformed or out-of-range input.
    Validation(ValidationError),
    /// Add on an existing key or score pair.
    DuplicateKey(EntityKey),
    /// Referenced key does not exist.
    NotFound(EntityKey),
    /// Remote call could not be completed.
    Transport(String),
    /// Record store failed on the service host.
    Storage(String),
}

impl ServiceError {
    /// Stable machine-readable code, also used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) => "transport",
            Self::Storage(_) => "storage",
        }
    }

    /// Returns whether this error is a business rule rejection.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::DuplicateKey(_) | Self::NotFound(_)
        )
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::DuplicateKey(key) => write!(f, "{key} already exists"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(key) => Self::NotFound(key),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::model::key::EntityKey;
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;

    #[test]
    fn repo_not_found_keeps_its_key() {
        let err = ServiceError::from(RepoError::NotFound(EntityKey::student("SV01")));
        assert_eq!(err, ServiceError::NotFound(EntityKey::student("SV01")));
        assert_eq!(err.to_string(), "student `SV01` not found");
    }

    #[test]
    fn codes_are_stable() {
        let validation = ServiceError::from(ValidationError::NonPositiveCredits { value: 0 });
        assert_eq!(validation.code(), "validation");
        assert!(validation.is_business());

        let storage = ServiceError::from(RepoError::InvalidData("bad".to_string()));
        assert_eq!(storage.code(), "storage");
        assert!(!storage.is_business());
    }
}
