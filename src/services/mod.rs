pub mod assignment;
pub mod asset_service;
pub mod category_service;
pub mod department_service;
pub mod employee_service;
pub mod history_service;

use thiserror::Error;

/// Failures crossing the service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Validation(String),
}

/// Turn a unique-constraint violation (Postgres 23505) into a Duplicate
/// with a client-facing message; everything else stays a database error.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl Into<String>) -> ServiceError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return ServiceError::Duplicate(message.into());
        }
    }
    ServiceError::Database(err)
}

/// Build a `%term%` ILIKE pattern with LIKE metacharacters escaped, so a
/// search term containing `%` or `_` matches it literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_escape_metacharacters() {
        assert_eq!(like_pattern("MacBook"), "%MacBook%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_c"), "%a\\_c%");
        assert_eq!(like_pattern("C:\\temp"), "%C:\\\\temp%");
    }
}
