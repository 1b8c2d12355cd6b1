//! Shared Diesel error mapping for the persistence adapters.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Adapters with richer semantics (unique or foreign key violations) handle
/// those kinds first and fall back to this for everything else.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Extract the violated constraint name from a unique violation, if any.
pub(crate) fn unique_violation_constraint(error: &diesel::result::Error) -> Option<&str> {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name()
        }
        _ => None,
    }
}

/// Report whether the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}
