//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{
    CredentialsRecord, NewUserRecord, UserPersistenceError, UserRecord, UserRepository,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error, unique_violation_constraint};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Map unique violations on the users table to the taken-field variants.
fn map_insert_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(constraint) = unique_violation_constraint(&error) {
        if constraint.contains("email") {
            return UserPersistenceError::email_taken();
        }
        if constraint.contains("username") {
            return UserPersistenceError::username_taken();
        }
    }
    map_diesel(error)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUserRecord) -> Result<UserRecord, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: &user.email,
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            password_hash: &user.password_hash,
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(UserRecord::from))
    }

    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialsRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<(Uuid, String)> = users::table
            .filter(users::email.eq(email))
            .select((users::id, users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(|(id, password_hash)| CredentialsRecord {
            user_id: UserId::from_uuid(id),
            password_hash,
        }))
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar_url: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::avatar_url.eq(avatar_url))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }

    async fn clear_avatar(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::avatar_url.eq(None::<String>))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error mapping in this adapter.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection() {
        let err = map_pool(PoolError::checkout("connection refused"));

        assert!(matches!(err, UserPersistenceError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel(diesel::result::Error::NotFound);

        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn non_unique_insert_error_falls_back_to_basic_mapping() {
        let err = map_insert_error(diesel::result::Error::NotFound);

        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
