//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{
    SubscriptionPersistenceError, SubscriptionRepository, UserRecord,
};

use super::diesel_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_pool_error,
};
use super::models::{NewSubscriptionRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{subscriptions, users};

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SubscriptionPersistenceError {
    map_pool_error(error, SubscriptionPersistenceError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SubscriptionPersistenceError {
    // An FK violation on insert means the author vanished between the
    // existence check and the insert.
    if is_foreign_key_violation(&error) {
        return SubscriptionPersistenceError::author_not_found();
    }
    map_basic_diesel_error(
        error,
        SubscriptionPersistenceError::query,
        SubscriptionPersistenceError::connection,
    )
}

async fn author_exists(
    conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
        '_,
        diesel_async::AsyncPgConnection,
    >,
    author: &UserId,
) -> Result<bool, SubscriptionPersistenceError> {
    let found: Option<Uuid> = users::table
        .filter(users::id.eq(author.as_uuid()))
        .select(users::id)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel)?;
    Ok(found.is_some())
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn subscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError> {
        if subscriber == author {
            return Err(SubscriptionPersistenceError::self_subscription());
        }

        let mut conn = self.pool.get().await.map_err(map_pool)?;
        if !author_exists(&mut conn, author).await? {
            return Err(SubscriptionPersistenceError::author_not_found());
        }

        let inserted = diesel::insert_into(subscriptions::table)
            .values(NewSubscriptionRow {
                subscriber_id: *subscriber.as_uuid(),
                author_id: *author.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if inserted == 0 {
            return Err(SubscriptionPersistenceError::already_subscribed());
        }
        Ok(())
    }

    async fn unsubscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        if !author_exists(&mut conn, author).await? {
            return Err(SubscriptionPersistenceError::author_not_found());
        }

        let deleted = diesel::delete(
            subscriptions::table.filter(
                subscriptions::subscriber_id
                    .eq(subscriber.as_uuid())
                    .and(subscriptions::author_id.eq(author.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        if deleted == 0 {
            return Err(SubscriptionPersistenceError::not_subscribed());
        }
        Ok(())
    }

    async fn is_subscribed(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let found: Option<Uuid> = subscriptions::table
            .filter(
                subscriptions::subscriber_id
                    .eq(subscriber.as_uuid())
                    .and(subscriptions::author_id.eq(author.as_uuid())),
            )
            .select(subscriptions::author_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(found.is_some())
    }

    async fn followed_authors(
        &self,
        subscriber: &UserId,
    ) -> Result<Vec<UserRecord>, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let followed = subscriptions::table
            .filter(subscriptions::subscriber_id.eq(*subscriber.as_uuid()))
            .select(subscriptions::author_id);
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(followed))
            .order_by(users::username.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}
