//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::dsl::exists;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, PasswordHash, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::NewUserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(constraint) = unique_violation_constraint(&error) {
        return UserPersistenceError::duplicate(describe_duplicate(constraint));
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn describe_duplicate(constraint: &str) -> &'static str {
    if constraint.contains("username") {
        "username taken"
    } else if constraint.contains("email") {
        "email taken"
    } else {
        "account taken"
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn user_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(users::table.filter(users::email.eq(email.as_ref()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_ref(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result::<i64>(&mut conn)
            .await
            .map(UserId::new)
            .map_err(map_diesel_error)
    }

    async fn find_user_id(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_ref()))
            .filter(users::password_hash.eq(password_hash.as_ref()))
            .select(users::id)
            .first::<i64>(&mut conn)
            .await
            .optional()
            .map(|id| id.map(UserId::new))
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; query behaviour is exercised against the
    //! in-memory store in the integration suite.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users_username_key", "username taken")]
    #[case("users_email_key", "email taken")]
    #[case("", "account taken")]
    fn duplicate_messages_name_the_column(#[case] constraint: &str, #[case] expected: &str) {
        assert_eq!(describe_duplicate(constraint), expected);
    }

    #[rstest]
    fn pool_failures_become_connection_errors() {
        let error = map_pool_error(PoolError::checkout("refused"));
        assert_eq!(error, UserPersistenceError::connection("refused"));
    }

    #[rstest]
    fn not_found_becomes_query_error() {
        let error = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
