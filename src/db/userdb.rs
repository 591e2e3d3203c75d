use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

#[async_trait]
pub trait UserExt {
    async fn save_user(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: UserRole,
        agency_id: Option<Uuid>,
        created_by: Option<Uuid>,
    ) -> Result<User, Error>;

    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, Error>;

    async fn get_users_by_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, Error>;

    async fn update_user_password(&self, user_id: Uuid, password_hash: &str)
        -> Result<User, Error>;

    async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<User, Error>;

    /// Compensating action for the create-user flow: removes the staff row if a
    /// later step fails. Not used anywhere else.
    async fn delete_user(&self, user_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn save_user(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: UserRole,
        agency_id: Option<Uuid>,
        created_by: Option<Uuid>,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, password, role, agency_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, phone, password, role, agency_id, is_active,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .bind(agency_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, password, role, agency_id, is_active,
                   created_by, created_at, updated_at
            FROM users
            WHERE ($1::uuid IS NULL OR id = $1)
              AND ($2::text IS NULL OR email = $2)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_users_by_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, password, role, agency_id, is_active,
                   created_by, created_at, updated_at
            FROM users
            WHERE agency_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(agency_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, email, phone, password, role, agency_id, is_active,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, email, phone, password, role, agency_id, is_active,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
