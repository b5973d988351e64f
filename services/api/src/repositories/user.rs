//! User repository for the admin surface
//!
//! Holds the one user-management invariant: the system never ends up
//! without an active managing director. Deletes, deactivations, and role
//! changes that would remove the last one are rejected inside a transaction
//! with the target row locked.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, conflict_on_fk, conflict_on_unique};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User};
use crate::rbac::Role;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// Map a user row, parsing the stored role string
fn map_user(row: &PgRow) -> ApiResult<User> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        role,
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Hash a password with argon2
fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))?
        .to_string();
    Ok(hash)
}

const USER_COLUMNS: &str = "id, email, full_name, role, active, created_at, updated_at";

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All users, newest first
    pub async fn list(&self) -> ApiResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        map_user(&row)
    }

    /// Create a new user account
    pub async fn create(&self, payload: &CreateUserRequest) -> ApiResult<User> {
        let password_hash = hash_password(&payload.password)?;
        let email = payload.email.trim().to_lowercase();
        let active = payload.active.unwrap_or(true);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(&payload.full_name)
        .bind(payload.role.as_str())
        .bind(active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

        let user = map_user(&row)?;
        info!("User {} created with role {}", user.email, user.role);
        Ok(user)
    }

    /// Update a user account
    ///
    /// Role changes and deactivations are checked against the
    /// managing-director invariant before anything is written.
    pub async fn update(&self, id: Uuid, payload: &UpdateUserRequest) -> ApiResult<User> {
        let mut tx = self.pool.begin().await?;

        let current = lock_user(&mut tx, id).await?;

        let new_role = payload.role.unwrap_or(current.role);
        let new_active = payload.active.unwrap_or(current.active);

        let loses_directorship = current.role == Role::ManagingDirector
            && current.active
            && (new_role != Role::ManagingDirector || !new_active);
        if loses_directorship {
            assert_other_active_director(&mut tx, id).await?;
        }

        let email = payload
            .email
            .as_ref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or(current.email);
        let full_name = payload.full_name.clone().unwrap_or(current.full_name);

        let password_hash = match &payload.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $2,
                full_name = $3,
                role = $4,
                active = $5,
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&email)
        .bind(&full_name)
        .bind(new_role.as_str())
        .bind(new_active)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

        let user = map_user(&row)?;
        tx.commit().await?;

        Ok(user)
    }

    /// Delete a user account
    ///
    /// Rejected for the last active managing director and for users who
    /// have recorded sales.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = lock_user(&mut tx, id).await?;

        if current.role == Role::ManagingDirector && current.active {
            assert_other_active_director(&mut tx, id).await?;
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_fk(e, "User has recorded sales and cannot be deleted"))?;

        tx.commit().await?;

        info!("User {} deleted", id);
        Ok(())
    }
}

/// Fetch a user inside a transaction with its row locked
async fn lock_user(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> ApiResult<User> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    map_user(&row)
}

/// Reject the operation unless another active managing director exists
async fn assert_other_active_director(
    tx: &mut Transaction<'_, Postgres>,
    excluding: Uuid,
) -> ApiResult<()> {
    let others: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE role = $1 AND active AND id <> $2
        "#,
    )
    .bind(Role::ManagingDirector.as_str())
    .bind(excluding)
    .fetch_one(&mut **tx)
    .await?;

    if others == 0 {
        return Err(ApiError::Conflict(
            "At least one active managing director must remain".to_string(),
        ));
    }

    Ok(())
}
