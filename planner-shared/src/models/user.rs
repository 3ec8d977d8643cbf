/// User model and account operations
///
/// Accounts are created at registration and changed by profile edits; they
/// are never deleted. Username, email and phone are each unique: registration
/// looks them up first and reports a readable `Conflict`, and the UNIQUE
/// constraints catch a racing insert.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(64) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     phone VARCHAR(32) NOT NULL UNIQUE,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     birthday DATE,
///     avatar_path VARCHAR(512),
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use planner_shared::auth::registration::RegistrationForm;
/// use planner_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::register(&pool, RegistrationForm {
///     username: "anna".to_string(),
///     email: "anna@example.com".to_string(),
///     phone: "+7 (912) 345-67-89".to_string(),
///     password: "secret1".to_string(),
///     confirm_password: "secret1".to_string(),
/// }).await?;
///
/// let again = User::authenticate(&pool, "anna@example.com", "secret1").await?;
/// assert_eq!(again.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{check_password, hash_password, PasswordCheck};
use crate::auth::registration::RegistrationForm;
use crate::error::{StoreError, StoreResult};

const USER_COLUMNS: &str = "id, username, email, phone, first_name, last_name, birthday, \
                            avatar_path, password_hash, created_at";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Login name / nickname
    pub username: String,

    pub email: String,

    pub phone: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub birthday: Option<NaiveDate>,

    /// Reference to the avatar image (file path or URL)
    pub avatar_path: Option<String>,

    /// Argon2id hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a user whose password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Editable profile fields
///
/// Every field is written; `None` clears the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub avatar_path: Option<String>,
}

/// A unique field to look a user up by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup<'a> {
    Username(&'a str),
    Email(&'a str),
    Phone(&'a str),
}

impl UserLookup<'_> {
    fn column(&self) -> &'static str {
        match self {
            UserLookup::Username(_) => "username",
            UserLookup::Email(_) => "email",
            UserLookup::Phone(_) => "phone",
        }
    }

    fn value(&self) -> &str {
        match self {
            UserLookup::Username(v) | UserLookup::Email(v) | UserLookup::Phone(v) => v,
        }
    }
}

impl User {
    /// Name shown in the UI: "First Last" when a first name is set,
    /// otherwise the username
    pub fn display_name(&self) -> String {
        match self.first_name.as_deref().filter(|n| !n.is_empty()) {
            Some(first) => match self.last_name.as_deref().filter(|n| !n.is_empty()) {
                Some(last) => format!("{} {}", first, last),
                None => first.to_string(),
            },
            None => self.username.clone(),
        }
    }

    /// Validates the form, checks uniqueness, hashes the password and
    /// creates the account
    ///
    /// # Errors
    ///
    /// - `Validation` if the form is incomplete or malformed
    /// - `Conflict` if the username, email or phone is already registered
    pub async fn register(pool: &PgPool, form: RegistrationForm) -> StoreResult<Self> {
        let form = form.normalized();
        form.check().map_err(StoreError::Validation)?;

        for lookup in [
            UserLookup::Username(&form.username),
            UserLookup::Email(&form.email),
            UserLookup::Phone(&form.phone),
        ] {
            if Self::find(pool, lookup).await?.is_some() {
                debug!(field = lookup.column(), "Registration rejected, field already in use");
                return Err(StoreError::Conflict(format!(
                    "a user with this {} already exists",
                    lookup.column()
                )));
            }
        }

        let password_hash = hash_password(&form.password)?;

        let user = Self::create(
            pool,
            NewUser {
                username: form.username,
                email: form.email,
                phone: form.phone,
                password_hash,
            },
        )
        .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Inserts a user row
    pub async fn create(pool: &PgPool, data: NewUser) -> StoreResult<Self> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, phone, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Checks credentials; `login` may be the email, phone or username
    ///
    /// Returns `None` when no account matches or the password is wrong.
    /// The two cases are deliberately indistinguishable to the caller.
    pub async fn authenticate(
        pool: &PgPool,
        login: &str,
        password: &str,
    ) -> StoreResult<Option<Self>> {
        let login = login.trim();
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1 OR phone = $1 OR username = $1 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(login)
        .fetch_optional(pool)
        .await?;

        let Some(user) = user else {
            debug!("Login rejected, no matching account");
            return Ok(None);
        };

        match check_password(password, &user.password_hash)? {
            PasswordCheck::Mismatch => {
                warn!(user_id = %user.id, "Login rejected, wrong password");
                Ok(None)
            }
            PasswordCheck::Match => {
                debug!(user_id = %user.id, "Login accepted");
                Ok(Some(user))
            }
            PasswordCheck::MatchNeedsRehash => {
                let password_hash = hash_password(password)?;
                sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
                    .bind(user.id)
                    .bind(&password_hash)
                    .execute(pool)
                    .await?;

                info!(user_id = %user.id, "Login accepted, password hash upgraded");
                Ok(Some(User {
                    password_hash,
                    ..user
                }))
            }
        }
    }

    /// Loads a user by id
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no such user
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Self> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    /// Looks a user up by one unique field
    pub async fn find(pool: &PgPool, lookup: UserLookup<'_>) -> StoreResult<Option<Self>> {
        // Column name comes from the closed enum, never from input
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE {} = $1",
            USER_COLUMNS,
            lookup.column()
        ))
        .bind(lookup.value().trim())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Resolves a user id for the invite dialog
    ///
    /// # Errors
    ///
    /// `NotFound` if nobody has that username/email/phone
    pub async fn find_id(pool: &PgPool, lookup: UserLookup<'_>) -> StoreResult<Uuid> {
        Self::find(pool, lookup)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "User",
                id: format!("{}={}", lookup.column(), lookup.value()),
            })
    }

    /// Overwrites the profile fields of a user
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no such user
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> StoreResult<Self> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET first_name = $2, last_name = $3, birthday = $4, avatar_path = $5 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.birthday)
        .bind(data.avatar_path)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("User", id))?;

        info!(user_id = %id, "Profile updated");
        Ok(user)
    }
}
