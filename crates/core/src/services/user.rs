//! Accounts: signup, login and session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use codestar_common::{AppError, AppResult, IdGenerator};
use codestar_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::{FormErrors, NON_FIELD_ERRORS, Submission, not_blank};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Input for creating an account.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct SignupInput {
    #[serde(default)]
    #[validate(
        custom(function = "valid_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(length(
        min = 8,
        max = 128,
        message = "This password must contain at least 8 characters."
    ))]
    pub password1: String,

    #[serde(default, skip_serializing)]
    #[validate(must_match(
        other = "password1",
        message = "The two password fields didn't match."
    ))]
    pub password2: String,
}

/// Input for signing in.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LoginInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[serde(default, skip_serializing)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

fn valid_username(value: &str) -> Result<(), validator::ValidationError> {
    not_blank(value)?;
    if value
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Ok(());
    }
    let mut error = validator::ValidationError::new("username");
    error.message = Some(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
            .into(),
    );
    Err(error)
}

/// User service for account management.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Usernames are unique regardless of case.
    pub async fn signup(&self, input: &SignupInput) -> AppResult<Submission<user::Model>> {
        if let Err(errors) = FormErrors::check(input) {
            return Ok(Submission::Rejected(errors));
        }

        let username = input.username.trim();
        if self.user_repo.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "Signup rejected: username taken");
            return Ok(Submission::Rejected(FormErrors::single("username", USERNAME_TAKEN)));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            username_lower: Set(username.to_lowercase()),
            name: Set(None),
            password: Set(hash_password(&input.password1)?),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.user_repo.create(model).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User registered");
                Ok(Submission::Accepted(user))
            }
            Err(AppError::Conflict(_)) => {
                tracing::debug!(username, "Signup lost a race for the username");
                Ok(Submission::Rejected(FormErrors::single("username", USERNAME_TAKEN)))
            }
            Err(e) => Err(e),
        }
    }

    /// Check credentials and return the user with a usable session token.
    pub async fn login(&self, input: &LoginInput) -> AppResult<Submission<user::Model>> {
        if let Err(errors) = FormErrors::check(input) {
            return Ok(Submission::Rejected(errors));
        }

        let invalid = || {
            Submission::Rejected(FormErrors::single(
                NON_FIELD_ERRORS,
                "Please enter a correct username and password.",
            ))
        };

        let Some(user) = self.user_repo.find_by_username(input.username.trim()).await? else {
            return Ok(invalid());
        };

        if !verify_password(&input.password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Login failed");
            return Ok(invalid());
        }

        if user.token.is_some() {
            return Ok(Submission::Accepted(user));
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        Ok(Submission::Accepted(self.user_repo.update(active).await?))
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Sign a user out everywhere by replacing their token.
    pub async fn logout(&self, user: user::Model) -> AppResult<()> {
        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));

        self.user_repo.update(active).await?;
        tracing::info!(user_id = %user_id, "User signed out");
        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash. Unparseable hashes never match.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a PHC string");
        return Ok(false);
    };

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
