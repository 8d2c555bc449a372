use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::{
    PasswordHashError, PasswordHasher, RepositoryError, UserRepository,
};
use crate::domain::{Identity, User};

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Registered accounts, each seeing only their own images.
    #[default]
    Users,
    /// One password for everybody.
    SharedPassword,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_uuid(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: Identity,
    pub user: Option<UserSummary>,
}

pub struct AuthService {
    mode: AuthMode,
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    app_password: Option<String>,
}

impl AuthService {
    pub fn new(
        mode: AuthMode,
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        app_password: Option<String>,
    ) -> Self {
        Self {
            mode,
            users,
            hasher,
            app_password: app_password.filter(|p| !p.is_empty()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    #[tracing::instrument(skip(self, password, name))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignedIn, AuthError> {
        if self.mode != AuthMode::Users {
            return Err(AuthError::Unsupported);
        }

        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(AuthError::InvalidInput("Invalid email address".to_string()));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = self.hash_password(password).await?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let user = User::new(email, hash, name.map(str::to_string));

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(RepositoryError::ConstraintViolation(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "User registered");
        Ok(signed_in(&user))
    }

    /// `email` is ignored in shared password mode.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: Option<&str>, password: &str) -> Result<SignedIn, AuthError> {
        match self.mode {
            AuthMode::Users => self.login_user(email.unwrap_or_default(), password).await,
            AuthMode::SharedPassword => self.login_shared(password),
        }
    }

    async fn login_user(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(signed_in(&user))
    }

    fn login_shared(&self, password: &str) -> Result<SignedIn, AuthError> {
        let Some(expected) = self.app_password.as_deref() else {
            return Err(AuthError::NotConfigured);
        };
        if password != expected {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(SignedIn {
            identity: Identity::Shared,
            user: None,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(AuthError::from)
    }
}

fn signed_in(user: &User) -> SignedIn {
    SignedIn {
        identity: Identity::User {
            user_id: user.id,
            email: user.email.clone(),
        },
        user: Some(UserSummary::from(user)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email address already registered")]
    EmailTaken,
    #[error("not available in this authentication mode")]
    Unsupported,
    #[error("shared password is not configured")]
    NotConfigured,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Hashing(#[from] PasswordHashError),
    #[error("internal: {0}")]
    Internal(String),
}
