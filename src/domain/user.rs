use super::UserId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String, name: Option<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.to_lowercase(),
            password_hash,
            name,
            created_at: Utc::now(),
        }
    }
}
