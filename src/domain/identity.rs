use super::UserId;

/// Who a validated session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User { user_id: UserId, email: String },
    /// Holder of the single shared password; sees every image.
    Shared,
}

impl Identity {
    /// Ownership scope for image queries. `None` means unrestricted.
    pub fn owner(&self) -> Option<UserId> {
        match self {
            Identity::User { user_id, .. } => Some(*user_id),
            Identity::Shared => None,
        }
    }
}
