use crate::domain::Identity;

/// Turns identities into session cookie values and back.
pub trait SessionCodec: Send + Sync {
    fn issue(&self, identity: &Identity) -> String;

    /// `None` for anything that is not a valid session.
    fn validate(&self, token: &str) -> Option<Identity>;
}
