use crate::application::ports::SessionCodec;
use crate::domain::Identity;

const AUTHENTICATED_FLAG: &str = "authenticated";

/// Single shared password deployments: the cookie is a fixed flag.
#[derive(Default)]
pub struct SharedFlagCodec;

impl SessionCodec for SharedFlagCodec {
    fn issue(&self, _identity: &Identity) -> String {
        AUTHENTICATED_FLAG.to_string()
    }

    fn validate(&self, token: &str) -> Option<Identity> {
        (token == AUTHENTICATED_FLAG).then_some(Identity::Shared)
    }
}
