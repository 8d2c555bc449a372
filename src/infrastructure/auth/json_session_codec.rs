use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::SessionCodec;
use crate::domain::{Identity, UserId};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    user_id: Uuid,
    email: String,
}

/// Per-user sessions: the cookie carries `{"userId": …, "email": …}`.
#[derive(Default)]
pub struct JsonSessionCodec;

impl SessionCodec for JsonSessionCodec {
    fn issue(&self, identity: &Identity) -> String {
        match identity {
            Identity::User { user_id, email } => serde_json::json!({
                "userId": user_id.as_uuid(),
                "email": email,
            })
            .to_string(),
            Identity::Shared => String::new(),
        }
    }

    fn validate(&self, token: &str) -> Option<Identity> {
        let payload: SessionPayload = match serde_json::from_str(token) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed session cookie");
                return None;
            }
        };
        if payload.email.trim().is_empty() {
            return None;
        }
        Some(Identity::User {
            user_id: UserId::from_uuid(payload.user_id),
            email: payload.email,
        })
    }
}
