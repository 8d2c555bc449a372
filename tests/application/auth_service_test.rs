use std::sync::Arc;

use simavi::application::services::{AuthError, AuthMode, AuthService};
use simavi::domain::Identity;
use simavi::infrastructure::auth::BcryptPasswordHasher;
use simavi::infrastructure::persistence::InMemoryUserRepository;

fn service(mode: AuthMode, app_password: Option<&str>) -> AuthService {
    AuthService::new(
        mode,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(BcryptPasswordHasher::new(4)),
        app_password.map(str::to_string),
    )
}

#[tokio::test]
async fn given_valid_details_when_registering_then_user_is_signed_in() {
    let auth = service(AuthMode::Users, None);

    let signed_in = auth
        .register("Ada@Example.com", "secret1", Some("Ada"))
        .await
        .unwrap();

    let user = signed_in.user.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.name.as_deref(), Some("Ada"));
    assert!(matches!(signed_in.identity, Identity::User { .. }));
}

#[tokio::test]
async fn given_missing_fields_when_registering_then_invalid_input() {
    let auth = service(AuthMode::Users, None);

    let result = auth.register("", "secret1", None).await;

    assert!(matches!(result, Err(AuthError::InvalidInput(m)) if m == "Email and password are required"));
}

#[tokio::test]
async fn given_short_password_when_registering_then_invalid_input() {
    let auth = service(AuthMode::Users, None);

    let result = auth.register("ada@example.com", "12345", None).await;

    assert!(matches!(result, Err(AuthError::InvalidInput(m)) if m.contains("at least 6")));
}

#[tokio::test]
async fn given_malformed_email_when_registering_then_invalid_input() {
    let auth = service(AuthMode::Users, None);

    for email in ["ada", "ada@example", "a da@example.com", "@example.com"] {
        let result = auth.register(email, "secret1", None).await;
        assert!(
            matches!(result, Err(AuthError::InvalidInput(ref m)) if m == "Invalid email address"),
            "{email} should be rejected"
        );
    }
}

#[tokio::test]
async fn given_taken_email_when_registering_then_email_taken() {
    let auth = service(AuthMode::Users, None);
    auth.register("ada@example.com", "secret1", None)
        .await
        .unwrap();

    let result = auth.register("ADA@example.com", "another1", None).await;

    assert!(matches!(result, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn given_registered_user_when_logging_in_then_identity_matches() {
    let auth = service(AuthMode::Users, None);
    let registered = auth
        .register("ada@example.com", "secret1", None)
        .await
        .unwrap();

    let signed_in = auth
        .login(Some("ada@example.com"), "secret1")
        .await
        .unwrap();

    assert_eq!(signed_in.identity, registered.identity);
}

#[tokio::test]
async fn given_wrong_password_when_logging_in_then_invalid_credentials() {
    let auth = service(AuthMode::Users, None);
    auth.register("ada@example.com", "secret1", None)
        .await
        .unwrap();

    let wrong = auth.login(Some("ada@example.com"), "secret2").await;
    let unknown = auth.login(Some("bob@example.com"), "secret1").await;

    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn given_shared_mode_when_registering_then_unsupported() {
    let auth = service(AuthMode::SharedPassword, Some("open-sesame"));

    let result = auth.register("ada@example.com", "secret1", None).await;

    assert!(matches!(result, Err(AuthError::Unsupported)));
}

#[tokio::test]
async fn given_shared_mode_when_logging_in_with_password_then_shared_identity() {
    let auth = service(AuthMode::SharedPassword, Some("open-sesame"));

    let signed_in = auth.login(None, "open-sesame").await.unwrap();
    let rejected = auth.login(None, "guess").await;

    assert_eq!(signed_in.identity, Identity::Shared);
    assert!(signed_in.user.is_none());
    assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn given_shared_mode_without_password_when_logging_in_then_not_configured() {
    let auth = service(AuthMode::SharedPassword, Some(""));

    let result = auth.login(None, "anything").await;

    assert!(matches!(result, Err(AuthError::NotConfigured)));
}
