use simavi::application::ports::PasswordHasher;
use simavi::infrastructure::auth::BcryptPasswordHasher;

#[test]
fn given_hashed_password_when_verifying_then_only_original_matches() {
    let hasher = BcryptPasswordHasher::new(4);

    let hash = hasher.hash("hunter22").unwrap();

    assert_ne!(hash, "hunter22");
    assert!(hasher.verify("hunter22", &hash).unwrap());
    assert!(!hasher.verify("hunter23", &hash).unwrap());
}

#[test]
fn given_garbage_hash_when_verifying_then_error() {
    let hasher = BcryptPasswordHasher::new(4);

    assert!(hasher.verify("hunter22", "not-a-bcrypt-hash").is_err());
}
