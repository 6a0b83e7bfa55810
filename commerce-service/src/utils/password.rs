use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Newtype so a raw password never ends up in a log line or error message.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// PHC-format argon2 hash string, as stored on the user document.
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash with Argon2id and a fresh random salt (salt travels inside the PHC
/// string).
pub fn hash_password(password: &Password) -> Result<PasswordHashString, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(PasswordHashString::new(hash))
}

/// Constant-time check of `password` against a stored hash. An undecodable
/// hash counts as a mismatch rather than an error, so login keeps its uniform
/// failure mode.
pub fn verify_password(password: &Password, password_hash: &PasswordHashString) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash.as_str()) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = Password::new("correct horse battery".to_string());
        let hash = hash_password(&password).expect("Failed to hash password");

        assert!(hash.as_str().starts_with("$argon2"));
        assert!(verify_password(&password, &hash));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let password = Password::new("correct horse battery".to_string());
        let hash = hash_password(&password).expect("Failed to hash password");

        assert!(!verify_password(
            &Password::new("incorrect horse".to_string()),
            &hash
        ));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let password = Password::new("correct horse battery".to_string());
        let first = hash_password(&password).unwrap();
        let second = hash_password(&password).unwrap();

        assert_ne!(first.as_str(), second.as_str());
        assert!(verify_password(&password, &first));
        assert!(verify_password(&password, &second));
    }

    #[test]
    fn garbage_hash_is_a_mismatch_not_a_panic() {
        let password = Password::new("anything".to_string());
        assert!(!verify_password(
            &password,
            &PasswordHashString::new("not-a-phc-string".to_string())
        ));
    }

    #[test]
    fn debug_never_prints_the_password() {
        let password = Password::new("hunter2".to_string());
        assert_eq!(format!("{:?}", password), "Password(***)");
    }
}
