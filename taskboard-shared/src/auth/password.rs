/// Account passwords
///
/// Stored as Argon2id PHC strings (`$argon2id$v=19$m=65536,t=3,p=4$...`).
/// Registration hashes, login verifies; both the API and the signup form
/// share the 8..=128 character rule.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse")?;
/// assert!(verify_password("correct horse", &hash)?);
/// assert!(!verify_password("Correct Horse", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted password length, in characters
pub const MAX_PASSWORD_LEN: usize = 128;

const MEMORY_KIB: u32 = 64 * 1024;
const PASSES: u32 = 3;
const LANES: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, PASSES, LANES, Some(32))
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a new account password with a fresh salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a login attempt against the stored hash
///
/// A wrong password is `Ok(false)`; only an unusable stored hash is an
/// error. Parameters are read from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Signup length rule, counted in characters
///
/// The message matches the one the register endpoint returns.
///
/// ```
/// use taskboard_shared::auth::password::validate_password_length;
///
/// assert!(validate_password_length("correct horse").is_ok());
/// assert!(validate_password_length("short").is_err());
/// ```
pub fn validate_password_length(password: &str) -> Result<(), String> {
    let len = password.chars().count();

    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_hash_verifies_at_login() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=65536,t=3,p=4$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("correct horse ", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_unusable_stored_hash_is_an_error() {
        assert!(matches!(
            verify_password("correct horse", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(verify_password("correct horse", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_length_rule_matches_register_bounds() {
        assert!(validate_password_length("12345678").is_ok());
        assert!(validate_password_length(&"x".repeat(128)).is_ok());
        // 8 characters, 24 bytes
        assert!(validate_password_length("密码密码密码密码").is_ok());

        assert_eq!(
            validate_password_length("1234567").unwrap_err(),
            "Password must be between 8 and 128 characters"
        );
        assert!(validate_password_length(&"x".repeat(129)).is_err());
    }
}
