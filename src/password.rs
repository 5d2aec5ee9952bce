use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, FormErrors};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "12345678", "123456789", "qwertyuiop", "iloveyou", "sunshine",
    "letmein1", "football", "baseball", "welcome1", "trustno1", "abcd1234",
];

/// Hash `password` into an argon2 PHC string on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
}

/// Check `password` against a stored PHC string. A malformed hash never verifies.
pub async fn verify_password(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}

/// Record every rule `password` breaks under `field`.
pub fn check_password_rules(field: &str, password: &str, username: &str, errors: &mut FormErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        );
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, "This password is entirely numeric.");
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.add(field, "This password is too common.");
    }
    if !username.is_empty() && lowered.contains(&username.to_lowercase()) {
        errors.add(field, "The password is too similar to the username.");
    }
}

/// Validate a new password typed twice, as on the sign-up and change forms.
pub fn check_new_password(
    first_field: &str,
    second_field: &str,
    first: &str,
    second: &str,
    username: &str,
    errors: &mut FormErrors,
) {
    if first.is_empty() {
        errors.add(first_field, "This field is required.");
    }
    if second.is_empty() {
        errors.add(second_field, "This field is required.");
    }
    if first.is_empty() || second.is_empty() {
        return;
    }
    if first != second {
        errors.add(second_field, "The two password fields didn't match.");
        return;
    }
    check_password_rules(second_field, second, username, errors);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery".to_string(), hash.clone()).await);
        assert!(!verify_password("wrong horse".to_string(), hash).await);
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        let first = hash_password("correct horse battery".to_string()).await.unwrap();
        let second = hash_password("correct horse battery".to_string()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything".to_string(), "plaintext".to_string()).await);
    }

    #[test]
    fn test_password_rules() {
        let mut errors = FormErrors::new();
        check_password_rules("password2", "kerning-matters", "alice", &mut errors);
        assert!(errors.is_empty());

        let mut errors = FormErrors::new();
        check_password_rules("password2", "1234", "alice", &mut errors);
        let messages = errors.into_inner().remove("password2").unwrap();
        assert_eq!(messages.len(), 2);

        let mut errors = FormErrors::new();
        check_password_rules("password2", "Password", "alice", &mut errors);
        assert!(errors.has("password2"));

        let mut errors = FormErrors::new();
        check_password_rules("password2", "alice-2024!", "Alice", &mut errors);
        assert!(errors.has("password2"));
    }

    #[test]
    fn test_new_password_must_match() {
        let mut errors = FormErrors::new();
        check_new_password("p1", "p2", "kerning-matters", "kerning-matter", "bob", &mut errors);
        assert_eq!(
            errors.into_inner()["p2"],
            vec!["The two password fields didn't match.".to_string()]
        );

        let mut errors = FormErrors::new();
        check_new_password("p1", "p2", "", "", "bob", &mut errors);
        assert!(errors.has("p1"));
        assert!(errors.has("p2"));
    }
}
