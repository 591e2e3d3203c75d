use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

const MAX_PASSWORD_LENGTH: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PasswordError {
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Password must not be more than {0} characters")]
    ExceededMaxPasswordLength(usize),
    #[error("Error while hashing password")]
    HashingError,
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub fn hash(password: impl Into<String>) -> Result<String, PasswordError> {
    let password = password.into();

    if password.is_empty() {
        return Err(PasswordError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingError)?
        .to_string();

    Ok(hashed_password)
}

pub fn compare(password: &str, hashed_password: &str) -> Result<bool, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH));
    }

    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| PasswordError::InvalidHashFormat)?;

    let password_matched = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(password_matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_compare() {
        let hashed = hash("correct horse battery").unwrap();
        assert!(compare("correct horse battery", &hashed).unwrap());
        assert!(!compare("wrong password", &hashed).unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(hash(""), Err(PasswordError::EmptyPassword));
    }

    #[test]
    fn test_overlong_password_rejected() {
        let long = "a".repeat(65);
        assert_eq!(
            hash(long),
            Err(PasswordError::ExceededMaxPasswordLength(64))
        );
    }
}
