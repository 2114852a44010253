// ============================
// complaint-desk-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use zeroize::Zeroize;

use crate::config::{HashingSettings, PasswordRequirements};

/// Hash a password using scrypt with the given cost parameters
pub fn hash_password(plain: &str, cost: &HashingSettings) -> anyhow::Result<String> {
    let params = Params::new(cost.log_n, cost.r, cost.p, Params::RECOMMENDED_LEN)
        .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash. Malformed hashes never verify.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check a password against the complexity requirements, returning every unmet rule
pub fn password_strength_errors(password: &str, requirements: &PasswordRequirements) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < requirements.min_length {
        errors.push(format!(
            "Password must be at least {} characters",
            requirements.min_length
        ));
    }
    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        errors.push("Password must contain a special character".to_string());
    }

    errors
}

/// Hash a password and zeroize the plaintext
pub fn hash_password_secure(plain: &mut String, cost: &HashingSettings) -> anyhow::Result<String> {
    let hash = hash_password(plain, cost);
    plain.zeroize();
    hash
}
