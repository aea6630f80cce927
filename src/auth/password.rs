use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::IdentityError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 6;

const SCHEME: &str = "pbkdf2-sha256";

/// PBKDF2-SHA256 credential hashing.
///
/// Encoded form: `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`. The
/// iteration count travels with the hash, so verification keeps working
/// after the configured cost changes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn hash(&self, password: &str) -> String {
        let salt = generate_salt();
        let hash = derive(password, &salt, self.iterations, HASH_LENGTH);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(&*hash)
        )
    }

    /// Constant-time check of `password` against an encoded hash.
    /// Malformed encodings never match.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let Some(stored) = StoredHash::parse(encoded) else {
            return false;
        };
        let candidate = derive(password, &stored.salt, stored.iterations, stored.hash.len());
        candidate.as_slice().ct_eq(stored.hash.as_slice()).into()
    }

    /// Spend one derivation without a stored hash, so a missing account
    /// costs the same as a wrong password.
    pub fn dummy_verify(&self, password: &str) {
        let _ = derive(password, &[0u8; SALT_LENGTH], self.iterations, HASH_LENGTH);
    }
}

struct StoredHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl StoredHash {
    fn parse(encoded: &str) -> Option<Self> {
        let mut parts = encoded.split('$');
        if parts.next()? != SCHEME {
            return None;
        }
        let iterations: u32 = parts.next()?.parse().ok()?;
        let salt = STANDARD.decode(parts.next()?).ok()?;
        let hash = STANDARD.decode(parts.next()?).ok()?;
        if parts.next().is_some() || iterations == 0 || hash.is_empty() {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            hash,
        })
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32, len: usize) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; len]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Password policy: every violated rule is reported.
pub fn password_errors(password: &str) -> Vec<IdentityError> {
    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(IdentityError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(IdentityError::PasswordRequiresDigit);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(IdentityError::PasswordRequiresLower);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(IdentityError::PasswordRequiresUpper);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(IdentityError::PasswordRequiresNonAlphanumeric);
    }
    errors
}
