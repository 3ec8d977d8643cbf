/// Account passwords
///
/// Stored as Argon2id PHC strings in `users.password_hash`. Each hash
/// carries its own cost parameters, so a hash made with older settings still
/// verifies; `check_password` reports it as `MatchNeedsRehash` and login
/// upgrades it in place.
///
/// # Example
///
/// ```
/// use planner_shared::auth::password::{check_password, hash_password, PasswordCheck};
///
/// # fn example() -> Result<(), planner_shared::auth::password::PasswordError> {
/// let hash = hash_password("hunter22")?;
/// assert_eq!(check_password("hunter22", &hash)?, PasswordCheck::Match);
/// assert_eq!(check_password("hunter23", &hash)?, PasswordCheck::Mismatch);
/// # Ok(())
/// # }
/// ```

use argon2::password_hash::{self, rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// 19 MiB, 2 passes, 1 lane
const MEMORY_KIB: u32 = 19 * 1024;
const PASSES: u32 = 2;
const LANES: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    /// The stored value is not a usable Argon2 hash
    #[error("Stored password hash is corrupt: {0}")]
    CorruptHash(String),
}

/// Outcome of comparing a password with a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    /// Correct password, but the hash uses other parameters than the current ones
    MatchNeedsRehash,
    Mismatch,
}

impl PasswordCheck {
    pub fn is_match(self) -> bool {
        !matches!(self, PasswordCheck::Mismatch)
    }
}

fn current_params() -> Result<Params, PasswordError> {
    Params::new(MEMORY_KIB, PASSES, LANES, Some(32)).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Argon2id hash with a fresh salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, current_params()?);
    let salt = SaltString::generate(&mut OsRng);

    argon
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Compares `password` with `stored`
///
/// # Errors
///
/// `CorruptHash` if `stored` cannot be parsed or verified at all; a wrong
/// password is `Ok(Mismatch)`.
pub fn check_password(password: &str, stored: &str) -> Result<PasswordCheck, PasswordError> {
    let parsed = password_hash::PasswordHash::new(stored)
        .map_err(|e| PasswordError::CorruptHash(e.to_string()))?;
    if parsed.hash.is_none() {
        return Err(PasswordError::CorruptHash("no hash output".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => {}
        Err(password_hash::Error::Password) => return Ok(PasswordCheck::Mismatch),
        Err(e) => return Err(PasswordError::CorruptHash(e.to_string())),
    }

    let current = current_params()?;
    let stale = parsed.algorithm.as_str() != "argon2id"
        || Params::try_from(&parsed).map_or(true, |p| {
            p.m_cost() != current.m_cost()
                || p.t_cost() != current.t_cost()
                || p.p_cost() != current.p_cost()
        });

    Ok(if stale {
        PasswordCheck::MatchNeedsRehash
    } else {
        PasswordCheck::Match
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak_hash(password: &str) -> String {
        let params = Params::new(8 * 1024, 1, 1, Some(32)).unwrap();
        let salt = SaltString::generate(&mut OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_hash_carries_current_parameters() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_check_password() {
        let hash = hash_password("correct horse").unwrap();
        assert_eq!(check_password("correct horse", &hash).unwrap(), PasswordCheck::Match);
        assert_eq!(check_password("wrong horse", &hash).unwrap(), PasswordCheck::Mismatch);
        assert_eq!(check_password("", &hash).unwrap(), PasswordCheck::Mismatch);
    }

    #[test]
    fn test_old_parameters_need_rehash() {
        let hash = weak_hash("pass123");
        let check = check_password("pass123", &hash).unwrap();
        assert_eq!(check, PasswordCheck::MatchNeedsRehash);
        assert!(check.is_match());
        assert_eq!(check_password("pass124", &hash).unwrap(), PasswordCheck::Mismatch);
    }

    #[test]
    fn test_corrupt_hash() {
        assert!(matches!(
            check_password("pass123", "plaintext"),
            Err(PasswordError::CorruptHash(_))
        ));
        assert!(matches!(
            check_password("pass123", "$argon2id$garbage"),
            Err(PasswordError::CorruptHash(_))
        ));
    }

    #[test]
    fn test_hash_without_output_is_corrupt() {
        let full = hash_password("pass123").unwrap();
        let salt_only = full.rsplit_once('$').unwrap().0;
        assert!(matches!(
            check_password("pass123", salt_only),
            Err(PasswordError::CorruptHash(_))
        ));
    }
}
