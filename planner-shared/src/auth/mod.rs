/// Account credentials
///
/// # Modules
///
/// - [`password`]: Argon2id hashes, with rehash detection on login
/// - [`registration`]: Field-level validation of the registration form

pub mod password;
pub mod registration;
