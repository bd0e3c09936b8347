//! Authentication module for filehub.
//!
//! This module provides password schemes, owner registration, login and
//! profile updates.

mod login;
mod password;
mod profile;
mod registration;
pub mod validation;

pub use login::login;
pub use password::{scheme_from_name, Argon2Scheme, PasswordError, PasswordScheme, PlaintextScheme};
pub use profile::{update_profile, ProfileUpdateRequest};
pub use registration::{register, RegistrationRequest};
pub use validation::ValidationError;
