//! Identity
//!
//! Mocked authentication: any well-formed credential pair is accepted and
//! turned into a local [`User`] record. No real identity provider is
//! involved; the rest of the crate only cares that a user is present.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Mock-auth failures, surfaced to the shopper verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Sign-up requires email, password and full name.
    #[error("All fields are required")]
    MissingFields,

    /// Sign-up passwords must be at least six characters.
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    /// Sign-in requires both email and password.
    #[error("Email and password are required")]
    MissingCredentials,

    /// Sign-in password too short to be plausible.
    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// An authenticated shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: Uuid,

    /// Email address used to sign in.
    pub email: String,

    /// Display name.
    pub full_name: String,
}

/// Register a new shopper.
///
/// # Errors
///
/// - [`AuthError::MissingFields`]: any argument is empty.
/// - [`AuthError::PasswordTooShort`]: the password is shorter than six characters.
pub fn sign_up(email: &str, password: &str, full_name: &str) -> Result<User, AuthError> {
    if email.is_empty() || password.is_empty() || full_name.is_empty() {
        return Err(AuthError::MissingFields);
    }

    if password.chars().count() < 6 {
        return Err(AuthError::PasswordTooShort);
    }

    Ok(User {
        id: Uuid::now_v7(),
        email: email.to_string(),
        full_name: full_name.to_string(),
    })
}

/// Sign an existing shopper in.
///
/// The display name is derived from the email's local part, mirroring the
/// mock nature of the whole identity layer.
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`]: email or password is empty.
/// - [`AuthError::InvalidCredentials`]: the password is shorter than six characters.
pub fn sign_in(email: &str, password: &str) -> Result<User, AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    if password.chars().count() < 6 {
        return Err(AuthError::InvalidCredentials);
    }

    let full_name = email.split('@').next().unwrap_or(email).to_string();

    Ok(User {
        id: Uuid::now_v7(),
        email: email.to_string(),
        full_name,
    })
}
