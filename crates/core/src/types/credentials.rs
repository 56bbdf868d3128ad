//! Sign-in form credentials.

use core::fmt;

/// Errors that can occur when reading the sign-in form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Email or password was left blank.
    #[error("Please enter both email and password")]
    Missing,
    /// The email has no `@`, or nothing on one side of it.
    #[error("Please enter a valid email address")]
    MalformedEmail,
}

/// Email and password submitted on the sign-in form.
///
/// The password is never printed by `Debug`.
///
/// ```
/// use campus_desk_core::{Credentials, CredentialsError};
///
/// assert!(Credentials::parse("staff@college.edu", "hunter2").is_ok());
/// assert_eq!(
///     Credentials::parse("", "hunter2").unwrap_err(),
///     CredentialsError::Missing
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Validate presence and basic email shape.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Missing`] if either field is empty and
    /// [`CredentialsError::MalformedEmail`] if the email has no local part or
    /// no domain.
    pub fn parse(email: &str, password: &str) -> Result<Self, CredentialsError> {
        if email.is_empty() || password.is_empty() {
            return Err(CredentialsError::Missing);
        }

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self {
                email: email.to_owned(),
                password: password.to_owned(),
            }),
            _ => Err(CredentialsError::MalformedEmail),
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
