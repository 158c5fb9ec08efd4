//! User entity representing a registered account in the Verigate system.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Origin of an account's credentials
///
/// Accounts are single-provider: an account created through a social
/// provider cannot log in with a password and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Local email + password account
    Email,
    /// Google OAuth account
    Google,
}

impl AuthProvider {
    /// String form used in tokens, logs, and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(AuthProvider::Email),
            "google" => Ok(AuthProvider::Google),
            other => Err(format!("Unknown auth provider: {}", other)),
        }
    }
}

/// User entity owned by the external user store
///
/// The core only reads identity attributes, account flags, and group
/// membership, and updates flags and the password hash through the
/// repository interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Unique email address
    pub email: String,

    /// Unique username, optional
    pub username: Option<String>,

    /// Bcrypt hash of the password
    pub password_hash: String,

    /// Phone number in E.164 format, optional
    pub phone_number: Option<String>,

    /// Whether the account is active
    pub is_active: bool,

    /// Whether the email address has been verified
    pub is_email_verified: bool,

    /// Whether the phone number has been verified
    pub is_phone_verified: bool,

    /// Whether the user has staff privileges
    pub is_staff: bool,

    /// Whether the user has superuser privileges
    pub is_superuser: bool,

    /// Origin of the account's credentials
    pub auth_provider: AuthProvider,

    /// Names of the groups the user belongs to
    pub group_names: HashSet<String>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Timestamp of the user's last login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new local (email-provider) user
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username: None,
            password_hash,
            phone_number: None,
            is_active: false,
            is_email_verified: false,
            is_phone_verified: false,
            is_staff: false,
            is_superuser: false,
            auth_provider: AuthProvider::Email,
            group_names: HashSet::new(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Whether the account was created with local credentials
    pub fn is_email_provider(&self) -> bool {
        self.auth_provider == AuthProvider::Email
    }

    /// Activates the account
    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    /// Marks the email address as verified
    pub fn verify_email(&mut self) {
        self.is_email_verified = true;
        self.updated_at = Utc::now();
    }

    /// Marks the phone number as verified
    pub fn verify_phone(&mut self) {
        self.is_phone_verified = true;
        self.updated_at = Utc::now();
    }

    /// Updates the last login timestamp
    pub fn update_last_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}
