use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use uuid::Uuid;

use crate::error::HbnbError;

use super::{Entity, Timestamps, ValidationError, required_text};

pub const NAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 120;
pub const PASSWORD_MIN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[\w.+-]+@[\w-]+\.[\w.-]+$").expect("email pattern compiles")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl TryFrom<&str> for Email {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::new("email", "is required"));
        }
        if value.len() > EMAIL_MAX || !email_regex().is_match(value) {
            return Err(ValidationError::new("email", "invalid email format"));
        }
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plaintext password that passed the length policy. Never logged.
#[derive(Clone)]
pub struct Password(SecretString);

impl TryFrom<&str> for Password {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.chars().count() < PASSWORD_MIN {
            return Err(ValidationError::new(
                "password",
                format!("must be at least {PASSWORD_MIN} characters long"),
            ));
        }

        Ok(Self(SecretString::from(value)))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Password {
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub(crate) id: Uuid,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    #[serde(skip_serializing)]
    pub(crate) password_hash: String,
    pub(crate) is_admin: bool,
    #[serde(flatten)]
    pub(crate) timestamps: Timestamps,
}

/// Partial update for a [`User`]. The password arrives already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum UserAttribute {
    /// Case-insensitive email match.
    Email(String),
}

impl User {
    /// `password_hash` is the PHC string produced by
    /// [`hash_password`](crate::services::password::hash_password).
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: String,
        is_admin: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            first_name: required_text("first_name", first_name, NAME_MAX)?,
            last_name: required_text("last_name", last_name, NAME_MAX)?,
            email: Email::try_from(email)?.to_string(),
            password_hash,
            is_admin,
            timestamps: Timestamps::now(),
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn set_first_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.first_name = required_text("first_name", value, NAME_MAX)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_last_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.last_name = required_text("last_name", value, NAME_MAX)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_email(&mut self, value: &str) -> Result<(), ValidationError> {
        self.email = Email::try_from(value)?.to_string();
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.timestamps.touch();
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
        self.timestamps.touch();
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Entity for User {
    type Patch = UserPatch;
    type Attribute = UserAttribute;

    const NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    fn apply(&mut self, patch: UserPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(first_name) = patch.first_name.as_deref() {
            next.set_first_name(first_name)?;
        }
        if let Some(last_name) = patch.last_name.as_deref() {
            next.set_last_name(last_name)?;
        }
        if let Some(email) = patch.email.as_deref() {
            next.set_email(email)?;
        }
        if let Some(password_hash) = patch.password_hash {
            next.set_password_hash(password_hash);
        }
        if let Some(is_admin) = patch.is_admin {
            next.set_admin(is_admin);
        }
        next.timestamps.touch();
        *self = next;
        Ok(())
    }

    fn matches(&self, attribute: &UserAttribute) -> bool {
        match attribute {
            UserAttribute::Email(email) => self.email.eq_ignore_ascii_case(email.trim()),
        }
    }

    fn conflicts_with(&self, other: &User) -> Option<HbnbError> {
        self.email
            .eq_ignore_ascii_case(&other.email)
            .then(|| ValidationError::new("email", "email already registered").into())
    }
}
