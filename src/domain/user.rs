//! User records, filters and views

use super::contains_ignore_case;
use crate::store::{OrderedRecord, Record, RecordFilter, SortValue};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(crate::Error::invalid_request(format!(
                "unknown role '{other}'"
            ))),
        }
    }
}

/// A stored user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    /// Never leaves the service layer
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a regular user with a fresh id, created now
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            name: None,
            role: Role::default(),
            password_hash: None,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl OrderedRecord for User {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "created_at" => Some(self.created_at.into()),
            "email" => Some(self.email.as_str().into()),
            _ => None,
        }
    }
}

/// Store filter for users, also the query accepted by the user list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(default)]
    pub role: Option<Role>,
    /// Case-insensitive match on email or name
    #[serde(default)]
    pub search: Option<String>,
}

impl RecordFilter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        let role_ok = self.role.map_or(true, |r| user.role == r);
        let search_ok = match self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            None => true,
            Some(s) => {
                contains_ignore_case(&user.email, s)
                    || user
                        .name
                        .as_deref()
                        .is_some_and(|name| contains_ignore_case(name, s))
            }
        };
        role_ok && search_ok
    }
}

/// User as returned to clients (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
