//! Configuration file handling
//!
//! Every key is optional. With no file the harness targets the default
//! deployment with the four standard role fixtures.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::{Error, Result};
use crate::api::types::{Registration, Role};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// API root, endpoints are appended as `<base_url>/<endpoint>`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ceiling for every HTTP call
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Treat 403 like 401 when checking that a role is denied
    #[serde(default)]
    pub accept_forbidden: bool,

    /// Accounts registered and logged in, one per role
    #[serde(default = "default_users")]
    pub users: Vec<UserFixture>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            accept_forbidden: false,
            users: default_users(),
        }
    }
}

/// Credentials and profile for one test account
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserFixture {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
}

impl UserFixture {
    fn new(role: Role, name: &str, email: &str, password: &str, phone_number: &str) -> Self {
        Self {
            role,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone_number: phone_number.to_string(),
        }
    }

    /// Body for `auth/register`
    pub fn registration(&self) -> Registration {
        Registration {
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

fn default_base_url() -> String {
    "https://edumanage-ng.preview.emergentagent.com/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_users() -> Vec<UserFixture> {
    vec![
        UserFixture::new(
            Role::Admin,
            "Admin User",
            "admin@school.edu.ng",
            "AdminPass123!",
            "+2348012345678",
        ),
        UserFixture::new(
            Role::Teacher,
            "Teacher John",
            "teacher@school.edu.ng",
            "TeacherPass123!",
            "+2348012345679",
        ),
        UserFixture::new(
            Role::Parent,
            "Parent Mary",
            "parent@school.edu.ng",
            "ParentPass123!",
            "+2348012345680",
        ),
        UserFixture::new(
            Role::Student,
            "Student David",
            "student@school.edu.ng",
            "StudentPass123!",
            "+2348012345681",
        ),
    ]
}

impl Config {
    /// Load configuration from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                Self::from_toml(&content)
                    .map_err(|e| Error::config_parse(&path.display().to_string(), e))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Replace the base URL, e.g. from a command-line override
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fixture for a role, if configured
    pub fn user(&self, role: Role) -> Option<&UserFixture> {
        self.users.iter().find(|u| u.role == role)
    }

    /// Reject settings that would make every call fail in a confusing way
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.role) {
                return Err(Error::Config(format!(
                    "duplicate user fixture for role '{}'",
                    user.role
                )));
            }
        }

        Ok(())
    }
}
