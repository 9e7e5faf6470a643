//! Session context threaded through the scenarios
//!
//! Holds bearer tokens per role and the last-seen JSON object for each
//! captured entity. Scenarios take the context by value and hand back an
//! updated one.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{ResourceKind, Role};
use crate::common::Failure;

/// Semantic name for a captured entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    /// Account returned when registering a role
    User(Role),
    /// Record created by a CRUD scenario
    Created(ResourceKind),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::User(role) => write!(f, "{}_user", role),
            EntityKey::Created(kind) => write!(f, "created_{}", kind.key()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    tokens: BTreeMap<Role, String>,
    entities: BTreeMap<EntityKey, Value>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self, role: Role) -> Option<&str> {
        self.tokens.get(&role).map(String::as_str)
    }

    /// Held tokens in role order
    pub fn tokens(&self) -> impl Iterator<Item = (Role, &str)> {
        self.tokens.iter().map(|(role, token)| (*role, token.as_str()))
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Register a token for a role, replacing any earlier one
    pub fn with_token(mut self, role: Role, token: impl Into<String>) -> Self {
        if self.tokens.insert(role, token.into()).is_some() {
            tracing::debug!(%role, "replaced bearer token");
        }
        self
    }

    /// Token for a role or a missing-prerequisite failure
    pub fn require_token(&self, role: Role) -> Result<&str, Failure> {
        self.token(role)
            .ok_or_else(|| Failure::missing(format!("{} token", capitalize(role.as_str()))))
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Value> {
        self.entities.get(&key)
    }

    /// Captured entity decoded into a schema, `None` if absent or mismatched
    pub fn entity_as<T: DeserializeOwned>(&self, key: EntityKey) -> Option<T> {
        self.entity(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The `id` field of a captured entity
    pub fn entity_id(&self, key: EntityKey) -> Option<&str> {
        self.entity(key)
            .and_then(|v| v.get("id"))
            .and_then(Value::as_str)
    }

    /// Id of a captured entity or a missing-prerequisite failure
    pub fn require_entity_id(&self, key: EntityKey) -> Result<&str, Failure> {
        self.entity_id(key)
            .ok_or_else(|| Failure::missing(format!("{} id", key)))
    }

    /// Capture an entity, replacing any earlier value for the key
    pub fn with_entity(mut self, key: EntityKey, value: Value) -> Self {
        if self.entities.insert(key, value).is_some() {
            tracing::debug!(%key, "replaced captured entity");
        }
        self
    }

    /// Capture a typed record
    ///
    /// Records that cannot be represented as JSON leave the context as is.
    pub fn with_record<T: Serialize>(self, key: EntityKey, record: &T) -> Self {
        match serde_json::to_value(record) {
            Ok(value) => self.with_entity(key, value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "could not capture record");
                self
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
