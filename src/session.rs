// File: ./src/session.rs
//! Credentials of the signed-in user.
//!
//! This is a plain in-memory provider with get/set/clear semantics. Where the
//! host app keeps the token between launches is its own business; it seeds the
//! store on startup via `set`.
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::{Arc, RwLock};

// The login endpoint sends `isAdmin` as 0/1; some builds send a bool.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Num(i64),
        Str(String),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Num(n) => n == 1,
        Flag::Str(s) => s == "1" || s.eq_ignore_ascii_case("true"),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(deserialize_with = "crate::model::item::id_as_string")]
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_admin: bool,
}

impl Session {
    pub fn is_agent(&self) -> bool {
        !self.is_admin
    }
}

pub trait SessionStore: Send + Sync + std::fmt::Debug {
    fn get(&self) -> Option<Session>;
    fn set(&self, session: Session);
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemorySession {
    inner: RwLock<Option<Session>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, session: Session) {
        log::debug!("Session set for user {}", session.username);
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(poisoned) => *poisoned.into_inner() = Some(session),
        }
    }

    fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

pub type SharedSession = Arc<dyn SessionStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload() {
        let json = r#"{
            "token": "abc",
            "userId": 12,
            "role": "delivery_boy",
            "username": "ravi",
            "phoneNumber": "555-0101",
            "isAdmin": 0
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.user_id, "12");
        assert!(!s.is_admin);
        assert!(s.is_agent());

        let admin: Session = serde_json::from_str(
            r#"{"token": "t", "userId": "1", "username": "root", "isAdmin": true}"#,
        )
        .unwrap();
        assert!(admin.is_admin);
        assert!(admin.role.is_none());
    }

    #[test]
    fn test_memory_session_get_set_clear() {
        let store = MemorySession::new();
        assert!(!store.is_authenticated());

        store.set(Session {
            token: "tok".to_string(),
            user_id: "3".to_string(),
            role: None,
            username: "amy".to_string(),
            phone_number: None,
            is_admin: false,
        });
        assert_eq!(store.get().map(|s| s.user_id), Some("3".to_string()));

        store.clear();
        assert!(store.get().is_none());
    }
}
