//! Credential storage seam and an in-memory implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{AuthError, AuthResult};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub created_at: SystemTime,
}

/// An account about to be persisted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
}

/// Username → identity storage consumed by the auth service.
///
/// Implementations report backend failures as
/// [`AuthError::StoreUnavailable`] and must reject a duplicate `save` with
/// [`AuthError::AlreadyExists`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup(&self, username: &str) -> AuthResult<Option<Identity>>;

    async fn exists(&self, username: &str) -> AuthResult<bool>;

    async fn save(&self, identity: NewIdentity) -> AuthResult<Identity>;
}

/// Process-local credential store.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    identities: DashMap<String, Identity>,
    next_id: AtomicU64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            identities: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lookup(&self, username: &str) -> AuthResult<Option<Identity>> {
        Ok(self.identities.get(username).map(|entry| entry.clone()))
    }

    async fn exists(&self, username: &str) -> AuthResult<bool> {
        Ok(self.identities.contains_key(username))
    }

    async fn save(&self, identity: NewIdentity) -> AuthResult<Identity> {
        match self.identities.entry(identity.username.clone()) {
            Entry::Occupied(_) => Err(AuthError::AlreadyExists(identity.username)),
            Entry::Vacant(vacant) => {
                let saved = Identity {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    username: identity.username,
                    password_hash: identity.password_hash,
                    created_at: SystemTime::now(),
                };
                vacant.insert(saved.clone());
                Ok(saved)
            }
        }
    }
}
