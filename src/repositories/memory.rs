//! In-process stores for tests and local runs.
//!
//! These do not survive restarts and are not shared between processes, so the
//! binary always uses the PostgreSQL and Redis stores.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::user::UserRecord;
use crate::repositories::{session::SessionStore, user::{single_match, UserStore}};

/// A user store kept in a vector.
///
/// Uniqueness is enforced on `create`; [`MemoryUserStore::insert_unchecked`]
/// bypasses it to reproduce a corrupted store.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record without the uniqueness check.
    pub async fn insert_unchecked(&self, email: &str, password_hash: &str, name: &str) {
        let record = UserRecord::new(Uuid::new_v4(), email.into(), password_hash.into(), name.into());
        self.users.write().await.push(record);
    }

    /// Number of successful `create` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, email: &str, password_hash: &str, name: &str) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::DuplicateUser);
        }
        let record = UserRecord::new(Uuid::new_v4(), email.into(), password_hash.into(), name.into());
        users.push(record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        let matches = users.iter().filter(|u| u.email == email).cloned().collect();
        single_match(email, matches)
    }
}

struct Entry {
    value: Vec<u8>,
    purge_at: Instant,
}

/// A session store kept in a map, purging entries once their TTL has passed.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record is physically held for `token`, expired or not.
    pub async fn contains(&self, token: &str) -> bool {
        self.entries.read().await.contains_key(token)
    }

    /// The raw sealed bytes stored for `token`.
    pub async fn raw(&self, token: &str) -> Option<Vec<u8>> {
        self.entries.read().await.get(token).map(|e| e.value.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let entry = Entry { value, purge_at: Instant::now() + ttl };
        self.entries.write().await.insert(token.to_string(), entry);
        Ok(())
    }

    async fn replace(&self, token: &str, value: Vec<u8>, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(token) {
            Some(entry) if entry.purge_at > Instant::now() => {
                *entry = Entry { value, purge_at: Instant::now() + ttl };
                Ok(true)
            }
            Some(_) => {
                entries.remove(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        let expired = match entries.get(token) {
            Some(entry) => entry.purge_at <= Instant::now(),
            None => return Ok(None),
        };
        if expired {
            entries.remove(token);
            return Ok(None);
        }
        Ok(entries.get(token).map(|e| e.value.clone()))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.entries.write().await.remove(token);
        Ok(())
    }
}
