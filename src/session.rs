use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Candidate account held in memory until its verification code is confirmed.
/// No row is written to the database before that point.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub code: String,
    expires_at: Instant,
}

pub enum VerifyOutcome {
    /// Code matched; the entry has been consumed.
    Verified(PendingRegistration),
    /// Code did not match; the entry is kept so the user can retry.
    WrongCode,
    /// No entry for the token, or it expired.
    Missing,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Uuid>,
    pending: HashMap<Uuid, PendingRegistration>,
}

/// In-memory store for login sessions and pending registrations.
///
/// Login sessions live for the process lifetime or until logout. Pending
/// registrations carry a TTL and are dropped lazily when accessed past it.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
    pending_ttl: Duration,
}

impl SessionStore {
    pub fn new(pending_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            pending_ttl,
        }
    }

    pub fn create_session(&self, user_id: Uuid) -> Uuid {
        let token = Uuid::new_v4();
        let mut inner = self.write();
        inner.sessions.insert(token, user_id);
        token
    }

    pub fn user_id(&self, token: Uuid) -> Option<Uuid> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.sessions.get(&token).copied()
    }

    pub fn revoke(&self, token: Uuid) -> bool {
        let mut inner = self.write();
        inner.sessions.remove(&token).is_some()
    }

    pub fn put_pending(
        &self,
        name: String,
        email: String,
        phone: String,
        password: String,
        code: String,
    ) -> Uuid {
        let token = Uuid::new_v4();
        let now = Instant::now();
        let entry = PendingRegistration {
            name,
            email,
            phone,
            password,
            code,
            expires_at: now + self.pending_ttl,
        };
        let mut inner = self.write();
        // Sweep abandoned registrations here so the map stays bounded even
        // for tokens that are never verified.
        inner.pending.retain(|_, pending| pending.expires_at > now);
        inner.pending.insert(token, entry);
        token
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.pending.len()
    }

    pub fn verify_pending(&self, token: Uuid, code: &str) -> VerifyOutcome {
        let mut inner = self.write();
        match inner.pending.remove(&token) {
            None => VerifyOutcome::Missing,
            Some(entry) if entry.expires_at <= Instant::now() => VerifyOutcome::Missing,
            Some(entry) if entry.code != code => {
                inner.pending.insert(token, entry);
                VerifyOutcome::WrongCode
            }
            Some(entry) => VerifyOutcome::Verified(entry),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
