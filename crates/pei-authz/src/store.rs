//! The persistence seam of the permission engine.
//!
//! The engine never talks to a database directly. It asks a [`PermissionStore`]
//! for three facts: a user's role tags and profile scope, whether a family
//! user is linked to a student, and the field visibility rule table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use pei_models::{SchoolId, StudentId, TenantId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(error))
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }
}

/// Raw role tags and profile scope of one user.
///
/// Role tags are kept as strings: the engine decides what to do with tags it
/// does not recognise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleScopeRecord {
    pub roles: Vec<String>,
    pub tenant_id: Option<TenantId>,
    pub school_id: Option<SchoolId>,
}

/// One row of the field visibility rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub role: String,
    pub field: String,
    pub visible: bool,
}

impl FieldRule {
    pub fn new(role: impl Into<String>, field: impl Into<String>, visible: bool) -> Self {
        Self {
            role: role.into(),
            field: field.into(),
            visible,
        }
    }
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// `Ok(None)` when the user has no profile.
    async fn roles_and_scope(&self, user_id: UserId)
    -> Result<Option<RoleScopeRecord>, StoreError>;

    async fn has_guardian_link(
        &self,
        user_id: UserId,
        student_id: StudentId,
    ) -> Result<bool, StoreError>;

    async fn field_visibility_rules(&self) -> Result<Vec<FieldRule>, StoreError>;
}

/// Process-local store for tests and local development.
///
/// Besides holding data it can simulate an unhealthy backend: every lookup can
/// be made to fail or to stall, and lookups are counted so cache behaviour can
/// be asserted.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    users: RwLock<HashMap<UserId, RoleScopeRecord>>,
    guardian_links: RwLock<HashSet<(UserId, StudentId)>>,
    field_rules: RwLock<Vec<FieldRule>>,
    failing: AtomicBool,
    latency: RwLock<Option<Duration>>,
    scope_lookups: AtomicUsize,
    link_lookups: AtomicUsize,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user_id: UserId, record: RoleScopeRecord) -> Self {
        self.set_user(user_id, record);
        self
    }

    pub fn with_guardian_link(self, user_id: UserId, student_id: StudentId) -> Self {
        self.link_guardian(user_id, student_id);
        self
    }

    pub fn with_field_rules(self, rules: Vec<FieldRule>) -> Self {
        self.set_field_rules(rules);
        self
    }

    pub fn set_user(&self, user_id: UserId, record: RoleScopeRecord) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id, record);
    }

    pub fn remove_user(&self, user_id: UserId) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&user_id);
    }

    pub fn link_guardian(&self, user_id: UserId, student_id: StudentId) {
        self.guardian_links
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((user_id, student_id));
    }

    pub fn unlink_guardian(&self, user_id: UserId, student_id: StudentId) {
        self.guardian_links
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(user_id, student_id));
    }

    pub fn set_field_rules(&self, rules: Vec<FieldRule>) {
        *self.field_rules.write().unwrap_or_else(|e| e.into_inner()) = rules;
    }

    /// Makes every subsequent lookup return [`StoreError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every subsequent lookup by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Number of `roles_and_scope` calls served so far.
    pub fn scope_lookups(&self) -> usize {
        self.scope_lookups.load(Ordering::SeqCst)
    }

    /// Number of `has_guardian_link` calls served so far.
    pub fn link_lookups(&self) -> usize {
        self.link_lookups.load(Ordering::SeqCst)
    }

    async fn simulate_backend(&self) -> Result<(), StoreError> {
        let latency = *self.latency.read().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store set to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn roles_and_scope(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleScopeRecord>, StoreError> {
        self.scope_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_backend().await?;

        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned())
    }

    async fn has_guardian_link(
        &self,
        user_id: UserId,
        student_id: StudentId,
    ) -> Result<bool, StoreError> {
        self.link_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_backend().await?;

        Ok(self
            .guardian_links
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(user_id, student_id)))
    }

    async fn field_visibility_rules(&self) -> Result<Vec<FieldRule>, StoreError> {
        self.simulate_backend().await?;

        Ok(self
            .field_rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roles: &[&str]) -> RoleScopeRecord {
        RoleScopeRecord {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            tenant_id: Some(TenantId::new()),
            school_id: Some(SchoolId::new()),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let store = InMemoryPermissionStore::new();
        assert_eq!(store.roles_and_scope(UserId::new()).await.unwrap(), None);
        assert_eq!(store.scope_lookups(), 1);
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let user = UserId::new();
        let rec = record(&["teacher"]);
        let store = InMemoryPermissionStore::new().with_user(user, rec.clone());

        assert_eq!(store.roles_and_scope(user).await.unwrap(), Some(rec));

        store.remove_user(user);
        assert_eq!(store.roles_and_scope(user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_guardian_links() {
        let parent = UserId::new();
        let child = StudentId::new();
        let store = InMemoryPermissionStore::new().with_guardian_link(parent, child);

        assert!(store.has_guardian_link(parent, child).await.unwrap());
        assert!(!store.has_guardian_link(parent, StudentId::new()).await.unwrap());

        store.unlink_guardian(parent, child);
        assert!(!store.has_guardian_link(parent, child).await.unwrap());
        assert_eq!(store.link_lookups(), 3);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let user = UserId::new();
        let store = InMemoryPermissionStore::new().with_user(user, record(&["teacher"]));
        store.set_failing(true);

        assert!(matches!(
            store.roles_and_scope(user).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.field_visibility_rules().await.is_err());

        store.set_failing(false);
        assert!(store.roles_and_scope(user).await.unwrap().is_some());
    }

    #[test]
    fn test_backend_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::backend(io);
        assert!(err.to_string().contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
