use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use portal_auth::{Identity, Role};
use portal_core::{DomainError, DomainResult, UserId};

use super::{IdentityPatch, IdentityStore, LatencyProfile, NewIdentity};

#[derive(Debug, Default)]
struct Directory {
    /// Insertion order is the listing order.
    users: Vec<Identity>,
    /// handle -> secret
    credentials: HashMap<String, String>,
}

impl Directory {
    fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }

    fn handle_taken(&self, handle: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.handle == handle && Some(u.id) != except)
    }

    fn next_id(&self) -> UserId {
        self.users
            .iter()
            .map(|u| u.id)
            .max()
            .map(|id| id.next())
            .unwrap_or(UserId::new(1))
    }
}

/// Mock identity backend: an ordered in-memory list keyed by integer id.
///
/// Intended for dev and tests. Handles are unique; ids are never reused while
/// a higher id exists.
#[derive(Debug)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Directory>,
    latency: LatencyProfile,
}

impl InMemoryIdentityStore {
    /// Empty directory.
    pub fn new(latency: LatencyProfile) -> Self {
        Self {
            inner: RwLock::new(Directory::default()),
            latency,
        }
    }

    /// The three demo accounts: admin/admin123, user/user123, manager/manager123.
    pub fn seeded(latency: LatencyProfile) -> Self {
        let seed = [
            (1, "admin", "Administrator", Role::Admin, "admin123"),
            (2, "user", "Regular User", Role::User, "user123"),
            (3, "manager", "Manager User", Role::Manager, "manager123"),
        ];

        let mut directory = Directory::default();
        for (id, handle, display_name, role, secret) in seed {
            directory.users.push(Identity {
                id: UserId::new(id),
                handle: handle.to_string(),
                email: format!("{handle}@example.com"),
                display_name: display_name.to_string(),
                role,
            });
            directory
                .credentials
                .insert(handle.to_string(), secret.to_string());
        }

        Self {
            inner: RwLock::new(directory),
            latency,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Directory> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Directory> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::seeded(LatencyProfile::default())
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn validate_fields(handle: &str, email: &str, display_name: &str) -> DomainResult<()> {
    if handle.trim().is_empty() {
        return Err(DomainError::invalid("handle", "cannot be empty"));
    }
    if handle.chars().any(char::is_whitespace) {
        return Err(DomainError::invalid("handle", "cannot contain whitespace"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::invalid("email", "must contain '@'"));
    }
    if display_name.trim().is_empty() {
        return Err(DomainError::invalid("display name", "cannot be empty"));
    }
    Ok(())
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Option<Identity> {
        self.read().users.iter().find(|u| u.handle == handle).cloned()
    }

    async fn verify_secret(&self, handle: &str, secret: &str) -> bool {
        self.read()
            .credentials
            .get(handle)
            .is_some_and(|stored| stored == secret)
    }

    async fn list(&self) -> Vec<Identity> {
        simulate(self.latency.list).await;
        self.read().users.clone()
    }

    async fn get(&self, id: UserId) -> Option<Identity> {
        simulate(self.latency.get).await;
        let dir = self.read();
        dir.position(id).map(|idx| dir.users[idx].clone())
    }

    async fn create(&self, new: NewIdentity) -> DomainResult<Identity> {
        simulate(self.latency.write).await;

        let handle = new.handle.trim().to_string();
        validate_fields(&handle, &new.email, &new.display_name)?;

        let mut dir = self.write();
        if dir.handle_taken(&handle, None) {
            return Err(DomainError::handle_taken(handle));
        }

        let identity = Identity {
            id: dir.next_id(),
            handle: handle.clone(),
            email: new.email.trim().to_lowercase(),
            display_name: new.display_name.trim().to_string(),
            role: new.role,
        };
        dir.users.push(identity.clone());
        if let Some(secret) = new.secret {
            dir.credentials.insert(handle, secret);
        }

        tracing::info!(user_id = %identity.id, handle = %identity.handle, role = %identity.role, "user created");
        Ok(identity)
    }

    async fn update(&self, id: UserId, patch: IdentityPatch) -> DomainResult<Identity> {
        simulate(self.latency.write).await;

        let mut dir = self.write();
        let idx = dir.position(id).ok_or(DomainError::NotFound)?;
        let current = dir.users[idx].clone();

        let merged = Identity {
            id: current.id,
            handle: patch
                .handle
                .map(|h| h.trim().to_string())
                .unwrap_or_else(|| current.handle.clone()),
            email: patch
                .email
                .map(|e| e.trim().to_lowercase())
                .unwrap_or_else(|| current.email.clone()),
            display_name: patch
                .display_name
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| current.display_name.clone()),
            role: patch.role.unwrap_or(current.role),
        };
        validate_fields(&merged.handle, &merged.email, &merged.display_name)?;

        if merged.handle != current.handle {
            if dir.handle_taken(&merged.handle, Some(id)) {
                return Err(DomainError::handle_taken(merged.handle));
            }
            if let Some(secret) = dir.credentials.remove(&current.handle) {
                dir.credentials.insert(merged.handle.clone(), secret);
            }
        }
        if let Some(secret) = patch.secret {
            dir.credentials.insert(merged.handle.clone(), secret);
        }

        dir.users[idx] = merged.clone();
        tracing::info!(user_id = %id, "user updated");
        Ok(merged)
    }

    async fn delete(&self, id: UserId) -> DomainResult<()> {
        simulate(self.latency.write).await;

        let mut dir = self.write();
        let idx = dir.position(id).ok_or(DomainError::NotFound)?;
        let removed = dir.users.remove(idx);
        dir.credentials.remove(&removed.handle);

        tracing::info!(user_id = %id, handle = %removed.handle, "user deleted");
        Ok(())
    }
}
