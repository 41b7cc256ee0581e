//! In-memory credential store implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{CredentialStore, UserId, UserIdentity};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserIdentity>,
    by_username: HashMap<String, UserId>,
    by_email: HashMap<String, UserId>,
    by_phone: HashMap<String, UserId>,
}

/// In-memory implementation of CredentialStore
///
/// All tables sit behind one lock so a `create` checks every unique key and
/// inserts in a single critical section. Emails are indexed lowercased.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, identity: UserIdentity) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let email_key = identity.email().to_lowercase();

        if tables.by_username.contains_key(identity.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                identity.username()
            )));
        }

        if tables.by_email.contains_key(&email_key) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                identity.email()
            )));
        }

        if tables.by_phone.contains_key(identity.phone()) {
            return Err(DomainError::conflict(format!(
                "Phone '{}' already exists",
                identity.phone()
            )));
        }

        let id = *identity.id();
        tables.by_username.insert(identity.username().to_string(), id);
        tables.by_email.insert(email_key, id);
        tables.by_phone.insert(identity.phone().to_string(), id);
        tables.users.insert(id, identity);

        Ok(())
    }

    async fn find_by_email_or_username(
        &self,
        key: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let tables = self.tables.read().await;

        let id = tables
            .by_email
            .get(&key.to_lowercase())
            .or_else(|| tables.by_username.get(key));

        Ok(id.and_then(|id| tables.users.get(id)).cloned())
    }

    async fn find_by_email_and_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let tables = self.tables.read().await;

        let id = tables
            .by_email
            .get(&email.to_lowercase())
            .or_else(|| tables.by_phone.get(phone));

        Ok(id.and_then(|id| tables.users.get(id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(username: &str, email: &str, phone: &str) -> UserIdentity {
        UserIdentity::new(UserId::generate(), username, email, phone, "hash")
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();
        store
            .create(identity("testuser", "test@example.com", "1234567890"))
            .await
            .unwrap();

        let by_email = store
            .find_by_email_or_username("test@example.com")
            .await
            .unwrap();
        assert_eq!(by_email.unwrap().username(), "testuser");

        let by_username = store.find_by_email_or_username("testuser").await.unwrap();
        assert_eq!(by_username.unwrap().email(), "test@example.com");

        assert!(store
            .find_by_email_or_username("nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_by_email_and_phone_matches_either() {
        let store = InMemoryCredentialStore::new();
        store
            .create(identity("testuser", "test@example.com", "1234567890"))
            .await
            .unwrap();

        assert!(store
            .find_by_email_and_phone("test@example.com", "1234567890")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_and_phone("test@example.com", "0000000000")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_and_phone("other@example.com", "1234567890")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_and_phone("other@example.com", "0000000000")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unique_keys() {
        let store = InMemoryCredentialStore::new();
        store
            .create(identity("testuser", "test@example.com", "1234567890"))
            .await
            .unwrap();

        let same_username = store
            .create(identity("testuser", "b@example.com", "2222222222"))
            .await;
        assert!(matches!(same_username, Err(DomainError::Conflict { .. })));

        let same_email = store
            .create(identity("other", "test@example.com", "2222222222"))
            .await;
        assert!(matches!(same_email, Err(DomainError::Conflict { .. })));

        let same_phone = store
            .create(identity("other", "b@example.com", "1234567890"))
            .await;
        assert!(matches!(same_phone, Err(DomainError::Conflict { .. })));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_email_ignores_case() {
        let store = InMemoryCredentialStore::new();
        store
            .create(identity("testuser", "Test@Example.com", "1234567890"))
            .await
            .unwrap();

        let same_email = store
            .create(identity("other", "test@example.com", "2222222222"))
            .await;
        assert!(matches!(same_email, Err(DomainError::Conflict { .. })));

        assert!(store
            .find_by_email_or_username("TEST@example.COM")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_and_phone("test@EXAMPLE.com", "0000000000")
            .await
            .unwrap()
            .is_some());

        // Usernames stay case-sensitive
        assert!(store
            .find_by_email_or_username("TESTUSER")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_one_winner() {
        let store = InMemoryCredentialStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(identity(
                            &format!("user{}", i),
                            "race@example.com",
                            &format!("55500000{:02}", i),
                        ))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }
}
