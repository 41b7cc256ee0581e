//! Credential store trait

use async_trait::async_trait;

use super::entity::UserIdentity;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence contract for user identities
///
/// Implementations must make `create` atomic: either the identity is stored
/// or nothing is. A write that collides with an existing username, email or
/// phone fails with `DomainError::Conflict`; every other failure is
/// `DomainError::Storage`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new identity
    async fn create(&self, identity: UserIdentity) -> Result<(), DomainError>;

    /// Find the identity whose email or username equals `key`
    async fn find_by_email_or_username(
        &self,
        key: &str,
    ) -> Result<Option<UserIdentity>, DomainError>;

    /// Find an identity already holding this email or this phone
    async fn find_by_email_and_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<UserIdentity>, DomainError>;
}
