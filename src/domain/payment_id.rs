//! Type-safe payment record identifier.
//!
//! [`PaymentId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! the internal record key cannot be confused with the provider's payment
//! identifier, which is a plain string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal identifier of a [`super::PaymentRecord`].
///
/// Generated once when the record is first inserted and immutable
/// thereafter. The idempotency key is the provider's payment id, not this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(uuid::Uuid);

impl PaymentId {
    /// Creates a new random `PaymentId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PaymentId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PaymentId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PaymentId> for uuid::Uuid {
    fn from(id: PaymentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(PaymentId::new(), PaymentId::new());
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let json = serde_json::to_string(&PaymentId::from_uuid(uuid)).ok();
        assert_eq!(json, Some(format!("\"{uuid}\"")));
    }
}
