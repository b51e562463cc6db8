use serde::{Deserialize, Serialize};

/// Unique identifier for a catalog goods entry.
///
/// Wraps the numeric id used across the catalog, inventory, and order
/// stores to prevent mixing it up with other numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsId(i64);

impl GoodsId {
    /// Creates a goods ID from a raw numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for GoodsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GoodsId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<GoodsId> for i64 {
    fn from(id: GoodsId) -> Self {
        id.0
    }
}

/// Unique identifier for a storefront user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user ID from a raw numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goods_id_preserves_value() {
        let id = GoodsId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn goods_id_serialization_is_transparent() {
        let id = GoodsId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let deserialized: GoodsId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn user_id_display() {
        assert_eq!(UserId::new(99).to_string(), "99");
    }
}
