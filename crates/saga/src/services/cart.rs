//! Shopping cart service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{GoodsId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, SagaError};

/// One cart row the user has checked for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub goods_id: GoodsId,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(goods_id: GoodsId, quantity: u32) -> Self {
        Self { goods_id, quantity }
    }
}

/// Access to a user's shopping cart.
///
/// Only checked (selected) rows participate in order placement;
/// unchecked rows are invisible to the saga and must survive it.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's checked cart rows.
    async fn list_selected(&self, user_id: UserId) -> Result<Vec<CartItem>>;

    /// Deletes the user's checked cart rows.
    async fn delete_selected(&self, user_id: UserId) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
    item: CartItem,
    checked: bool,
}

/// In-memory cart for tests.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    rows: Arc<RwLock<HashMap<UserId, Vec<CartRow>>>>,
    fail_on_list: Arc<RwLock<bool>>,
    fail_on_delete: Arc<RwLock<bool>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cart row for the user.
    pub async fn add_item(&self, user_id: UserId, item: CartItem, checked: bool) {
        self.rows
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(CartRow { item, checked });
    }

    /// When set, `list_selected` fails with `Upstream`.
    pub async fn set_fail_on_list(&self, fail: bool) {
        *self.fail_on_list.write().await = fail;
    }

    /// When set, `delete_selected` fails with `Upstream`.
    pub async fn set_fail_on_delete(&self, fail: bool) {
        *self.fail_on_delete.write().await = fail;
    }

    /// Returns all of the user's rows, checked or not.
    pub async fn items_for(&self, user_id: UserId) -> Vec<CartItem> {
        self.rows
            .read()
            .await
            .get(&user_id)
            .map(|rows| rows.iter().map(|row| row.item).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn list_selected(&self, user_id: UserId) -> Result<Vec<CartItem>> {
        if *self.fail_on_list.read().await {
            return Err(SagaError::Upstream("cart unavailable".to_string()));
        }
        Ok(self
            .rows
            .read()
            .await
            .get(&user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.checked)
                    .map(|row| row.item)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_selected(&self, user_id: UserId) -> Result<()> {
        if *self.fail_on_delete.read().await {
            return Err(SagaError::Upstream("cart unavailable".to_string()));
        }
        if let Some(rows) = self.rows.write().await.get_mut(&user_id) {
            rows.retain(|row| !row.checked);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_selected_skips_unchecked_rows() {
        let cart = InMemoryCartStore::new();
        let user = UserId::new(1);
        cart.add_item(user, CartItem::new(GoodsId::new(1), 2), true).await;
        cart.add_item(user, CartItem::new(GoodsId::new(2), 1), false).await;

        let selected = cart.list_selected(user).await.unwrap();
        assert_eq!(selected, vec![CartItem::new(GoodsId::new(1), 2)]);
    }

    #[tokio::test]
    async fn delete_selected_leaves_unchecked_rows() {
        let cart = InMemoryCartStore::new();
        let user = UserId::new(1);
        cart.add_item(user, CartItem::new(GoodsId::new(1), 2), true).await;
        cart.add_item(user, CartItem::new(GoodsId::new(2), 1), false).await;

        cart.delete_selected(user).await.unwrap();

        assert!(cart.list_selected(user).await.unwrap().is_empty());
        assert_eq!(
            cart.items_for(user).await,
            vec![CartItem::new(GoodsId::new(2), 1)]
        );
    }

    #[tokio::test]
    async fn empty_cart_lists_nothing() {
        let cart = InMemoryCartStore::new();
        assert!(cart.list_selected(UserId::new(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_toggles() {
        let cart = InMemoryCartStore::new();
        let user = UserId::new(1);

        cart.set_fail_on_list(true).await;
        assert!(matches!(
            cart.list_selected(user).await,
            Err(SagaError::Upstream(_))
        ));

        cart.set_fail_on_list(false).await;
        cart.set_fail_on_delete(true).await;
        assert!(matches!(
            cart.delete_selected(user).await,
            Err(SagaError::Upstream(_))
        ));
    }
}
