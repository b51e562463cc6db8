//! Catalog lookup service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{GoodsId, Money};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, SagaError};

/// The catalog fields an order line needs: display data and the price
/// in effect at pricing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsSummary {
    pub goods_id: GoodsId,
    pub name: String,
    pub front_image: String,
    pub shop_price: Money,
}

/// Read access to the goods catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetches one goods summary. Fails with `GoodsNotFound` for an
    /// unknown id.
    async fn get_by_id(&self, goods_id: GoodsId) -> Result<GoodsSummary>;

    /// Fetches summaries for a batch of ids. Fails with `GoodsNotFound`
    /// on the first unknown id; no partial result is returned.
    async fn batch_get(&self, goods_ids: &[GoodsId]) -> Result<Vec<GoodsSummary>> {
        let mut summaries = Vec::with_capacity(goods_ids.len());
        for &goods_id in goods_ids {
            summaries.push(self.get_by_id(goods_id).await?);
        }
        Ok(summaries)
    }
}

/// In-memory catalog for tests.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    goods: Arc<RwLock<HashMap<GoodsId, GoodsSummary>>>,
    fail_on_get: Arc<RwLock<bool>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog entry.
    pub async fn insert(&self, summary: GoodsSummary) {
        self.goods.write().await.insert(summary.goods_id, summary);
    }

    /// When set, every lookup fails with `Upstream`.
    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn get_by_id(&self, goods_id: GoodsId) -> Result<GoodsSummary> {
        if *self.fail_on_get.read().await {
            return Err(SagaError::Upstream("catalog unavailable".to_string()));
        }
        self.goods
            .read()
            .await
            .get(&goods_id)
            .cloned()
            .ok_or(SagaError::GoodsNotFound(goods_id))
    }
}
