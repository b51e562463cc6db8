//! Order draft built in memory before any durable write.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{GoodsId, Money, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};
use crate::services::{CartItem, GoodsSummary};
use crate::state::OrderStatus;

/// Recipient and delivery fields carried on the order header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: String,
    pub signer_name: String,
    pub signer_mobile: String,
    pub post: String,
}

/// One priced order line. Name, image, and unit price are copied from
/// the catalog at pricing time so the order stays accurate after
/// catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub goods_id: GoodsId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// Returns `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// An order being placed: created from cart + catalog data, discarded
/// when its saga ends. Only a successfully placed order's durable
/// projection survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_number: String,
    pub user_id: UserId,
    pub shipping: ShippingInfo,
    pub items: Vec<OrderLine>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Builds a priced draft from the selected cart items and their
    /// catalog summaries, using price at resolution time.
    pub fn priced(
        user_id: UserId,
        shipping: ShippingInfo,
        selected: &[CartItem],
        summaries: &[GoodsSummary],
    ) -> Result<Self> {
        let by_id: HashMap<GoodsId, &GoodsSummary> =
            summaries.iter().map(|s| (s.goods_id, s)).collect();

        let mut items = Vec::with_capacity(selected.len());
        for cart_item in selected {
            let summary = by_id
                .get(&cart_item.goods_id)
                .ok_or(SagaError::GoodsNotFound(cart_item.goods_id))?;
            items.push(OrderLine {
                goods_id: cart_item.goods_id,
                name: summary.name.clone(),
                image: summary.front_image.clone(),
                unit_price: summary.shop_price,
                quantity: cart_item.quantity,
            });
        }

        let total_amount = items.iter().map(OrderLine::line_total).sum();

        Ok(Self {
            order_number: generate_order_number(user_id),
            user_id,
            shipping,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Marks the draft placed after full saga success.
    pub fn mark_placed(&mut self) {
        self.status = OrderStatus::Placed;
    }

    /// Marks the draft failed after a saga abort.
    pub fn mark_failed(&mut self) {
        self.status = OrderStatus::Failed;
    }

    /// Returns the goods ids of all lines, in line order.
    pub fn goods_ids(&self) -> Vec<GoodsId> {
        self.items.iter().map(|line| line.goods_id).collect()
    }
}

/// Generates a unique order number: unix-timestamp prefix for rough
/// ordering, random middle for collision resistance, user id suffix.
pub fn generate_order_number(user_id: UserId) -> String {
    let random = u32::from_le_bytes(
        uuid::Uuid::new_v4().as_bytes()[..4]
            .try_into()
            .unwrap_or([0; 4]),
    ) % 1_000_000;
    format!("{}{:06}{}", Utc::now().timestamp(), random, user_id)
}
