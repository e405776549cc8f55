use crate::cart::{CartSummary, Line, ShippingPolicy};
use crate::catalog::Collectable;
use crate::error::MarketError;
use crate::store::{Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

/// An order entry with the unit price at the time of ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub line: Line,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub user_id: String,
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub shipping: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Resource for Order {
    const KIND: ResourceKind = ResourceKind::Orders;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Order {
    /// Price `lines` against the catalog and build a pending order.
    /// Every line must resolve to an existing collectable.
    pub fn price_lines(
        user_id: &str,
        lines: &[Line],
        collectables: &[Collectable],
        policy: &ShippingPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, MarketError> {
        if lines.is_empty() {
            return Err(MarketError::invalid_record("an order needs at least one line"));
        }
        if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
            return Err(MarketError::invalid_record(format!(
                "quantity for '{}' must be at least 1",
                line.collectable_id
            )));
        }

        let summary = CartSummary::compute(lines, collectables, policy);
        if let Some(missing) = summary.unresolved.first() {
            return Err(MarketError::NotFound {
                kind: "collectable",
                id: missing.clone(),
            });
        }

        let order_lines = lines
            .iter()
            .map(|line| {
                let unit_price = collectables
                    .iter()
                    .find(|c| c.id == line.collectable_id)
                    .map(|c| c.price)
                    .unwrap_or_default();
                OrderLine {
                    line: line.clone(),
                    unit_price,
                }
            })
            .collect();

        Ok(Self {
            id: String::new(),
            user_id: user_id.to_string(),
            lines: order_lines,
            subtotal: summary.subtotal,
            shipping: summary.shipping,
            total: summary.total,
            status: OrderStatus::Pending,
            created_at: now,
        })
    }
}
