//! Cart lines and totals.
//! Totals are derived on every read from the lines and the current catalog
//! prices; nothing about them is stored.
// region:    --- Imports
use crate::catalog::Collectable;
use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod commands;

// endregion: --- Imports

// region:    --- Cart Line
/// One cart or order entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub collectable_id: String,
    pub quantity: u32,
    /// Stored as sent by clients; not applied to any total.
    #[serde(default)]
    pub discount: f64,
}

/// Add `line` to the cart, merging with an existing line for the same collectable.
pub fn add_line(cart: &mut Vec<Line>, line: Line) -> Result<(), MarketError> {
    if line.quantity == 0 {
        return Err(MarketError::invalid_record("quantity must be at least 1"));
    }
    match cart
        .iter_mut()
        .find(|existing| existing.collectable_id == line.collectable_id)
    {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            existing.discount = line.discount;
        }
        None => cart.push(line),
    }
    Ok(())
}

/// Set the quantity of a line. Zero removes it.
pub fn update_line(cart: &mut Vec<Line>, line: Line) -> Result<(), MarketError> {
    if line.quantity == 0 {
        remove_line(cart, &line.collectable_id)?;
        return Ok(());
    }
    let existing = cart
        .iter_mut()
        .find(|existing| existing.collectable_id == line.collectable_id)
        .ok_or_else(|| MarketError::NotFound {
            kind: "cart line",
            id: line.collectable_id.clone(),
        })?;
    existing.quantity = line.quantity;
    existing.discount = line.discount;
    Ok(())
}

pub fn remove_line(cart: &mut Vec<Line>, collectable_id: &str) -> Result<(), MarketError> {
    let before = cart.len();
    cart.retain(|line| line.collectable_id != collectable_id);
    if cart.len() == before {
        return Err(MarketError::NotFound {
            kind: "cart line",
            id: collectable_id.to_string(),
        });
    }
    Ok(())
}

// endregion: --- Cart Line

// region:    --- Totals
/// Flat shipping fee waived above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    pub flat_fee: f64,
    pub free_above: f64,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee: 5.0,
            free_above: 50.0,
        }
    }
}

impl ShippingPolicy {
    pub fn shipping_for(&self, subtotal: f64) -> f64 {
        if subtotal <= 0.0 || subtotal > self.free_above {
            0.0
        } else {
            self.flat_fee
        }
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    /// Lines whose collectable no longer exists. Excluded from the totals.
    pub unresolved: Vec<String>,
}

impl CartSummary {
    pub fn compute(lines: &[Line], collectables: &[Collectable], policy: &ShippingPolicy) -> Self {
        let prices: HashMap<&str, f64> = collectables
            .iter()
            .map(|c| (c.id.as_str(), c.price))
            .collect();

        let mut subtotal = 0.0;
        let mut unresolved = Vec::new();
        for line in lines {
            match prices.get(line.collectable_id.as_str()) {
                Some(price) => subtotal += price * f64::from(line.quantity),
                None => unresolved.push(line.collectable_id.clone()),
            }
        }

        let shipping = policy.shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
            unresolved,
        }
    }
}

/// Cart contents as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<Line>,
    #[serde(flatten)]
    pub summary: CartSummary,
}

// endregion: --- Totals

// endregion: --- Tests
