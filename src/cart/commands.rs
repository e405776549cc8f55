//! Cart write commands and checkout.
// region:    --- Imports
use super::{add_line, remove_line, update_line, Line, ShippingPolicy};
use crate::auction::MarketEvent;
use crate::catalog::Collectable;
use crate::error::MarketError;
use crate::message_broker::EventPublisher;
use crate::orders::Order;
use crate::store::Repository;
use crate::users::User;
use chrono::{DateTime, Utc};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Commands
pub async fn add_to_cart(
    users: &Repository<User>,
    collectables: &Repository<Collectable>,
    user_id: &str,
    line: Line,
) -> Result<Vec<Line>, MarketError> {
    info!("{:<12} --> add to cart {}: {:?}", "Command", user_id, line);
    if !collectables.exists(&line.collectable_id).await? {
        return Err(MarketError::NotFound {
            kind: "collectable",
            id: line.collectable_id,
        });
    }
    let (user, ()) = users
        .update_with(user_id, |user: &mut User| add_line(&mut user.cart, line.clone()))
        .await?;
    Ok(user.cart)
}

/// Set a line's quantity. Zero removes the line.
pub async fn update_cart(
    users: &Repository<User>,
    user_id: &str,
    line: Line,
) -> Result<Vec<Line>, MarketError> {
    info!("{:<12} --> update cart {}: {:?}", "Command", user_id, line);
    let (user, ()) = users
        .update_with(user_id, |user: &mut User| {
            update_line(&mut user.cart, line.clone())
        })
        .await?;
    Ok(user.cart)
}

pub async fn remove_from_cart(
    users: &Repository<User>,
    user_id: &str,
    collectable_id: &str,
) -> Result<Vec<Line>, MarketError> {
    info!(
        "{:<12} --> remove from cart {}: {}",
        "Command", user_id, collectable_id
    );
    let (user, ()) = users
        .update_with(user_id, |user: &mut User| {
            remove_line(&mut user.cart, collectable_id)
        })
        .await?;
    Ok(user.cart)
}

/// Turn the cart into a pending order and empty it.
/// Pricing and clearing happen in one versioned write, so a cart becomes at
/// most one order.
pub async fn checkout(
    users: &Repository<User>,
    collectables: &Repository<Collectable>,
    orders: &Repository<Order>,
    publisher: &dyn EventPublisher,
    user_id: &str,
    policy: &ShippingPolicy,
    now: DateTime<Utc>,
) -> Result<Order, MarketError> {
    info!("{:<12} --> checkout user: {}", "Command", user_id);
    let catalog = collectables.list().await?;

    let (_, order) = users
        .update_with(user_id, |user: &mut User| {
            let order = Order::price_lines(user_id, &user.cart, &catalog, policy, now)?;
            user.cart.clear();
            Ok::<_, MarketError>(order)
        })
        .await?;

    let order = match orders.create(order.clone()).await {
        Ok(order) => order,
        Err(e) => {
            error!(
                "{:<12} --> order not stored for {}, restoring cart: {}",
                "Command", user_id, e
            );
            restore_cart(users, user_id, &order).await;
            return Err(e.into());
        }
    };

    let event = MarketEvent::OrderPlaced {
        order_id: order.id.clone(),
        user_id: order.user_id.clone(),
        total: order.total,
        timestamp: now,
    };
    if let Err(e) = publisher.publish(&event).await {
        error!(
            "{:<12} --> OrderPlaced not published for {}: {}",
            "Command", order.id, e
        );
    }

    Ok(order)
}

/// Put the lines of an order that could not be stored back into the cart.
async fn restore_cart(users: &Repository<User>, user_id: &str, order: &Order) {
    let restored = users
        .update_with(user_id, |user: &mut User| {
            for ordered in &order.lines {
                add_line(&mut user.cart, ordered.line.clone())?;
            }
            Ok::<_, MarketError>(())
        })
        .await;
    if let Err(e) = restored {
        error!("{:<12} --> cart of {} not restored: {}", "Command", user_id, e);
    }
}

// endregion: --- Commands

// endregion: --- Tests
