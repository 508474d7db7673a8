//! Order business logic - checkout and the fulfilment workflow.
//!
//! Orders are created from a server-side cart, start as `pending` and only move
//! along the legal transitions of [`OrderStatus`]. Status writes are conditional on
//! the status that was read, so two admins advancing the same order cannot skip a step.

use crate::{
    config::store::StoreConfig,
    core::{cart::Cart, money::cents_to_amount},
    entities::{
        Order, OrderColumn, OrderModel,
        order::{self, OrderLines, OrderStatus},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rand::Rng;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

const ORDER_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ORDER_CODE_LEN: usize = 6;

/// Customer details plus the cart being checked out.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: String,
    pub cart: Cart,
}

/// Generates a short order number such as `ZSB-4F7Q2K`.
///
/// Numbers are random and not checked for uniqueness; the record id is what
/// identifies an order.
#[must_use]
pub fn generate_order_number(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..ORDER_CODE_LEN)
        .map(|_| char::from(ORDER_CODE_ALPHABET[rng.gen_range(0..ORDER_CODE_ALPHABET.len())]))
        .collect();
    format!("{prefix}-{code}")
}

/// Validates a draft and stores it as a new pending order.
///
/// Name and phone are trimmed and must be non-empty, and the cart must have at
/// least one line. Nothing is written when validation fails.
#[instrument(skip(db, config, draft), fields(customer = %draft.customer_name.trim()))]
pub async fn place_order(
    db: &DatabaseConnection,
    config: &StoreConfig,
    draft: OrderDraft,
) -> Result<OrderModel> {
    let customer_name = draft.customer_name.trim().to_string();
    let customer_phone = draft.customer_phone.trim().to_string();
    if customer_name.is_empty() || customer_phone.is_empty() {
        return Err(Error::validation("Name and phone are required"));
    }
    if draft.cart.is_empty() {
        return Err(Error::validation("Cannot place an order with an empty cart"));
    }

    let total_cents = draft.cart.total_cents();
    let order = order::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        order_number: Set(generate_order_number(&config.store.order_prefix)),
        customer_name: Set(customer_name),
        customer_phone: Set(customer_phone),
        notes: Set(draft.notes.trim().to_string()),
        items: Set(OrderLines(draft.cart.into_lines())),
        total: Set(cents_to_amount(total_cents)),
        total_cents: Set(total_cents),
        status: Set(OrderStatus::Pending),
        created_at: Set(Utc::now()),
    };

    let created = order.insert(db).await?;
    info!(
        "Placed order {} with {} line(s), total {}",
        created.order_number,
        created.items.0.len(),
        created.total
    );
    Ok(created)
}

pub async fn get_order_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<OrderModel>> {
    Order::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_order(db: &DatabaseConnection, id: &str) -> Result<OrderModel> {
    get_order_by_id(db, id)
        .await?
        .ok_or_else(|| Error::OrderNotFound { id: id.to_string() })
}

/// Orders newest first, optionally limited to one status.
pub async fn list_orders(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
) -> Result<Vec<OrderModel>> {
    let mut query = Order::find();
    if let Some(status) = status {
        query = query.filter(OrderColumn::Status.eq(status));
    }
    query
        .order_by_desc(OrderColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to `target` if that is a legal transition from its current status.
///
/// The update only applies while the status is still the one that was checked.
/// If another writer got there first, the call fails with `InvalidTransition`
/// against the newer status.
#[instrument(skip(db))]
pub async fn set_order_status(
    db: &DatabaseConnection,
    id: &str,
    target: OrderStatus,
) -> Result<OrderModel> {
    let current = require_order(db, id).await?;
    if !current.status.can_transition_to(target) {
        return Err(Error::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    let result = Order::update_many()
        .col_expr(OrderColumn::Status, Expr::value(target))
        .filter(OrderColumn::Id.eq(id))
        .filter(OrderColumn::Status.eq(current.status))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let latest = require_order(db, id).await?;
        warn!(
            "Order {} changed to {} before it could move to {target}",
            latest.order_number, latest.status
        );
        return Err(Error::InvalidTransition {
            from: latest.status,
            to: target,
        });
    }

    info!("Order {} moved {} -> {target}", current.order_number, current.status);
    Ok(OrderModel {
        status: target,
        ..current
    })
}

/// Moves an order one step forward.
pub async fn advance_order(db: &DatabaseConnection, id: &str) -> Result<OrderModel> {
    let current = require_order(db, id).await?;
    let next = current
        .status
        .next()
        .ok_or(Error::NoNextStatus {
            status: current.status,
        })?;
    set_order_status(db, id, next).await
}

pub async fn cancel_order(db: &DatabaseConnection, id: &str) -> Result<OrderModel> {
    set_order_status(db, id, OrderStatus::Cancelled).await
}

/// Permanently deletes an order, whatever its status.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, id: &str) -> Result<()> {
    let result = Order::delete_by_id(id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound { id: id.to_string() });
    }
    info!("Deleted order {id}");
    Ok(())
}
