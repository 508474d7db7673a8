//! Order entity - A customer delivery order and its fulfilment status.
//!
//! Each order embeds a snapshot of the cart lines at checkout time. Lines are never
//! edited after creation; the admin only moves the order through its status workflow
//! or deletes it.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Fulfilment status of an order.
///
/// The forward path is linear: pending → confirmed → preparing → ready → delivered.
/// `Cancelled` is a terminal side exit reachable from any non-terminal status.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// The single status an "advance" moves to, or `None` once terminal.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    #[must_use]
    pub const fn can_cancel(self) -> bool {
        !self.is_terminal()
    }

    /// Whether an admin may move an order from `self` straight to `target`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Cancelled => self.can_cancel(),
            other => self.next() == Some(other),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Label shown in the admin panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Confirmed => "Confirmado",
            Self::Preparing => "Preparando",
            Self::Ready => "Listo",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::validation(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }
}

/// One line of an order, copied from the cart at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Menu item id the line was built from
    pub id: String,
    pub name: String,
    /// Unit price string as it was on the menu at checkout
    pub price: String,
    /// Always at least 1
    pub quantity: u32,
    /// Menu image reference, empty when the item had none
    pub image: String,
}

/// JSON column wrapper for the embedded order lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct OrderLines(pub Vec<OrderLine>);

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Opaque record identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Short human-readable number such as `ZSB-4F7Q2K`
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    /// Free-text kitchen notes, may be empty
    pub notes: String,
    /// Snapshot of the cart lines
    #[sea_orm(column_type = "Json")]
    pub items: OrderLines,
    /// Display total in currency units, derived from `total_cents`
    pub total: f64,
    /// Exact total in integer cents
    pub total_cents: i64,
    pub status: OrderStatus,
    /// Assigned by the store when the order is inserted
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
