use crate::entities::order::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("{message}")]
    Validation { message: String },

    #[error("Invalid price: '{price}'")]
    InvalidPrice { price: String },

    #[error("Menu item not found: {id}")]
    MenuItemNotFound { id: String },

    #[error("Order not found: {id}")]
    OrderNotFound { id: String },

    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is {status} and has no further status")]
    NoNextStatus { status: OrderStatus },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error("Admin login required")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Database(value.to_string())
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
