use crate::order::OrderStatus;
use crate::role::Role;

/// Caller-input failures raised during order intake and rejection.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("customer name is missing")]
    MissingCustomerName,
    #[error("customer contact is missing")]
    MissingCustomerContact,
    #[error("order has no line items")]
    EmptyOrder,
    #[error("line quantity must be at least 1")]
    ZeroQuantity,
    #[error("order total overflows the currency range")]
    PriceOverflow,
    #[error("a rejection requires a reason")]
    MissingReason,
}

/// Workflow and storage-contract failures.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(String),
    #[error("stock item not found: {0}")]
    StockNotFound(String),
    #[error("insufficient stock for '{0}'")]
    InsufficientStock(String),
    #[error("order is {0} and can no longer change")]
    InvalidTransition(OrderStatus),
    #[error("role {role} may not {action}")]
    Forbidden { role: Role, action: &'static str },
    #[error("stock item name '{0}' already exists")]
    DuplicateName(String),
    #[error("stock item '{0}' is referenced by existing orders")]
    StockInUse(String),
    #[error("storage codec failure: {0}")]
    Codec(String),
}
