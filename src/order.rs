//! Purchase orders, line items and the status machine
use crate::error::{OrderError, ValidationError};
use crate::utils;
use chrono::{DateTime, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
}

impl OrderStatus {
    /// Approved and Rejected are terminal, nothing transitions out of them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// One requested line of a draft, before any stock checks ran.
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub stock_id: String,
    pub quantity: u64,
    pub selling_price: Option<u64>, // caller supplied, defaults to 0
}

// Used for constructing drafts; the service turns a validated draft
// into a pending Order.
#[derive(Debug, Default, Clone)]
pub struct OrderDraft {
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub lines: Vec<LineRequest>,
}

impl OrderDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_customer_name(mut self, name: &str) -> Self {
        self.customer_name = Some(name.to_string());
        self
    }
    pub fn set_customer_contact(mut self, contact: &str) -> Self {
        self.customer_contact = Some(contact.to_string());
        self
    }
    pub fn add_line(mut self, stock_id: &str, quantity: u64, selling_price: Option<u64>) -> Self {
        self.lines.push(LineRequest {
            stock_id: stock_id.to_string(),
            quantity,
            selling_price,
        });
        self
    }
    /// Field-presence checks only. Stock existence and quantity checks
    /// need the store and live in the service intake path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.customer_name {
            Some(name) if !name.trim().is_empty() => {}
            _ => return Err(ValidationError::MissingCustomerName),
        }
        match &self.customer_contact {
            Some(contact) if !contact.trim().is_empty() => {}
            _ => return Err(ValidationError::MissingCustomerContact),
        }
        if self.lines.is_empty() {
            return Err(ValidationError::EmptyOrder);
        }
        if self.lines.iter().any(|line| line.quantity == 0) {
            return Err(ValidationError::ZeroQuantity);
        }
        Ok(())
    }
}

/// One settled line of an order. Written once at intake, never mutated;
/// lives embedded in its order so it is created and deleted with it.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub stock_id: String,
    #[n(2)]
    pub quantity: u64, // at least 1, enforced at intake
    #[n(3)]
    pub unit_price: u64, // snapshot of the supplied selling price
    #[n(4)]
    pub total_price: u64, // quantity * unit_price
}

impl OrderItem {
    pub fn new(stock_id: String, quantity: u64, unit_price: u64) -> anyhow::Result<Self> {
        // quantities and prices are caller input, a wrapped total would
        // silently corrupt the order
        let total_price = quantity
            .checked_mul(unit_price)
            .ok_or(ValidationError::PriceOverflow)?;
        Ok(Self {
            id: utils::new_uuid_to_bech32(utils::ITEM_HRP)?,
            stock_id,
            quantity,
            unit_price,
            total_price,
        })
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Order {
    #[n(0)]
    pub id: String, // bech32 encoded uuid7
    #[n(1)]
    pub customer_name: String,
    #[n(2)]
    pub customer_contact: String,
    #[n(3)]
    pub status: OrderStatus,
    #[n(4)]
    pub total_amount: u64, // fixed at intake, never recomputed
    #[n(5)]
    pub rejection_reason: Option<String>,
    #[n(6)]
    pub sales_rep: String, // user id of the creating representative
    #[n(7)]
    pub items: Vec<OrderItem>,
    #[n(8)]
    pub created_at: TimeStamp<Utc>,
    #[n(9)]
    pub updated_at: TimeStamp<Utc>,
}

impl Order {
    pub fn new(
        customer_name: String,
        customer_contact: String,
        sales_rep: String,
        items: Vec<OrderItem>,
    ) -> anyhow::Result<Self> {
        let mut total_amount: u64 = 0;
        for item in &items {
            total_amount = total_amount
                .checked_add(item.total_price)
                .ok_or(ValidationError::PriceOverflow)?;
        }
        let now = TimeStamp::new();
        Ok(Self {
            id: utils::new_uuid_to_bech32(utils::ORDER_HRP)?,
            customer_name,
            customer_contact,
            status: OrderStatus::Pending,
            total_amount,
            rejection_reason: None,
            sales_rep,
            items,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Gate for both transitions. Terminal orders never change again.
    pub fn ensure_pending(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::InvalidTransition(self.status));
        }
        Ok(())
    }

    /// Flip to Approved. The stock side effect is the settlement's job,
    /// this only records the transition on the record itself.
    pub fn approve(&mut self) -> Result<(), OrderError> {
        self.ensure_pending()?;
        self.status = OrderStatus::Approved;
        self.updated_at = TimeStamp::new();
        Ok(())
    }

    /// Flip to Rejected with the mandatory reason. No stock side effect.
    pub fn reject(&mut self, reason: &str) -> Result<(), OrderError> {
        self.ensure_pending()?;
        self.status = OrderStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.updated_at = TimeStamp::new();
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
