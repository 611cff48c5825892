//! Service layer API for the order approval workflow
use crate::error::{OrderError, ValidationError};
use crate::order::{Order, OrderDraft, OrderItem};
use crate::role::Principal;
use crate::store::Store;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct OrderService {
    store: Store,
    // in future we could add a config for approval constraints
}

impl OrderService {
    pub fn new(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        Ok(Self {
            store: Store::open(&instance)?,
        })
    }

    /// Stock lookups and maintenance go straight through; stock CRUD is
    /// plumbing, the workflow below is the interesting part.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Intake: validate a draft against current stock and persist it as a
    /// pending order.
    ///
    /// The stock checks here are advisory. Stock can be sold to another
    /// order between intake and approval, so the authoritative re-check
    /// happens again inside settlement.
    pub fn create_order(&self, principal: &Principal, draft: OrderDraft) -> anyhow::Result<Order> {
        principal.may_create_orders()?;
        draft.validate()?;

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let stock = self
                .store
                .stock_by_id(&line.stock_id)?
                .ok_or_else(|| OrderError::StockNotFound(line.stock_id.clone()))?;
            if stock.quantity < line.quantity {
                return Err(OrderError::InsufficientStock(stock.name).into());
            }
            // Pricing comes from the caller, not from the stock record.
            // See DESIGN.md on the unfloored selling price.
            let unit_price = line.selling_price.unwrap_or(0);
            items.push(OrderItem::new(line.stock_id.clone(), line.quantity, unit_price)?);
        }

        let order = Order::new(
            draft.customer_name.unwrap_or_default(),
            draft.customer_contact.unwrap_or_default(),
            principal.user_id.clone(),
            items,
        )?;
        self.store.insert_order(&order)?;

        info!(
            order_id = %order.id,
            sales_rep = %order.sales_rep,
            total = order.total_amount,
            lines = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    /// Approve a pending order. Delegates to the store's settlement
    /// transaction; the flip to Approved only commits if every stock
    /// decrement does.
    pub fn approve_order(&self, principal: &Principal, order_id: &str) -> anyhow::Result<Order> {
        principal.may_settle_orders()?;

        // Fast-fail before opening a transaction. The same checks run
        // again inside settlement under isolation.
        let order = self
            .store
            .order_by_id(order_id)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        order.ensure_pending()?;

        let settled = self.store.settle(order_id).inspect_err(|err| {
            warn!(order_id, %err, "settlement aborted, order left pending");
        })?;

        info!(order_id = %settled.id, approver = %principal.user_id, "order approved");
        Ok(settled)
    }

    /// Reject a pending order with a reason. Unconditional apart from the
    /// state gate: rejection has no stock side effect, so no re-check.
    pub fn reject_order(
        &self,
        principal: &Principal,
        order_id: &str,
        reason: &str,
    ) -> anyhow::Result<Order> {
        principal.may_settle_orders()?;
        if reason.trim().is_empty() {
            return Err(ValidationError::MissingReason.into());
        }

        let order = self.store.reject(order_id, reason)?;

        info!(order_id = %order.id, approver = %principal.user_id, reason, "order rejected");
        Ok(order)
    }

    /// List orders visible to the caller, oldest first. Sales
    /// representatives only see orders they created themselves.
    pub fn list_orders(&self, principal: &Principal) -> anyhow::Result<Vec<Order>> {
        let mut orders = self.store.orders()?;
        if !principal.sees_all_orders() {
            orders.retain(|order| order.sales_rep == principal.user_id);
        }
        debug!(caller = %principal.user_id, count = orders.len(), "orders listed");
        Ok(orders)
    }

    /// Point lookup with the same visibility rule as listing.
    pub fn get_order(&self, principal: &Principal, order_id: &str) -> anyhow::Result<Order> {
        let order = self
            .store
            .order_by_id(order_id)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        if !principal.sees_all_orders() && order.sales_rep != principal.user_id {
            return Err(OrderError::NotFound(order_id.to_string()).into());
        }
        Ok(order)
    }
}
