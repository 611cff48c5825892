//! Sled-backed persistence for stock and orders
//!
//! Three trees: `stock` (id -> StockItem), `stock_names` (unique name -> id)
//! and `orders` (id -> Order with embedded line items). Records are CBOR
//! encoded. Settlement runs as one serializable multi-tree transaction, so
//! concurrent approvals against the same stock rows either serialize or
//! retry, and no partial decrement is ever visible.
use crate::error::OrderError;
use crate::order::Order;
use crate::stock::StockItem;
use sled::Db;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};

pub struct Store {
    stock: sled::Tree,
    stock_names: sled::Tree,
    orders: sled::Tree,
}

fn encode<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, OrderError> {
    minicbor::to_vec(value).map_err(|err| OrderError::Codec(err.to_string()))
}

fn decode<T: for<'b> minicbor::Decode<'b, ()>>(bytes: &[u8]) -> Result<T, OrderError> {
    minicbor::decode(bytes).map_err(|err| OrderError::Codec(err.to_string()))
}

impl Store {
    pub fn open(db: &Db) -> anyhow::Result<Self> {
        Ok(Self {
            stock: db.open_tree("stock")?,
            stock_names: db.open_tree("stock_names")?,
            orders: db.open_tree("orders")?,
        })
    }

    /// Insert a new stock item. The name index is claimed first with a
    /// compare-and-swap, which is what enforces the unique-name constraint.
    pub fn insert_stock(&self, item: &StockItem) -> anyhow::Result<()> {
        let claimed = self.stock_names.compare_and_swap(
            item.name.as_bytes(),
            None as Option<&[u8]>,
            Some(item.id.as_bytes()),
        )?;
        if claimed.is_err() {
            return Err(OrderError::DuplicateName(item.name.clone()).into());
        }
        self.stock.insert(item.id.as_bytes(), encode(item)?)?;
        Ok(())
    }

    pub fn stock_by_id(&self, id: &str) -> anyhow::Result<Option<StockItem>> {
        match self.stock.get(id.as_bytes())? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn stock_by_name(&self, name: &str) -> anyhow::Result<Option<StockItem>> {
        match self.stock_names.get(name.as_bytes())? {
            Some(id) => {
                let id = String::from_utf8_lossy(&id).to_string();
                self.stock_by_id(&id)
            }
            None => Ok(None),
        }
    }

    /// Overwrite an existing stock item, moving its name index entry when
    /// the item was renamed.
    pub fn update_stock(&self, item: &StockItem) -> anyhow::Result<()> {
        let prior = self
            .stock_by_id(&item.id)?
            .ok_or_else(|| OrderError::StockNotFound(item.id.clone()))?;
        if prior.name != item.name {
            let claimed = self.stock_names.compare_and_swap(
                item.name.as_bytes(),
                None as Option<&[u8]>,
                Some(item.id.as_bytes()),
            )?;
            if claimed.is_err() {
                return Err(OrderError::DuplicateName(item.name.clone()).into());
            }
            self.stock_names.remove(prior.name.as_bytes())?;
        }
        self.stock.insert(item.id.as_bytes(), encode(item)?)?;
        Ok(())
    }

    /// Delete a stock item. Refused while any order line still references
    /// it, so historic orders keep a resolvable stock reference.
    pub fn remove_stock(&self, id: &str) -> anyhow::Result<()> {
        let item = self
            .stock_by_id(id)?
            .ok_or_else(|| OrderError::StockNotFound(id.to_string()))?;
        for order in self.orders()? {
            if order.items.iter().any(|line| line.stock_id == id) {
                return Err(OrderError::StockInUse(item.name).into());
            }
        }
        self.stock.remove(id.as_bytes())?;
        self.stock_names.remove(item.name.as_bytes())?;
        Ok(())
    }

    /// Persist a new order with its embedded line items in a single write.
    pub fn insert_order(&self, order: &Order) -> anyhow::Result<()> {
        self.orders.insert(order.id.as_bytes(), encode(order)?)?;
        Ok(())
    }

    pub fn order_by_id(&self, id: &str) -> anyhow::Result<Option<Order>> {
        match self.orders.get(id.as_bytes())? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// All orders, oldest first. bech32 keys do not sort chronologically,
    /// so ordering comes from the stored creation timestamp.
    pub fn orders(&self) -> anyhow::Result<Vec<Order>> {
        let mut out = Vec::new();
        for entry in self.orders.iter() {
            let (_, raw) = entry?;
            out.push(decode::<Order>(&raw)?);
        }
        out.sort_by(|a, b| {
            a.created_at
                .to_datetime_utc()
                .cmp(&b.created_at.to_datetime_utc())
        });
        Ok(out)
    }

    /// Delete an order. Line items are embedded in the record, so they go
    /// with it.
    pub fn remove_order(&self, id: &str) -> anyhow::Result<()> {
        self.orders
            .remove(id.as_bytes())?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        Ok(())
    }

    /// Flip a pending order to Rejected with its reason. Runs as a
    /// transaction on the orders tree so the pending re-check and the
    /// write are one unit: a rejection racing a settlement of the same
    /// order cannot overwrite an already-Approved record.
    pub fn reject(&self, order_id: &str, reason: &str) -> anyhow::Result<Order> {
        use ConflictableTransactionError::Abort;

        let result = self.orders.transaction(|orders| {
            let raw = orders
                .get(order_id.as_bytes())?
                .ok_or_else(|| Abort(OrderError::NotFound(order_id.to_string())))?;
            let mut order: Order = decode(&raw).map_err(Abort)?;
            order.reject(reason).map_err(Abort)?;
            orders.insert(order.id.as_bytes(), encode(&order).map_err(Abort)?)?;
            Ok(order)
        });

        match result {
            Ok(order) => Ok(order),
            Err(TransactionError::Abort(err)) => Err(err.into()),
            Err(TransactionError::Storage(err)) => Err(err.into()),
        }
    }

    /// Atomic stock settlement: re-read the order and every referenced
    /// stock row under one transaction, re-check quantities, then apply
    /// all decrements and the flip to Approved together.
    ///
    /// The closure can run more than once (sled retries on conflict), so
    /// it re-reads everything from the transactional view each attempt.
    /// The pending re-check inside the transaction is what makes the
    /// transition exactly-once under concurrent approval attempts.
    pub fn settle(&self, order_id: &str) -> anyhow::Result<Order> {
        use ConflictableTransactionError::Abort;

        let result = (&self.orders, &self.stock).transaction(|(orders, stock)| {
            let raw = orders
                .get(order_id.as_bytes())?
                .ok_or_else(|| Abort(OrderError::NotFound(order_id.to_string())))?;
            let mut order: Order = decode(&raw).map_err(Abort)?;
            order.ensure_pending().map_err(Abort)?;

            for line in &order.items {
                let raw = stock
                    .get(line.stock_id.as_bytes())?
                    .ok_or_else(|| Abort(OrderError::StockNotFound(line.stock_id.clone())))?;
                let mut item: StockItem = decode(&raw).map_err(Abort)?;
                if item.quantity < line.quantity {
                    return Err(Abort(OrderError::InsufficientStock(item.name)));
                }
                item.quantity -= line.quantity;
                stock.insert(line.stock_id.as_bytes(), encode(&item).map_err(Abort)?)?;
            }

            order.approve().map_err(Abort)?;
            orders.insert(order.id.as_bytes(), encode(&order).map_err(Abort)?)?;
            Ok(order)
        });

        match result {
            Ok(order) => Ok(order),
            Err(TransactionError::Abort(err)) => Err(err.into()),
            Err(TransactionError::Storage(err)) => Err(err.into()),
        }
    }
}
