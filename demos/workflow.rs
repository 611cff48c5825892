//! End-to-end walkthrough: seed stock, draft an order, approve it.
//!
//! Run with `cargo run --example workflow`.

use order_approval::order::OrderDraft;
use order_approval::role::{Principal, Role};
use order_approval::service::OrderService;
use order_approval::stock::StockItem;
use order_approval::utils;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db = sled::open("orders-demo")?;
    db.clear()?;
    let service = OrderService::new(Arc::new(db))?;

    let rep = Principal::new(
        utils::new_uuid_to_bech32(utils::USER_HRP)?,
        Role::SalesRepresentative,
    );
    let keeper = Principal::new(
        utils::new_uuid_to_bech32(utils::USER_HRP)?,
        Role::StoreKeeper,
    );

    let plywood = StockItem::new("Plywood", 10, 80)?.set_selling_price(100);
    service.store().insert_stock(&plywood)?;

    let draft = OrderDraft::new()
        .set_customer_name("Jane Carpenter")
        .set_customer_contact("0712 555 001")
        .add_line(&plywood.id, 4, Some(100));
    let order = service.create_order(&rep, draft)?;
    println!("created {} total={} status={}", order.id, order.total_amount, order.status);

    let order = service.approve_order(&keeper, &order.id)?;
    let left = service.store().stock_by_id(&plywood.id)?.unwrap();
    println!("approved {} status={} plywood_left={}", order.id, order.status, left.quantity);

    Ok(())
}
