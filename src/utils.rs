//! Identifier construction helpers

use bech32::Bech32m;
use uuid7::uuid7;

pub const ORDER_HRP: &str = "order_";
pub const STOCK_HRP: &str = "stock_";
pub const USER_HRP: &str = "user_";
pub const ITEM_HRP: &str = "line_";

// construct a unique uuid7 then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
