//! Stock inventory records
use crate::utils;

// Key in the stock tree is the id; a second tree maps the unique name
// back to the id so lookups by either work.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    #[n(0)]
    pub id: String, // bech32 encoded uuid7
    #[n(1)]
    pub name: String, // unique across the store
    #[n(2)]
    pub quantity: u64,
    #[n(3)]
    pub buying_price: u64, // minor currency units, integers for currency
    #[n(4)]
    pub selling_price: Option<u64>,
}

impl StockItem {
    pub fn new(name: &str, quantity: u64, buying_price: u64) -> anyhow::Result<Self> {
        Ok(Self {
            id: utils::new_uuid_to_bech32(utils::STOCK_HRP)?,
            name: name.to_string(),
            quantity,
            buying_price,
            selling_price: None,
        })
    }

    pub fn set_selling_price(mut self, price: u64) -> Self {
        self.selling_price = Some(price);
        self
    }
}
