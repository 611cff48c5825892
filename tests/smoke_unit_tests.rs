//! Smoke screen unit tests for order approval system components
//!
//! These are unit tests that span the codebase, testing behavior in
//! isolation from the integration scenarios. They are intended as
//! smoke-screen and generally test the happy path plus the direct
//! refusals of each component.

use order_approval::error::{OrderError, ValidationError};
use order_approval::order::{OrderDraft, OrderStatus};
use order_approval::stock::StockItem;
use order_approval::store::Store;
use order_approval::utils::{self, new_uuid_to_bech32};

// UTILS MODULE TESTS
mod utils_tests {
    use super::*;

    /// new_uuid_to_bech32 generates valid bech32-encoded strings with the
    /// correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let result = new_uuid_to_bech32(utils::ORDER_HRP);
        assert!(result.is_ok());

        let encoded = result.unwrap();
        assert!(encoded.starts_with("order_1"));
        assert!(encoded.len() > 10); // UUID should produce substantial output
    }

    /// Empty human-readable prefixes are refused
    #[test]
    fn handles_empty_hrp() {
        let result = new_uuid_to_bech32("");
        assert!(result.is_err());
    }

    /// Multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_uuid_to_bech32(utils::ORDER_HRP).unwrap();
        let id2 = new_uuid_to_bech32(utils::ORDER_HRP).unwrap();
        let id3 = new_uuid_to_bech32(utils::ORDER_HRP).unwrap();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    /// Different entity kinds produce differently prefixed ids
    #[test]
    fn different_hrps_produce_different_encodings() {
        let order_id = new_uuid_to_bech32(utils::ORDER_HRP).unwrap();
        let stock_id = new_uuid_to_bech32(utils::STOCK_HRP).unwrap();

        assert!(order_id.starts_with("order_"));
        assert!(stock_id.starts_with("stock_"));
        assert_ne!(order_id, stock_id);
    }
}

// DRAFT / INTAKE VALIDATION TESTS
mod draft_tests {
    use super::*;

    fn full_draft() -> OrderDraft {
        OrderDraft::new()
            .set_customer_name("Jane Carpenter")
            .set_customer_contact("0712 555 001")
            .add_line("stock_x", 4, Some(100))
    }

    #[test]
    fn complete_draft_validates() {
        assert!(full_draft().validate().is_ok());
    }

    #[test]
    fn missing_fields_are_refused_individually() {
        let draft = OrderDraft::new()
            .set_customer_contact("0712 555 001")
            .add_line("stock_x", 4, Some(100));
        assert_eq!(draft.validate(), Err(ValidationError::MissingCustomerName));

        let draft = OrderDraft::new()
            .set_customer_name("Jane Carpenter")
            .add_line("stock_x", 4, Some(100));
        assert_eq!(draft.validate(), Err(ValidationError::MissingCustomerContact));

        let draft = OrderDraft::new()
            .set_customer_name("Jane Carpenter")
            .set_customer_contact("0712 555 001");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyOrder));

        let draft = full_draft().add_line("stock_y", 0, None);
        assert_eq!(draft.validate(), Err(ValidationError::ZeroQuantity));
    }

    /// Whitespace-only fields count as missing
    #[test]
    fn blank_fields_are_missing() {
        let draft = OrderDraft::new()
            .set_customer_name("   ")
            .set_customer_contact("0712 555 001")
            .add_line("stock_x", 4, Some(100));
        assert_eq!(draft.validate(), Err(ValidationError::MissingCustomerName));
    }
}

// STATUS MACHINE TESTS
mod status_tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Approved.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
        assert_eq!(OrderStatus::Approved.to_string(), "APPROVED");
        assert_eq!(OrderStatus::Rejected.to_string(), "REJECTED");
    }
}

// STORE CONSTRAINT TESTS
mod store_tests {
    use super::*;
    use order_approval::order::{Order, OrderItem};

    fn new_store(name: &str) -> (tempfile::TempDir, Store) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = sled::open(temp_dir.path().join(name)).unwrap();
        let store = Store::open(&db).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn stock_names_are_unique() {
        let (_tmp, store) = new_store("unique_names.db");

        let first = StockItem::new("Plywood", 10, 80).unwrap();
        let second = StockItem::new("Plywood", 3, 90).unwrap();
        store.insert_stock(&first).unwrap();

        let err = store.insert_stock(&second).unwrap_err();
        assert_eq!(
            err.downcast_ref::<OrderError>(),
            Some(&OrderError::DuplicateName("Plywood".into()))
        );
        // the first writer's record is untouched
        assert_eq!(store.stock_by_name("Plywood").unwrap().unwrap().id, first.id);
    }

    #[test]
    fn renames_move_the_name_index() {
        let (_tmp, store) = new_store("renames.db");

        let item = StockItem::new("Plywood", 10, 80).unwrap();
        store.insert_stock(&item).unwrap();

        let mut renamed = item.clone();
        renamed.name = "Birch Plywood".into();
        store.update_stock(&renamed).unwrap();

        assert!(store.stock_by_name("Plywood").unwrap().is_none());
        assert_eq!(
            store.stock_by_name("Birch Plywood").unwrap().unwrap().id,
            item.id
        );
    }

    #[test]
    fn referenced_stock_cannot_be_removed() {
        let (_tmp, store) = new_store("referenced_stock.db");

        let item = StockItem::new("Plywood", 10, 80).unwrap();
        store.insert_stock(&item).unwrap();

        let lines = vec![OrderItem::new(item.id.clone(), 2, 100).unwrap()];
        let order = Order::new("Jane".into(), "0712".into(), "user_x".into(), lines).unwrap();
        store.insert_order(&order).unwrap();

        let err = store.remove_stock(&item.id).unwrap_err();
        assert_eq!(
            err.downcast_ref::<OrderError>(),
            Some(&OrderError::StockInUse("Plywood".into()))
        );

        // removing the order cascades its lines away, then the stock can go
        store.remove_order(&order.id).unwrap();
        store.remove_stock(&item.id).unwrap();
        assert!(store.stock_by_id(&item.id).unwrap().is_none());
        assert!(store.stock_by_name("Plywood").unwrap().is_none());
    }

    #[test]
    fn orders_list_in_creation_order() {
        let (_tmp, store) = new_store("creation_order.db");

        let mut ids = Vec::new();
        for n in 0..5 {
            let lines = vec![OrderItem::new("stock_x".into(), 1, n).unwrap()];
            let order = Order::new("Jane".into(), "0712".into(), "user_x".into(), lines).unwrap();
            store.insert_order(&order).unwrap();
            ids.push(order.id);
        }

        let listed: Vec<String> = store.orders().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(listed, ids);
    }
}
