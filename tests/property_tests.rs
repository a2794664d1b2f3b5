//! Property-based tests for the inventory payload rules and the price filter.

use std::collections::BTreeSet;
use std::sync::Arc;

use inventory_api::{
    db::{self, inventory_filter::InventoryFilterCriteria, DbConfig},
    models::{InventoryDetailsDraft, InventoryMasterDraft, MasterReference},
    repositories::SeaOrmInventoryRepository,
    services::inventory::InventoryService,
};
use proptest::prelude::*;
use serde_json::json;
use validator::Validate;

fn price_strategy() -> impl Strategy<Value = f64> {
    (0u32..10_000).prop_map(|cents| f64::from(cents) / 100.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn non_negative_prices_validate(price in price_strategy()) {
        let draft = InventoryMasterDraft { unit_price: price, ..Default::default() };
        prop_assert!(draft.validate().is_ok());
    }

    #[test]
    fn negative_prices_are_rejected(cents in 1u32..1_000_000) {
        let draft = InventoryMasterDraft {
            unit_price: -(f64::from(cents) / 100.0),
            ..Default::default()
        };
        prop_assert!(draft.validate().is_err());
    }

    #[test]
    fn notes_limit_is_2500_characters(len in 0usize..3_000) {
        let draft = InventoryDetailsDraft {
            transaction_notes: Some("n".repeat(len)),
            ..Default::default()
        };
        prop_assert_eq!(draft.validate().is_ok(), len <= 2_500);
    }

    #[test]
    fn both_reference_forms_name_the_same_product(id in any::<i64>()) {
        let bare: MasterReference = serde_json::from_value(json!(id)).unwrap();
        let object: MasterReference = serde_json::from_value(json!({ "productId": id })).unwrap();
        prop_assert_eq!(bare.product_id(), id);
        prop_assert_eq!(object.product_id(), id);
    }
}

async fn fresh_service() -> InventoryService {
    let pool = db::establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        ..Default::default()
    })
    .await
    .expect("in-memory database");
    db::run_migrations(&pool).await.expect("migrations");
    InventoryService::new(Arc::new(SeaOrmInventoryRepository::new(Arc::new(pool))))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn price_filter_returns_exactly_the_products_in_range(
        prices in prop::collection::vec(price_strategy(), 1..6),
        bound_a in price_strategy(),
        bound_b in price_strategy(),
    ) {
        let (min_price, max_price) = if bound_a <= bound_b { (bound_a, bound_b) } else { (bound_b, bound_a) };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (expected, found) = runtime.block_on(async {
            let service = fresh_service().await;
            let mut expected = BTreeSet::new();

            for price in &prices {
                let created = service
                    .create_inventory(InventoryMasterDraft {
                        product_name: Some("p".into()),
                        unit_price: *price,
                        ..Default::default()
                    })
                    .await
                    .unwrap();
                service
                    .create_inventory_details(InventoryDetailsDraft {
                        inventory_master: Some(MasterReference::Id(created.product_id())),
                        quantity: 1,
                        ..Default::default()
                    })
                    .await
                    .unwrap();
                if (min_price..=max_price).contains(price) {
                    expected.insert(created.product_id());
                }
            }

            let found: BTreeSet<i64> = service
                .get_inventory_by_filters(InventoryFilterCriteria {
                    min_price: Some(min_price),
                    max_price: Some(max_price),
                    ..Default::default()
                })
                .await
                .unwrap()
                .iter()
                .map(|m| m.product_id())
                .collect();

            (expected, found)
        });

        prop_assert_eq!(expected, found);
    }
}
