//! Tests for the client-context fetcher
//!
//! These tests verify that:
//! - Queries are composed in the documented order
//! - "all" and empty dropdown values never restrict the query
//! - Search is one OR group ANDed with the equality filters
//! - Page windows and totals follow the pagination contract
//! - Store failures propagate verbatim

mod fetch_harness;

use fetch_harness::*;
use fleetdesk::core::adapter::{ClientFetcher, ListConfig};
use fleetdesk::core::error::{FetchError, RequestError, StorageError};
use fleetdesk::core::filter::FilterSelection;
use fleetdesk::core::query::{ListRequest, RowRange};
use fleetdesk::core::spec::{CountMode, OrderBy};
use serde_json::{Value, json};
use std::sync::Arc;

fn client(config: ListConfig, store: &RecordingStore) -> ClientFetcher {
    ClientFetcher::new(config, Arc::new(store.clone()))
}

// =============================================================================
// Query composition
// =============================================================================

mod composition_tests {
    use super::*;

    #[tokio::test]
    async fn test_end_to_end_vehicles_query() {
        let rows: Vec<Value> = (0..10).map(|i| json!({ "id": i })).collect();
        let store = RecordingStore::answering(rows, Some(37));
        let fetcher = client(vehicles_config(), &store);

        let request = ListRequest::new(1, 10)
            .with_ui_filter("status", "active")
            .with_search("ABC");
        let page = fetcher.fetch(&request).await.unwrap();

        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, 37);

        let spec = store.single_call();
        assert_eq!(spec.collection, "vehicles");
        assert_eq!(spec.projection, "*");
        assert_eq!(spec.count, CountMode::Exact);
        assert_eq!(spec.equalities.len(), 1);
        assert_eq!(spec.equality_on("status"), Some("active"));

        let search = spec.search.expect("search group");
        let matches: Vec<(&str, &str)> = search
            .matches
            .iter()
            .map(|m| (m.column.as_str(), m.pattern.as_str()))
            .collect();
        assert_eq!(
            matches,
            vec![("plate", "%ABC%"), ("model", "%ABC%"), ("brand", "%ABC%")]
        );

        assert_eq!(spec.order, Some(OrderBy::desc("created_at")));
        assert_eq!(spec.range, Some(RowRange { from: 0, to: 9 }));
    }

    #[tokio::test]
    async fn test_all_sentinel_places_no_condition() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);

        fetcher
            .fetch(&ListRequest::new(1, 10).with_ui_filter("status", "all"))
            .await
            .unwrap();

        let spec = store.single_call();
        assert!(spec.equalities.is_empty());
        assert_eq!(spec.equality_on("status"), None);
    }

    #[tokio::test]
    async fn test_empty_filter_value_places_no_condition() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);

        fetcher
            .fetch(
                &ListRequest::new(1, 10)
                    .with_ui_filter("status", "")
                    .with_filter("type", FilterSelection::Any),
            )
            .await
            .unwrap();

        assert!(store.single_call().equalities.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_literal_all_is_matched() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);

        fetcher
            .fetch(&ListRequest::new(1, 10).with_filter("status", FilterSelection::equals("all")))
            .await
            .unwrap();

        assert_eq!(store.single_call().equality_on("status"), Some("all"));
    }

    #[tokio::test]
    async fn test_filter_map_routes_key_to_column() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);

        fetcher
            .fetch(
                &ListRequest::new(1, 10)
                    .with_ui_filter("type", "truck")
                    .with_ui_filter("status", "active"),
            )
            .await
            .unwrap();

        let spec = store.single_call();
        let columns: Vec<&str> = spec.equalities.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["vehicle_type", "status"]);
    }

    #[tokio::test]
    async fn test_no_search_group_without_term_or_fields() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);
        fetcher
            .fetch(&ListRequest::new(1, 10).with_search(""))
            .await
            .unwrap();
        assert!(store.single_call().search.is_none());

        let store = RecordingStore::empty();
        let config = ListConfig::builder("reports").build().unwrap();
        let fetcher = client(config, &store);
        fetcher
            .fetch(&ListRequest::new(1, 10).with_search("fuel"))
            .await
            .unwrap();

        let spec = store.single_call();
        assert!(spec.search.is_none());
        assert!(spec.order.is_none());
    }

    #[tokio::test]
    async fn test_projection_is_forwarded_verbatim() {
        let store = RecordingStore::empty();
        let config = ListConfig::builder("services")
            .select("*, vehicle:vehicles(plate), driver:employees!driver_id(name)")
            .build()
            .unwrap();
        client(config, &store)
            .fetch(&ListRequest::new(1, 5))
            .await
            .unwrap();

        assert_eq!(
            store.single_call().projection,
            "*, vehicle:vehicles(plate), driver:employees!driver_id(name)"
        );
    }

    #[tokio::test]
    async fn test_page_window() {
        let store = RecordingStore::empty();
        let fetcher = client(vehicles_config(), &store);

        for (page, items, from, to) in [(1, 10, 0, 9), (2, 10, 10, 19), (3, 7, 14, 20), (5, 1, 4, 4)] {
            fetcher
                .fetch(&ListRequest::new(page, items))
                .await
                .unwrap();
            let spec = store.calls().pop().unwrap();
            assert_eq!(spec.range, Some(RowRange { from, to }));
        }
    }
}

// =============================================================================
// Results
// =============================================================================

mod result_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_count_defaults_to_zero() {
        let store = RecordingStore::answering(vec![json!({"id": 1})], None);
        let page = client(vehicles_config(), &store)
            .fetch(&ListRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_transform_applies_to_every_row_in_order() {
        let rows: Vec<Value> = (0..6)
            .map(|i| json!({ "plate": format!("P-{}", i), "brand": "ford" }))
            .collect();
        let store = RecordingStore::answering(rows, Some(6));
        let config = ListConfig::builder("vehicles")
            .transform(|row| {
                json!({
                    "label": format!("{} ({})", row["plate"].as_str().unwrap_or(""), row["brand"].as_str().unwrap_or("").to_uppercase()),
                })
            })
            .build()
            .unwrap();

        let page = client(config, &store)
            .fetch(&ListRequest::new(1, 10))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 6);
        for (i, row) in page.data.iter().enumerate() {
            assert_eq!(row["label"], format!("P-{} (FORD)", i));
        }
    }

    #[tokio::test]
    async fn test_identical_requests_return_identical_results() {
        let store = seeded_store("owner-a", "owner-b");
        let fetcher = ClientFetcher::new(vehicles_config(), Arc::new(store));
        let request = ListRequest::new(2, 4).with_ui_filter("status", "active");

        let first = fetcher.fetch(&request).await.unwrap();
        let second = fetcher.fetch(&request).await.unwrap();
        assert_eq!(first, second);
    }
}

// =============================================================================
// Against the in-memory store
// =============================================================================

mod in_memory_tests {
    use super::*;

    #[tokio::test]
    async fn test_total_ignores_page_window() {
        let store = seeded_store("owner-a", "owner-b");
        let fetcher = ClientFetcher::new(vehicles_config(), Arc::new(store));

        // ids not divisible by 3 are active: 25 - 8 = 17
        let request = ListRequest::new(1, 5).with_ui_filter("status", "active");
        let first = fetcher.fetch(&request).await.unwrap();
        assert_eq!(first.total, 17);
        assert_eq!(first.data.len(), 5);

        let last = fetcher
            .fetch(&ListRequest::new(4, 5).with_ui_filter("status", "active"))
            .await
            .unwrap();
        assert_eq!(last.total, 17);
        assert_eq!(last.data.len(), 2);
    }

    #[tokio::test]
    async fn test_pages_partition_the_ordered_set() {
        let store = seeded_store("owner-a", "owner-b");
        let fetcher = ClientFetcher::new(vehicles_config(), Arc::new(store));

        let mut ids = Vec::new();
        for page in 1..=3 {
            let result = fetcher.fetch(&ListRequest::new(page, 10)).await.unwrap();
            ids.extend(result.data.iter().map(|r| r["id"].as_u64().unwrap()));
        }

        // created_at descending
        let expected: Vec<u64> = (1..=25u64).rev().collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_search_and_filter_combine_with_and() {
        let store = seeded_store("owner-a", "owner-b");
        let fetcher = ClientFetcher::new(vehicles_config(), Arc::new(store));

        // "abc" plates: 5, 10, 15, 20, 25; of those 15 is inactive
        let page = fetcher
            .fetch(
                &ListRequest::new(1, 10)
                    .with_search("abc")
                    .with_ui_filter("status", "active"),
            )
            .await
            .unwrap();

        let ids: Vec<u64> = page.data.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![25, 20, 10, 5]);
        assert_eq!(page.total, 4);
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_error_propagates_verbatim() {
        let error = StorageError::QueryError {
            backend: "PostgREST".to_string(),
            message: "column vehicles.colour does not exist".to_string(),
        };
        let store = RecordingStore::failing(error.clone());

        let err = client(vehicles_config(), &store)
            .fetch(&ListRequest::new(1, 10).with_ui_filter("colour", "red"))
            .await
            .unwrap_err();

        match err {
            FetchError::DataAccess(inner) => assert_eq!(inner, error),
            other => panic!("Expected DataAccess, got {:?}", other),
        }
        // No retry
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_page_issues_no_query() {
        let store = RecordingStore::empty();
        let err = client(vehicles_config(), &store)
            .fetch(&ListRequest::new(0, 10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::InvalidRequest(RequestError::InvalidPage { page: 0 })
        ));
        assert_eq!(store.call_count(), 0);
    }
}
