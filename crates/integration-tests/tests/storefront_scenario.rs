//! End-to-end storefront scenarios driven through the event dispatcher.

use std::sync::Arc;

use nona_store_core::{Category, Price, ProductId};
use nona_store_integration_tests::storefront;
use nona_store_storefront::cart::{CartStore, FileCartStore, MemoryCartStore};
use nona_store_storefront::catalog::{Snapshot, ViewStatus};
use nona_store_storefront::events::{EventOutcome, StorefrontEvent};
use nona_store_storefront::feed::{FeedError, FeedEvent};
use nona_store_storefront::gallery::GalleryImage;
use nona_store_storefront::locale::Locale;
use nona_store_storefront::notifications::NotificationKind;
use serde_json::json;

fn add_shoe() -> StorefrontEvent {
    StorefrontEvent::AddToCart {
        id: ProductId::new("p1"),
        name: "Shoe A".to_string(),
        price: Price::from(100),
        image: String::new(),
    }
}

fn one_shoe() -> serde_json::Value {
    json!({"p1": {"name": "Shoe A", "price": 100, "category": "shoes", "images": []}})
}

// =============================================================================
// Catalog, search and cart
// =============================================================================

#[tokio::test]
async fn test_single_product_scenario() {
    let store = Arc::new(MemoryCartStore::new());
    let state = storefront(Locale::Arabic, store.clone(), one_shoe());

    state
        .dispatch(StorefrontEvent::SelectCategory {
            category: Category::Shoes,
        })
        .unwrap();
    let view = state.catalog_view();
    assert_eq!(view.products.len(), 1);
    assert_eq!(view.label, "الاحذيه");

    let english = storefront(Locale::English, store.clone(), one_shoe());
    english
        .dispatch(StorefrontEvent::SearchSubmit {
            term: "a".to_string(),
        })
        .unwrap();
    assert_eq!(english.catalog_view().label, "results for 'a' (1 item)");

    english.dispatch(add_shoe()).unwrap();
    let outcome = english.dispatch(add_shoe()).unwrap();

    let EventOutcome::Cart(outcome) = outcome else {
        panic!("expected cart outcome");
    };
    assert_eq!(outcome.item.quantity, 2);
    assert_eq!(outcome.total, 2);
    let cart = english.cart().cart().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(english.cart().total(), 2);
    assert_eq!(store.raw_count().as_deref(), Some("2"));
}

#[tokio::test]
async fn test_later_snapshot_leaves_no_residue() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        json!({
            "a": {"name": "Old A", "price": 1, "category": "offers"},
            "b": {"name": "Old B", "price": 2, "category": "offers"}
        }),
    );
    state.apply_feed_event(FeedEvent::Snapshot(Snapshot::from_json(json!({
        "c": {"name": "New C", "price": 3, "category": "clothes"}
    }))));

    let ids: Vec<String> = state
        .catalog_view()
        .products
        .iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(ids, ["c"]);
}

#[tokio::test]
async fn test_search_overrides_category_scope() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        json!({
            "red": {"name": "Red Shoes", "price": 50, "category": "shoes"},
            "hat": {"name": "Blue Hat", "price": 20, "category": "accessories"}
        }),
    );
    state
        .dispatch(StorefrontEvent::SelectCategory {
            category: Category::Accessories,
        })
        .unwrap();
    state
        .dispatch(StorefrontEvent::SearchSubmit {
            term: "Shoe".to_string(),
        })
        .unwrap();

    let view = state.catalog_view();
    assert_eq!(view.products.len(), 1);
    assert_eq!(view.products[0].name, "Red Shoes");

    // Clearing the search restores the category scope.
    state
        .dispatch(StorefrontEvent::SearchSubmit {
            term: "  ".to_string(),
        })
        .unwrap();
    let view = state.catalog_view();
    assert_eq!(view.label, "Accessories");
    assert_eq!(view.products[0].name, "Blue Hat");
}

#[tokio::test]
async fn test_invalid_records_are_skipped_not_fatal() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        json!({
            "ok": {"name": "Fine", "price": 10, "category": "clothes"},
            "neg": {"name": "Negative", "price": -1, "category": "clothes"},
            "cat": {"name": "Mystery", "price": 5, "category": "gadgets"},
            "all": {"name": "Pseudo", "price": 5, "category": "all"},
            "noname": {"price": 5, "category": "shoes"}
        }),
    );

    let view = state.catalog_view();
    assert_eq!(view.status, ViewStatus::Products);
    assert_eq!(view.products.len(), 1);
}

#[tokio::test]
async fn test_absent_feed_and_feed_failure_are_distinct() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        serde_json::Value::Null,
    );
    assert_eq!(state.catalog_view().status, ViewStatus::NoProducts);
    assert!(state.notifications().current().is_none());

    state.apply_feed_event(FeedEvent::Failed(FeedError::Status(503)));
    assert_eq!(state.catalog_view().status, ViewStatus::FeedError);
    let notification = state.notifications().current().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
}

// =============================================================================
// Cart storage
// =============================================================================

#[tokio::test]
async fn test_storage_failure_leaves_cart_byte_identical() {
    let store = Arc::new(MemoryCartStore::new());
    let state = storefront(Locale::English, store.clone(), one_shoe());
    state.dispatch(add_shoe()).unwrap();
    let before = store.raw_cart().unwrap();
    let count_before = store.raw_count();

    store.set_fail_writes(true);
    assert!(state.dispatch(add_shoe()).is_err());

    assert_eq!(store.raw_cart().unwrap(), before);
    assert_eq!(store.raw_count(), count_before);
    assert_eq!(state.cart().total(), 1);
    let notification = state.notifications().current().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_views_sharing_a_cart_directory_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let first_store: Arc<dyn CartStore> = Arc::new(FileCartStore::open(dir.path()).unwrap());
    let second_store: Arc<dyn CartStore> = Arc::new(FileCartStore::open(dir.path()).unwrap());
    let first = storefront(Locale::English, first_store, one_shoe());
    let second = storefront(Locale::English, second_store, one_shoe());

    first.dispatch(add_shoe()).unwrap();
    second.dispatch(add_shoe()).unwrap();

    assert_eq!(second.cart().cart().unwrap().get(&ProductId::new("p1")).unwrap().quantity, 2);
    assert_eq!(first.cart().refresh().unwrap(), 2);
}

#[tokio::test]
async fn test_cart_keeps_items_for_products_gone_from_feed() {
    let store = Arc::new(MemoryCartStore::new());
    let state = storefront(Locale::English, store, one_shoe());
    state.dispatch(add_shoe()).unwrap();

    state.apply_feed_event(FeedEvent::Snapshot(Snapshot::default()));

    assert_eq!(state.cart().cart().unwrap().total_quantity(), 1);
    assert_eq!(state.catalog_view().status, ViewStatus::NoProducts);
}

// =============================================================================
// Gallery
// =============================================================================

#[tokio::test]
async fn test_zero_image_product_shows_placeholder() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        one_shoe(),
    );
    let outcome = state
        .dispatch(StorefrontEvent::OpenProduct {
            product_id: ProductId::new("p1"),
        })
        .unwrap();

    let EventOutcome::Gallery(view) = outcome else {
        panic!("expected gallery view");
    };
    assert_eq!(view.image, Some(GalleryImage::Placeholder));
    assert!(!view.navigation_enabled);
    assert!(view.scroll_locked);
}

#[tokio::test]
async fn test_three_images_wrap_after_three_nexts() {
    let state = storefront(
        Locale::English,
        Arc::new(MemoryCartStore::new()),
        json!({"p1": {"name": "Shoe A", "price": 100, "category": "shoes",
                      "images": ["1.jpg", "2.jpg", "3.jpg"]}}),
    );
    state
        .dispatch(StorefrontEvent::OpenProduct {
            product_id: ProductId::new("p1"),
        })
        .unwrap();
    for _ in 0..3 {
        state.dispatch(StorefrontEvent::GalleryNext).unwrap();
    }

    let view = state.gallery_view();
    assert_eq!(view.current_index, 0);
    assert_eq!(view.image, Some(GalleryImage::Url("1.jpg".to_string())));

    state.dispatch(StorefrontEvent::CloseGallery).unwrap();
    assert!(!state.gallery_view().scroll_locked);
}
