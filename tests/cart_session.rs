use anyhow::anyhow;
use bgs_restaurant_api::{
    cart::{
        CART_STORAGE_KEY, CartExtra, CartSession, CartState, MAX_CART_LINES, MAX_QUANTITY,
        MemorySnapshotStore, SnapshotStore,
    },
    dto::cart::CartView,
    error::AppResult,
    models::{Extra, MenuItem},
    pricing::line_total,
};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

fn menu_item(name: &str, cents: i64) -> MenuItem {
    MenuItem {
        id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        price: Decimal::new(cents, 2),
        image_url: None,
        is_available: true,
        is_fasting: false,
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        category: None,
    }
}

fn extra(name: &str, cents: i64, quantity: i32) -> CartExtra {
    CartExtra {
        extra: Extra {
            id: Uuid::new_v4(),
            name: name.into(),
            price: Decimal::new(cents, 2),
            is_active: true,
            created_at: Utc::now(),
        },
        quantity,
    }
}

/// Accepts nothing and remembers nothing.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    async fn load(&self, _slot: &str) -> AppResult<Option<String>> {
        Err(anyhow!("storage unavailable").into())
    }

    async fn save(&self, _slot: &str, _payload: &str) -> AppResult<()> {
        Err(anyhow!("storage full").into())
    }
}

#[tokio::test]
async fn total_tracks_independent_line_totals() -> anyhow::Result<()> {
    let mut session = CartSession::restore(MemorySnapshotStore::new(), "table-4").await;

    let tibs = menu_item("Special Tibs", 35000);
    let shiro = menu_item("Shiro", 18000);
    let injera = extra("Extra Injera", 2000, 2);
    let awaze = extra("Awaze", 1000, 1);

    let mut expected = Decimal::ZERO;
    for (item, quantity, extras) in [
        (tibs.clone(), 1, vec![injera.clone()]),
        (shiro.clone(), 3, vec![]),
        (tibs, 2, vec![injera, awaze]),
        (shiro, 1, vec![]),
    ] {
        expected += line_total(&item, quantity, &extras);
        session.add_item(item, quantity, extras).await?;
        assert_eq!(session.state().total, expected);
    }

    assert_eq!(session.state().lines.len(), 4);
    Ok(())
}

#[tokio::test]
async fn sample_order_shows_tax_inclusive_split() -> anyhow::Result<()> {
    let mut session = CartSession::restore(MemorySnapshotStore::new(), "sample").await;

    let line_id = session
        .add_item(
            menu_item("Special Tibs", 10000),
            2,
            vec![extra("Extra Injera", 2000, 1)],
        )
        .await?;

    let line = session.state().line(line_id).expect("line present");
    assert_eq!(line.total_price, Decimal::new(22000, 2));

    let view = CartView::from(session.state());
    assert_eq!(view.total, Decimal::new(22000, 2));
    assert_eq!(view.subtotal, Decimal::new(19130, 2));
    assert_eq!(view.tax_amount, Decimal::new(2870, 2));
    assert_eq!(view.item_count, 2);
    Ok(())
}

#[tokio::test]
async fn zero_quantity_update_removes_line() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    let mut updated = CartSession::restore(store.clone(), "a").await;
    let mut removed = CartSession::restore(store, "b").await;

    let kitfo = menu_item("Kitfo", 42000);
    let firfir = menu_item("Firfir", 15000);

    let keep_a = updated.add_item(kitfo.clone(), 1, vec![]).await?;
    let drop_a = updated.add_item(firfir.clone(), 2, vec![]).await?;
    let keep_b = removed.add_item(kitfo, 1, vec![]).await?;
    let drop_b = removed.add_item(firfir, 2, vec![]).await?;

    updated.update_quantity(drop_a, 0).await?;
    removed.remove_item(drop_b).await;

    assert_eq!(updated.state().lines.len(), 1);
    assert!(updated.state().contains(keep_a));
    assert!(removed.state().contains(keep_b));
    assert_eq!(updated.state().total, removed.state().total);

    updated.update_quantity(keep_a, -3).await?;
    assert!(updated.state().is_empty());
    assert_eq!(updated.state().total, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn update_quantity_reprices_line() -> anyhow::Result<()> {
    let mut session = CartSession::restore(MemorySnapshotStore::new(), "reprice").await;
    let line_id = session
        .add_item(
            menu_item("Doro Wat", 38000),
            1,
            vec![extra("Ayib", 2500, 1)],
        )
        .await?;

    session.update_quantity(line_id, 3).await?;

    let line = session.state().line(line_id).expect("line present");
    assert_eq!(line.quantity, 3);
    // extras are per line, not per portion
    assert_eq!(line.total_price, Decimal::new(116500, 2));
    assert_eq!(session.state().total, Decimal::new(116500, 2));
    Ok(())
}

#[tokio::test]
async fn clear_cart_resets_everything() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    let mut session = CartSession::restore(store.clone(), "clear").await;
    session.add_item(menu_item("Shiro", 18000), 2, vec![]).await?;

    session.clear_cart().await;
    assert_eq!(*session.state(), CartState::default());

    let reopened = CartSession::restore(store, "clear").await;
    assert!(reopened.state().is_empty());
    assert_eq!(reopened.state().total, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn item_count_does_not_touch_the_store() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    let session = CartSession::restore(store.clone(), "count").await;

    assert_eq!(session.item_count(), 0);
    assert_eq!(session.item_count(), 0);
    assert_eq!(store.slot_count(), 0);

    let mut session = session;
    session.add_item(menu_item("Buna", 4000), 3, vec![]).await?;
    session.add_item(menu_item("Spris", 9000), 2, vec![]).await?;
    let before = session.state().clone();

    assert_eq!(session.item_count(), 5);
    assert_eq!(session.item_count(), 5);
    assert_eq!(*session.state(), before);
    assert_eq!(store.slot_count(), 1);
    Ok(())
}

#[tokio::test]
async fn identical_adds_stay_separate_lines() -> anyhow::Result<()> {
    let mut session = CartSession::restore(MemorySnapshotStore::new(), "twins").await;
    let beyaynetu = menu_item("Beyaynetu", 22000);

    let first = session.add_item(beyaynetu.clone(), 1, vec![]).await?;
    let second = session.add_item(beyaynetu, 1, vec![]).await?;

    assert_ne!(first, second);
    assert_eq!(session.state().lines.len(), 2);

    session.remove_item(first).await;
    assert_eq!(session.state().lines.len(), 1);
    assert!(session.state().contains(second));
    assert_eq!(session.state().total, Decimal::new(22000, 2));
    Ok(())
}

#[tokio::test]
async fn fresh_session_restores_persisted_cart() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    let mut session = CartSession::restore(store.clone(), "table-9").await;
    session
        .add_item(
            menu_item("Special Tibs", 35000),
            2,
            vec![extra("Awaze", 1000, 1)],
        )
        .await?;
    session.add_item(menu_item("Shiro", 18000), 1, vec![]).await?;
    let saved = session.into_state();

    let restored = CartSession::restore(store.clone(), "table-9").await;
    assert_eq!(*restored.state(), saved);

    let other = CartSession::restore(store, "table-10").await;
    assert!(other.state().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_snapshot_starts_empty() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    store
        .save(&format!("{CART_STORAGE_KEY}:broken"), "{not json")
        .await?;

    let session = CartSession::restore(store, "broken").await;
    assert!(session.state().is_empty());
    assert_eq!(session.state().total, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn store_failures_do_not_fail_mutations() -> anyhow::Result<()> {
    let mut session = CartSession::restore(BrokenStore, "offline").await;
    assert!(session.state().is_empty());

    let line_id = session.add_item(menu_item("Firfir", 15000), 1, vec![]).await?;
    session.update_quantity(line_id, 2).await?;

    assert_eq!(session.item_count(), 2);
    assert_eq!(session.state().total, Decimal::new(30000, 2));
    Ok(())
}

#[tokio::test]
async fn rejects_non_positive_add() {
    let store = MemorySnapshotStore::new();
    let mut session = CartSession::restore(store.clone(), "reject").await;

    assert!(session.add_item(menu_item("Kitfo", 42000), 0, vec![]).await.is_err());
    assert!(
        session
            .add_item(menu_item("Kitfo", 42000), 1, vec![extra("Ayib", 2500, 0)])
            .await
            .is_err()
    );
    assert!(session.state().is_empty());
    assert_eq!(store.slot_count(), 0);
}

#[tokio::test]
async fn rejects_prices_and_quantities_that_cannot_be_stored() -> anyhow::Result<()> {
    let mut session = CartSession::restore(MemorySnapshotStore::new(), "limits").await;

    let mut overpriced = menu_item("Kitfo", 42000);
    overpriced.price = Decimal::MAX;
    assert!(session.add_item(overpriced, 2, vec![]).await.is_err());

    let mut pricey_extra = extra("Ayib", 2500, 1);
    pricey_extra.extra.price = Decimal::MAX;
    assert!(
        session
            .add_item(menu_item("Kitfo", 42000), 1, vec![pricey_extra])
            .await
            .is_err()
    );

    assert!(
        session
            .add_item(menu_item("Kitfo", 42000), MAX_QUANTITY + 1, vec![])
            .await
            .is_err()
    );
    assert!(session.state().is_empty());

    let line_id = session.add_item(menu_item("Kitfo", 42000), 1, vec![]).await?;
    assert!(session.update_quantity(line_id, MAX_QUANTITY + 1).await.is_err());
    assert_eq!(session.state().line(line_id).map(|line| line.quantity), Some(1));
    assert_eq!(session.state().total, Decimal::new(42000, 2));
    Ok(())
}

#[tokio::test]
async fn cart_refuses_lines_beyond_the_limit() -> anyhow::Result<()> {
    let store = MemorySnapshotStore::new();
    let mut session = CartSession::restore(store.clone(), "full").await;

    for _ in 0..MAX_CART_LINES {
        session.add_item(menu_item("Buna", 4000), 1, vec![]).await?;
    }
    assert!(session.add_item(menu_item("Buna", 4000), 1, vec![]).await.is_err());
    assert_eq!(session.state().lines.len(), MAX_CART_LINES);

    let restored = CartSession::restore(store, "full").await;
    assert_eq!(restored.state().lines.len(), MAX_CART_LINES);
    Ok(())
}
