use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;

use crate::{db::DbPool, error::AppResult};

/// Storage slot name for cart snapshots; each cart key gets its own slot
/// underneath it.
pub const CART_STORAGE_KEY: &str = "bgs-restaurant-cart";

pub fn snapshot_slot(cart_key: &str) -> String {
    format!("{CART_STORAGE_KEY}:{cart_key}")
}

/// Where serialized cart snapshots are kept. Payloads are opaque strings so a
/// corrupted slot is still readable and can be discarded by the caller.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, slot: &str) -> impl Future<Output = AppResult<Option<String>>> + Send;

    fn save(&self, slot: &str, payload: &str) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, slot: &str) -> AppResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        Ok(slots.get(slot).cloned())
    }

    async fn save(&self, slot: &str, payload: &str) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        slots.insert(slot.to_string(), payload.to_string());
        Ok(())
    }
}

/// Snapshots kept in the `cart_snapshots` table, one row per slot.
#[derive(Clone)]
pub struct PgSnapshotStore {
    pool: DbPool,
}

impl PgSnapshotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SnapshotStore for PgSnapshotStore {
    async fn load(&self, slot: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM cart_snapshots WHERE cart_key = $1")
                .bind(slot)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn save(&self, slot: &str, payload: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (cart_key, payload, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (cart_key) DO UPDATE
            SET payload = EXCLUDED.payload, updated_at = NOW()
            "#,
        )
        .bind(slot)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
