//! Cart state manager.
//!
//! `state` holds the data, `reducer` is the pure transition function,
//! `store` abstracts where snapshots live and `session` wires the three
//! together for one customer cart.

pub mod reducer;
pub mod session;
pub mod state;
pub mod store;

pub use reducer::{CartCommand, reduce};
pub use session::{CartSession, MAX_CART_LINES, MAX_QUANTITY};
pub use state::{CartExtra, CartLine, CartState};
pub use store::{CART_STORAGE_KEY, MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
