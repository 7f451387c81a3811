//! Inventory domain module.
//!
//! One inventory record exists per catalog record. It is created together with the
//! product and then evolves independently (stock movements, reservations).

pub mod record;

pub use record::{DEFAULT_LOCATION, InventoryRecord, Reservation};
