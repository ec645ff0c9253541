//! Room registry for Memoria.
//!
//! The server has a fixed set of named rooms, created once at startup and
//! never destroyed. Each room seats at most [`ROOM_CAPACITY`] connections,
//! and a connection sits in at most one room at a time.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: owns the rooms, admits and removes connections
//! - [`Room`]: one room's id, label, and occupants
//! - [`RoomError`]: why an admit or remove did not happen

mod config;
mod error;
mod registry;
mod room;

pub use config::{DEFAULT_ROOM_NAMES, ROOM_CAPACITY, default_room_names};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::Room;
