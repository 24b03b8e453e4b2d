//! Room lifecycle for the saming server.
//!
//! Each room is an isolated Tokio task owning its game state and phase
//! timer; the [`RoomRegistry`] maps six-character codes to live room
//! handles.

mod actor;
mod error;
mod registry;

pub use actor::{EventSender, RoomHandle, RoomInfo};
pub use error::RoomError;
pub use registry::RoomRegistry;
