//! # saming
//!
//! Authoritative multi-room websocket server for the Thai "Tiger-Shaman"
//! social-deduction game (เสือสมิง). Clients are untrusted: all game rules
//! run server-side, and every outbound snapshot is projected per
//! recipient so hidden roles and night intents never leave the server.
//!
//! The layers, bottom up: `saming-protocol` (wire types), `saming-game`
//! (the pure phase state machine), `saming-clock` (ticketed phase
//! timers), `saming-room` (one actor task per room + the registry), and
//! this crate (websocket transport and the binary).

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{SamingServer, SamingServerBuilder};

/// Re-exports everything needed to embed or test the server.
pub mod prelude {
    pub use crate::{SamingServer, SamingServerBuilder, ServerError};

    pub use saming_game::{GameConfig, GameError, Room};
    pub use saming_protocol::{
        ClientCommand, Codec, JsonCodec, Phase, PlayerId, Reading, Recipient,
        Role, RoomCode, RoomSnapshot, ServerEvent, Team,
    };
    pub use saming_room::{RoomError, RoomHandle, RoomRegistry};
}
