//! Wire protocol for the saming game server.
//!
//! This crate is the language clients and server speak:
//!
//! - **Vocabulary** ([`PlayerId`], [`RoomCode`], [`Role`], [`Phase`], …)
//! - **Commands** ([`ClientCommand`]) — one typed variant per inbound
//!   `{type, payload}` envelope.
//! - **Events** ([`ServerEvent`]) — outbound envelopes, each paired with a
//!   [`Recipient`] by the game layer.
//! - **Snapshots** ([`RoomSnapshot`]) — per-viewer projections with other
//!   players' hidden fields structurally absent.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — frame (de)serialization.
//!
//! It knows nothing about connections, rooms, or game rules.

mod codec;
mod commands;
mod error;
mod events;
mod snapshot;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use commands::ClientCommand;
pub use error::ProtocolError;
pub use events::ServerEvent;
pub use snapshot::{NightSummary, PlayerView, PrivateView, RoomSnapshot};
pub use types::{
    Phase, PlayerId, Reading, Recipient, Role, RoomCode, Team, ROOM_CODE_LEN,
};
