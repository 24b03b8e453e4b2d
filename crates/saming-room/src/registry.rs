//! The room registry: live rooms keyed by code.

use std::collections::HashMap;

use rand::Rng;
use saming_game::GameConfig;
use saming_protocol::{PlayerId, RoomCode, ROOM_CODE_LEN};
use tokio::sync::RwLock;

use crate::actor::{spawn_room, EventSender, RoomHandle};
use crate::RoomError;

/// Command channel depth per room actor.
const ROOM_CHANNEL_SIZE: usize = 64;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Owns every live room. Lookups take the map's read lock; per-room work
/// then goes through the room's own actor, so the registry is never held
/// across game logic.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: GameConfig,
}

impl RoomRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config: config.validated(),
        }
    }

    /// Creates a room with a fresh code and the host seated, and returns
    /// its handle. Retries code generation on collision.
    pub async fn create_room(
        &self,
        host_id: PlayerId,
        host_name: &str,
        host_sender: EventSender,
    ) -> RoomHandle {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = generate_code(&mut rand::rng());
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let handle = spawn_room(
            code.clone(),
            host_id,
            host_name,
            host_sender,
            self.config.clone(),
            ROOM_CHANNEL_SIZE,
        );
        rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, host = %host_id, "room created");
        handle
    }

    /// Looks a room up by code, case-insensitively.
    pub async fn get(&self, raw_code: &str) -> Result<RoomHandle, RoomError> {
        let code = RoomCode::parse(raw_code)
            .map_err(|_| RoomError::NotFound(raw_code.to_string()))?;
        self.rooms
            .read()
            .await
            .get(&code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(raw_code.to_string()))
    }

    /// Removes a room from the registry. Idempotent; the actor itself is
    /// told to shut down if it is still running.
    pub async fn remove(&self, code: &RoomCode) {
        let handle = self.rooms.write().await.remove(code);
        if let Some(handle) = handle {
            let _ = handle.shutdown().await;
            tracing::info!(room = %code, "room removed");
        }
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

fn generate_code(rng: &mut impl Rng) -> RoomCode {
    let raw: String = (0..ROOM_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode::parse(&raw).expect("generated codes are always valid")
}
