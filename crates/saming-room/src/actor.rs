//! Room actor: an isolated Tokio task that owns one game room.
//!
//! Each room runs in its own task — the task *is* the room's mutual
//! exclusion domain. Commands arrive over an mpsc channel, the controller
//! mutates state and returns recipient-scoped events, and the actor fans
//! them out to per-player channels. The phase timer lives in the same
//! `select!` loop, so timer fires are serialized with player commands and
//! checked against the room's current `(phase, round)` ticket.

use std::collections::HashMap;

use saming_clock::PhaseTimer;
use saming_game::{GameConfig, Outbound, PhaseTicket, Room};
use saming_protocol::{
    ClientCommand, Phase, PlayerId, Recipient, RoomCode, ServerEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::RoomError;

/// Channel for delivering outbound events to one player's connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Seat a player and register their event channel.
    Join {
        player_id: PlayerId,
        username: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Drop a player's connection. Replies with `true` when the room is
    /// now empty (the caller should remove it from the registry).
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },

    /// A game command from a connected player. Errors go back to the
    /// sender as a direct `error` event, never through a reply channel.
    Command {
        sender_id: PlayerId,
        command: ClientCommand,
    },

    /// Request room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Tear the room down.
    Shutdown,
}

/// Room metadata, without any game state.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub player_count: usize,
    pub connected: usize,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Seats a player in the room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        username: &str,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            username: username.to_string(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Drops a player's connection. Returns `true` when the room emptied
    /// out and shut itself down.
    pub async fn leave(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Routes a game command into the room (fire-and-forget).
    pub async fn command(
        &self,
        sender_id: PlayerId,
        command: ClientCommand,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Command { sender_id, command }).await
    }

    /// Fetches room metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The actor state. Lives inside a Tokio task.
struct RoomActor {
    room: Room,
    timer: PhaseTimer<PhaseTicket>,
    /// Per-player outbound channels; membership here means "connected".
    senders: HashMap<PlayerId, EventSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        // Hand the creator their freshly-minted room.
        let host = self.room.host_id();
        self.send_to(
            host,
            ServerEvent::RoomCreated {
                room: self.room.snapshot_for(host),
            },
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle(cmd) {
                            break;
                        }
                    }
                    None => break,
                },
                ticket = self.timer.fired() => {
                    let events = self.room.timer_fired(ticket);
                    self.dispatch(events);
                }
            }

            // Reconcile the timer with whatever phase the room is in now.
            // Same ticket → the running deadline is kept untouched.
            self.timer
                .sync(self.room.timer_ticket().zip(self.room.phase_remaining()));
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    /// Processes one command. Returns `true` when the actor should stop.
    fn handle(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                username,
                sender,
                reply,
            } => {
                match self.room.join(player_id, &username) {
                    Ok(events) => {
                        self.senders.insert(player_id, sender);
                        self.dispatch(events);
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(RoomError::Game(e)));
                    }
                }
                false
            }

            RoomCommand::Leave { player_id, reply } => {
                self.senders.remove(&player_id);
                let events = self.room.leave(player_id);
                self.dispatch(events);

                let empty = self.senders.is_empty();
                let _ = reply.send(empty);
                if empty {
                    tracing::info!(
                        room = %self.room.code(),
                        "last connection gone, destroying room"
                    );
                }
                empty
            }

            RoomCommand::Command { sender_id, command } => {
                self.handle_command(sender_id, command);
                false
            }

            RoomCommand::Info { reply } => {
                let _ = reply.send(RoomInfo {
                    code: self.room.code().clone(),
                    phase: self.room.phase(),
                    player_count: self.room.players().len(),
                    connected: self.senders.len(),
                });
                false
            }

            RoomCommand::Shutdown => {
                tracing::info!(room = %self.room.code(), "room shutting down");
                true
            }
        }
    }

    fn handle_command(&mut self, sender_id: PlayerId, command: ClientCommand) {
        if !self.senders.contains_key(&sender_id) {
            tracing::warn!(
                room = %self.room.code(),
                player = %sender_id,
                "command from non-member, ignoring"
            );
            return;
        }

        let result = match command {
            ClientCommand::StartGame => self.room.start_game(sender_id),
            ClientCommand::SkipPhase => self.room.skip_phase(sender_id),
            ClientCommand::SkipAction => self.room.skip_action(sender_id),
            ClientCommand::NightAction { target_id } => {
                self.room.night_action(sender_id, target_id)
            }
            ClientCommand::CurseAction { target_id } => {
                self.room.curse_action(sender_id, target_id)
            }
            ClientCommand::Vote { target_id } => {
                self.room.vote(sender_id, target_id)
            }
            ClientCommand::HunterShoot { target_id } => {
                self.room.hunter_shoot(sender_id, target_id)
            }
            ClientCommand::ChatMessage { content } => {
                Ok(self.room.chat(sender_id, content))
            }
            // Lobby commands are consumed by the connection handler and
            // should never reach a room.
            ClientCommand::Hello { .. }
            | ClientCommand::CreateRoom
            | ClientCommand::JoinRoom { .. }
            | ClientCommand::LeaveRoom => {
                self.send_to(
                    sender_id,
                    ServerEvent::Error {
                        code: "unexpected_command".into(),
                        message: "lobby commands are not valid inside a room"
                            .into(),
                    },
                );
                return;
            }
        };

        match result {
            Ok(events) => self.dispatch(events),
            Err(e) => {
                tracing::debug!(
                    room = %self.room.code(),
                    player = %sender_id,
                    error = %e,
                    "command rejected"
                );
                self.send_to(
                    sender_id,
                    ServerEvent::Error {
                        code: e.code().into(),
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Delivers events to their recipients, in order.
    fn dispatch(&self, events: Vec<Outbound>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(event.clone());
                    }
                }
                Recipient::Player(id) => self.send_to(id, event),
            }
        }
    }

    /// Sends to one player; silently dropped when they're disconnected.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a room actor with the host already seated and connected.
pub(crate) fn spawn_room(
    code: RoomCode,
    host_id: PlayerId,
    host_name: &str,
    host_sender: EventSender,
    config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room: Room::new(code.clone(), host_id, host_name, config),
        timer: PhaseTimer::new(),
        senders: HashMap::from([(host_id, host_sender)]),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
