//! Error type for game-rule violations.

use saming_protocol::Phase;

/// A rejected controller operation.
///
/// Always reported to the offending sender only, never broadcast, and
/// always leaves room state untouched. [`GameError::code`] is the stable
/// string carried by the wire `error` event.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    /// Joining a room whose game is already running.
    #[error("the game has already started")]
    GameAlreadyStarted,

    /// Joining a room at its player cap.
    #[error("the room is full")]
    RoomFull,

    /// Starting a game below the minimum seat count.
    #[error("at least {0} players are required to start")]
    NotEnoughPlayers(usize),

    /// The operation is not legal in the current phase.
    #[error("not allowed during the {0} phase")]
    InvalidPhase(Phase),

    /// A night action from a role whose table is not acting (or from a
    /// dead player).
    #[error("it is not your turn to act")]
    NotYourTurn,

    /// A host-only command from a non-host, or an action from a player
    /// who has no say (dead voter, wrong hunter).
    #[error("you are not allowed to do that")]
    NotAuthorized,

    /// The target is unknown, dead when it must be alive, or breaks an
    /// action-specific rule.
    #[error("invalid target: {0}")]
    InvalidTarget(&'static str),

    /// The alpha tiger's curse has already been spent.
    #[error("the curse has already been used")]
    AlreadyUsed,

    /// Phase advance attempted while the dying hunter has the floor.
    #[error("waiting for the hunter's shot")]
    WaitingForHunter,
}

impl GameError {
    /// Stable machine-readable code for the wire `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::GameAlreadyStarted => "game_already_started",
            GameError::RoomFull => "room_full",
            GameError::NotEnoughPlayers(_) => "not_enough_players",
            GameError::InvalidPhase(_) => "invalid_phase",
            GameError::NotYourTurn => "not_your_turn",
            GameError::NotAuthorized => "not_authorized",
            GameError::InvalidTarget(_) => "invalid_target",
            GameError::AlreadyUsed => "already_used",
            GameError::WaitingForHunter => "waiting_for_hunter",
        }
    }
}
