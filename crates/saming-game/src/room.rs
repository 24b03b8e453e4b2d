//! The per-room phase state machine.
//!
//! `Room` is the authoritative state plus every controller operation the
//! transport can invoke. Operations are synchronous and non-suspending:
//! they validate, mutate, and return the outbound events to deliver —
//! ordering within the returned list is the delivery order. The room
//! actor provides the mutual exclusion and the timers; nothing in here
//! blocks.

use std::collections::{BTreeMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use saming_protocol::{
    NightSummary, Phase, PlayerId, Recipient, Role, RoomCode, ServerEvent, Team,
};

use crate::night::{self, NightIntents};
use crate::{assign, end, view, vote, GameConfig, GameError, Player};

/// One routed outbound event.
pub type Outbound = (Recipient, ServerEvent);

/// Identifies the phase a timer was armed for.
///
/// A timer fire is honored only while the room is still in the exact
/// `(phase, round)` the timer was armed in; a host skip moves the room on
/// and strands the old ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTicket {
    pub phase: Phase,
    pub round: u32,
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A game room: seats, phase, and all pending night/vote state.
pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) host_id: PlayerId,
    /// Seats in join order; that order is the fixed enumeration used when
    /// dealing roles.
    pub(crate) players: Vec<Player>,
    pub(crate) phase: Phase,
    pub(crate) round: u32,
    pub(crate) created_at: u64,
    pub(crate) started_at: Option<u64>,
    /// Absolute phase deadline in unix millis; `None` for untimed phases.
    pub(crate) phase_end_time: Option<u64>,
    pub(crate) config: GameConfig,
    pub(crate) intents: NightIntents,
    pub(crate) current_night_role: Option<Role>,
    pub(crate) night_order: Vec<Role>,
    pub(crate) night_completed: HashSet<PlayerId>,
    pub(crate) vote_results: BTreeMap<PlayerId, u32>,
    pub(crate) killed_tonight: Option<PlayerId>,
    pub(crate) waiting_hunter_shoot: bool,
    pub(crate) dead_hunter: Option<PlayerId>,
    pub(crate) winning_team: Option<Team>,
    /// Night summary held back while the dying hunter has the floor, so
    /// the deferred `phase_changed` can still carry it.
    pub(crate) pending_night: Option<NightSummary>,
}

impl Room {
    /// Creates a room in `Waiting` with the host seated.
    pub fn new(
        code: RoomCode,
        host_id: PlayerId,
        host_name: &str,
        config: GameConfig,
    ) -> Self {
        let now = unix_millis();
        Self {
            code,
            host_id,
            players: vec![Player::new(host_id, host_name, now)],
            phase: Phase::Waiting,
            round: 0,
            created_at: now,
            started_at: None,
            phase_end_time: None,
            config: config.validated(),
            intents: NightIntents::default(),
            current_night_role: None,
            night_order: Vec::new(),
            night_completed: HashSet::new(),
            vote_results: BTreeMap::new(),
            killed_tonight: None,
            waiting_hunter_shoot: false,
            dead_hunter: None,
            winning_team: None,
            pending_night: None,
        }
    }

    // -- accessors -----------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn current_night_role(&self) -> Option<Role> {
        self.current_night_role
    }

    pub fn vote_results(&self) -> &BTreeMap<PlayerId, u32> {
        &self.vote_results
    }

    pub fn waiting_hunter_shoot(&self) -> bool {
        self.waiting_hunter_shoot
    }

    /// Seats whose night table has already acted (or skipped) tonight.
    pub fn night_actions_completed(&self) -> &HashSet<PlayerId> {
        &self.night_completed
    }

    pub fn winning_team(&self) -> Option<Team> {
        self.winning_team
    }

    /// The ticket a timer for the current phase must carry, if the
    /// current phase is timed.
    pub fn timer_ticket(&self) -> Option<PhaseTicket> {
        self.phase_end_time.map(|_| PhaseTicket {
            phase: self.phase,
            round: self.round,
        })
    }

    /// Absolute deadline of the current phase in unix millis.
    pub fn phase_end_time(&self) -> Option<u64> {
        self.phase_end_time
    }

    /// Time left until the current phase's deadline.
    pub fn phase_remaining(&self) -> Option<std::time::Duration> {
        self.phase_end_time.map(|end| {
            std::time::Duration::from_millis(end.saturating_sub(unix_millis()))
        })
    }

    /// `viewer`'s sanitized snapshot. See [`view::snapshot_for`].
    pub fn snapshot_for(&self, viewer: PlayerId) -> saming_protocol::RoomSnapshot {
        view::snapshot_for(self, viewer)
    }

    fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    fn set_timer(&mut self, secs: u64) {
        self.phase_end_time = Some(unix_millis() + secs * 1000);
    }

    /// One `Player`-scoped event per seat, each built from that seat's
    /// own snapshot. Every event that carries a snapshot goes through
    /// here; there is no broadcast path for snapshots.
    fn fanout(
        &self,
        make: impl Fn(saming_protocol::RoomSnapshot) -> ServerEvent,
    ) -> Vec<Outbound> {
        self.players
            .iter()
            .map(|p| {
                (
                    Recipient::Player(p.id),
                    make(view::snapshot_for(self, p.id)),
                )
            })
            .collect()
    }

    // -- lobby ---------------------------------------------------------

    /// Seats a new player. Only legal in `Waiting`.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        username: &str,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull);
        }
        if self.index_of(player_id).is_some() {
            return Err(GameError::InvalidTarget("already seated in this room"));
        }

        self.players
            .push(Player::new(player_id, username, unix_millis()));
        tracing::info!(
            room = %self.code,
            player = %player_id,
            players = self.players.len(),
            "player joined"
        );
        Ok(self.fanout(|room| ServerEvent::PlayerJoined {
            player_id,
            username: username.to_string(),
            room,
        }))
    }

    /// Handles a departure. In `Waiting` the seat is removed (with a host
    /// handoff if needed); after start the seat stays in the game and
    /// only the connection is gone — absence of input is not an error.
    pub fn leave(&mut self, player_id: PlayerId) -> Vec<Outbound> {
        let Some(idx) = self.index_of(player_id) else {
            return Vec::new();
        };

        if self.phase == Phase::Waiting {
            self.players.remove(idx);
            if self.host_id == player_id {
                if let Some(next_host) = self.players.first() {
                    self.host_id = next_host.id;
                    tracing::info!(
                        room = %self.code,
                        host = %self.host_id,
                        "host handed off"
                    );
                }
            }
        }

        tracing::info!(room = %self.code, player = %player_id, "player left");
        self.fanout(|room| ServerEvent::PlayerLeft { player_id, room })
    }

    /// Relays chat verbatim. Any phase, never arbitrated.
    pub fn chat(&self, sender: PlayerId, content: String) -> Vec<Outbound> {
        match self.player(sender) {
            Some(p) => vec![(
                Recipient::All,
                ServerEvent::ChatMessage {
                    player_id: sender,
                    username: p.username.clone(),
                    content,
                },
            )],
            None => Vec::new(),
        }
    }

    // -- game lifecycle ------------------------------------------------

    /// Host only: deal roles and enter the first day.
    pub fn start_game(
        &mut self,
        requester: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if requester != self.host_id {
            return Err(GameError::NotAuthorized);
        }
        if self.phase != Phase::Waiting {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers(self.config.min_players));
        }

        assign::assign_roles(&mut self.players, &mut rand::rng())?;
        self.started_at = Some(unix_millis());
        self.phase = Phase::Day;
        self.round = 1;
        self.set_timer(self.config.day_secs);

        tracing::info!(
            room = %self.code,
            players = self.players.len(),
            "game started"
        );
        Ok(self.fanout(|room| ServerEvent::GameStarted { room }))
    }

    /// Host only: end the current timed phase now.
    pub fn skip_phase(
        &mut self,
        requester: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if requester != self.host_id {
            return Err(GameError::NotAuthorized);
        }
        if self.waiting_hunter_shoot {
            return Err(GameError::WaitingForHunter);
        }
        if matches!(self.phase, Phase::Waiting | Phase::Ended) {
            return Err(GameError::InvalidPhase(self.phase));
        }

        self.phase_end_time = None;
        Ok(self.advance_phase())
    }

    /// A phase timer fired. Honored only while the ticket still matches
    /// the room's `(phase, round)`; late fires after a skip are dropped.
    pub fn timer_fired(&mut self, ticket: PhaseTicket) -> Vec<Outbound> {
        if self.timer_ticket() != Some(ticket) {
            tracing::debug!(room = %self.code, ?ticket, "stale timer ignored");
            return Vec::new();
        }
        self.phase_end_time = None;
        self.advance_phase()
    }

    fn advance_phase(&mut self) -> Vec<Outbound> {
        match self.phase {
            Phase::Day => self.enter_voting(),
            Phase::Voting => self.finalize_votes(),
            Phase::Night => self.resolve_night(),
            Phase::Waiting | Phase::Ended => Vec::new(),
        }
    }

    fn enter_voting(&mut self) -> Vec<Outbound> {
        self.phase = Phase::Voting;
        self.set_timer(self.config.voting_secs);
        self.vote_results.clear();
        for p in &mut self.players {
            p.voted_for = None;
        }
        tracing::info!(room = %self.code, round = self.round, "voting opens");
        self.fanout(|room| ServerEvent::PhaseChanged { room, night: None })
    }

    fn enter_night(&mut self) -> Vec<Outbound> {
        self.phase = Phase::Night;
        self.phase_end_time = None;
        self.reset_night_state();

        // Tables with no living holder are skipped outright. At least one
        // tiger is alive here, or the end check would have fired.
        let order: Vec<Role> = self
            .config
            .night_order
            .iter()
            .copied()
            .filter(|role| {
                self.players.iter().any(|p| p.alive && p.role == Some(*role))
            })
            .collect();
        self.night_order = order;
        self.current_night_role = self.night_order.first().copied();

        tracing::info!(
            room = %self.code,
            round = self.round,
            order = ?self.night_order,
            "night falls"
        );
        let mut events =
            self.fanout(|room| ServerEvent::PhaseChanged { room, night: None });
        if let Some(role) = self.current_night_role {
            events.push((Recipient::All, ServerEvent::NightRoleChange { role }));
        }
        events
    }

    fn enter_day(&mut self) -> Vec<Outbound> {
        self.phase = Phase::Day;
        self.round += 1;
        self.set_timer(self.config.day_secs);
        self.current_night_role = None;
        let night = self.pending_night.take();

        tracing::info!(room = %self.code, round = self.round, "day breaks");
        self.fanout(|room| ServerEvent::PhaseChanged {
            room,
            night: night.clone(),
        })
    }

    fn reset_night_state(&mut self) {
        self.intents = NightIntents::default();
        self.night_completed.clear();
        self.night_order.clear();
        self.killed_tonight = None;
        self.pending_night = None;
        for p in &mut self.players {
            p.has_acted_tonight = false;
        }
    }

    fn finish(&mut self, team: Team) -> Vec<Outbound> {
        self.phase = Phase::Ended;
        self.winning_team = Some(team);
        self.phase_end_time = None;
        self.current_night_role = None;
        self.waiting_hunter_shoot = false;
        self.dead_hunter = None;

        tracing::info!(room = %self.code, winner = %team, "game over");
        self.fanout(move |room| ServerEvent::GameEnded {
            winning_team: team,
            room,
        })
    }

    // -- night ---------------------------------------------------------

    /// The acting role submits its target.
    pub fn night_action(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Night {
            return Err(GameError::InvalidPhase(self.phase));
        }
        let current = self.current_night_role.ok_or(GameError::NotYourTurn)?;
        let actor_idx = self.index_of(actor).ok_or(GameError::NotYourTurn)?;
        {
            let a = &self.players[actor_idx];
            if !a.alive || a.role != Some(current) {
                return Err(GameError::NotYourTurn);
            }
        }
        match self.player(target) {
            None => return Err(GameError::InvalidTarget("unknown player id")),
            Some(t) if !t.alive => {
                return Err(GameError::InvalidTarget("target must be alive"))
            }
            Some(_) => {}
        }

        match current {
            Role::Hunter => {
                if self.players[actor_idx].last_protected == Some(target) {
                    return Err(GameError::InvalidTarget(
                        "cannot protect the same player two nights running",
                    ));
                }
                self.intents.hunter_protection = Some(target);
                self.players[actor_idx].last_protected = Some(target);
            }
            Role::Tiger | Role::AlphaTiger => {
                self.intents.tiger_target = Some(target);
            }
            Role::Shaman => {
                self.intents.shaman_vision = Some(target);
            }
            // Villagers never appear in the night order.
            Role::Villager => return Err(GameError::NotYourTurn),
        }

        tracing::debug!(
            room = %self.code,
            player = %actor,
            role = %current,
            "night action recorded"
        );
        Ok(self.complete_current(actor_idx))
    }

    /// The alpha tiger spends its one-shot curse. The mark is permanent
    /// and makes the target read as a tiger to the shaman. Cursing does
    /// not end the alpha's turn — it may still submit a kill target, or
    /// skip.
    pub fn curse_action(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Night {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.current_night_role != Some(Role::AlphaTiger) {
            return Err(GameError::NotYourTurn);
        }
        let actor_idx = self.index_of(actor).ok_or(GameError::NotYourTurn)?;
        {
            let a = &self.players[actor_idx];
            if !a.alive || !a.is(Role::AlphaTiger) {
                return Err(GameError::NotYourTurn);
            }
            if a.has_used_curse {
                return Err(GameError::AlreadyUsed);
            }
        }
        let target_idx = self
            .index_of(target)
            .ok_or(GameError::InvalidTarget("unknown player id"))?;
        if !self.players[target_idx].alive {
            return Err(GameError::InvalidTarget("target must be alive"));
        }

        self.players[target_idx].cursed = true;
        self.players[actor_idx].has_used_curse = true;
        self.intents.cursed_player = Some(target);

        tracing::debug!(room = %self.code, target = %target, "curse placed");
        Ok(Vec::new())
    }

    /// The acting role declines to use its power tonight.
    pub fn skip_action(
        &mut self,
        actor: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Night {
            return Err(GameError::InvalidPhase(self.phase));
        }
        let current = self.current_night_role.ok_or(GameError::NotYourTurn)?;
        let actor_idx = self.index_of(actor).ok_or(GameError::NotYourTurn)?;
        {
            let a = &self.players[actor_idx];
            if !a.alive || a.role != Some(current) {
                return Err(GameError::NotYourTurn);
            }
        }
        tracing::debug!(room = %self.code, player = %actor, "night action skipped");
        Ok(self.complete_current(actor_idx))
    }

    /// Marks the acting seat done and moves to the next table; when the
    /// last table finishes, the night resolves.
    fn complete_current(&mut self, actor_idx: usize) -> Vec<Outbound> {
        let actor_id = self.players[actor_idx].id;
        self.night_completed.insert(actor_id);
        self.players[actor_idx].has_acted_tonight = true;

        let Some(current) = self.current_night_role else {
            return Vec::new();
        };
        let next = self
            .night_order
            .iter()
            .position(|r| *r == current)
            .and_then(|i| self.night_order.get(i + 1))
            .copied();
        self.current_night_role = next;

        match next {
            Some(role) => {
                vec![(Recipient::All, ServerEvent::NightRoleChange { role })]
            }
            None => self.resolve_night(),
        }
    }

    fn resolve_night(&mut self) -> Vec<Outbound> {
        let result = night::resolve(&self.players, &self.intents);
        self.current_night_role = None;
        self.intents = NightIntents::default();

        let mut events = Vec::new();

        if let Some(victim_id) = result.killed {
            if let Some(idx) = self.index_of(victim_id) {
                self.players[idx].alive = false;
                self.killed_tonight = Some(victim_id);
                events.push((
                    Recipient::All,
                    ServerEvent::PlayerDied {
                        player_id: victim_id,
                        username: self.players[idx].username.clone(),
                    },
                ));
            }
        }

        if let Some(vision) = &result.vision {
            if let Some(shaman) =
                self.players.iter().find(|p| p.is(Role::Shaman))
            {
                events.push((
                    Recipient::Player(shaman.id),
                    ServerEvent::VisionResult {
                        target_id: vision.target_id,
                        username: vision.username.clone(),
                        result: vision.reading,
                    },
                ));
            }
        }

        tracing::info!(
            room = %self.code,
            killed = ?result.killed,
            protected = result.protected,
            shaman_saved = result.shaman_saved,
            "night resolved"
        );

        let summary = result.summary();

        // A hunter killed at night takes the retaliation shot before the
        // day can begin.
        if let Some(victim_id) = result.killed {
            let shoots = self
                .player(victim_id)
                .is_some_and(|p| p.is(Role::Hunter) && p.can_shoot);
            if shoots {
                self.waiting_hunter_shoot = true;
                self.dead_hunter = Some(victim_id);
                self.pending_night = Some(summary);
                events.push((
                    Recipient::Player(victim_id),
                    ServerEvent::HunterShoot {
                        hunter_id: victim_id,
                    },
                ));
                return events;
            }
        }

        if let Some(team) = end::winner(&self.players) {
            events.extend(self.finish(team));
            return events;
        }

        self.pending_night = Some(summary);
        events.extend(self.enter_day());
        events
    }

    // -- voting --------------------------------------------------------

    /// Casts or replaces a vote and publishes the live tally.
    pub fn vote(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Voting {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.waiting_hunter_shoot {
            return Err(GameError::WaitingForHunter);
        }
        let actor_idx = self.index_of(actor).ok_or(GameError::NotAuthorized)?;
        if !self.players[actor_idx].alive {
            return Err(GameError::NotAuthorized);
        }
        match self.player(target) {
            None => return Err(GameError::InvalidTarget("unknown player id")),
            Some(t) if !t.alive => {
                return Err(GameError::InvalidTarget("target must be alive"))
            }
            Some(_) => {}
        }

        if let Some(prev) = self.players[actor_idx].voted_for.take() {
            if let Some(count) = self.vote_results.get_mut(&prev) {
                *count -= 1;
                if *count == 0 {
                    self.vote_results.remove(&prev);
                }
            }
        }
        *self.vote_results.entry(target).or_insert(0) += 1;
        self.players[actor_idx].voted_for = Some(target);

        let votes = self
            .players
            .iter()
            .filter_map(|p| p.voted_for.map(|t| (p.id, t)))
            .collect();
        Ok(vec![(
            Recipient::All,
            ServerEvent::VoteUpdate {
                vote_results: self.vote_results.clone(),
                votes,
            },
        )])
    }

    fn finalize_votes(&mut self) -> Vec<Outbound> {
        let tallies = self.vote_results.clone();
        let eliminated = vote::leader(&tallies);

        let mut events = vec![(
            Recipient::All,
            ServerEvent::VoteResult {
                eliminated,
                vote_results: tallies,
            },
        )];

        self.vote_results.clear();
        for p in &mut self.players {
            p.voted_for = None;
        }

        if let Some(victim_id) = eliminated {
            if let Some(idx) = self.index_of(victim_id) {
                self.players[idx].alive = false;
                events.push((
                    Recipient::All,
                    ServerEvent::PlayerDied {
                        player_id: victim_id,
                        username: self.players[idx].username.clone(),
                    },
                ));
                tracing::info!(
                    room = %self.code,
                    player = %victim_id,
                    "eliminated by vote"
                );

                if self.players[idx].is(Role::Hunter)
                    && self.players[idx].can_shoot
                {
                    self.waiting_hunter_shoot = true;
                    self.dead_hunter = Some(victim_id);
                    self.phase_end_time = None;
                    events.push((
                        Recipient::Player(victim_id),
                        ServerEvent::HunterShoot {
                            hunter_id: victim_id,
                        },
                    ));
                    return events;
                }
            }
        } else {
            tracing::info!(room = %self.code, "vote tied or empty, nobody eliminated");
        }

        if let Some(team) = end::winner(&self.players) {
            events.extend(self.finish(team));
            return events;
        }

        events.extend(self.enter_night());
        events
    }

    // -- hunter retaliation --------------------------------------------

    /// The dying hunter's shot. Clears the pause and resumes whichever
    /// transition was deferred.
    pub fn hunter_shoot(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<Outbound>, GameError> {
        if !self.waiting_hunter_shoot {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.dead_hunter != Some(actor) {
            return Err(GameError::NotAuthorized);
        }
        let target_idx = self
            .index_of(target)
            .ok_or(GameError::InvalidTarget("unknown player id"))?;
        if !self.players[target_idx].alive {
            return Err(GameError::InvalidTarget("target must be alive"));
        }

        self.players[target_idx].alive = false;
        let username = self.players[target_idx].username.clone();
        if let Some(idx) = self.index_of(actor) {
            self.players[idx].can_shoot = false;
        }
        self.waiting_hunter_shoot = false;
        self.dead_hunter = None;

        tracing::info!(
            room = %self.code,
            hunter = %actor,
            victim = %target,
            "hunter retaliation"
        );

        let mut events = vec![(
            Recipient::All,
            ServerEvent::PlayerDied {
                player_id: target,
                username,
            },
        )];

        if let Some(team) = end::winner(&self.players) {
            events.extend(self.finish(team));
            return Ok(events);
        }

        // Resume the deferred transition: a night death pauses before the
        // day, a lynch pauses before the night.
        match self.phase {
            Phase::Night => events.extend(self.enter_day()),
            Phase::Voting => events.extend(self.enter_night()),
            _ => {}
        }
        Ok(events)
    }
}
