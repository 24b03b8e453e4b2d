//! Integration tests for the room actor and registry.

use std::time::Duration;

use saming_game::{GameConfig, GameError};
use saming_protocol::{ClientCommand, Phase, PlayerId, ServerEvent, ROOM_CODE_LEN};
use saming_room::{EventSender, RoomError, RoomRegistry};
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

type Events = UnboundedReceiver<ServerEvent>;

fn channel() -> (EventSender, Events) {
    mpsc::unbounded_channel()
}

async fn recv(rx: &mut Events) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Drains events until one matches `pred`.
async fn recv_until(
    rx: &mut Events,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = recv(rx).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Registry with a host-created room and `extra` more seated players.
async fn room_with_players(
    config: GameConfig,
    extra: usize,
) -> (RoomRegistry, saming_room::RoomHandle, Vec<(PlayerId, Events)>) {
    let registry = RoomRegistry::new(config);
    let host_id = PlayerId::new();
    let (host_tx, host_rx) = channel();
    let handle = registry.create_room(host_id, "host", host_tx).await;

    let mut members = vec![(host_id, host_rx)];
    for i in 0..extra {
        let id = PlayerId::new();
        let (tx, rx) = channel();
        handle.join(id, &format!("p{i}"), tx).await.unwrap();
        members.push((id, rx));
    }
    (registry, handle, members)
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_room_delivers_room_created_to_host() {
    let registry = RoomRegistry::new(GameConfig::default());
    let (tx, mut rx) = channel();
    let handle = registry.create_room(PlayerId::new(), "host", tx).await;

    assert_eq!(handle.code().as_str().len(), ROOM_CODE_LEN);
    assert_eq!(registry.room_count().await, 1);

    let event = recv(&mut rx).await;
    let ServerEvent::RoomCreated { room } = event else {
        panic!("expected room_created, got {event:?}");
    };
    assert_eq!(room.phase, Phase::Waiting);
    assert_eq!(room.players.len(), 1);
}

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let registry = RoomRegistry::new(GameConfig::default());
    let (tx, _rx) = channel();
    let handle = registry.create_room(PlayerId::new(), "host", tx).await;

    let lower = handle.code().as_str().to_ascii_lowercase();
    let found = registry.get(&lower).await.unwrap();
    assert_eq!(found.code(), handle.code());
}

#[tokio::test]
async fn test_lookup_unknown_code_fails() {
    let registry = RoomRegistry::new(GameConfig::default());
    assert!(matches!(
        registry.get("ZZZZZ9").await,
        Err(RoomError::NotFound(_))
    ));
    assert!(matches!(
        registry.get("not a code").await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let registry = RoomRegistry::new(GameConfig::default());
    let (tx, _rx) = channel();
    let handle = registry.create_room(PlayerId::new(), "host", tx).await;

    let code = handle.code().clone();
    registry.remove(&code).await;
    registry.remove(&code).await;
    assert_eq!(registry.room_count().await, 0);
}

// =========================================================================
// Joining and leaving
// =========================================================================

#[tokio::test]
async fn test_join_notifies_everyone_with_their_own_snapshot() {
    let (_registry, _handle, mut members) =
        room_with_players(GameConfig::default(), 1).await;

    let (joiner_id, joiner_rx) = members.last_mut().map(|(id, rx)| (*id, rx)).unwrap();
    let event = recv_until(joiner_rx, |e| {
        matches!(e, ServerEvent::PlayerJoined { .. })
    })
    .await;
    let ServerEvent::PlayerJoined { player_id, room, .. } = event else {
        unreachable!()
    };
    assert_eq!(player_id, joiner_id);
    assert_eq!(room.players.len(), 2);

    let (_, host_rx) = &mut members[0];
    let event =
        recv_until(host_rx, |e| matches!(e, ServerEvent::PlayerJoined { .. }))
            .await;
    assert!(matches!(event, ServerEvent::PlayerJoined { .. }));
}

#[tokio::test]
async fn test_join_rejected_when_full() {
    let (_registry, handle, _members) =
        room_with_players(GameConfig::default(), 9).await;

    let (tx, _rx) = channel();
    let result = handle.join(PlayerId::new(), "p11", tx).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::RoomFull))
    ));
}

#[tokio::test]
async fn test_join_rejected_after_start() {
    let (_registry, handle, members) =
        room_with_players(GameConfig::default(), 4).await;

    let host_id = members[0].0;
    handle.command(host_id, ClientCommand::StartGame).await.unwrap();

    let (tx, _rx) = channel();
    let result = handle.join(PlayerId::new(), "late", tx).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::GameAlreadyStarted))
    ));
}

#[tokio::test]
async fn test_last_leave_destroys_the_room() {
    let registry = RoomRegistry::new(GameConfig::default());
    let host_id = PlayerId::new();
    let (tx, _rx) = channel();
    let handle = registry.create_room(host_id, "host", tx).await;

    let empty = handle.leave(host_id).await.unwrap();
    assert!(empty, "last player leaving should empty the room");
    registry.remove(handle.code()).await;

    // Give the actor a moment to wind down; then commands fail.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let result = handle.command(host_id, ClientCommand::StartGame).await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}

#[tokio::test]
async fn test_leave_notifies_remaining_players() {
    let (_registry, handle, mut members) =
        room_with_players(GameConfig::default(), 1).await;

    let leaver = members[1].0;
    let empty = handle.leave(leaver).await.unwrap();
    assert!(!empty);

    let (_, host_rx) = &mut members[0];
    let event =
        recv_until(host_rx, |e| matches!(e, ServerEvent::PlayerLeft { .. }))
            .await;
    let ServerEvent::PlayerLeft { player_id, room } = event else {
        unreachable!()
    };
    assert_eq!(player_id, leaver);
    assert_eq!(room.players.len(), 1);
}

// =========================================================================
// Commands and event routing
// =========================================================================

#[tokio::test]
async fn test_start_game_hands_each_seat_its_own_role() {
    let (_registry, handle, mut members) =
        room_with_players(GameConfig::default(), 4).await;

    let host_id = members[0].0;
    handle.command(host_id, ClientCommand::StartGame).await.unwrap();

    for (id, rx) in &mut members {
        let event =
            recv_until(rx, |e| matches!(e, ServerEvent::GameStarted { .. }))
                .await;
        let ServerEvent::GameStarted { room } = event else {
            unreachable!()
        };
        assert_eq!(room.phase, Phase::Day);
        assert_eq!(room.round, 1);
        for view in &room.players {
            assert_eq!(view.role.is_some(), view.id == *id);
        }
    }
}

#[tokio::test]
async fn test_rejected_command_errors_only_the_sender() {
    let (_registry, handle, mut members) =
        room_with_players(GameConfig::default(), 4).await;

    let outsider = members[1].0;
    handle.command(outsider, ClientCommand::StartGame).await.unwrap();

    let (_, outsider_rx) = &mut members[1];
    let event =
        recv_until(outsider_rx, |e| matches!(e, ServerEvent::Error { .. }))
            .await;
    let ServerEvent::Error { code, .. } = event else {
        unreachable!()
    };
    assert_eq!(code, "not_authorized");

    // The host saw nothing beyond the join traffic.
    let (_, host_rx) = &mut members[0];
    while let Ok(event) = host_rx.try_recv() {
        assert!(
            !matches!(event, ServerEvent::Error { .. }),
            "errors must never be broadcast"
        );
    }
}

#[tokio::test]
async fn test_command_from_non_member_is_ignored() {
    let (_registry, handle, mut members) =
        room_with_players(GameConfig::default(), 4).await;

    handle
        .command(PlayerId::new(), ClientCommand::StartGame)
        .await
        .unwrap();

    // Probe with a chat afterwards: the only thing the host receives past
    // the join traffic is the chat, not a game start.
    let host_id = members[0].0;
    handle
        .command(
            host_id,
            ClientCommand::ChatMessage {
                content: "still waiting".into(),
            },
        )
        .await
        .unwrap();

    let (_, host_rx) = &mut members[0];
    let event = recv_until(host_rx, |e| {
        matches!(
            e,
            ServerEvent::ChatMessage { .. } | ServerEvent::GameStarted { .. }
        )
    })
    .await;
    assert!(matches!(event, ServerEvent::ChatMessage { .. }));
}

#[tokio::test]
async fn test_chat_is_relayed_to_everyone() {
    let (_registry, handle, mut members) =
        room_with_players(GameConfig::default(), 1).await;

    let speaker = members[1].0;
    handle
        .command(
            speaker,
            ClientCommand::ChatMessage {
                content: "sawasdee".into(),
            },
        )
        .await
        .unwrap();

    for (_, rx) in &mut members {
        let event =
            recv_until(rx, |e| matches!(e, ServerEvent::ChatMessage { .. }))
                .await;
        let ServerEvent::ChatMessage {
            player_id, content, ..
        } = event
        else {
            unreachable!()
        };
        assert_eq!(player_id, speaker);
        assert_eq!(content, "sawasdee");
    }
}

// =========================================================================
// Phase timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_day_timer_advances_to_voting() {
    let config = GameConfig {
        day_secs: 1,
        voting_secs: 600,
        ..GameConfig::default()
    };
    let (_registry, handle, mut members) = room_with_players(config, 4).await;

    let host_id = members[0].0;
    handle.command(host_id, ClientCommand::StartGame).await.unwrap();

    // No skip, no input: the day deadline alone must open the vote.
    let (_, host_rx) = &mut members[0];
    let event = recv_until(host_rx, |e| {
        matches!(
            e,
            ServerEvent::PhaseChanged { room, .. } if room.phase == Phase::Voting
        )
    })
    .await;
    let ServerEvent::PhaseChanged { room, .. } = event else {
        unreachable!()
    };
    assert_eq!(room.round, 1);
}

#[tokio::test(start_paused = true)]
async fn test_skipped_phase_outruns_its_timer() {
    let config = GameConfig {
        day_secs: 600,
        voting_secs: 600,
        ..GameConfig::default()
    };
    let (_registry, handle, mut members) = room_with_players(config, 4).await;

    let host_id = members[0].0;
    handle.command(host_id, ClientCommand::StartGame).await.unwrap();
    handle.command(host_id, ClientCommand::SkipPhase).await.unwrap();

    let (_, host_rx) = &mut members[0];
    let event = recv_until(host_rx, |e| {
        matches!(e, ServerEvent::PhaseChanged { room, .. } if room.phase == Phase::Voting)
    })
    .await;
    let ServerEvent::PhaseChanged { room, .. } = event else {
        unreachable!()
    };
    // The voting deadline is fresh, not inherited from the skipped day.
    assert!(room.phase_end_time.is_some());
}

#[tokio::test]
async fn test_info_reports_membership() {
    let (_registry, handle, members) =
        room_with_players(GameConfig::default(), 2).await;

    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.player_count, 3);
    assert_eq!(info.connected, 3);
    assert_eq!(members.len(), 3);
}
