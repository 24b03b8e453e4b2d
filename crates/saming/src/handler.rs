//! Per-connection handler: hello exchange, lobby routing, and pumps.
//!
//! Each accepted socket gets one handler task. The flow is:
//!
//!   1. Upgrade to websocket, wait for `hello {username}`.
//!   2. Issue a [`PlayerId`], answer with `welcome`.
//!   3. Split the socket: a write pump drains the player's event channel,
//!      the read loop routes commands — lobby commands here, game
//!      commands into the player's room actor.
//!   4. On disconnect, leave the room; the game itself keeps running for
//!      the players still connected.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use saming_protocol::{
    ClientCommand, Codec, JsonCodec, PlayerId, ServerEvent,
};
use saming_room::RoomHandle;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::server::ServerState;
use crate::ServerError;

/// How long a client gets to say hello.
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let codec = JsonCodec;
    let (mut sink, mut inbound) = ws.split();

    // --- Step 1: hello ---
    let username = match await_hello(&mut inbound, &codec).await {
        Ok(name) => name,
        Err(e) => {
            let _ = send_now(
                &mut sink,
                &codec,
                &ServerEvent::Error {
                    code: "bad_hello".into(),
                    message: e.to_string(),
                },
            )
            .await;
            return Err(e);
        }
    };

    let player_id = PlayerId::new();
    send_now(
        &mut sink,
        &codec,
        &ServerEvent::Welcome { player_id },
    )
    .await?;
    tracing::info!(player = %player_id, username = %username, "player connected");

    // --- Step 2: write pump ---
    // All outbound traffic from here on goes through the event channel,
    // which is also what the room actor fans out into.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let pump = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match codec.encode(&event) {
                Ok(bytes) => {
                    if sink.send(Message::Binary(bytes.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                }
            }
        }
        let _ = sink.close().await;
    });

    // --- Step 3: read loop ---
    let mut room: Option<RoomHandle> = None;
    while let Some(frame) = inbound.next().await {
        let data = match frame {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong
            Err(e) => {
                tracing::debug!(player = %player_id, error = %e, "recv error");
                break;
            }
        };

        let command: ClientCommand = match codec.decode(&data) {
            Ok(cmd) => cmd,
            Err(e) => {
                // Malformed or unknown frames are answered, not fatal.
                tracing::debug!(player = %player_id, error = %e, "bad frame");
                send_error(&event_tx, "bad_request", "unrecognized message");
                continue;
            }
        };

        handle_command(&state, &event_tx, &mut room, player_id, &username, command)
            .await;
    }

    // --- Step 4: disconnect ---
    leave_room(&state, &mut room, player_id).await;
    tracing::info!(player = %player_id, "player disconnected");
    drop(event_tx);
    let _ = pump.await;
    Ok(())
}

/// Routes one decoded command: lobby traffic is handled here, everything
/// else goes to the player's current room.
async fn handle_command(
    state: &Arc<ServerState>,
    event_tx: &mpsc::UnboundedSender<ServerEvent>,
    room: &mut Option<RoomHandle>,
    player_id: PlayerId,
    username: &str,
    command: ClientCommand,
) {
    match command {
        ClientCommand::Hello { .. } => {
            send_error(event_tx, "unexpected_command", "already greeted");
        }

        ClientCommand::CreateRoom => {
            if room.is_some() {
                send_error(event_tx, "already_in_room", "leave your room first");
                return;
            }
            let handle = state
                .registry
                .create_room(player_id, username, event_tx.clone())
                .await;
            *room = Some(handle);
        }

        ClientCommand::JoinRoom { code } => {
            if room.is_some() {
                send_error(event_tx, "already_in_room", "leave your room first");
                return;
            }
            match state.registry.get(&code).await {
                Ok(handle) => {
                    match handle.join(player_id, username, event_tx.clone()).await
                    {
                        Ok(()) => *room = Some(handle),
                        Err(e) => send_error(event_tx, e.code(), &e.to_string()),
                    }
                }
                Err(e) => send_error(event_tx, e.code(), &e.to_string()),
            }
        }

        ClientCommand::LeaveRoom => {
            if room.is_none() {
                send_error(event_tx, "not_in_room", "you are not in a room");
                return;
            }
            leave_room(state, room, player_id).await;
        }

        // Game commands need a room to land in.
        other => match room {
            Some(handle) => {
                if handle.command(player_id, other).await.is_err() {
                    // The actor is gone (room destroyed under us).
                    *room = None;
                    send_error(event_tx, "room_unavailable", "the room is gone");
                }
            }
            None => send_error(event_tx, "not_in_room", "join a room first"),
        },
    }
}

/// Leaves the current room, removing it from the registry if this was the
/// last connection.
async fn leave_room(
    state: &Arc<ServerState>,
    room: &mut Option<RoomHandle>,
    player_id: PlayerId,
) {
    if let Some(handle) = room.take() {
        if let Ok(true) = handle.leave(player_id).await {
            state.registry.remove(handle.code()).await;
        }
    }
}

/// Waits for the opening `hello` and returns the username.
async fn await_hello(
    inbound: &mut (impl Stream<
        Item = Result<Message, tokio_tungstenite::tungstenite::Error>,
    > + Unpin),
    codec: &JsonCodec,
) -> Result<String, ServerError> {
    let deadline = tokio::time::sleep(HELLO_TIMEOUT);
    tokio::pin!(deadline);

    loop {
        let frame = tokio::select! {
            frame = inbound.next() => frame,
            _ = &mut deadline => {
                return Err(ServerError::Handshake("hello timed out"));
            }
        };

        let data = match frame {
            Some(Ok(Message::Binary(data))) => data.to_vec(),
            Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
            Some(Ok(Message::Close(_))) | None => {
                return Err(ServerError::Handshake("closed before hello"));
            }
            Some(Ok(_)) => continue,
            Some(Err(_)) => {
                return Err(ServerError::Handshake("recv failed before hello"));
            }
        };

        return match codec.decode::<ClientCommand>(&data) {
            Ok(ClientCommand::Hello { username })
                if !username.trim().is_empty() =>
            {
                Ok(username.trim().to_string())
            }
            Ok(ClientCommand::Hello { .. }) => {
                Err(ServerError::Handshake("username must not be empty"))
            }
            Ok(_) => Err(ServerError::Handshake("first message must be hello")),
            Err(_) => Err(ServerError::Handshake("malformed hello")),
        };
    }
}

/// Sends one event directly on the sink (pre-pump).
async fn send_now(
    sink: &mut WsSink,
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), ServerError> {
    let bytes = codec.encode(event)?;
    sink.send(Message::Binary(bytes.into())).await?;
    Ok(())
}

/// Queues a direct `error` event for the write pump.
fn send_error(
    event_tx: &mpsc::UnboundedSender<ServerEvent>,
    code: &str,
    message: &str,
) {
    let _ = event_tx.send(ServerEvent::Error {
        code: code.to_string(),
        message: message.to_string(),
    });
}
