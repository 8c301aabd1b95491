//! The lobby actor: a single Tokio task that owns every room.
//!
//! All mutable state — the room registry, the connection→room index,
//! and the per-connection outbound channels — lives inside this one
//! actor. Commands from every connection funnel through its mailbox and
//! are handled one at a time, to completion, before the next is read.
//! That serialized dispatch is the sole concurrency discipline: no two
//! commands ever interleave against the same room, and the core holds
//! no locks. If both players move "at the same instant", whichever
//! command the mailbox yields first is applied and the other fails the
//! turn check — deterministic, not racy.
//!
//! Handlers never await network I/O: outbound events go into unbounded
//! per-connection channels drained by writer tasks.

use std::collections::HashMap;

use tokio::sync::mpsc;
use trigrid_protocol::{ClientCommand, ConnectionId, Mark, RoomCode, ServerEvent};
use trigrid_room::{Bindings, MoveOutcome, RematchOutcome, Room, RoomError, RoomRegistry};

/// Unicast to a rematch requester while the other vote is outstanding.
const WAITING_FOR_REMATCH: &str = "Waiting for the other player to accept the rematch.";

/// Broadcast to a room when a seat is vacated by a disconnect.
const PLAYER_LEFT: &str = "The other player left the room.";

/// Channel delivering outbound events to one connection's writer task.
pub(crate) type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands delivered to the lobby mailbox.
pub(crate) enum LobbyCommand {
    /// A connection was accepted; register its outbound channel.
    Connected {
        conn: ConnectionId,
        sender: EventSender,
    },

    /// A decoded command from a connection.
    Command {
        conn: ConnectionId,
        cmd: ClientCommand,
    },

    /// The connection's tasks ended — clean close, error, or panic.
    Disconnected { conn: ConnectionId },
}

/// Spawns the lobby actor and returns the sender half of its mailbox.
pub(crate) fn spawn_lobby(mailbox_capacity: usize) -> mpsc::Sender<LobbyCommand> {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let lobby = Lobby {
        registry: RoomRegistry::new(),
        bindings: Bindings::new(),
        senders: HashMap::new(),
        mailbox: rx,
    };
    tokio::spawn(lobby.run());
    tx
}

/// The actor state. Owned by exactly one task; nothing here is shared.
struct Lobby {
    registry: RoomRegistry,
    bindings: Bindings,
    senders: HashMap<ConnectionId, EventSender>,
    mailbox: mpsc::Receiver<LobbyCommand>,
}

impl Lobby {
    async fn run(mut self) {
        tracing::info!("lobby started");

        while let Some(cmd) = self.mailbox.recv().await {
            match cmd {
                LobbyCommand::Connected { conn, sender } => {
                    self.senders.insert(conn, sender);
                    tracing::debug!(conn = %conn, "connection registered");
                }
                LobbyCommand::Command { conn, cmd } => self.dispatch(conn, cmd),
                LobbyCommand::Disconnected { conn } => self.handle_disconnect(conn),
            }
        }

        tracing::info!("lobby stopped");
    }

    /// The closed dispatch table: every inbound command kind, matched
    /// exhaustively. Adding a command is a compile-visible change here.
    fn dispatch(&mut self, conn: ConnectionId, cmd: ClientCommand) {
        match cmd {
            ClientCommand::CreateRoom { name } => {
                self.handle_create(conn, name.as_deref());
            }
            ClientCommand::JoinRoom { room_code, name } => {
                self.handle_join(conn, &room_code, name.as_deref());
            }
            ClientCommand::MakeMove { room_code, index } => {
                self.handle_move(conn, &room_code, index);
            }
            ClientCommand::RequestRematch { room_code } => {
                self.handle_rematch(conn, &room_code);
            }
        }
    }

    fn handle_create(&mut self, conn: ConnectionId, name: Option<&str>) {
        let code = match self.registry.allocate() {
            Ok(code) => code,
            Err(e) => return self.report(conn, &e),
        };
        if let Err(e) = self.bindings.bind(conn, code.clone()) {
            return self.report(conn, &e);
        }

        let room = Room::create(conn, name);
        let snapshot = room.snapshot(&code);
        self.registry.insert(code.clone(), room);
        tracing::info!(room = %code, conn = %conn, "room created");

        self.unicast(
            conn,
            ServerEvent::RoomJoined {
                room_code: code,
                mark: Mark::X,
                state: snapshot,
            },
        );
    }

    fn handle_join(&mut self, conn: ConnectionId, raw_code: &str, name: Option<&str>) {
        let Some(code) = self.lookup(raw_code) else {
            return self.report(conn, &RoomError::NotFound(raw_code.to_string()));
        };
        if let Err(e) = self.bindings.bind(conn, code.clone()) {
            return self.report(conn, &e);
        }

        let Some(room) = self.registry.get_mut(&code) else {
            return;
        };
        if let Err(e) = room.join(conn, name) {
            // Roll the binding back; the connection holds no seat here.
            self.bindings.unbind(conn);
            return self.report(conn, &e);
        }

        let snapshot = room.snapshot(&code);
        let members: Vec<_> = room.members().collect();
        tracing::info!(room = %code, conn = %conn, "player joined");

        self.unicast(
            conn,
            ServerEvent::RoomJoined {
                room_code: code,
                mark: Mark::O,
                state: snapshot.clone(),
            },
        );
        self.broadcast(&members, ServerEvent::StateUpdate { state: snapshot });
    }

    fn handle_move(&mut self, conn: ConnectionId, raw_code: &str, index: usize) {
        let Some(code) = self.lookup(raw_code) else {
            return self.report(conn, &RoomError::NotFound(raw_code.to_string()));
        };
        let Some(room) = self.registry.get_mut(&code) else {
            return;
        };

        match room.apply_move(conn, index) {
            Ok(MoveOutcome::Applied) => {
                let snapshot = room.snapshot(&code);
                let members: Vec<_> = room.members().collect();
                self.broadcast(&members, ServerEvent::StateUpdate { state: snapshot });
            }
            Ok(MoveOutcome::Ignored) => {
                tracing::debug!(room = %code, conn = %conn, index, "move ignored");
            }
            Err(e) => self.report(conn, &e),
        }
    }

    fn handle_rematch(&mut self, conn: ConnectionId, raw_code: &str) {
        let Some(code) = self.lookup(raw_code) else {
            return self.report(conn, &RoomError::NotFound(raw_code.to_string()));
        };
        let Some(room) = self.registry.get_mut(&code) else {
            return;
        };

        match room.vote_rematch(conn) {
            RematchOutcome::Reset => {
                let snapshot = room.snapshot(&code);
                let members: Vec<_> = room.members().collect();
                tracing::info!(room = %code, "round reset");
                self.broadcast(&members, ServerEvent::RoundReset { state: snapshot });
            }
            RematchOutcome::Waiting => {
                self.unicast(
                    conn,
                    ServerEvent::ErrorMessage {
                        message: WAITING_FOR_REMATCH.to_string(),
                    },
                );
            }
            RematchOutcome::Ignored => {
                tracing::debug!(room = %code, conn = %conn, "rematch vote ignored");
            }
        }
    }

    /// Disconnect is the only cancellation signal: unbind, vacate the
    /// seat, tell the survivor, and destroy the room once deserted.
    fn handle_disconnect(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
        let Some(code) = self.bindings.unbind(conn) else {
            return;
        };
        let Some(room) = self.registry.get_mut(&code) else {
            return;
        };
        if room.clear_seat(conn).is_none() {
            return;
        }

        let snapshot = room.snapshot(&code);
        let members: Vec<_> = room.members().collect();
        let deserted = room.is_deserted();
        tracing::info!(room = %code, conn = %conn, "player left");

        self.broadcast(
            &members,
            ServerEvent::PlayerLeft {
                message: PLAYER_LEFT.to_string(),
            },
        );
        self.broadcast(&members, ServerEvent::StateUpdate { state: snapshot });

        if deserted {
            self.registry.remove(&code);
            tracing::info!(room = %code, "room destroyed");
        }
    }

    /// Parses and resolves a player-typed code. An unparseable code and
    /// an unknown one are the same "not found" to the player.
    fn lookup(&self, raw: &str) -> Option<RoomCode> {
        let code = raw.parse::<RoomCode>().ok()?;
        self.registry.contains(&code).then_some(code)
    }

    /// Unicasts the player-facing text of a rejected command.
    fn report(&self, conn: ConnectionId, error: &RoomError) {
        tracing::debug!(conn = %conn, %error, "command rejected");
        self.unicast(
            conn,
            ServerEvent::ErrorMessage {
                message: error.to_string(),
            },
        );
    }

    /// Sends one event to one connection. A missing or closed channel
    /// means the disconnect is already in flight; the event is dropped.
    fn unicast(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(event);
        }
    }

    /// Sends one event to every listed member of a room.
    fn broadcast(&self, members: &[ConnectionId], event: ServerEvent) {
        for conn in members {
            self.unicast(*conn, event.clone());
        }
    }
}
