//! Connection registry
//!
//! Tracks every open WebSocket connection together with the session identity
//! it claimed on `join`. Each connection owns an unbounded outbound queue
//! drained by its own writer task, so pushing to one never waits on another.

use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use tokio::sync::mpsc;

pub type ConnectionId = u64;
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub session_id: SessionId,
    pub role: Role,
}

#[derive(Debug)]
struct Connection {
    tx: Outbound,
    identity: Option<Identity>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: ConnectionId,
    connections: HashMap<ConnectionId, Connection>,
    by_session: HashMap<SessionId, ConnectionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new, not yet joined connection
    pub fn register(&mut self, tx: Outbound) -> ConnectionId {
        self.next_id += 1;
        let id = self.next_id;
        self.connections.insert(id, Connection { tx, identity: None });
        id
    }

    /// Attach a session identity to a connection.
    ///
    /// A session can only be bound to one connection at a time; an older
    /// connection for the same session loses its identity and is returned.
    pub fn bind(
        &mut self,
        conn: ConnectionId,
        session_id: &str,
        role: Role,
    ) -> Option<ConnectionId> {
        let connection = self.connections.get_mut(&conn)?;
        if let Some(previous) = connection.identity.take() {
            if self.by_session.get(&previous.session_id) == Some(&conn) {
                self.by_session.remove(&previous.session_id);
            }
        }
        connection.identity = Some(Identity {
            session_id: session_id.to_string(),
            role,
        });

        let displaced = self
            .by_session
            .insert(session_id.to_string(), conn)
            .filter(|old| *old != conn);
        if let Some(old) = displaced {
            if let Some(old_conn) = self.connections.get_mut(&old) {
                old_conn.identity = None;
            }
        }
        displaced
    }

    pub fn identity(&self, conn: ConnectionId) -> Option<&Identity> {
        self.connections.get(&conn)?.identity.as_ref()
    }

    pub fn sender(&self, conn: ConnectionId) -> Option<&Outbound> {
        self.connections.get(&conn).map(|c| &c.tx)
    }

    pub fn sender_for_session(&self, session_id: &str) -> Option<&Outbound> {
        let conn = self.by_session.get(session_id)?;
        self.sender(*conn)
    }

    /// Forget a closed connection. Returns its identity only if the
    /// connection still owned that session.
    pub fn unregister(&mut self, conn: ConnectionId) -> Option<Identity> {
        let identity = self.connections.remove(&conn)?.identity?;
        if self.by_session.get(&identity.session_id) == Some(&conn) {
            self.by_session.remove(&identity.session_id);
            Some(identity)
        } else {
            None
        }
    }

    /// Detach a session from its connection, returning the sender so the
    /// caller can notify it. The connection itself stays registered until it
    /// closes.
    pub fn evict_session(&mut self, session_id: &str) -> Option<Outbound> {
        let conn = self.by_session.remove(session_id)?;
        let connection = self.connections.get_mut(&conn)?;
        connection.identity = None;
        Some(connection.tx.clone())
    }

    /// Senders of every joined connection with the role it joined as
    pub fn viewers(&self) -> impl Iterator<Item = (Role, &Outbound)> + '_ {
        self.connections
            .values()
            .filter_map(|c| c.identity.as_ref().map(|id| (id.role, &c.tx)))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
