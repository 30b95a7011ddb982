// server/src/actors/connection_registry.rs
use actix::{Actor, Context, Handler, Message, MessageResult, Recipient};
use dashmap::DashMap;
use uuid::Uuid;

/// Command delivered to a registered socket actor
#[derive(Debug, Clone, PartialEq, Eq, Message)]
#[rtype(result = "()")]
pub enum SocketCommand {
    /// Push a serialized payload out the socket
    Deliver(String),
    /// Close: the connection was replaced by a newer one for the same user
    Evict,
}

/// Actor message: register a socket as the user's single live connection
#[derive(Message)]
#[rtype(result = "()")]
pub struct Register {
    pub user_id: Uuid,
    pub conn_id: Uuid,
    pub socket: Recipient<SocketCommand>,
}

/// Actor message: drop a registration. Guarded by connection id so a stale
/// close event from a replaced socket cannot remove its successor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Unregister {
    pub user_id: Uuid,
    pub conn_id: Uuid,
}

/// Actor message: best-effort push to the user's registered socket
#[derive(Message)]
#[rtype(result = "()")]
pub struct Push {
    pub user_id: Uuid,
    pub payload: String,
}

/// Actor message: count an inbound frame dropped by the tolerance policy
#[derive(Message)]
#[rtype(result = "()")]
pub struct RecordIgnoredMessage;

/// Actor message: read the registry counters
#[derive(Message)]
#[rtype(result = "RegistryMetrics")]
pub struct GetRegistryMetrics;

/// Registry counters: the observability hook for traffic the push protocol
/// drops without an error reply
#[derive(Debug, Clone, Default)]
pub struct RegistryMetrics {
    pub active_connections: usize,
    pub evicted_connections: u64,
    pub dropped_pushes: u64,
    pub ignored_messages: u64,
}

// Live connection entry
struct ConnectionData {
    conn_id: Uuid,
    socket: Recipient<SocketCommand>,
}

/// Actor owning the user id to live socket mapping. All mutation serializes
/// through this mailbox; callers never touch the map directly.
pub struct ConnectionRegistryActor {
    connections: DashMap<Uuid, ConnectionData>,
    metrics: RegistryMetrics,
}

impl ConnectionRegistryActor {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            metrics: RegistryMetrics::default(),
        }
    }
}

impl Default for ConnectionRegistryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for ConnectionRegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("ConnectionRegistryActor started");
    }
}

impl Handler<Register> for ConnectionRegistryActor {
    type Result = ();

    fn handle(&mut self, msg: Register, _ctx: &mut Self::Context) -> Self::Result {
        let replaced = self.connections.insert(
            msg.user_id,
            ConnectionData {
                conn_id: msg.conn_id,
                socket: msg.socket,
            },
        );

        // Single-active-connection policy: last connection wins, the
        // previous socket is closed rather than orphaned
        if let Some(old) = replaced {
            old.socket.do_send(SocketCommand::Evict);
            self.metrics.evicted_connections += 1;
            tracing::info!("Replaced live connection for user: {}", msg.user_id);
        } else {
            tracing::info!("Registered connection for user: {}", msg.user_id);
        }
    }
}

impl Handler<Unregister> for ConnectionRegistryActor {
    type Result = ();

    fn handle(&mut self, msg: Unregister, _ctx: &mut Self::Context) -> Self::Result {
        let removed = self
            .connections
            .remove_if(&msg.user_id, |_, data| data.conn_id == msg.conn_id);

        if removed.is_some() {
            tracing::info!("Unregistered connection for user: {}", msg.user_id);
        }
    }
}

impl Handler<Push> for ConnectionRegistryActor {
    type Result = ();

    fn handle(&mut self, msg: Push, _ctx: &mut Self::Context) -> Self::Result {
        match self.connections.get(&msg.user_id) {
            Some(entry) => entry.socket.do_send(SocketCommand::Deliver(msg.payload)),
            None => {
                // Offline user: this is live push, not durable delivery
                self.metrics.dropped_pushes += 1;
                tracing::debug!("Dropped push for offline user: {}", msg.user_id);
            }
        }
    }
}

impl Handler<RecordIgnoredMessage> for ConnectionRegistryActor {
    type Result = ();

    fn handle(&mut self, _msg: RecordIgnoredMessage, _ctx: &mut Self::Context) -> Self::Result {
        self.metrics.ignored_messages += 1;
    }
}

impl Handler<GetRegistryMetrics> for ConnectionRegistryActor {
    type Result = MessageResult<GetRegistryMetrics>;

    fn handle(&mut self, _msg: GetRegistryMetrics, _ctx: &mut Self::Context) -> Self::Result {
        let mut metrics = self.metrics.clone();
        metrics.active_connections = self.connections.len();
        MessageResult(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain actor standing in for a socket, recording what it is sent
    #[derive(Default)]
    struct Collector {
        received: Vec<SocketCommand>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<SocketCommand> for Collector {
        type Result = ();

        fn handle(&mut self, msg: SocketCommand, _ctx: &mut Self::Context) -> Self::Result {
            self.received.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<SocketCommand>")]
    struct Drain;

    impl Handler<Drain> for Collector {
        type Result = MessageResult<Drain>;

        fn handle(&mut self, _msg: Drain, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(std::mem::take(&mut self.received))
        }
    }

    #[actix_web::test]
    async fn replacement_evicts_previous_socket_exactly_once() {
        let registry = ConnectionRegistryActor::new().start();
        let first = Collector::default().start();
        let second = Collector::default().start();
        let user_id = Uuid::new_v4();

        registry.do_send(Register {
            user_id,
            conn_id: Uuid::new_v4(),
            socket: first.clone().recipient(),
        });
        registry.do_send(Register {
            user_id,
            conn_id: Uuid::new_v4(),
            socket: second.clone().recipient(),
        });
        registry.do_send(Push {
            user_id,
            payload: "hello".to_string(),
        });

        // Mailboxes are FIFO: a round-trip flushes everything queued above
        let metrics = registry.send(GetRegistryMetrics).await.unwrap();
        assert_eq!(metrics.active_connections, 1);
        assert_eq!(metrics.evicted_connections, 1);

        let first_seen = first.send(Drain).await.unwrap();
        assert_eq!(first_seen, vec![SocketCommand::Evict]);

        let second_seen = second.send(Drain).await.unwrap();
        assert_eq!(
            second_seen,
            vec![SocketCommand::Deliver("hello".to_string())]
        );
    }

    #[actix_web::test]
    async fn stale_unregister_keeps_newer_registration() {
        let registry = ConnectionRegistryActor::new().start();
        let first = Collector::default().start();
        let second = Collector::default().start();
        let user_id = Uuid::new_v4();
        let first_conn = Uuid::new_v4();
        let second_conn = Uuid::new_v4();

        registry.do_send(Register {
            user_id,
            conn_id: first_conn,
            socket: first.clone().recipient(),
        });
        registry.do_send(Register {
            user_id,
            conn_id: second_conn,
            socket: second.clone().recipient(),
        });

        // The evicted socket's close event arrives after its replacement
        registry.do_send(Unregister {
            user_id,
            conn_id: first_conn,
        });
        registry.do_send(Push {
            user_id,
            payload: "still here".to_string(),
        });

        let metrics = registry.send(GetRegistryMetrics).await.unwrap();
        assert_eq!(metrics.active_connections, 1);
        assert_eq!(metrics.dropped_pushes, 0);

        let second_seen = second.send(Drain).await.unwrap();
        assert_eq!(
            second_seen,
            vec![SocketCommand::Deliver("still here".to_string())]
        );

        // A matching unregister does remove the entry
        registry.do_send(Unregister {
            user_id,
            conn_id: second_conn,
        });
        let metrics = registry.send(GetRegistryMetrics).await.unwrap();
        assert_eq!(metrics.active_connections, 0);
    }

    #[actix_web::test]
    async fn push_without_registration_is_a_counted_drop() {
        let registry = ConnectionRegistryActor::new().start();

        registry.do_send(Push {
            user_id: Uuid::new_v4(),
            payload: "nobody home".to_string(),
        });

        let metrics = registry.send(GetRegistryMetrics).await.unwrap();
        assert_eq!(metrics.dropped_pushes, 1);
        assert_eq!(metrics.active_connections, 0);
    }
}
