// server/src/actors/timer_session_actor.rs
use actix::{Actor, ActorContext, ActorFutureExt, Addr, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::connection_registry::{ConnectionRegistryActor, Register, SocketCommand, Unregister};
use crate::broadcaster::UpdateBroadcaster;

// Liveness: ping every 5 seconds, drop peers silent for 30
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Actor managing one authenticated WebSocket connection. Created only
/// after the upgrade authenticator has resolved the bearer token, so a
/// user id is always present.
pub struct TimerSessionActor {
    user_id: Uuid,
    conn_id: Uuid,
    registry: Addr<ConnectionRegistryActor>,
    broadcaster: UpdateBroadcaster,
    last_heartbeat: Instant,
}

impl TimerSessionActor {
    pub fn new(
        user_id: Uuid,
        registry: Addr<ConnectionRegistryActor>,
        broadcaster: UpdateBroadcaster,
    ) -> Self {
        Self {
            user_id,
            conn_id: Uuid::new_v4(),
            registry,
            broadcaster,
            last_heartbeat: Instant::now(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                tracing::warn!("Client heartbeat timeout: {}", act.user_id);
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn handle_query(&self, text: String, ctx: &mut ws::WebsocketContext<Self>) {
        let broadcaster = self.broadcaster.clone();
        let user_id = self.user_id;

        // The datastore round-trip happens off the actor; the reply comes
        // back through the registry so a socket closed mid-read degrades to
        // a counted drop
        let fut = actix::fut::wrap_future::<_, Self>(async move {
            broadcaster.handle_query(user_id, &text).await
        })
        .map(|result, act, ctx| {
            if let Err(err) = result {
                // A datastore failure takes down this one connection, not
                // the registry
                tracing::error!("Query failed for user {}: {}", act.user_id, err);
                ctx.close(Some(ws::CloseCode::Error.into()));
                ctx.stop();
            }
        });

        ctx.spawn(fut);
    }
}

impl Actor for TimerSessionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("Client connected: {}", self.user_id);

        self.heartbeat(ctx);

        self.registry.do_send(Register {
            user_id: self.user_id,
            conn_id: self.conn_id,
            socket: ctx.address().recipient(),
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Client disconnected: {}", self.user_id);

        // Guarded by conn_id: if this socket was already replaced, the
        // newer registration survives this notification
        self.registry.do_send(Unregister {
            user_id: self.user_id,
            conn_id: self.conn_id,
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for TimerSessionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_query(text.to_string(), ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!("Client closing connection: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            // Binary and continuation frames fall under the same tolerance
            // policy as malformed text: ignored, connection stays open
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("Protocol error from client {}: {}", self.user_id, err);
                ctx.stop();
            }
        }
    }
}

impl Handler<SocketCommand> for TimerSessionActor {
    type Result = ();

    fn handle(&mut self, msg: SocketCommand, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            SocketCommand::Deliver(payload) => ctx.text(payload),
            SocketCommand::Evict => {
                tracing::info!("Evicting superseded connection for user: {}", self.user_id);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some("connection superseded".to_string()),
                }));
                ctx.stop();
            }
        }
    }
}
