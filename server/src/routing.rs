// server/src/routing.rs
use actix::Addr;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::actors::connection_registry::ConnectionRegistryActor;
use crate::actors::timer_session_actor::TimerSessionActor;
use crate::api::auth::TOKEN_COOKIE_NAME;
use crate::broadcaster::UpdateBroadcaster;
use crate::tokens::TokenManager;

/// Configure the WebSocket route
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(timer_ws_route)));
}

/// Authenticate and upgrade a WebSocket connection. Rejection happens at
/// the transport layer: an unresolvable token gets a plain 401 and no
/// WebSocket frames are ever exchanged with the peer.
async fn timer_ws_route(
    req: HttpRequest,
    stream: web::Payload,
    registry: web::Data<Addr<ConnectionRegistryActor>>,
    tokens: web::Data<TokenManager>,
    broadcaster: web::Data<UpdateBroadcaster>,
) -> Result<HttpResponse, Error> {
    // The browser WebSocket constructor cannot set custom headers, so the
    // bearer token rides in on the handshake's cookie header
    let token = match req.cookie(TOKEN_COOKIE_NAME) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            tracing::warn!("WebSocket upgrade attempt without token cookie");
            return Ok(HttpResponse::Unauthorized().finish());
        }
    };

    let user_id = match tokens.resolve(&token).await? {
        Some(user_id) => user_id,
        None => {
            tracing::warn!("WebSocket upgrade attempt with unresolvable token");
            return Ok(HttpResponse::Unauthorized().finish());
        }
    };

    let actor = TimerSessionActor::new(
        user_id,
        registry.get_ref().clone(),
        broadcaster.get_ref().clone(),
    );

    ws::start(actor, &req, stream)
}
