// server/src/main.rs
use actix::Actor;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use common::{setup_tracing, Config};
use timer_server::actors::connection_registry::ConnectionRegistryActor;
use timer_server::api;
use timer_server::broadcaster::UpdateBroadcaster;
use timer_server::identity::IdentityService;
use timer_server::middleware::session_auth::SessionAuth;
use timer_server::routing;
use timer_server::sessions::SessionManager;
use timer_server::store::{Datastore, MemStore};
use timer_server::tokens::TokenManager;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();
    let server_addr = config.server_addr.clone();

    // The datastore collaborator; a durable backend slots in behind the
    // same trait
    let store: Arc<dyn Datastore> = Arc::new(MemStore::new());

    let identity = IdentityService::new(Arc::clone(&store));
    let sessions = SessionManager::new(Arc::clone(&store), config.auth.session_ttl_seconds);
    let tokens = TokenManager::new(Arc::clone(&store), config.auth.token_length);

    // Start the registry before the HTTP workers so every worker shares
    // the single process-local instance
    let registry = ConnectionRegistryActor::new().start();
    let broadcaster = UpdateBroadcaster::new(Arc::clone(&store), registry.clone());

    tracing::info!("Starting timer server on {}", server_addr);

    let identity_data = web::Data::new(identity);
    let sessions_data = web::Data::new(sessions.clone());
    let tokens_data = web::Data::new(tokens);
    let registry_data = web::Data::new(registry);
    let broadcaster_data = web::Data::new(broadcaster);

    HttpServer::new(move || {
        App::new()
            .app_data(identity_data.clone())
            .app_data(sessions_data.clone())
            .app_data(tokens_data.clone())
            .app_data(registry_data.clone())
            .app_data(broadcaster_data.clone())
            .wrap(SessionAuth::new(sessions.clone()))
            .configure(api::configure)
            .configure(routing::routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
