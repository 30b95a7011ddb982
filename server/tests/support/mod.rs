//! Shared state and app assembly for integration tests.
#![allow(dead_code)]

use actix::{Actor, Addr};
use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App, Error, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use timer_server::actors::connection_registry::ConnectionRegistryActor;
use timer_server::api;
use timer_server::broadcaster::UpdateBroadcaster;
use timer_server::identity::IdentityService;
use timer_server::middleware::session_auth::SessionAuth;
use timer_server::routing;
use timer_server::sessions::SessionManager;
use timer_server::store::{Datastore, MemStore};
use timer_server::tokens::TokenManager;

pub struct TestState {
    pub store: Arc<MemStore>,
    pub identity: IdentityService,
    pub sessions: SessionManager,
    pub tokens: TokenManager,
    pub registry: Addr<ConnectionRegistryActor>,
    pub broadcaster: UpdateBroadcaster,
}

/// Assemble the service graph the way `main` does, over a fresh store
pub fn build_state() -> TestState {
    let store = Arc::new(MemStore::new());
    let datastore: Arc<dyn Datastore> = Arc::clone(&store) as Arc<dyn Datastore>;

    let identity = IdentityService::new(Arc::clone(&datastore));
    let sessions = SessionManager::new(Arc::clone(&datastore), 86400);
    let tokens = TokenManager::new(Arc::clone(&datastore), 32);
    let registry = ConnectionRegistryActor::new().start();
    let broadcaster = UpdateBroadcaster::new(datastore, registry.clone());

    TestState {
        store,
        identity,
        sessions,
        tokens,
        registry,
        broadcaster,
    }
}

/// In-process app for request/response assertions
pub async fn init_app(
    state: &TestState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state.identity.clone()))
            .app_data(web::Data::new(state.sessions.clone()))
            .app_data(web::Data::new(state.tokens.clone()))
            .app_data(web::Data::new(state.registry.clone()))
            .app_data(web::Data::new(state.broadcaster.clone()))
            .wrap(SessionAuth::new(state.sessions.clone()))
            .configure(api::configure)
            .configure(routing::routes),
    )
    .await
}

/// Bind an ephemeral port and spawn a live server for socket tests
pub fn spawn_server(state: &TestState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let identity_data = web::Data::new(state.identity.clone());
    let sessions_data = web::Data::new(state.sessions.clone());
    let tokens_data = web::Data::new(state.tokens.clone());
    let registry_data = web::Data::new(state.registry.clone());
    let broadcaster_data = web::Data::new(state.broadcaster.clone());
    let sessions = state.sessions.clone();

    let server = HttpServer::new(move || {
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
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen on test port")
    .run();

    actix_web::rt::spawn(server);

    format!("http://{addr}")
}

/// Sign up through the in-process app, returning the two issued cookies as
/// (session id, token)
pub async fn signup<S>(app: &S, username: &str, password: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let resp = test::call_service(
        app,
        TestRequest::post()
            .uri("/signup")
            .set_form([("username", username), ("password", password)])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let mut session = None;
    let mut token = None;
    for cookie in resp.response().cookies() {
        match cookie.name() {
            "sessionId" => session = Some(cookie.value().to_string()),
            "token" => token = Some(cookie.value().to_string()),
            _ => {}
        }
    }

    (
        session.expect("signup sets a session cookie"),
        token.expect("signup sets a token cookie"),
    )
}
