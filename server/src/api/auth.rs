// server/src/api/auth.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{get, post, web, Error, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::identity::IdentityService;
use crate::middleware::session_auth::{MaybeUser, SESSION_COOKIE_NAME};
use crate::sessions::SessionManager;
use crate::store::StoreError;
use crate::tokens::TokenManager;
use common::models::PublicUser;

/// Cookie carrying the bearer token. Deliberately NOT httpOnly: client
/// script must read it to present it at WebSocket construction time.
pub const TOKEN_COOKIE_NAME: &str = "token";

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    #[serde(rename = "authError")]
    pub auth_error: Option<String>,
}

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location.to_string()))
        .finish()
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, session_id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE_NAME, token)
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .finish()
}

fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

/// Page context for the externally rendered index view
#[get("/")]
pub async fn index(
    user: MaybeUser,
    query: web::Query<IndexQuery>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, Error> {
    let token = match &user.0 {
        Some(current) => tokens.token_for_user(current.user.id).await?,
        None => None,
    };

    // `authError=true` maps to the credential-mismatch message; any other
    // value passes through for the view to display verbatim
    let auth_error = query.into_inner().auth_error.map(|raw| {
        if raw == "true" {
            "Wrong username or password".to_string()
        } else {
            raw
        }
    });

    Ok(HttpResponse::Ok().json(json!({
        "user": user.0.as_ref().map(|current| PublicUser::from(&current.user)),
        "userToken": token,
        "authError": auth_error,
    })))
}

#[post("/login")]
pub async fn login(
    form: web::Form<Credentials>,
    identity: web::Data<IdentityService>,
    sessions: web::Data<SessionManager>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    let Some(user) = identity.verify(&form.username, &form.password).await? else {
        tracing::info!("Failed login for username: {}", form.username);
        return Ok(redirect_to("/?authError=true"));
    };

    let session_id = sessions.create(user.id).await?;
    let token = tokens.create(user.id).await?;

    Ok(HttpResponse::Found()
        .cookie(token_cookie(token))
        .cookie(session_cookie(session_id))
        .append_header((header::LOCATION, "/"))
        .finish())
}

#[post("/signup")]
pub async fn signup(
    form: web::Form<Credentials>,
    identity: web::Data<IdentityService>,
    sessions: web::Data<SessionManager>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    if form.username.is_empty() || form.password.is_empty() {
        return Ok(redirect_to("/?authError=true"));
    }

    let user = match identity.create(&form.username, &form.password).await {
        Ok(user) => user,
        Err(StoreError::DuplicateUsername(username)) => {
            tracing::info!("Signup with taken username: {}", username);
            return Ok(redirect_to("/?authError=true"));
        }
        Err(err) => return Err(err.into()),
    };

    let session_id = sessions.create(user.id).await?;
    let token = tokens.create(user.id).await?;

    Ok(HttpResponse::Found()
        .cookie(token_cookie(token))
        .cookie(session_cookie(session_id))
        .append_header((header::LOCATION, "/"))
        .finish())
}

/// Logout revokes both credentials: the session row and the token named by
/// the `token` cookie. Both deletes are idempotent, so a partially failed
/// logout is safe to retry.
#[get("/logout")]
pub async fn logout(
    req: HttpRequest,
    user: MaybeUser,
    sessions: web::Data<SessionManager>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, Error> {
    let Some(current) = user.0 else {
        return Ok(redirect_to("/"));
    };

    sessions.delete(&current.session_id).await?;
    if let Some(cookie) = req.cookie(TOKEN_COOKIE_NAME) {
        tokens.delete(cookie.value()).await?;
    }

    Ok(HttpResponse::Found()
        .cookie(clear_cookie(TOKEN_COOKIE_NAME))
        .cookie(clear_cookie(SESSION_COOKIE_NAME))
        .append_header((header::LOCATION, "/"))
        .finish())
}
