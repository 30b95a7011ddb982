// server/src/api/mod.rs
pub mod auth;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(auth::index)
        .service(auth::login)
        .service(auth::signup)
        .service(auth::logout);
}
