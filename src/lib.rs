pub mod admin;
pub mod auth;
pub mod config;
pub mod context;
pub mod crypto;
pub mod db;
pub mod error;
pub mod handlers;
pub mod manage;
pub mod models;
pub mod schema;

use actix_web::web;

use crate::error::AppError;

pub use context::AppContext;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(handlers::index))
    .route("/about", web::get().to(handlers::about))
    .route("/register", web::post().to(handlers::register))
    .route("/login", web::post().to(handlers::login))
    .route("/logout", web::post().to(handlers::logout))
    .route("/members", web::get().to(handlers::members));
    admin::configure(cfg);
    cfg.default_service(web::to(handlers::not_found));
}
