#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the `EcoRoad` road damage dashboard.
//!
//! Serves the HTML pages (landing, report form, map and table view,
//! pothole simulator) and the JSON API behind them. Reports live in a
//! `SQLite` database and photos in an image directory next to it; both
//! locations come from the environment (see [`ServerConfig::from_env`]).
//! Every request re-reads storage and re-runs the simulator.

mod handlers;
pub mod interactive;
mod pages;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use ecoroad_database::{DbError, paths};
use ecoroad_geocoder::{GeocodeError, NominatimGeocoder, ReverseGeocoder};
use ecoroad_simulation::SimulationConfig;
use switchy_database::Database;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port.
pub const DEFAULT_PORT: u16 = 8080;
/// Largest photo upload accepted, in bytes.
pub const MAX_PHOTO_BYTES: usize = 16 * 1024 * 1024;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The report database could not be opened.
    #[error(transparent)]
    Database(#[from] DbError),
    /// The geocoder could not be configured.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// Binding or running the HTTP server failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where the server listens and keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind; [`DEFAULT_BIND_ADDR`] unless `BIND_ADDR` is set.
    pub bind_addr: String,
    /// TCP port; [`DEFAULT_PORT`] unless `PORT` is set.
    pub port: u16,
    /// `SQLite` report database.
    pub db_path: PathBuf,
    /// Directory uploaded photos are written to.
    pub images_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `ECOROAD_DB_PATH` and
    /// `ECOROAD_IMAGES_DIR`, falling back to defaults for anything unset
    /// or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            bind_addr,
            port,
            db_path: paths::db_path_from_env(),
            images_dir: paths::images_dir_from_env(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Report storage.
    pub db: Arc<dyn Database>,
    /// Address lookup for submissions and the location preview.
    pub geocoder: Arc<dyn ReverseGeocoder>,
    /// Directory uploaded photos are written to.
    pub images_dir: PathBuf,
    /// Simulator settings; a request's `seed` overrides the configured one.
    pub simulation: SimulationConfig,
}

/// Registers every page and API route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_PHOTO_BYTES))
        .route("/", web::get().to(pages::landing))
        .route("/report", web::get().to(pages::report_form))
        .route("/map", web::get().to(pages::map))
        .route("/simulate", web::get().to(pages::simulator))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/reports", web::get().to(handlers::list_reports))
                .route("/reports", web::post().to(handlers::submit_report))
                .route("/reports/{id}/image", web::get().to(handlers::report_image))
                .route("/geocode/reverse", web::get().to(handlers::reverse_geocode))
                .route("/simulate", web::get().to(handlers::simulate)),
        );
}

/// Opens storage, builds the geocoder and serves until shutdown.
///
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// * [`ServerError::Database`] if the report database cannot be opened.
/// * [`ServerError::Geocode`] if the geocoding service config is invalid.
/// * [`ServerError::Io`] if the server fails to bind or the image
///   directory cannot be created.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Opening report database at {}...", config.db_path.display());
    let db = ecoroad_database::open_db(&config.db_path).await?;

    paths::ensure_dir(&config.images_dir)?;
    log::info!("Storing photos in {}", config.images_dir.display());

    let geocoder = NominatimGeocoder::from_env()?;
    log::info!("Reverse geocoding via {}", geocoder.base_url());

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        geocoder: Arc::new(geocoder),
        images_dir: config.images_dir.clone(),
        simulation: SimulationConfig::from_env(),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let images_dir = config.images_dir;
    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .service(Files::new("/images", images_dir.clone()))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
