use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use ecoroad_geocoder::{GeocodeError, ResolvedAddress, ReverseGeocoder};
use ecoroad_simulation::SimulationConfig;

use crate::AppState;

/// Resolves everything to one Chennai address, except latitudes above 80
/// which are not found.
pub struct FixedGeocoder;

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ResolvedAddress, GeocodeError> {
        if latitude > 80.0 {
            return Err(GeocodeError::NotFound {
                latitude,
                longitude,
            });
        }
        Ok(ResolvedAddress {
            display_name: "Anna Salai, Chennai, Tamil Nadu, 600002, India".to_string(),
            latitude,
            longitude,
            postcode: Some("600002".to_string()),
            locality: "Chennai".to_string(),
            region: Some("Tamil Nadu".to_string()),
            country: Some("India".to_string()),
        })
    }
}

/// Fresh state backed by a temp directory. Callers remove the directory.
pub async fn test_state() -> (web::Data<AppState>, PathBuf) {
    let dir = std::env::temp_dir().join(format!("ecoroad_server_test_{}", uuid::Uuid::new_v4()));
    let db = ecoroad_database::open_db(&dir.join("reports.db"))
        .await
        .unwrap();
    let state = web::Data::new(AppState {
        db: Arc::from(db),
        geocoder: Arc::new(FixedGeocoder),
        images_dir: dir.join("images"),
        simulation: SimulationConfig::default().with_seed(50),
    });
    (state, dir)
}
