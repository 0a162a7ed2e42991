//! HTTP handler functions for the `EcoRoad` JSON API.

use actix_web::{HttpResponse, web};
use ecoroad_database::queries;
use ecoroad_intake::{IntakeError, IntakeForm};
use ecoroad_report_models::Coordinates;
use ecoroad_server_models::{
    ApiAddress, ApiError, ApiHealth, ApiReport, ApiSimulation, ApiSubmittedReport,
    ReverseGeocodeParams, SimulationQueryParams, SubmitReportParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/reports`
///
/// Returns every stored report in submission order.
pub async fn list_reports(state: web::Data<AppState>) -> HttpResponse {
    match queries::fetch_reports(state.db.as_ref()).await {
        Ok(reports) => {
            let reports: Vec<ApiReport> = reports.into_iter().map(ApiReport::from).collect();
            HttpResponse::Ok().json(reports)
        }
        Err(e) => {
            log::error!("Failed to query reports: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to query reports"))
        }
    }
}

/// `POST /api/reports`
///
/// Form fields come from the query string; the request body is the photo.
pub async fn submit_report(
    state: web::Data<AppState>,
    params: web::Query<SubmitReportParams>,
    body: web::Bytes,
) -> HttpResponse {
    let params = params.into_inner();
    let location = match (params.lat, params.lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let form = IntakeForm {
        email: params.email,
        phone: params.phone,
        photo: (!body.is_empty()).then(|| body.to_vec()),
        location,
        unit: params.unit,
        breadth: params.breadth,
        length: params.length,
        depth: params.depth,
    };

    match ecoroad_intake::submit(
        state.db.as_ref(),
        state.geocoder.as_ref(),
        &state.images_dir,
        form,
    )
    .await
    {
        Ok(submitted) => HttpResponse::Created().json(ApiSubmittedReport {
            id: submitted.id,
            address: ApiAddress::from(submitted.address),
            image_path: submitted.image_path.display().to_string(),
            breadth: submitted.dimensions.breadth,
            length: submitted.dimensions.length,
            depth: submitted.dimensions.depth,
        }),
        Err(IntakeError::Invalid(issues)) => {
            HttpResponse::UnprocessableEntity().json(ApiError {
                error: "Invalid submission".to_string(),
                issues: issues.iter().map(ToString::to_string).collect(),
            })
        }
        Err(IntakeError::Geocode(e)) => {
            log::error!("Failed to resolve report location: {e}");
            HttpResponse::BadGateway().json(ApiError::new("Failed to resolve location"))
        }
        Err(e) => {
            log::error!("Failed to store report: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to store report"))
        }
    }
}

/// `GET /api/reports/{id}/image`
pub async fn report_image(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();

    match queries::fetch_image(state.db.as_ref(), id).await {
        Ok(Some(bytes)) => HttpResponse::Ok().content_type("image/jpeg").body(bytes),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(format!("No image for report {id}"))),
        Err(e) => {
            log::error!("Failed to load image for report {id}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load image"))
        }
    }
}

/// `GET /api/geocode/reverse`
///
/// Location preview for the report form. Lookup failures are logged and
/// answered with 404.
pub async fn reverse_geocode(
    state: web::Data<AppState>,
    params: web::Query<ReverseGeocodeParams>,
) -> HttpResponse {
    let coordinates = Coordinates {
        latitude: params.lat,
        longitude: params.lon,
    };

    match ecoroad_intake::lookup_location(state.geocoder.as_ref(), Some(coordinates)).await {
        Some(address) => HttpResponse::Ok().json(ApiAddress::from(address)),
        None => HttpResponse::NotFound().json(ApiError::new("No location found")),
    }
}

/// `GET /api/simulate`
///
/// Runs one simulation with the requested parameters.
pub async fn simulate(
    state: web::Data<AppState>,
    params: web::Query<SimulationQueryParams>,
) -> HttpResponse {
    match run_simulation(&state, &params) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(message) => HttpResponse::BadRequest().json(ApiError::new(message)),
    }
}

/// Resolves `params` against the configured simulator and runs it.
pub fn run_simulation(
    state: &AppState,
    params: &SimulationQueryParams,
) -> Result<ApiSimulation, String> {
    let resolved = params.resolve()?;
    let config = match params.seed {
        Some(seed) => state.simulation.clone().with_seed(seed),
        None => state.simulation.clone(),
    };

    ecoroad_simulation::simulate(&resolved, &config)
        .map(|result| ApiSimulation::from(&result))
        .map_err(|e| {
            log::warn!("Simulation rejected: {e}");
            e.to_string()
        })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};

    use super::*;
    use crate::test_utils::test_state;

    const SUBMIT_URI: &str =
        "/api/reports?email=user%40example.com&phone=9876543210&lat=13.0827&lon=80.2707&unit=cm&breadth=90&length=120&depth=15";

    #[actix_web::test]
    async fn health_is_ok() {
        let app = test::init_service(App::new().configure(crate::configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ApiHealth = test::read_body_json(resp).await;
        assert!(body.healthy);
    }

    #[actix_web::test]
    async fn submit_then_list_and_fetch_image() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let photo = vec![0xFF_u8, 0xD8, 0xFF, 0xE0, 0xFF, 0xD9];
        let req = test::TestRequest::post()
            .uri(SUBMIT_URI)
            .set_payload(photo.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let submitted: ApiSubmittedReport = test::read_body_json(resp).await;
        assert_eq!(submitted.address.locality, "Chennai");
        assert_eq!(submitted.breadth, 0.9);
        assert_eq!(submitted.length, 1.2);
        assert_eq!(submitted.depth, 0.15);

        let req = test::TestRequest::get().uri("/api/reports").to_request();
        let reports: Vec<ApiReport> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, submitted.id);
        assert_eq!(reports[0].email, "user@example.com");
        assert_eq!(reports[0].city.as_deref(), Some("Chennai"));
        assert_eq!(reports[0].status, "s");

        let req = test::TestRequest::get()
            .uri(&reports[0].image_url)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await.to_vec(), photo);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn invalid_submission_is_unprocessable() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/reports?email=user%40%40example&phone=1234567890")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.issues.len(), 4);

        let req = test::TestRequest::get().uri("/api/reports").to_request();
        let reports: Vec<ApiReport> = test::call_and_read_body_json(&app, req).await;
        assert!(reports.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn missing_image_is_not_found() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let req = test::TestRequest::get().uri("/api/reports/42/image").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn reverse_geocode_reports_failures_as_not_found() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/geocode/reverse?lat=13.0827&lon=80.2707")
            .to_request();
        let address: ApiAddress = test::call_and_read_body_json(&app, req).await;
        assert_eq!(address.postcode.as_deref(), Some("600002"));

        let req = test::TestRequest::get()
            .uri("/api/geocode/reverse?lat=85.0&lon=0.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn simulate_is_repeatable_with_seed() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let uri = "/api/simulate?gridSize=60&numPotholes=3&seed=7";
        let first: ApiSimulation =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let second: ApiSimulation =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;

        assert_eq!(first.seed, Some(7));
        assert_eq!(first.coords.len(), 60);
        assert_eq!(first.surface.len(), 60);
        assert_eq!(first.surface, second.surface);
        assert_eq!(first.profit, second.profit);
        assert_eq!(first.bounding_length, 50.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn simulate_rejects_out_of_range_params() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/simulate?gridSize=5000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
