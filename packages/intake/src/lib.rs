#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road damage report intake.
//!
//! Takes what a reporter typed into the submission form, checks it, converts
//! the measurements to meters, resolves the location to an address, stores
//! the photo on disk and writes the report row.

pub mod validation;

use std::path::{Path, PathBuf};

use ecoroad_database::DbError;
use ecoroad_geocoder::{GeocodeError, ResolvedAddress, ReverseGeocoder};
use ecoroad_report_models::{
    ContactInfo, Coordinates, Dimensions, LengthUnit, NewReport, ReportAddress, ReportStatus,
};
use switchy_database::Database;
use thiserror::Error;

pub use validation::{is_valid_email, is_valid_phone};

/// Raw submission form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeForm {
    /// Reporter email.
    pub email: String,
    /// Reporter phone number.
    pub phone: String,
    /// Uploaded photo bytes.
    pub photo: Option<Vec<u8>>,
    /// Location the browser reported.
    pub location: Option<Coordinates>,
    /// Unit `breadth`, `length` and `depth` were measured in.
    pub unit: LengthUnit,
    /// Breadth in `unit`.
    pub breadth: f64,
    /// Length in `unit`.
    pub length: f64,
    /// Depth in `unit`.
    pub depth: f64,
}

/// One problem with a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeIssue {
    /// The email field was left blank.
    #[error("Email is required")]
    MissingEmail,
    /// The email does not look like `local@domain.tld`.
    #[error("Invalid email address")]
    InvalidEmail,
    /// The phone field was left blank.
    #[error("Phone number is required")]
    MissingPhone,
    /// The phone is not a ten digit Indian mobile number.
    #[error("Invalid phone number")]
    InvalidPhone,
    /// No photo, or an empty one, was uploaded.
    #[error("A photo of the damage is required")]
    MissingPhoto,
    /// The browser did not share a location.
    #[error("Location is required")]
    MissingLocation,
    /// A measurement is negative or not a number.
    #[error("Invalid {field} measurement")]
    InvalidMeasurement {
        /// `breadth`, `length` or `depth`.
        field: &'static str,
    },
}

/// A form that passed every check, with measurements in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    /// Checked email and phone.
    pub contact: ContactInfo,
    /// Non-empty photo bytes.
    pub photo: Vec<u8>,
    /// Where the damage is.
    pub coordinates: Coordinates,
    /// Measurements converted to meters.
    pub dimensions: Dimensions,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReport {
    /// Identifier storage assigned.
    pub id: i64,
    /// Address the location resolved to.
    pub address: ResolvedAddress,
    /// Where the photo was written.
    pub image_path: PathBuf,
    /// Stored measurements, in meters.
    pub dimensions: Dimensions,
}

/// Errors from [`submit`].
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The form failed one or more checks.
    #[error("Invalid submission: {}", join_issues(.0))]
    Invalid(Vec<IntakeIssue>),
    /// The location could not be resolved to an address.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// The report row could not be written.
    #[error(transparent)]
    Database(#[from] DbError),
    /// The photo could not be written to disk.
    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

fn join_issues(issues: &[IntakeIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_measurement(field: &'static str, value: f64, issues: &mut Vec<IntakeIssue>) {
    if !value.is_finite() || value < 0.0 {
        issues.push(IntakeIssue::InvalidMeasurement { field });
    }
}

/// Checks `form`, returning every problem found rather than stopping at the
/// first one.
///
/// # Errors
///
/// Returns the full list of [`IntakeIssue`]s if any check fails.
pub fn validate(form: IntakeForm) -> Result<ValidatedForm, Vec<IntakeIssue>> {
    let mut issues = Vec::new();

    if form.email.is_empty() {
        issues.push(IntakeIssue::MissingEmail);
    } else if !is_valid_email(&form.email) {
        issues.push(IntakeIssue::InvalidEmail);
    }

    if form.phone.is_empty() {
        issues.push(IntakeIssue::MissingPhone);
    } else if !is_valid_phone(&form.phone) {
        issues.push(IntakeIssue::InvalidPhone);
    }

    let photo = form.photo.filter(|bytes| !bytes.is_empty());
    if photo.is_none() {
        issues.push(IntakeIssue::MissingPhoto);
    }

    if form.location.is_none() {
        issues.push(IntakeIssue::MissingLocation);
    }

    check_measurement("breadth", form.breadth, &mut issues);
    check_measurement("length", form.length, &mut issues);
    check_measurement("depth", form.depth, &mut issues);

    match (photo, form.location) {
        (Some(photo), Some(coordinates)) if issues.is_empty() => Ok(ValidatedForm {
            contact: ContactInfo {
                email: form.email,
                phone: form.phone,
            },
            photo,
            coordinates,
            dimensions: Dimensions::from_unit(form.unit, form.breadth, form.length, form.depth),
        }),
        _ => Err(issues),
    }
}

fn report_address(address: &ResolvedAddress) -> ReportAddress {
    ReportAddress {
        display_name: Some(address.display_name.clone()),
        postcode: address.postcode.clone(),
        city: Some(address.locality.clone()),
        state: address.region.clone(),
        country: address.country.clone(),
    }
}

/// Validates and stores one report.
///
/// The location is reverse-geocoded, the photo is written to `images_dir`
/// and the row is inserted with status [`ReportStatus::Submitted`].
///
/// # Errors
///
/// * [`IntakeError::Invalid`] if the form fails validation. Nothing is
///   written in that case.
/// * [`IntakeError::Geocode`] if the address lookup fails.
/// * [`IntakeError::Io`] if the photo cannot be written.
/// * [`IntakeError::Database`] if the insert fails. The photo written for
///   this submission is removed again.
pub async fn submit(
    db: &dyn Database,
    geocoder: &dyn ReverseGeocoder,
    images_dir: &Path,
    form: IntakeForm,
) -> Result<SubmittedReport, IntakeError> {
    let form = validate(form).map_err(IntakeError::Invalid)?;
    let Coordinates {
        latitude,
        longitude,
    } = form.coordinates;

    let address = geocoder.reverse_geocode(latitude, longitude).await?;
    log::debug!("Resolved ({latitude}, {longitude}) to {}", address.display_name);

    let image_path = ecoroad_database::images::write_image(images_dir, form.coordinates, &form.photo)?;

    let report = NewReport {
        contact: form.contact,
        address: report_address(&address),
        coordinates: form.coordinates,
        image_name: image_path.display().to_string(),
        image: form.photo,
        dimensions: form.dimensions,
        status: ReportStatus::Submitted,
    };
    let id = match ecoroad_database::queries::insert_report(db, &report).await {
        Ok(id) => id,
        Err(e) => {
            if let Err(remove) = std::fs::remove_file(&image_path) {
                log::warn!(
                    "Failed to remove orphaned image {}: {remove}",
                    image_path.display()
                );
            }
            return Err(e.into());
        }
    };

    log::info!("Report {id} submitted at ({latitude}, {longitude})");

    Ok(SubmittedReport {
        id,
        address,
        image_path,
        dimensions: report.dimensions,
    })
}

/// Resolves `coordinates` for the location preview shown before
/// submission.
///
/// Returns `None` when no coordinates are available or the lookup fails.
pub async fn lookup_location(
    geocoder: &dyn ReverseGeocoder,
    coordinates: Option<Coordinates>,
) -> Option<ResolvedAddress> {
    let Coordinates {
        latitude,
        longitude,
    } = coordinates?;

    match geocoder.reverse_geocode(latitude, longitude).await {
        Ok(address) => Some(address),
        Err(e) => {
            log::warn!("Location lookup failed for ({latitude}, {longitude}): {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ecoroad_database::queries::fetch_reports;

    use super::*;

    struct FixedGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse_geocode(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> Result<ResolvedAddress, GeocodeError> {
            Ok(ResolvedAddress {
                display_name: "MG Road, Bengaluru, Karnataka, 560001, India".to_string(),
                latitude,
                longitude,
                postcode: Some("560001".to_string()),
                locality: "Bengaluru".to_string(),
                region: Some("Karnataka".to_string()),
                country: Some("India".to_string()),
            })
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse_geocode(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<ResolvedAddress, GeocodeError> {
            Err(GeocodeError::RateLimited)
        }
    }

    fn valid_form() -> IntakeForm {
        IntakeForm {
            email: "user@example.com".to_string(),
            phone: "9876543210".to_string(),
            photo: Some(vec![0xFF, 0xD8, 0xFF, 0xD9]),
            location: Some(Coordinates {
                latitude: 12.9716,
                longitude: 77.5946,
            }),
            unit: LengthUnit::Feet,
            breadth: 3.0,
            length: 2.0,
            depth: 0.5,
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("ecoroad_intake_test_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn valid_form_converts_measurements_to_meters() {
        let form = validate(valid_form()).unwrap();
        assert_eq!(form.dimensions.breadth, 0.914);
        assert_eq!(form.dimensions.length, 0.61);
        assert_eq!(form.dimensions.depth, 0.152);
        assert_eq!(form.contact.email, "user@example.com");
    }

    #[test]
    fn centimeters_and_meters_convert() {
        let cm = validate(IntakeForm {
            unit: LengthUnit::Centimeters,
            breadth: 120.0,
            ..valid_form()
        })
        .unwrap();
        assert_eq!(cm.dimensions.breadth, 1.2);

        let m = validate(IntakeForm {
            unit: LengthUnit::Meters,
            breadth: 1.23456,
            ..valid_form()
        })
        .unwrap();
        assert_eq!(m.dimensions.breadth, 1.235);
    }

    #[test]
    fn collects_every_issue() {
        let issues = validate(IntakeForm {
            email: "user@@example".to_string(),
            phone: "1234567890".to_string(),
            photo: None,
            location: None,
            ..valid_form()
        })
        .unwrap_err();

        assert_eq!(
            issues,
            vec![
                IntakeIssue::InvalidEmail,
                IntakeIssue::InvalidPhone,
                IntakeIssue::MissingPhoto,
                IntakeIssue::MissingLocation,
            ]
        );
    }

    #[test]
    fn empty_fields_are_missing_not_invalid() {
        let issues = validate(IntakeForm {
            email: String::new(),
            phone: String::new(),
            photo: Some(Vec::new()),
            ..valid_form()
        })
        .unwrap_err();

        assert_eq!(
            issues,
            vec![
                IntakeIssue::MissingEmail,
                IntakeIssue::MissingPhone,
                IntakeIssue::MissingPhoto,
            ]
        );
    }

    #[test]
    fn rejects_negative_and_nan_measurements() {
        let issues = validate(IntakeForm {
            breadth: -1.0,
            depth: f64::NAN,
            ..valid_form()
        })
        .unwrap_err();

        assert_eq!(
            issues,
            vec![
                IntakeIssue::InvalidMeasurement { field: "breadth" },
                IntakeIssue::InvalidMeasurement { field: "depth" },
            ]
        );
    }

    #[tokio::test]
    async fn submit_stores_report_and_image() {
        let dir = temp_dir();
        let db = ecoroad_database::open_db(&dir.join("reports.db")).await.unwrap();
        let images = dir.join("images");

        let submitted = submit(db.as_ref(), &FixedGeocoder, &images, valid_form())
            .await
            .unwrap();

        assert_eq!(
            submitted.image_path,
            images.join("12.9716-77.5946.jpg")
        );
        assert_eq!(
            std::fs::read(&submitted.image_path).unwrap(),
            vec![0xFF, 0xD8, 0xFF, 0xD9]
        );

        let reports = fetch_reports(db.as_ref()).await.unwrap();
        assert_eq!(reports.len(), 1);
        let stored = &reports[0];
        assert_eq!(stored.id, submitted.id);
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert_eq!(stored.address.city.as_deref(), Some("Bengaluru"));
        assert_eq!(stored.address.postcode.as_deref(), Some("560001"));
        assert_eq!(stored.dimensions, submitted.dimensions);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn invalid_submission_writes_nothing() {
        let dir = temp_dir();
        let db = ecoroad_database::open_db(&dir.join("reports.db")).await.unwrap();
        let images = dir.join("images");

        let result = submit(
            db.as_ref(),
            &FixedGeocoder,
            &images,
            IntakeForm {
                email: "not-an-email".to_string(),
                ..valid_form()
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(IntakeError::Invalid(ref issues)) if issues == &[IntakeIssue::InvalidEmail]
        ));
        assert!(fetch_reports(db.as_ref()).await.unwrap().is_empty());
        assert!(!images.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn geocode_failure_aborts_submission() {
        let dir = temp_dir();
        let db = ecoroad_database::open_db(&dir.join("reports.db")).await.unwrap();

        let result = submit(db.as_ref(), &FailingGeocoder, &dir.join("images"), valid_form()).await;

        assert!(matches!(result, Err(IntakeError::Geocode(GeocodeError::RateLimited))));
        assert!(fetch_reports(db.as_ref()).await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_insert_removes_the_photo() {
        let dir = temp_dir();
        let db = ecoroad_database::open_db(&dir.join("reports.db")).await.unwrap();
        db.exec_raw("DROP TABLE user_data").await.unwrap();
        let images = dir.join("images");

        let result = submit(db.as_ref(), &FixedGeocoder, &images, valid_form()).await;

        assert!(matches!(result, Err(IntakeError::Database(_))));
        assert!(!images.join("12.9716-77.5946.jpg").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn lookup_location_swallows_failures() {
        let coordinates = Some(Coordinates {
            latitude: 12.9716,
            longitude: 77.5946,
        });

        let found = lookup_location(&FixedGeocoder, coordinates).await.unwrap();
        assert_eq!(found.locality, "Bengaluru");

        assert!(lookup_location(&FailingGeocoder, coordinates).await.is_none());
        assert!(lookup_location(&FixedGeocoder, None).await.is_none());
    }
}
