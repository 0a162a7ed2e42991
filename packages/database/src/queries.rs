//! Report insert and projection queries.
//!
//! Column lists are assembled from [`ReportColumn`] names only, never from
//! caller-supplied text. Photo bytes are stored hex-encoded in `img_blob`
//! and decoded on the way out.

use ecoroad_report_models::{
    ColumnKind, ColumnValue, NewReport, ProjectedRow, Report, ReportColumn,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn optional_text(value: Option<&String>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone()))
}

/// Inserts one report and returns its assigned identifier.
///
/// The write is committed as soon as the statement completes.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails or no identifier is returned.
pub async fn insert_report(db: &dyn Database, report: &NewReport) -> Result<i64, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO user_data (
                email, ph_no, address, lat, long, postcode, city, state,
                country, img_name, img_blob, breadth, length, height, status
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, $14, $15
            )
            RETURNING slno",
            &[
                DatabaseValue::String(report.contact.email.clone()),
                DatabaseValue::String(report.contact.phone.clone()),
                optional_text(report.address.display_name.as_ref()),
                DatabaseValue::Real64(report.coordinates.latitude),
                DatabaseValue::Real64(report.coordinates.longitude),
                optional_text(report.address.postcode.as_ref()),
                optional_text(report.address.city.as_ref()),
                optional_text(report.address.state.as_ref()),
                optional_text(report.address.country.as_ref()),
                DatabaseValue::String(report.image_name.clone()),
                DatabaseValue::String(hex::encode(&report.image)),
                DatabaseValue::Real64(report.dimensions.breadth),
                DatabaseValue::Real64(report.dimensions.length),
                DatabaseValue::Real64(report.dimensions.depth),
                DatabaseValue::String(report.status.code().to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Insert returned no report id".to_string(),
    })?;

    let id: i64 = row.to_value("slno").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse report id: {e}"),
    })?;

    log::info!("Stored report {id} from {}", report.contact.email);

    Ok(id)
}

/// Returns every report projected to `columns`, in insertion order.
///
/// An empty column list is treated as a request for all columns.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a value has an unexpected type.
pub async fn fetch_columns(
    db: &dyn Database,
    columns: &[ReportColumn],
) -> Result<Vec<ProjectedRow>, DbError> {
    let columns = if columns.is_empty() {
        ReportColumn::all()
    } else {
        columns
    };

    let list = columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(", ");

    let rows = db
        .query_raw_params(
            &format!("SELECT {list} FROM user_data ORDER BY slno"),
            &[],
        )
        .await?;

    rows.iter().map(|row| project_row(row, columns)).collect()
}

/// Returns every report with all columns.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row is malformed.
pub async fn fetch_reports(db: &dyn Database) -> Result<Vec<Report>, DbError> {
    fetch_columns(db, ReportColumn::all())
        .await?
        .into_iter()
        .map(|row| {
            Report::try_from(row).map_err(|e| DbError::Conversion {
                message: e.to_string(),
            })
        })
        .collect()
}

/// Returns the photo bytes stored for report `id`, or `None` if there is
/// no such report or it has no photo.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the stored value is not valid
/// hex.
pub async fn fetch_image(db: &dyn Database, id: i64) -> Result<Option<Vec<u8>>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT img_blob FROM user_data WHERE slno = $1",
            &[DatabaseValue::Int64(id)],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    match read_value(row, ReportColumn::ImageBlob)? {
        ColumnValue::Blob(bytes) => Ok(Some(bytes)),
        _ => Ok(None),
    }
}

fn project_row(row: &Row, columns: &[ReportColumn]) -> Result<ProjectedRow, DbError> {
    let mut projected = ProjectedRow::new();
    for column in columns {
        projected.push(*column, read_value(row, *column)?);
    }
    Ok(projected)
}

fn read_value(row: &Row, column: ReportColumn) -> Result<ColumnValue, DbError> {
    let name = column.as_ref();
    let conversion = |e: &dyn std::fmt::Display| DbError::Conversion {
        message: format!("Failed to read column {name}: {e}"),
    };

    let value = match column.kind() {
        ColumnKind::Integer => row
            .to_value::<Option<i64>>(name)
            .map_err(|e| conversion(&e))?
            .map_or(ColumnValue::Null, ColumnValue::Integer),
        ColumnKind::Real => row
            .to_value::<Option<f64>>(name)
            .map_err(|e| conversion(&e))?
            .map_or(ColumnValue::Null, ColumnValue::Real),
        ColumnKind::Text => row
            .to_value::<Option<String>>(name)
            .map_err(|e| conversion(&e))?
            .map_or(ColumnValue::Null, ColumnValue::Text),
        ColumnKind::Blob => match row
            .to_value::<Option<String>>(name)
            .map_err(|e| conversion(&e))?
        {
            Some(encoded) => ColumnValue::Blob(hex::decode(encoded).map_err(|e| conversion(&e))?),
            None => ColumnValue::Null,
        },
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ecoroad_report_models::{
        ContactInfo, Coordinates, Dimensions, LengthUnit, ReportAddress, ReportStatus,
    };

    use super::*;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("ecoroad_db_test_{}.db", uuid::Uuid::new_v4()))
    }

    fn sample_report(email: &str, latitude: f64) -> NewReport {
        NewReport {
            contact: ContactInfo {
                email: email.to_string(),
                phone: "+919876543210".to_string(),
            },
            address: ReportAddress {
                display_name: Some("MG Road, Bengaluru, Karnataka, 560001, India".to_string()),
                postcode: Some("560001".to_string()),
                city: Some("Bengaluru".to_string()),
                state: Some("Karnataka".to_string()),
                country: Some("India".to_string()),
            },
            coordinates: Coordinates {
                latitude,
                longitude: 77.5946,
            },
            image_name: format!("data/images/{latitude}-77.5946.jpg"),
            image: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x00, 0xFF, 0xD9],
            dimensions: Dimensions::from_unit(LengthUnit::Feet, 3.5, 2.0, 0.4),
            status: ReportStatus::Submitted,
        }
    }

    #[tokio::test]
    async fn insert_then_fetch_preserves_fields() {
        let path = temp_db_path();
        let db = crate::open_db(&path).await.unwrap();
        let report = sample_report("user@example.com", 12.9716);

        let id = insert_report(db.as_ref(), &report).await.unwrap();
        let reports = fetch_reports(db.as_ref()).await.unwrap();

        assert_eq!(reports.len(), 1);
        let stored = &reports[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.contact, report.contact);
        assert_eq!(stored.address, report.address);
        assert_eq!(stored.coordinates, report.coordinates);
        assert_eq!(stored.image_name.as_deref(), Some(report.image_name.as_str()));
        assert_eq!(stored.image, report.image);
        assert_eq!(stored.dimensions, report.dimensions);
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert!(stored.created_at.is_some());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_order_is_stable() {
        let path = temp_db_path();
        let db = crate::open_db(&path).await.unwrap();

        let first = insert_report(db.as_ref(), &sample_report("a@example.com", 10.0))
            .await
            .unwrap();
        let second = insert_report(db.as_ref(), &sample_report("b@example.com", 11.0))
            .await
            .unwrap();
        assert!(second > first);

        let rows = fetch_columns(db.as_ref(), &[ReportColumn::Email, ReportColumn::Id])
            .await
            .unwrap();
        let emails: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get(ReportColumn::Email).and_then(ColumnValue::as_str))
            .collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn projection_only_returns_requested_columns() {
        let path = temp_db_path();
        let db = crate::open_db(&path).await.unwrap();
        insert_report(db.as_ref(), &sample_report("user@example.com", 12.0))
            .await
            .unwrap();

        let rows = fetch_columns(db.as_ref(), &[ReportColumn::Latitude, ReportColumn::Depth])
            .await
            .unwrap();
        let row = &rows[0];
        let columns: Vec<ReportColumn> = row.iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec![ReportColumn::Latitude, ReportColumn::Depth]);
        assert_eq!(
            row.get(ReportColumn::Latitude).and_then(ColumnValue::as_f64),
            Some(12.0)
        );
        assert!(row.get(ReportColumn::Email).is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn fetch_image_by_id() {
        let path = temp_db_path();
        let db = crate::open_db(&path).await.unwrap();
        let report = sample_report("user@example.com", 12.0);
        let id = insert_report(db.as_ref(), &report).await.unwrap();

        assert_eq!(
            fetch_image(db.as_ref(), id).await.unwrap(),
            Some(report.image)
        );
        assert_eq!(fetch_image(db.as_ref(), id + 100).await.unwrap(), None);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_table_fetches_nothing() {
        let path = temp_db_path();
        let db = crate::open_db(&path).await.unwrap();

        assert!(fetch_reports(db.as_ref()).await.unwrap().is_empty());
        assert!(fetch_columns(db.as_ref(), &[]).await.unwrap().is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
