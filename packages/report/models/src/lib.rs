#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Road damage report types shared across the `EcoRoad` workspace.
//!
//! Defines the persisted [`Report`] shape, the [`NewReport`] written by the
//! intake flow, measurement units, and the [`ReportColumn`] selector used to
//! project rows out of storage without string-built column lists.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Timestamp format `SQLite`'s `datetime()` produces.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle status of a report.
///
/// Stored as a single-character code. Only [`ReportStatus::Submitted`] is
/// ever written.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ReportStatus {
    /// The report has been submitted by a user.
    #[default]
    #[serde(rename = "s")]
    #[strum(serialize = "s")]
    Submitted,
}

impl ReportStatus {
    /// Returns the storage code for this status.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Submitted => "s",
        }
    }
}

/// Unit a user measured the damage in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum LengthUnit {
    /// Feet.
    #[serde(rename = "ft")]
    #[strum(serialize = "ft")]
    #[default]
    Feet,
    /// Centimeters.
    #[serde(rename = "cm")]
    #[strum(serialize = "cm")]
    Centimeters,
    /// Meters.
    #[serde(rename = "m")]
    #[strum(serialize = "m")]
    Meters,
}

impl LengthUnit {
    /// All units, in the order the submission form offers them.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Feet, Self::Centimeters, Self::Meters]
    }

    /// Multiplier converting a value in this unit to meters.
    #[must_use]
    pub const fn to_meters_factor(self) -> f64 {
        match self {
            Self::Feet => 0.3048,
            Self::Centimeters => 0.01,
            Self::Meters => 1.0,
        }
    }
}

/// Physical size of the damaged area, in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Breadth in meters.
    pub breadth: f64,
    /// Length in meters.
    pub length: f64,
    /// Depth in meters (stored in the `height` column).
    pub depth: f64,
}

impl Dimensions {
    /// Converts user-entered measurements to meters, rounded to
    /// millimeter precision.
    #[must_use]
    pub fn from_unit(unit: LengthUnit, breadth: f64, length: f64, depth: f64) -> Self {
        let factor = unit.to_meters_factor();
        Self {
            breadth: round_to(breadth * factor, 3),
            length: round_to(length * factor, 3),
            depth: round_to(depth * factor, 3),
        }
    }
}

/// Rounds `value` to `places` decimal places (half away from zero).
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// A WGS84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// Reporter contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
}

/// Postal address fields resolved for a report's location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAddress {
    /// Full human-readable address.
    pub display_name: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
    /// Locality (city, town, village, ...).
    pub city: Option<String>,
    /// Administrative region.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

/// A report ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    /// Who submitted it.
    pub contact: ContactInfo,
    /// Resolved address.
    pub address: ReportAddress,
    /// Where the damage is.
    pub coordinates: Coordinates,
    /// Path the photo was written to.
    pub image_name: String,
    /// Raw photo bytes.
    pub image: Vec<u8>,
    /// Size of the damage.
    pub dimensions: Dimensions,
    /// Lifecycle status.
    pub status: ReportStatus,
}

/// A report as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Auto-assigned identifier.
    pub id: i64,
    /// Who submitted it.
    pub contact: ContactInfo,
    /// Resolved address.
    pub address: ReportAddress,
    /// Where the damage is.
    pub coordinates: Coordinates,
    /// Path the photo was written to.
    pub image_name: Option<String>,
    /// Raw photo bytes.
    pub image: Vec<u8>,
    /// Size of the damage.
    pub dimensions: Dimensions,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// Insert time, in the storage's fixed offset.
    pub created_at: Option<NaiveDateTime>,
}

/// A column of the reports table.
///
/// Projections are built from this enum only, so column names in SQL are
/// always one of the known identifiers below.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
pub enum ReportColumn {
    /// Primary key.
    #[strum(serialize = "slno")]
    Id,
    /// Contact email.
    #[strum(serialize = "email")]
    Email,
    /// Contact phone.
    #[strum(serialize = "ph_no")]
    Phone,
    /// Full resolved address.
    #[strum(serialize = "address")]
    Address,
    /// Latitude.
    #[strum(serialize = "lat")]
    Latitude,
    /// Longitude.
    #[strum(serialize = "long")]
    Longitude,
    /// Postal code.
    #[strum(serialize = "postcode")]
    Postcode,
    /// Locality.
    #[strum(serialize = "city")]
    City,
    /// Administrative region.
    #[strum(serialize = "state")]
    State,
    /// Country.
    #[strum(serialize = "country")]
    Country,
    /// Image file path.
    #[strum(serialize = "img_name")]
    ImageName,
    /// Image bytes.
    #[strum(serialize = "img_blob")]
    ImageBlob,
    /// Breadth in meters.
    #[strum(serialize = "breadth")]
    Breadth,
    /// Length in meters.
    #[strum(serialize = "length")]
    Length,
    /// Depth in meters.
    #[strum(serialize = "height")]
    Depth,
    /// Status code.
    #[strum(serialize = "status")]
    Status,
    /// Insert timestamp.
    #[strum(serialize = "datime")]
    CreatedAt,
}

/// Storage type of a [`ReportColumn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer.
    Integer,
    /// 64-bit float.
    Real,
    /// UTF-8 text.
    Text,
    /// Binary data.
    Blob,
}

impl ReportColumn {
    /// Every column, in table order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Id,
            Self::Email,
            Self::Phone,
            Self::Address,
            Self::Latitude,
            Self::Longitude,
            Self::Postcode,
            Self::City,
            Self::State,
            Self::Country,
            Self::ImageName,
            Self::ImageBlob,
            Self::Breadth,
            Self::Length,
            Self::Depth,
            Self::Status,
            Self::CreatedAt,
        ]
    }

    /// The columns the dashboard table shows, image last.
    #[must_use]
    pub const fn dashboard() -> &'static [Self] {
        &[
            Self::Id,
            Self::Email,
            Self::Phone,
            Self::Address,
            Self::Latitude,
            Self::Longitude,
            Self::Postcode,
            Self::City,
            Self::State,
            Self::Country,
            Self::Breadth,
            Self::Length,
            Self::Depth,
            Self::Status,
        ]
    }

    /// Returns how this column is stored.
    #[must_use]
    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::Id => ColumnKind::Integer,
            Self::Latitude | Self::Longitude | Self::Breadth | Self::Length | Self::Depth => {
                ColumnKind::Real
            }
            Self::ImageBlob => ColumnKind::Blob,
            Self::Email
            | Self::Phone
            | Self::Address
            | Self::Postcode
            | Self::City
            | Self::State
            | Self::Country
            | Self::ImageName
            | Self::Status
            | Self::CreatedAt => ColumnKind::Text,
        }
    }

    /// Human-readable header for tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "#",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Postcode => "Postcode",
            Self::City => "City",
            Self::State => "State",
            Self::Country => "Country",
            Self::ImageName => "Image file",
            Self::ImageBlob => "Image",
            Self::Breadth => "Breadth (m)",
            Self::Length => "Length (m)",
            Self::Depth => "Depth (m)",
            Self::Status => "Status",
            Self::CreatedAt => "Submitted at",
        }
    }
}

/// A single projected cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL `NULL`.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Blob(Vec<u8>),
}

impl ColumnValue {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number as `f64`, if this is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a binary value.
    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Renders the value for display in a table cell.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// One row of a projection, holding values in the requested column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedRow {
    values: Vec<(ReportColumn, ColumnValue)>,
}

impl ProjectedRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends a column value.
    pub fn push(&mut self, column: ReportColumn, value: ColumnValue) {
        self.values.push((column, value));
    }

    /// Returns the value of `column`, if it was projected.
    #[must_use]
    pub fn get(&self, column: ReportColumn) -> Option<&ColumnValue> {
        self.values
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    /// Iterates values in projection order.
    pub fn iter(&self) -> impl Iterator<Item = &(ReportColumn, ColumnValue)> {
        self.values.iter()
    }

    fn text(&self, column: ReportColumn) -> Option<String> {
        self.get(column)
            .and_then(ColumnValue::as_str)
            .map(ToString::to_string)
    }

    fn real(&self, column: ReportColumn) -> Option<f64> {
        self.get(column).and_then(ColumnValue::as_f64)
    }

    fn required_text(&self, column: ReportColumn) -> Result<String, ReportConversionError> {
        self.text(column)
            .ok_or_else(|| ReportConversionError::missing(column))
    }

    fn required_real(&self, column: ReportColumn) -> Result<f64, ReportConversionError> {
        self.real(column)
            .ok_or_else(|| ReportConversionError::missing(column))
    }
}

/// Error returned when a [`ProjectedRow`] cannot form a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid report row: {message}")]
pub struct ReportConversionError {
    /// What went wrong.
    pub message: String,
}

impl ReportConversionError {
    fn missing(column: ReportColumn) -> Self {
        Self {
            message: format!("missing or mistyped column {}", column.as_ref()),
        }
    }
}

impl TryFrom<ProjectedRow> for Report {
    type Error = ReportConversionError;

    /// Builds a report from a row projected with [`ReportColumn::all`].
    ///
    /// Nullable measurement columns default to zero, matching the form's
    /// default when the optional dimensions are left blank.
    fn try_from(row: ProjectedRow) -> Result<Self, Self::Error> {
        let id = row
            .get(ReportColumn::Id)
            .and_then(ColumnValue::as_i64)
            .ok_or_else(|| ReportConversionError::missing(ReportColumn::Id))?;

        let status = match row.text(ReportColumn::Status) {
            Some(code) => code.parse().map_err(|_| ReportConversionError {
                message: format!("unknown status code {code:?}"),
            })?,
            None => ReportStatus::default(),
        };

        let created_at = match row.text(ReportColumn::CreatedAt) {
            Some(ts) => Some(NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).map_err(
                |e| ReportConversionError {
                    message: format!("bad timestamp {ts:?}: {e}"),
                },
            )?),
            None => None,
        };

        Ok(Self {
            id,
            contact: ContactInfo {
                email: row.required_text(ReportColumn::Email)?,
                phone: row.required_text(ReportColumn::Phone)?,
            },
            address: ReportAddress {
                display_name: row.text(ReportColumn::Address),
                postcode: row.text(ReportColumn::Postcode),
                city: row.text(ReportColumn::City),
                state: row.text(ReportColumn::State),
                country: row.text(ReportColumn::Country),
            },
            coordinates: Coordinates {
                latitude: row.required_real(ReportColumn::Latitude)?,
                longitude: row.required_real(ReportColumn::Longitude)?,
            },
            image_name: row.text(ReportColumn::ImageName),
            image: row
                .get(ReportColumn::ImageBlob)
                .and_then(ColumnValue::as_blob)
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
            dimensions: Dimensions {
                breadth: row.real(ReportColumn::Breadth).unwrap_or(0.0),
                length: row.real(ReportColumn::Length).unwrap_or(0.0),
                depth: row.real(ReportColumn::Depth).unwrap_or(0.0),
            },
            status,
            created_at,
        })
    }
}
