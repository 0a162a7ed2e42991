//! Server-rendered HTML pages.
//!
//! Pages are plain HTML with a little inline JavaScript; the map page pulls
//! Leaflet from a CDN. All dynamic text goes through [`escape_html`].

use std::fmt::Write as _;

use actix_web::{HttpResponse, http::StatusCode, web};
use ecoroad_database::queries;
use ecoroad_report_models::{ColumnValue, ProjectedRow, ReportColumn};
use ecoroad_server_models::{
    ApiSimulation, GRID_SIZE_RANGE, MapQueryParams, NUM_POTHOLES_RANGE, RATE_RANGE,
    SimulationQueryParams, image_url,
};
use ecoroad_simulation::SimulationParams;

use crate::AppState;
use crate::handlers::run_simulation;

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5fff5; color: #1b1b1b; }
header { background: #2e7d32; color: #fff; padding: 0.75rem 1.5rem; display: flex; gap: 1.5rem; align-items: baseline; }
header a { color: #fff; text-decoration: none; }
header strong { font-size: 1.25rem; margin-right: auto; }
main { padding: 1.5rem; max-width: 1200px; margin: 0 auto; }
h1, h2, h3 { color: #2e7d32; }
.card { border-radius: 12px; padding: 1.25rem; background: #e8f5e9; box-shadow: 2px 2px 10px rgba(0,0,0,0.1); margin-bottom: 1.5rem; }
.error { background: #ffebee; color: #b71c1c; }
.success { background: #e8f5e9; color: #1b5e20; }
button { background: #2e7d32; color: #fff; border: none; border-radius: 5px; padding: 0.5rem 1rem; cursor: pointer; }
button:hover { background: #1b5e20; }
label { display: block; margin: 0.5rem 0 0.25rem; }
table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
th, td { border: 1px solid #c8e6c9; padding: 0.35rem 0.5rem; text-align: left; vertical-align: top; }
th { background: #c8e6c9; }
#map { height: 480px; border-radius: 12px; margin-bottom: 1.5rem; }
footer { text-align: center; color: #555; padding: 1rem; }
";

const LEAFLET_HEAD: &str = r#"<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>"#;

/// Map center used when there are no reports yet.
const DEFAULT_CENTER: (f64, f64) = (20.5937, 78.9629);

/// Heatmap cells per axis before the surface is downsampled.
const MAX_HEATMAP_CELLS: usize = 60;
const HEATMAP_SIZE: f64 = 480.0;

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | EcoRoad</title>
<style>{STYLE}</style>
{head}
</head>
<body>
<header>
<strong>EcoRoad</strong>
<a href="/">Home</a>
<a href="/report">Report damage</a>
<a href="/map">Map</a>
<a href="/simulate">Simulator</a>
</header>
<main>
{body}
</main>
<footer>EcoRoad Project | Together, we pave the way for a sustainable future.</footer>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn html(status: StatusCode, page: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page)
}

/// `GET /`
pub async fn landing() -> HttpResponse {
    let body = r#"<h1>EcoRoad Road Filling Dashboard</h1>
<h3>A community-driven initiative for sustainable road maintenance</h3>
<div class="card">
<p>EcoRoad monitors and manages <b>road damage</b> and <b>filling operations</b> with an
eco-friendly approach, keeping the carbon footprint low while improving road safety and
infrastructure lifespan.</p>
</div>
<h2>Get started</h2>
<div class="card">
<ul>
<li><a href="/report">Report damage</a>: photograph a pothole, share its location and size.</li>
<li><a href="/map">Map</a>: browse every reported location and the full reports table.</li>
<li><a href="/simulate">Simulator</a>: model a pothole surface and estimate the cost of filling it with paving blocks.</li>
</ul>
</div>"#;

    html(StatusCode::OK, layout("Home", "", body))
}

/// `GET /report`
pub async fn report_form() -> HttpResponse {
    let body = r#"<h1>Report road damage</h1>
<p>Help us build better, safer roads with your report.</p>
<form id="report-form">
<div class="card">
<h3>Photo of the damaged area (required)</h3>
<input type="file" id="photo" accept="image/*" capture="environment">
</div>
<div class="card">
<h3>Location (required)</h3>
<button type="button" id="locate">Get location</button>
<input type="hidden" id="lat"><input type="hidden" id="lon">
<p id="location-status"></p>
</div>
<div class="card">
<h3>Contact details</h3>
<label for="email">Email address</label><input type="email" id="email">
<label for="phone">Phone number</label><input type="tel" id="phone">
</div>
<div class="card">
<h3>Damage dimensions (optional)</h3>
<label><input type="radio" name="unit" value="ft" checked> ft</label>
<label><input type="radio" name="unit" value="cm"> cm</label>
<label><input type="radio" name="unit" value="m"> m</label>
<label for="breadth">Breadth</label><input type="number" id="breadth" step="0.2" min="0" value="0">
<label for="length">Length</label><input type="number" id="length" step="0.2" min="0" value="0">
<label for="depth">Depth</label><input type="number" id="depth" step="0.2" min="0" value="0">
</div>
<button type="submit">Submit report</button>
</form>
<div id="result"></div>
<script>
const $ = (id) => document.getElementById(id);
const escapeText = (s) => String(s).replace(/[&<>"']/g, (c) => `&#${c.charCodeAt(0)};`);

$("locate").addEventListener("click", () => {
  const status = $("location-status");
  if (!navigator.geolocation) {
    status.textContent = "Unable to get location. Try enabling permissions or reload the page.";
    return;
  }
  navigator.geolocation.getCurrentPosition(async (pos) => {
    const { latitude, longitude } = pos.coords;
    $("lat").value = latitude;
    $("lon").value = longitude;
    status.textContent = `Latitude: ${latitude}, Longitude: ${longitude}`;
    const resp = await fetch(`/api/geocode/reverse?lat=${latitude}&lon=${longitude}`);
    if (resp.ok) {
      const address = await resp.json();
      status.textContent += ` | Address: ${address.displayName}`;
    }
  }, () => {
    status.textContent = "Unable to get location. Try enabling permissions or reload the page.";
  });
});

$("report-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const params = new URLSearchParams({
    email: $("email").value,
    phone: $("phone").value,
    unit: document.querySelector("input[name=unit]:checked").value,
    breadth: $("breadth").value || "0",
    length: $("length").value || "0",
    depth: $("depth").value || "0",
  });
  if ($("lat").value && $("lon").value) {
    params.set("lat", $("lat").value);
    params.set("lon", $("lon").value);
  }
  const file = $("photo").files[0];
  const resp = await fetch(`/api/reports?${params}`, {
    method: "POST",
    headers: { "Content-Type": "application/octet-stream" },
    body: file ?? new Blob([]),
  });
  const data = await resp.json();
  const result = $("result");
  if (resp.ok) {
    result.className = "card success";
    result.innerHTML = `<h3>Report #${data.id} submitted</h3>
      <p>${escapeText(data.address.displayName)}</p>
      <p>Breadth ${data.breadth} m, length ${data.length} m, depth ${data.depth} m</p>`;
  } else {
    result.className = "card error";
    const issues = (data.issues ?? []).map((i) => `<li>${escapeText(i)}</li>`).join("");
    result.innerHTML = `<p>${escapeText(data.error)}</p><ul>${issues}</ul>`;
  }
});
</script>"#;

    html(StatusCode::OK, layout("Report damage", "", body))
}

fn row_id(row: &ProjectedRow) -> Option<i64> {
    row.get(ReportColumn::Id).and_then(ColumnValue::as_i64)
}

fn row_position(row: &ProjectedRow) -> Option<(f64, f64)> {
    let lat = row.get(ReportColumn::Latitude).and_then(ColumnValue::as_f64)?;
    let lon = row
        .get(ReportColumn::Longitude)
        .and_then(ColumnValue::as_f64)?;
    Some((lat, lon))
}

#[allow(clippy::cast_precision_loss)]
fn map_center(positions: &[(f64, f64)]) -> (f64, f64) {
    if positions.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = positions.len() as f64;
    let (lat, lon) = positions
        .iter()
        .fold((0.0, 0.0), |(la, lo), (lat, lon)| (la + lat, lo + lon));
    (lat / n, lon / n)
}

fn selected_panel(rows: &[ProjectedRow], selected: Option<i64>) -> String {
    let Some(id) = selected else {
        return "<p>Click on a map pin to view report details here.</p>".to_string();
    };
    let Some(row) = rows.iter().find(|row| row_id(row) == Some(id)) else {
        return format!("<p>Report {id} not found.</p>");
    };

    let mut panel = format!("<h3>Report #{id}</h3><table>");
    for (column, value) in row.iter() {
        let _ = write!(
            panel,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(column.label()),
            escape_html(&value.display())
        );
    }
    let _ = write!(
        panel,
        r#"</table><p><img src="{}" alt="Report {id}" style="max-width:100%;max-height:320px"></p>"#,
        image_url(id)
    );
    panel
}

fn reports_table(rows: &[ProjectedRow]) -> String {
    if rows.is_empty() {
        return "<p>No reports yet.</p>".to_string();
    }

    let mut table = String::from("<table><thead><tr>");
    for column in ReportColumn::dashboard() {
        let _ = write!(table, "<th>{}</th>", escape_html(column.label()));
    }
    let _ = write!(
        table,
        "<th>{}</th></tr></thead><tbody>",
        ReportColumn::ImageBlob.label()
    );

    for row in rows {
        table.push_str("<tr>");
        for (_, value) in row.iter() {
            let _ = write!(table, "<td>{}</td>", escape_html(&value.display()));
        }
        match row_id(row) {
            Some(id) => {
                let _ = write!(
                    table,
                    r#"<td><a href="/map?selected={id}"><img src="{}" alt="Report {id}" width="120" loading="lazy"></a></td>"#,
                    image_url(id)
                );
            }
            None => table.push_str("<td></td>"),
        }
        table.push_str("</tr>");
    }

    table.push_str("</tbody></table>");
    table
}

/// `GET /map`
///
/// One pin per report, the details panel for `?selected=<id>` and the full
/// reports table.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let rows = match queries::fetch_columns(state.db.as_ref(), ReportColumn::dashboard()).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to load reports for map: {e}");
            let body = r#"<div class="card error">Failed to load reports.</div>"#;
            return html(
                StatusCode::INTERNAL_SERVER_ERROR,
                layout("Map", "", body),
            );
        }
    };

    let pins: Vec<serde_json::Value> = rows
        .iter()
        .filter_map(|row| {
            let id = row_id(row)?;
            let (lat, lon) = row_position(row)?;
            Some(serde_json::json!({ "id": id, "lat": lat, "lon": lon }))
        })
        .collect();
    let positions: Vec<(f64, f64)> = rows.iter().filter_map(row_position).collect();
    let (center_lat, center_lon) = map_center(&positions);
    let zoom = if positions.is_empty() { 4 } else { 6 };

    let body = format!(
        r#"<h1>EcoRoad map</h1>
<p>Explore reported road damage. Click a pin for its details.</p>
<div id="map"></div>
<div class="card">
<h2>Selected location details</h2>
{panel}
</div>
<details open>
<summary><h2 style="display:inline">All reports ({count})</h2></summary>
{table}
</details>
<script>
const pins = {pins};
const map = L.map("map").setView([{center_lat}, {center_lon}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors",
}}).addTo(map);
for (const pin of pins) {{
  L.marker([pin.lat, pin.lon])
    .bindTooltip(`Latitude: ${{pin.lat}}<br>Longitude: ${{pin.lon}}`)
    .on("click", () => {{ window.location.search = `?selected=${{pin.id}}`; }})
    .addTo(map);
}}
</script>"#,
        panel = selected_panel(&rows, params.selected),
        count = rows.len(),
        table = reports_table(&rows),
        pins = serde_json::Value::Array(pins),
    );

    html(StatusCode::OK, layout("Map", LEAFLET_HEAD, &body))
}

fn slider(name: &str, label: &str, min: f64, max: f64, value: f64) -> String {
    format!(
        r#"<label for="{name}">{label}: <output id="{name}-value">{value}</output></label>
<input type="range" id="{name}" name="{name}" min="{min}" max="{max}" step="1" value="{value}"
 oninput="document.getElementById('{name}-value').value = this.value">"#
    )
}

#[allow(clippy::cast_precision_loss)]
fn simulation_form(params: &SimulationParams, seed: Option<u64>) -> String {
    let seed = seed.map(|s| s.to_string()).unwrap_or_default();
    format!(
        r#"<form class="card" method="get" action="/simulate">
{grid}
{potholes}
{selling}
{manufacturing}
<label for="seed">Seed (optional)</label><input type="number" id="seed" name="seed" min="0" value="{seed}">
<p><button type="submit">Run simulation</button></p>
</form>"#,
        grid = slider(
            "gridSize",
            "Grid size",
            *GRID_SIZE_RANGE.start() as f64,
            *GRID_SIZE_RANGE.end() as f64,
            params.grid_size as f64,
        ),
        potholes = slider(
            "numPotholes",
            "Number of potholes",
            *NUM_POTHOLES_RANGE.start() as f64,
            *NUM_POTHOLES_RANGE.end() as f64,
            params.num_potholes as f64,
        ),
        selling = slider(
            "sellingRate",
            "Selling price per m\u{b3} (thousands)",
            *RATE_RANGE.start(),
            *RATE_RANGE.end(),
            params.selling_rate,
        ),
        manufacturing = slider(
            "manufacturingRate",
            "Manufacturing price per m\u{b3} (thousands)",
            *RATE_RANGE.start(),
            *RATE_RANGE.end(),
            params.manufacturing_rate,
        ),
    )
}

/// Shade for a depth `fraction` of the deepest point, 0 (surface) to 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn depth_color(fraction: f64) -> String {
    let t = fraction.clamp(0.0, 1.0);
    let channel = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(232.0, 62.0),
        channel(245.0, 39.0),
        channel(233.0, 35.0)
    )
}

/// Renders the smoothed surface as an SVG heatmap, darker where deeper.
#[allow(clippy::cast_precision_loss)]
fn heatmap_svg(simulation: &ApiSimulation) -> String {
    let size = simulation.surface.len();
    if size == 0 {
        return String::new();
    }
    let step = size.div_ceil(MAX_HEATMAP_CELLS);
    let cells = size.div_ceil(step);
    let cell = HEATMAP_SIZE / cells as f64;
    let deepest = simulation
        .surface
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.min(*v));

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{HEATMAP_SIZE}" height="{HEATMAP_SIZE}" viewBox="0 0 {HEATMAP_SIZE} {HEATMAP_SIZE}" role="img" aria-label="Smoothed pothole surface">"#
    );
    for (i, row) in simulation.surface.iter().step_by(step).enumerate() {
        for (j, value) in row.iter().step_by(step).enumerate() {
            let fraction = if deepest < 0.0 { value / deepest } else { 0.0 };
            let _ = write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                j as f64 * cell,
                i as f64 * cell,
                cell + 0.5,
                cell + 0.5,
                depth_color(fraction)
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

fn simulation_summary(simulation: &ApiSimulation) -> String {
    let waste = simulation
        .waste_percent
        .map_or_else(|| "n/a".to_string(), |w| format!("{w:.2} %"));
    let rows = [
        (
            "Bounding box",
            format!(
                "{:.2} cm x {:.2} cm",
                simulation.bounding_length, simulation.bounding_width
            ),
        ),
        ("Maximum depth", format!("{:.2} cm", simulation.max_depth)),
        (
            "Volume before smoothing",
            format!("{:.2} cm\u{b3}", simulation.original_volume),
        ),
        (
            "Scaled volume after smoothing",
            format!("{:.2} cm\u{b3}", simulation.scaled_volume),
        ),
        (
            "Paving cuboid volume",
            format!("{:.2} cm\u{b3}", simulation.cuboid_volume),
        ),
        ("Material wasted by cuboid fill", waste),
        ("Selling price", format!("{:.2}", simulation.selling_price)),
        (
            "Manufacturing price",
            format!("{:.2}", simulation.manufacturing_price),
        ),
        ("Profit", format!("{:.2}", simulation.profit)),
        ("Margin", format!("{:.2} %", simulation.margin_percent)),
    ];

    let mut table = String::from("<table>");
    for (label, value) in rows {
        let _ = write!(
            table,
            "<tr><th>{label}</th><td>{}</td></tr>",
            escape_html(&value)
        );
    }
    table.push_str("</table>");
    table
}

/// `GET /simulate`
///
/// Re-runs the simulator on every load with the slider values from the
/// query string.
pub async fn simulator(
    state: web::Data<AppState>,
    params: web::Query<SimulationQueryParams>,
) -> HttpResponse {
    let shown = params
        .resolve()
        .unwrap_or_else(|_| SimulationParams::default());
    let form = simulation_form(&shown, params.seed);

    let (status, results) = match run_simulation(&state, &params) {
        Ok(simulation) => (
            StatusCode::OK,
            format!(
                r#"<div class="card">
<h2>Smoothed surface</h2>
{svg}
<p>{size} x {size} samples over {length:.0} cm, darker is deeper.</p>
</div>
<div class="card">
<h2>Dimensions and cost</h2>
{summary}
</div>"#,
                svg = heatmap_svg(&simulation),
                size = simulation.coords.len(),
                length = simulation.bounding_length,
                summary = simulation_summary(&simulation),
            ),
        ),
        Err(message) => (
            StatusCode::BAD_REQUEST,
            format!(r#"<div class="card error">{}</div>"#, escape_html(&message)),
        ),
    };

    let body = format!(
        r"<h1>Pothole simulator</h1>
<p>Generates a synthetic pothole surface from Gaussian depressions, smooths it and estimates
the cost of filling its bounding box with paving blocks.</p>
{form}
{results}"
    );

    html(status, layout("Simulator", "", &body))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, body::MessageBody, dev::ServiceResponse, test};

    use super::*;
    use crate::test_utils::test_state;

    #[::core::prelude::v1::test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; co&lt;/a&gt;"
        );
    }

    #[::core::prelude::v1::test]
    fn depth_color_spans_surface_to_deepest() {
        assert_eq!(depth_color(0.0), "#e8f5e9");
        assert_eq!(depth_color(1.0), "#3e2723");
        assert_eq!(depth_color(7.0), depth_color(1.0));
    }

    #[::core::prelude::v1::test]
    fn map_center_is_mean_of_pins() {
        assert_eq!(map_center(&[]), DEFAULT_CENTER);
        assert_eq!(map_center(&[(10.0, 70.0), (20.0, 80.0)]), (15.0, 75.0));
    }

    async fn page_text<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, String) {
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    macro_rules! get_page {
        ($app:expr, $uri:expr) => {
            page_text(test::call_service(&$app, test::TestRequest::get().uri($uri).to_request()).await)
                .await
        };
    }

    #[actix_web::test]
    async fn static_pages_render() {
        let app = test::init_service(App::new().configure(crate::configure)).await;

        let (status, body) = get_page!(app, "/");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("EcoRoad Road Filling Dashboard"));

        let (status, body) = get_page!(app, "/report");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"id="report-form""#));
    }

    #[actix_web::test]
    async fn map_shows_pins_table_and_selection() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let (status, body) = get_page!(app, "/map");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No reports yet."));
        assert!(body.contains("Click on a map pin"));

        let req = test::TestRequest::post()
            .uri("/api/reports?email=a%2Bb%40example.com&phone=9876543210&lat=13.05&lon=80.25")
            .set_payload(vec![1_u8, 2, 3])
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let (status, body) = get_page!(app, "/map?selected=1");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Report #1"));
        assert!(body.contains("a+b@example.com"));
        assert!(body.contains(r#"src="/api/reports/1/image""#));
        assert!(body.contains(r#""lat":13.05"#));

        let (_, body) = get_page!(app, "/map?selected=99");
        assert!(body.contains("Report 99 not found."));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn simulator_page_renders_heatmap_and_costs() {
        let (state, dir) = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let (status, body) = get_page!(app, "/simulate?gridSize=120&numPotholes=4");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<svg"));
        assert_eq!(body.matches("<rect").count(), 60 * 60);
        assert!(body.contains("Profit"));
        assert!(body.contains(r#"value="120""#));

        let (status, body) = get_page!(app, "/simulate?numPotholes=0");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("numPotholes must be between 1 and 300"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
