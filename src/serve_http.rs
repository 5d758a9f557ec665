//! The query form, served over http.
//!
//! + `GET /` renders the form with the default filter.
//! + `POST /` runs a form submission through [`pipeline::submit()`] and renders the form again
//!   with the result.
//! + `POST /api/query` does the same for a json [`FilterState`], responding with the json
//!   [`ResultState`].

use std::{fmt::Write, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use eyre::Context;
use html_builder::Html5;
use opmet::ReportType;
use reqwest::StatusCode;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    filter::FilterState,
    group::GroupedResults,
    highlight::Markup,
    pipeline::{self, ResultState},
    report_service,
};

/// Options for running this application's http server.
pub struct Options {
    /// Address the server listens on.
    pub listen_address: SocketAddr,
    /// Service used to answer queries.
    pub report_service: Arc<dyn report_service::Port>,
}

#[derive(Clone)]
struct AppState {
    report_service: Arc<dyn report_service::Port>,
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2em; }
.error { color: #b00020; border: 1px solid #b00020; padding: 0.5em; margin-bottom: 1em; }
.loading { font-style: italic; }
label { margin-right: 1em; }
table { border-collapse: collapse; margin-bottom: 1.5em; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }
td.text { font-family: monospace; }
"#;

const SCRIPT: &str = r#"
document.getElementById("filter").addEventListener("submit", function () {
    document.getElementById("loading").hidden = false;
});
"#;

/// Contents of the submitted form. Checkboxes are only present when checked.
#[derive(Debug, Default, Deserialize)]
struct FilterForm {
    #[serde(default)]
    airports: String,
    #[serde(default)]
    countries: String,
    metar: Option<String>,
    sigmet: Option<String>,
    taf: Option<String>,
}

impl From<FilterForm> for FilterState {
    fn from(form: FilterForm) -> Self {
        let report_types = [
            (ReportType::Metar, form.metar.is_some()),
            (ReportType::Sigmet, form.sigmet.is_some()),
            (ReportType::Taf, form.taf.is_some()),
        ]
        .into_iter()
        .filter_map(|(report_type, checked)| checked.then_some(report_type));

        FilterState::new(form.airports, form.countries, report_types)
    }
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
    #[error("Internal server error")]
    InternalServerError(#[from] eyre::Error),
}

impl From<std::fmt::Error> for ServeError {
    fn from(error: std::fmt::Error) -> Self {
        Self::InternalServerError(eyre::Error::from(error))
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServeError::InternalServerError(error) => {
                tracing::error!("Error rendering page: {:?}", error);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn form_name(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Metar => "metar",
        ReportType::Sigmet => "sigmet",
        ReportType::Taf => "taf",
    }
}

fn render_page(filter: &FilterState, result: Option<&ResultState>) -> Result<String, ServeError> {
    let mut buf = html_builder::Buffer::new();
    let mut html = buf.html();
    let mut head = html.head();
    write!(head.title(), "OPMET query")?;
    write!(head.style(), "{}", STYLE)?;

    let mut body = html.body();
    write!(body.h1(), "OPMET query")?;

    if let Some(message) = result.and_then(ResultState::message) {
        let mut banner = body.div().attr(r#"class="error""#);
        write!(banner, "{}", Markup::escape(message))?;
    }

    let mut form = body.form().attr(r#"id="filter" method="post" action="/""#);

    let mut airports = form.label();
    write!(airports, "Airports ")?;
    airports.input().attr(&format!(
        r#"type="text" name="airports" placeholder="LKPR LKTB" value="{}""#,
        Markup::escape(&filter.airport_codes)
    ));

    let mut countries = form.label();
    write!(countries, "Countries ")?;
    countries.input().attr(&format!(
        r#"type="text" name="countries" placeholder="CZ SK" value="{}""#,
        Markup::escape(&filter.country_codes)
    ));

    for &report_type in ReportType::enumerate() {
        let checked = if filter.is_selected(report_type) {
            " checked"
        } else {
            ""
        };
        let mut label = form.label();
        label.input().attr(&format!(
            r#"type="checkbox" name="{}" value="on"{}"#,
            form_name(report_type),
            checked
        ));
        write!(label, " {}", report_type)?;
    }

    write!(form.button().attr(r#"type="submit""#), "Query")?;

    write!(
        body.div().attr(r#"id="loading" class="loading" hidden"#),
        "Loading..."
    )?;

    if let Some(results) = result.and_then(ResultState::results) {
        render_results(&mut body, results)?;
    }

    write!(body.script(), "{}", SCRIPT)?;

    Ok(buf.finish())
}

fn render_results(body: &mut html_builder::Node, results: &GroupedResults) -> Result<(), ServeError> {
    if results.is_empty() {
        write!(body.p(), "No reports found.")?;
        return Ok(());
    }

    for station in results.stations() {
        let mut table = body.table().attr(r#"class="station""#);
        let mut header = table.tr();
        write!(
            header.th().attr(r#"colspan="2""#),
            "{}",
            Markup::escape(&station.station_id)
        )?;

        for report in &station.reports {
            let mut row = table.tr();
            let report_type = report
                .extra
                .get("queryType")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            write!(row.td(), "{}", Markup::escape(report_type))?;
            write!(row.td().attr(r#"class="text""#), "{}", report.text)?;
        }
    }

    Ok(())
}

async fn get_index() -> Result<Html<String>, ServeError> {
    Ok(Html(render_page(&FilterState::default(), None)?))
}

async fn post_index(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Html<String>, ServeError> {
    let filter = FilterState::from(form);
    let result = pipeline::submit(&filter, state.report_service.as_ref()).await;
    Ok(Html(render_page(&filter, Some(&result))?))
}

async fn post_api_query(
    State(state): State<AppState>,
    Json(filter): Json<FilterState>,
) -> Json<ResultState> {
    Json(pipeline::submit(&filter, state.report_service.as_ref()).await)
}

/// Http routes for the query form and api.
pub fn router(report_service: Arc<dyn report_service::Port>) -> Router {
    Router::new()
        .route("/", get(get_index).post(post_index))
        .route("/api/query", post(post_api_query))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { report_service })
}

/// Run this service's http server until a shutdown message is broadcast.
#[tracing::instrument(skip(shutdown_rx, options))]
pub async fn serve_http(
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
    options: Options,
) -> eyre::Result<()> {
    let app = router(options.report_service);

    tracing::info!("Serving query form at http://{}/", options.listen_address);
    axum::Server::try_bind(&options.listen_address)
        .wrap_err_with(|| format!("Unable to bind to {}", options.listen_address))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move {
            if let Err(error) = shutdown_rx.recv().await {
                tracing::error!("Error receiving shutdown message: {:?}", error);
            }
            tracing::debug!("Received shutdown broadcast");
        })
        .await
        .wrap_err("Error while serving http")
}
