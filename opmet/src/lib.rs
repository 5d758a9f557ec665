//! Client for the IBL OPMET query service, which serves aviation weather reports (METAR, SIGMET
//! and TAF) for a set of stations and countries.
//!
//! Requests are JSON-RPC shaped: a single `query` method whose only parameter object carries the
//! selection. See [`QueryRequest`] and [`obtain_reports()`].

use std::fmt::Display;

use once_cell::sync::Lazy;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Endpoint of the public OPMET query service.
pub const DEFAULT_ENDPOINT: &str = "https://ogcie.iblsoft.com/ria/opmetquery/ria/dbr";

/// Value of [`QueryRequest::id`]. The service echoes it back but it is not used to match
/// responses.
pub const REQUEST_ID: &str = "interviewId";

/// Value of [`QueryParameters::id`].
pub const PARAMETERS_ID: &str = "";

const QUERY_METHOD: &str = "query";

/// Type of aviation weather report.
///
/// The declaration order is the priority order used when listing report types in a request.
#[derive(
    EnumIter, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportType {
    /// Routine aerodrome weather observation.
    Metar,
    /// Significant meteorological information, hazards en-route.
    Sigmet,
    /// Terminal aerodrome forecast.
    Taf,
}

static REPORT_TYPE_VARIANTS: Lazy<Vec<ReportType>> = Lazy::new(|| ReportType::iter().collect());

impl ReportType {
    /// Enumerate all variants of [`ReportType`] in priority order.
    pub fn enumerate() -> &'static [ReportType] {
        REPORT_TYPE_VARIANTS.as_slice()
    }

    /// Name of the report type as used on the wire, e.g. `METAR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Metar => "METAR",
            ReportType::Sigmet => "SIGMET",
            ReportType::Taf => "TAF",
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selection part of a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, buildstructor::Builder)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    /// Placeholder identifier, see [`PARAMETERS_ID`].
    pub id: String,
    /// Report types to query, in priority order.
    pub report_types: Vec<ReportType>,
    /// ICAO codes of the stations to query, e.g. `LKPR`.
    pub stations: Vec<String>,
    /// Two letter country codes to query, e.g. `CZ`.
    pub countries: Vec<String>,
}

/// Body of a request to the OPMET query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub id: String,
    pub method: String,
    pub params: Vec<QueryParameters>,
}

impl QueryRequest {
    /// Construct a `query` request carrying a single set of parameters.
    pub fn new(parameters: QueryParameters) -> Self {
        Self {
            id: REQUEST_ID.to_owned(),
            method: QUERY_METHOD.to_owned(),
            params: vec![parameters],
        }
    }
}

/// A single report returned by the service.
///
/// Only the fields required for presentation are typed, everything else the service sends is
/// kept in [`ReportRecord::extra`] and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// ICAO code of the station which issued the report.
    pub station_id: String,
    /// Raw report text.
    pub text: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of a response from the OPMET query service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Present when the service rejected the query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ReportRecord>>,
}

impl QueryResponse {
    /// Split the response into the reports, or the error the service returned. A response which
    /// carries neither is an empty list of reports.
    ///
    /// An `error` of `null`, `false`, `0` or `""` does not count as an error.
    pub fn into_result(self) -> Result<Vec<ReportRecord>, serde_json::Value> {
        match self.error {
            Some(error) if is_truthy(&error) => Err(error),
            _ => Ok(self.result.unwrap_or_default()),
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error while performing request")]
    Reqwest(#[from] reqwest::Error),
    #[error("Response status unsuccessful, code: {code}, body: {body}")]
    ResponseStatusNotSuccessful { code: StatusCode, body: String },
    #[error("Error while parsing json")]
    SerdeJson(#[from] serde_json::Error),
}

/// Post `request` to `endpoint`, returning the raw response body.
pub async fn obtain_reports_json(
    client: &reqwest::Client,
    endpoint: &url::Url,
    request: &QueryRequest,
) -> Result<String, Error> {
    tracing::trace!("POST {}", endpoint);

    let response = client
        .request(Method::POST, endpoint.clone())
        .json(request)
        .send()
        .await?;

    if response.status().is_success() {
        response.text().await.map_err(Error::from)
    } else {
        Err(Error::ResponseStatusNotSuccessful {
            code: response.status(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Post `request` to `endpoint` and parse the response.
pub async fn obtain_reports(
    client: &reqwest::Client,
    endpoint: &url::Url,
    request: &QueryRequest,
) -> Result<QueryResponse, Error> {
    obtain_reports_json(client, endpoint, request)
        .await
        .and_then(|json| Ok(serde_json::from_str(&json)?))
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use crate::{
        obtain_reports, Error, QueryParameters, QueryRequest, QueryResponse, ReportType,
        PARAMETERS_ID,
    };

    fn lkpr_request() -> QueryRequest {
        QueryRequest::new(
            QueryParameters::builder()
                .id(PARAMETERS_ID.to_owned())
                .report_types(vec![ReportType::Metar, ReportType::Taf])
                .stations(vec!["LKPR".to_owned()])
                .countries(Vec::<String>::new())
                .build(),
        )
    }

    #[test]
    fn report_type_serialize() {
        assert_eq!(
            json!(["METAR", "SIGMET", "TAF"]),
            serde_json::to_value(ReportType::enumerate()).unwrap()
        );
        assert_eq!("SIGMET", ReportType::Sigmet.to_string());
    }

    #[test]
    fn request_serialize() {
        assert_eq!(
            json!({
                "id": "interviewId",
                "method": "query",
                "params": [{
                    "id": "",
                    "reportTypes": ["METAR", "TAF"],
                    "stations": ["LKPR"],
                    "countries": [],
                }],
            }),
            serde_json::to_value(lkpr_request()).unwrap()
        );
    }

    #[test]
    fn response_deserialize_keeps_extra_fields() {
        let response: QueryResponse = serde_json::from_value(json!({
            "id": "interviewId",
            "result": [{
                "stationId": "LKPR",
                "text": "METAR LKPR 161200Z 24008KT 9999 FEW030 BKN045 12/06 Q1018=",
                "queryType": "METAR",
                "reportTime": "2026-10-16 12:00:00",
            }],
        }))
        .unwrap();

        let reports = response.into_result().unwrap();
        assert_eq!(1, reports.len());
        assert_eq!("LKPR", reports[0].station_id);
        assert_eq!(Some(&json!("METAR")), reports[0].extra.get("queryType"));

        let round_tripped = serde_json::to_value(&reports[0]).unwrap();
        assert_eq!(json!("2026-10-16 12:00:00"), round_tripped["reportTime"]);
    }

    #[test]
    fn response_error() {
        let response: QueryResponse =
            serde_json::from_value(json!({"error": {"code": -32602, "message": "Invalid params"}}))
                .unwrap();
        let error = response.into_result().unwrap_err();
        assert_eq!(json!("Invalid params"), error["message"]);

        let empty: QueryResponse = serde_json::from_value(json!({"error": null})).unwrap();
        assert!(empty.into_result().unwrap().is_empty());
    }

    #[test]
    fn response_falsy_error_is_not_an_error() {
        for error in [json!(false), json!(0), json!(""), json!(null)] {
            let response: QueryResponse = serde_json::from_value(json!({
                "error": error,
                "result": [{"stationId": "LKPR", "text": "METAR LKPR 161200Z FEW030="}],
            }))
            .unwrap();
            assert_eq!(1, response.into_result().unwrap().len());
        }

        for error in [json!(true), json!(1), json!("Unknown station"), json!([])] {
            let response: QueryResponse =
                serde_json::from_value(json!({"error": error.clone()})).unwrap();
            assert_eq!(error, response.into_result().unwrap_err());
        }
    }

    #[tokio::test]
    async fn obtain_reports_posts_request() {
        let mock_server = MockServer::start().await;
        let request = lkpr_request();

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/ria/dbr"))
            .and(matchers::body_json(&request))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"stationId": "LKPR", "text": "METAR LKPR 161200Z BKN020="},
                    {"stationId": "LKPR", "text": "TAF LKPR 161100Z SCT045="},
                ],
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint: url::Url = format!("{}/ria/dbr", mock_server.uri()).parse().unwrap();
        let client = reqwest::Client::new();
        let response = obtain_reports(&client, &endpoint, &request).await.unwrap();
        let reports = response.into_result().unwrap();
        assert_eq!(2, reports.len());
        assert_eq!("TAF LKPR 161100Z SCT045=", reports[1].text);
    }

    #[tokio::test]
    async fn obtain_reports_unsuccessful_status() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint: url::Url = mock_server.uri().parse().unwrap();
        let client = reqwest::Client::new();
        let error = obtain_reports(&client, &endpoint, &lkpr_request())
            .await
            .unwrap_err();

        match error {
            Error::ResponseStatusNotSuccessful { code, body } => {
                assert_eq!(503, code.as_u16());
                assert_eq!("maintenance", body);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
