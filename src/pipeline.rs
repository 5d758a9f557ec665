//! A single query submission, from the filter to grouped results.
//! See [`submit()`].

use serde::Serialize;

use crate::{filter::FilterState, group::GroupedResults, report_service};

/// Message shown when the service responded with an error.
pub const SERVICE_ERROR_MESSAGE: &str = "The report service returned an error.";
/// Message shown when no usable response was received from the service.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "No data received from the report service.";

/// Outcome of one submission. Replaces the previous outcome as a whole, results from an earlier
/// submission are never kept alongside an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum ResultState {
    /// The query succeeded.
    Loaded(GroupedResults),
    /// The filter did not pass validation, no query was sent.
    Invalid(String),
    /// The service rejected the query.
    ServiceError(String),
    /// The request failed, or the response could not be read.
    TransportFailure(String),
}

impl ResultState {
    /// Message to show in the error banner, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResultState::Loaded(_) => None,
            ResultState::Invalid(message)
            | ResultState::ServiceError(message)
            | ResultState::TransportFailure(message) => Some(message),
        }
    }

    /// The grouped reports, if the query succeeded.
    pub fn results(&self) -> Option<&GroupedResults> {
        match self {
            ResultState::Loaded(results) => Some(results),
            _ => None,
        }
    }
}

/// Validate `filter`, query the report service with it, and group the highlighted reports.
#[tracing::instrument(skip(report_service))]
pub async fn submit(filter: &FilterState, report_service: &dyn report_service::Port) -> ResultState {
    let request = match filter.to_query() {
        Ok(request) => request,
        Err(error) => {
            tracing::debug!("Filter is invalid: {}", error);
            return ResultState::Invalid(error.to_string());
        }
    };

    if let Ok(request_json) = serde_json::to_string(&request) {
        tracing::debug!("Querying reports with {}", request_json);
    }

    let response = match report_service.obtain_reports(&request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!("Error obtaining reports: {:?}", error);
            return ResultState::TransportFailure(TRANSPORT_FAILURE_MESSAGE.to_owned());
        }
    };

    match response.into_result() {
        Ok(records) => {
            let grouped = crate::group::group_reports(records);
            tracing::info!(
                "Obtained {} reports for {} stations",
                grouped.report_count(),
                grouped.len()
            );
            ResultState::Loaded(grouped)
        }
        Err(error) => {
            tracing::warn!("Report service returned an error: {}", error);
            ResultState::ServiceError(SERVICE_ERROR_MESSAGE.to_owned())
        }
    }
}
