//! Building OPMET query requests from a [`FilterState`].

use opmet::{QueryParameters, QueryRequest, ReportType, PARAMETERS_ID};

use crate::filter::FilterState;

/// Build the request for `filter`. The filter is expected to have passed
/// [`FilterState::validate()`], see [`FilterState::to_query()`].
pub fn build_query(filter: &FilterState) -> QueryRequest {
    let report_types: Vec<ReportType> = filter.report_types.iter().copied().collect();
    let parameters = QueryParameters::builder()
        .id(PARAMETERS_ID.to_owned())
        .report_types(report_types)
        .stations(split_codes(&filter.airport_codes))
        .countries(split_codes(&filter.country_codes))
        .build();

    QueryRequest::new(parameters)
}

/// Split a validated list of codes into its tokens. Tokens are separated by exactly one
/// whitespace character.
fn split_codes(codes: &str) -> Vec<String> {
    if codes.is_empty() {
        return Vec::new();
    }
    codes.split(char::is_whitespace).map(str::to_owned).collect()
}
