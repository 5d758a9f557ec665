//! The user's selection of reports to query, and its validation.
//! See [`FilterState::validate()`].

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use opmet::{QueryRequest, ReportType};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One or more four letter ICAO station codes separated by single whitespace characters.
static AIRPORT_CODES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}(\s[A-Z]{4})*$").expect("Invalid airport codes pattern"));

/// One or more two letter country codes separated by single whitespace characters.
static COUNTRY_CODES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}(\s[A-Z]{2})*$").expect("Invalid country codes pattern"));

/// Reason a [`FilterState`] cannot be used for a query. The display string is the message shown
/// to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No report type is selected.
    #[error("Select at least one message type.")]
    NoReportType,
    /// Both the airport and the country codes are empty.
    #[error("Input at least one airport or country.")]
    NoLocation,
    /// A non-empty code list does not match its pattern.
    #[error("Put countries and airports in correct format.")]
    InvalidFormat,
}

/// A snapshot of the query form.
///
/// A new value is constructed for every submission, it is never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Space separated ICAO station codes, e.g. `LKPR LKTB`.
    #[serde(default)]
    pub airport_codes: String,
    /// Space separated country codes, e.g. `CZ SK`.
    #[serde(default)]
    pub country_codes: String,
    /// Selected report types. Iterates in priority order.
    #[serde(default)]
    pub report_types: BTreeSet<ReportType>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new("LKPR", "CZ", [ReportType::Metar])
    }
}

impl FilterState {
    /// Construct a new [`FilterState`].
    pub fn new(
        airport_codes: impl Into<String>,
        country_codes: impl Into<String>,
        report_types: impl IntoIterator<Item = ReportType>,
    ) -> Self {
        Self {
            airport_codes: airport_codes.into(),
            country_codes: country_codes.into(),
            report_types: report_types.into_iter().collect(),
        }
    }

    /// Whether `report_type` is part of the selection.
    pub fn is_selected(&self, report_type: ReportType) -> bool {
        self.report_types.contains(&report_type)
    }

    /// Check that this filter can be used for a query. Rules are checked in order and the first
    /// one to fail is returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.report_types.is_empty() {
            return Err(ValidationError::NoReportType);
        }

        if self.airport_codes.is_empty() && self.country_codes.is_empty() {
            return Err(ValidationError::NoLocation);
        }

        let airports_valid =
            self.airport_codes.is_empty() || AIRPORT_CODES.is_match(&self.airport_codes);
        let countries_valid =
            self.country_codes.is_empty() || COUNTRY_CODES.is_match(&self.country_codes);
        if !(airports_valid && countries_valid) {
            return Err(ValidationError::InvalidFormat);
        }

        Ok(())
    }

    /// Validate this filter and build the request for it.
    pub fn to_query(&self) -> Result<QueryRequest, ValidationError> {
        self.validate()?;
        Ok(crate::query::build_query(self))
    }
}

#[cfg(test)]
mod test {
    use opmet::ReportType;

    use super::{FilterState, ValidationError};

    #[test]
    fn test_no_report_type() {
        for (airports, countries) in [("LKPR", "CZ"), ("", ""), ("lkpr", "CZE")] {
            let filter = FilterState::new(airports, countries, []);
            assert_eq!(Err(ValidationError::NoReportType), filter.validate());
        }
        assert_eq!(
            "Select at least one message type.",
            ValidationError::NoReportType.to_string()
        );
    }

    #[test]
    fn test_no_location() {
        let filter = FilterState::new("", "", [ReportType::Sigmet]);
        let error = filter.validate().unwrap_err();
        assert_eq!(ValidationError::NoLocation, error);
        assert_eq!("Input at least one airport or country.", error.to_string());
    }

    #[test]
    fn test_invalid_format() {
        let invalid = [
            ("lkpr", ""),
            ("LKP", ""),
            ("LKPRX", ""),
            ("LKPR  LKTB", ""),
            ("LKPR ", ""),
            (" LKPR", ""),
            ("LKPR,LKTB", ""),
            ("", "CZE"),
            ("", "cz"),
            ("", "CZ SK "),
            ("LKPR", "C"),
            ("LKPR1", "CZ"),
        ];
        for (airports, countries) in invalid {
            let filter = FilterState::new(airports, countries, [ReportType::Metar]);
            assert_eq!(
                Err(ValidationError::InvalidFormat),
                filter.validate(),
                "airports: {:?}, countries: {:?}",
                airports,
                countries
            );
        }
        assert_eq!(
            "Put countries and airports in correct format.",
            ValidationError::InvalidFormat.to_string()
        );
    }

    #[test]
    fn test_valid() {
        let valid = [
            ("LKPR", ""),
            ("", "CZ"),
            ("LKPR", "CZ"),
            ("LKPR LKTB EGLL", ""),
            ("", "CZ SK DE"),
            ("LKPR\tLKTB", "CZ"),
        ];
        for (airports, countries) in valid {
            let filter = FilterState::new(airports, countries, [ReportType::Taf]);
            assert_eq!(Ok(()), filter.validate());
        }
    }

    #[test]
    fn test_default() {
        let filter = FilterState::default();
        assert_eq!("LKPR", filter.airport_codes);
        assert_eq!("CZ", filter.country_codes);
        assert!(filter.is_selected(ReportType::Metar));
        assert!(!filter.is_selected(ReportType::Sigmet));
        assert!(!filter.is_selected(ReportType::Taf));
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_to_query_rejects_invalid() {
        let filter = FilterState::new("", "", [ReportType::Metar]);
        assert_eq!(Err(ValidationError::NoLocation), filter.to_query());
    }

    #[test]
    fn test_deserialize() {
        let filter: FilterState = serde_json::from_value(serde_json::json!({
            "airportCodes": "LKTB",
            "reportTypes": ["TAF", "METAR"],
        }))
        .unwrap();
        assert_eq!(FilterState::new("LKTB", "", [ReportType::Metar, ReportType::Taf]), filter);
    }
}
