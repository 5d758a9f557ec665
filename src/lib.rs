//! opmet-query library crate
//!
//! A form for querying METAR, SIGMET and TAF reports from the OPMET service, rendering them
//! grouped by station with cloud layers highlighted.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod filter;
pub mod group;
pub mod highlight;
pub mod options;
pub mod pipeline;
pub mod query;
pub mod report_service;
pub mod reporting;
pub mod serve_http;
