//! Grouping of highlighted reports by station.
//! See [`group_reports()`].

use std::collections::HashMap;

use opmet::ReportRecord;
use serde::{ser::SerializeMap, Serialize};

use crate::highlight::{highlight, Markup};

/// A [`ReportRecord`] with its text replaced by highlighted markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedReport {
    /// ICAO id of the reporting station.
    pub station_id: String,
    /// Escaped report text with cloud layers highlighted.
    pub text: Markup,
    /// Fields of the record which are passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<ReportRecord> for HighlightedReport {
    fn from(record: ReportRecord) -> Self {
        Self {
            text: highlight(&record.text),
            station_id: record.station_id,
            extra: record.extra,
        }
    }
}

/// Reports of a single station, in the order they were received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReports {
    /// ICAO id of the station.
    pub station_id: String,
    /// The station's reports.
    pub reports: Vec<HighlightedReport>,
}

/// Reports grouped by station id.
///
/// Stations are kept in the order of their first report, reports within a station in the order
/// they were pushed. Serializes as a map from station id to reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedResults {
    stations: Vec<StationReports>,
    index: HashMap<String, usize>,
}

impl GroupedResults {
    /// Append `report` to its station's group, creating the group if this is the station's first
    /// report.
    pub fn push(&mut self, report: HighlightedReport) {
        match self.index.get(&report.station_id) {
            Some(&i) => self.stations[i].reports.push(report),
            None => {
                self.index
                    .insert(report.station_id.clone(), self.stations.len());
                self.stations.push(StationReports {
                    station_id: report.station_id.clone(),
                    reports: vec![report],
                });
            }
        }
    }

    /// Reports for `station_id`, if any were received.
    pub fn get(&self, station_id: &str) -> Option<&[HighlightedReport]> {
        self.index
            .get(station_id)
            .map(|&i| self.stations[i].reports.as_slice())
    }

    /// Stations in the order of their first report.
    pub fn stations(&self) -> &[StationReports] {
        &self.stations
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether there are no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Number of reports across all stations.
    pub fn report_count(&self) -> usize {
        self.stations.iter().map(|s| s.reports.len()).sum()
    }
}

impl Serialize for GroupedResults {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.stations.len()))?;
        for station in &self.stations {
            map.serialize_entry(&station.station_id, &station.reports)?;
        }
        map.end()
    }
}

/// Highlight every record's text and group the records by station, preserving response order.
pub fn group_reports(records: impl IntoIterator<Item = ReportRecord>) -> GroupedResults {
    records
        .into_iter()
        .fold(GroupedResults::default(), |mut grouped, record| {
            grouped.push(HighlightedReport::from(record));
            grouped
        })
}
