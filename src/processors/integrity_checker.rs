use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;

use crate::models::ObservationTable;
use crate::processors::skeleton::HourlySkeleton;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_rows: usize,
    pub total_locations: usize,
    pub grid_violations: Vec<GridViolation>,
    pub location_statistics: BTreeMap<String, LocationStatistics>,
    pub column_missing: BTreeMap<String, usize>,
}

impl IntegrityReport {
    pub fn is_complete_grid(&self) -> bool {
        self.grid_violations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GridViolation {
    pub location: String,
    pub timestamp: Option<NaiveDateTime>,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    DuplicateHour,
    MissingHours,
    OutOfOrder,
    ExtentMismatch,
}

#[derive(Debug, Clone, Default)]
pub struct LocationStatistics {
    pub rows: usize,
    pub empty_rows: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub pm25_min: Option<f64>,
    pub pm25_max: Option<f64>,
}

/// Verifies the complete-grid invariant: one row per hour per location, no gaps
pub struct IntegrityChecker<'a> {
    skeleton: Option<&'a HourlySkeleton>,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new() -> Self {
        Self { skeleton: None }
    }

    /// Also require every location to span exactly the skeleton's extent
    pub fn with_skeleton(skeleton: &'a HourlySkeleton) -> Self {
        Self {
            skeleton: Some(skeleton),
        }
    }

    pub fn check_integrity(&self, table: &ObservationTable) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_rows: table.row_count(),
            total_locations: table.location_count(),
            grid_violations: Vec::new(),
            location_statistics: BTreeMap::new(),
            column_missing: BTreeMap::new(),
        };

        for series in table.series() {
            let name = series.name().to_string();
            let timestamps = series.timestamps();

            self.check_time_series(&name, timestamps, &mut report);

            let mut stats = LocationStatistics {
                rows: series.len(),
                first: timestamps.first().copied(),
                last: timestamps.last().copied(),
                ..Default::default()
            };

            stats.empty_rows = (0..series.len())
                .filter(|&row| series.columns().iter().all(|c| c.data.is_null(row)))
                .count();

            if let Some(pm25) = series.float("pm2_5") {
                for value in pm25.iter().flatten() {
                    stats.pm25_min = Some(stats.pm25_min.map_or(*value, |m| m.min(*value)));
                    stats.pm25_max = Some(stats.pm25_max.map_or(*value, |m| m.max(*value)));
                }
            }

            for column in series.columns() {
                *report.column_missing.entry(column.name.clone()).or_default() +=
                    column.data.null_count();
            }

            report.location_statistics.insert(name, stats);
        }

        report
    }

    fn check_time_series(&self, location: &str, timestamps: &[NaiveDateTime], report: &mut IntegrityReport) {
        for window in timestamps.windows(2) {
            let (prev, curr) = (window[0], window[1]);
            let step = curr - prev;

            let violation = if step == Duration::zero() {
                Some((ViolationType::DuplicateHour, format!("{} appears twice", curr)))
            } else if step < Duration::zero() {
                Some((ViolationType::OutOfOrder, format!("{} follows {}", curr, prev)))
            } else if step > Duration::hours(1) {
                Some((
                    ViolationType::MissingHours,
                    format!("{} hours missing between {} and {}", step.num_hours() - 1, prev, curr),
                ))
            } else {
                None
            };

            if let Some((violation_type, details)) = violation {
                report.grid_violations.push(GridViolation {
                    location: location.to_string(),
                    timestamp: Some(curr),
                    violation_type,
                    details,
                });
            }
        }

        if let Some(skeleton) = self.skeleton {
            let expected = skeleton.timestamps();
            if timestamps.first() != expected.first()
                || timestamps.last() != expected.last()
                || timestamps.len() != expected.len()
            {
                report.grid_violations.push(GridViolation {
                    location: location.to_string(),
                    timestamp: None,
                    violation_type: ViolationType::ExtentMismatch,
                    details: format!(
                        "{} rows from {:?} to {:?}, expected {} rows from {} to {}",
                        timestamps.len(),
                        timestamps.first(),
                        timestamps.last(),
                        expected.len(),
                        skeleton.start(),
                        skeleton.end()
                    ),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Grid Integrity Report ===\n");
        summary.push_str(&format!("Locations: {}\n", report.total_locations));
        summary.push_str(&format!("Total Rows: {}\n", report.total_rows));
        summary.push_str(&format!(
            "Complete Grid: {}\n",
            if report.is_complete_grid() { "yes" } else { "no" }
        ));

        if !report.column_missing.is_empty() && report.total_rows > 0 {
            summary.push_str("\nMissing Values by Column:\n");
            for (column, missing) in &report.column_missing {
                summary.push_str(&format!(
                    "  {:<16} {:>10} ({:.1}%)\n",
                    column,
                    missing,
                    100.0 * *missing as f64 / report.total_rows as f64
                ));
            }
        }

        let empty: Vec<&String> = report
            .location_statistics
            .iter()
            .filter(|(_, s)| s.rows > 0 && s.empty_rows == s.rows)
            .map(|(name, _)| name)
            .collect();
        if !empty.is_empty() {
            summary.push_str(&format!("\nLocations without any data: {}\n", empty.len()));
            for name in empty {
                summary.push_str(&format!("  - {}\n", name));
            }
        }

        summary.push_str(&format!("\nGrid Violations: {}\n", report.grid_violations.len()));
        if !report.grid_violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.grid_violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} ({:?}): {}\n",
                    i + 1,
                    violation.location,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker<'_> {
    fn default() -> Self {
        Self::new()
    }
}
