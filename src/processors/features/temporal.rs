use chrono::{Datelike, Timelike};
use std::f64::consts::PI;

use crate::error::Result;
use crate::models::{ColumnData, DayPart, LocationSeries, ObservationTable, Season};
use crate::utils::constants::{HOURS_PER_DAY, MONTHS_PER_YEAR, RUSH_HOURS, WEEKEND_FIRST_DAY};

/// Group 1: calendar and social-rhythm features derived from the timestamp
pub fn add_temporal_features(table: ObservationTable) -> Result<ObservationTable> {
    table.map_series(temporal_features)
}

fn temporal_features(mut series: LocationSeries) -> Result<LocationSeries> {
    let hours: Vec<u32> = series.timestamps().iter().map(|ts| ts.hour()).collect();
    let weekdays: Vec<u32> = series
        .timestamps()
        .iter()
        .map(|ts| ts.weekday().num_days_from_monday())
        .collect();
    let months: Vec<u32> = series.timestamps().iter().map(|ts| ts.month()).collect();

    series.insert_column("hour", integers(&hours))?;
    series.insert_column("hour_sin", cyclic(&hours, HOURS_PER_DAY, f64::sin))?;
    series.insert_column("hour_cos", cyclic(&hours, HOURS_PER_DAY, f64::cos))?;
    series.insert_column(
        "day_part",
        ColumnData::DayPart(hours.iter().map(|&h| DayPart::from_hour(h)).collect()),
    )?;
    series.insert_column(
        "is_rush_hour",
        flags(&hours, |h| RUSH_HOURS.contains(&h)),
    )?;

    series.insert_column("dayofweek", integers(&weekdays))?;
    series.insert_column("is_weekend", flags(&weekdays, |d| d >= WEEKEND_FIRST_DAY))?;

    series.insert_column("month", integers(&months))?;
    series.insert_column(
        "season",
        ColumnData::Season(months.iter().map(|&m| Season::from_month(m)).collect()),
    )?;
    series.insert_column("month_sin", cyclic(&months, MONTHS_PER_YEAR, f64::sin))?;
    series.insert_column("month_cos", cyclic(&months, MONTHS_PER_YEAR, f64::cos))?;

    Ok(series)
}

fn integers(values: &[u32]) -> ColumnData {
    ColumnData::Integer(values.iter().map(|&v| Some(i64::from(v))).collect())
}

fn flags(values: &[u32], pred: impl Fn(u32) -> bool) -> ColumnData {
    ColumnData::Integer(values.iter().map(|&v| Some(i64::from(pred(v)))).collect())
}

fn cyclic(values: &[u32], period: f64, f: fn(f64) -> f64) -> ColumnData {
    ColumnData::Float(
        values
            .iter()
            .map(|&v| Some(f(2.0 * PI * f64::from(v) / period)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use chrono::NaiveDate;

    fn table_from(start: chrono::NaiveDateTime, hours: usize) -> ObservationTable {
        let timestamps = (0..hours)
            .map(|h| start + chrono::Duration::hours(h as i64))
            .collect();
        let series = LocationSeries::new(Location::new("Hà Nội", 21.03, 105.85), timestamps);
        ObservationTable::new(vec![series]).unwrap()
    }

    #[test]
    fn test_hour_encoding_is_continuous_at_midnight() {
        // Saturday 2024-06-01 22:00 through Sunday 01:00
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        let table = add_temporal_features(table_from(start, 4)).unwrap();
        let s = table.get("Hà Nội").unwrap();

        let sin = s.float("hour_sin").unwrap();
        let cos = s.float("hour_cos").unwrap();
        // 23:00 and 00:00 are neighbours on the circle
        let d_wrap = ((sin[1].unwrap() - sin[2].unwrap()).powi(2)
            + (cos[1].unwrap() - cos[2].unwrap()).powi(2))
        .sqrt();
        let d_step = ((sin[0].unwrap() - sin[1].unwrap()).powi(2)
            + (cos[0].unwrap() - cos[1].unwrap()).powi(2))
        .sqrt();
        assert!((d_wrap - d_step).abs() < 1e-12);
        assert!((cos[2].unwrap() - 1.0).abs() < 1e-12);

        assert_eq!(
            s.column("is_weekend").unwrap(),
            &ColumnData::Integer(vec![Some(1); 4])
        );
        assert_eq!(
            s.column("dayofweek").unwrap(),
            &ColumnData::Integer(vec![Some(5), Some(5), Some(6), Some(6)])
        );
        assert_eq!(
            s.column("season").unwrap(),
            &ColumnData::Season(vec![Season::Summer; 4])
        );
    }

    #[test]
    fn test_rush_hour_and_day_part() {
        // Monday 2024-01-01
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = add_temporal_features(table_from(start, 24)).unwrap();
        let s = table.get("Hà Nội").unwrap();

        let rush = match s.column("is_rush_hour").unwrap() {
            ColumnData::Integer(v) => v.clone(),
            other => panic!("unexpected column {:?}", other),
        };
        let rush_hours: Vec<usize> = rush
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == Some(1))
            .map(|(h, _)| h)
            .collect();
        assert_eq!(rush_hours, vec![7, 8, 9, 17, 18, 19]);

        match s.column("day_part").unwrap() {
            ColumnData::DayPart(parts) => {
                assert_eq!(parts[9], DayPart::Morning);
                assert_eq!(parts[14], DayPart::Midday);
                assert_eq!(parts[17], DayPart::Afternoon);
                assert_eq!(parts[22], DayPart::Evening);
                assert_eq!(parts[23], DayPart::Night);
            }
            other => panic!("unexpected column {:?}", other),
        }

        assert_eq!(
            s.column("is_weekend").unwrap(),
            &ColumnData::Integer(vec![Some(0); 24])
        );
        assert_eq!(s.column("month").unwrap(), &ColumnData::Integer(vec![Some(1); 24]));
        let month_cos = s.float("month_cos").unwrap()[0].unwrap();
        assert!((month_cos - (2.0 * PI / 12.0).cos()).abs() < 1e-12);
    }
}
