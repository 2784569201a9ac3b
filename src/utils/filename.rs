use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

fn stamp(date: NaiveDate) -> String {
    format!("{:02}{:02}{:02}", date.year() % 100, date.month(), date.day())
}

/// Default persisted table path: data/aqi-raw-{YYMMDD}.csv
pub fn generate_default_table_filename() -> PathBuf {
    table_filename_for(Local::now().date_naive())
}

/// Default split output directory: output/aqi-split-{YYMMDD}
pub fn generate_default_split_dir() -> PathBuf {
    split_dir_for(Local::now().date_naive())
}

fn table_filename_for(date: NaiveDate) -> PathBuf {
    PathBuf::from("data").join(format!("aqi-raw-{}.csv", stamp(date)))
}

fn split_dir_for(date: NaiveDate) -> PathBuf {
    PathBuf::from("output").join(format!("aqi-split-{}", stamp(date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(table_filename_for(date), PathBuf::from("data/aqi-raw-250307.csv"));
        assert_eq!(split_dir_for(date), PathBuf::from("output/aqi-split-250307"));
    }

    #[test]
    fn test_default_names_have_expected_shape() {
        let table = generate_default_table_filename();
        let name = table.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("aqi-raw-"));
        assert!(name.ends_with(".csv"));
        assert!(generate_default_split_dir().starts_with("output"));
    }
}
