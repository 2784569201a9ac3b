use aqi_processor::models::{ColumnData, Location, LocationSeries, Measurement, ObservationTable};
use aqi_processor::processors::{FeatureEngine, RegionLabelClassifier, TemporalSplitter};
use aqi_processor::processors::features::window::{rolling_mean, rolling_std, shift};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const CITIES: [&str; 6] = ["Hà Nội", "Hải Phòng", "Vinh", "Đà Nẵng", "Đà Lạt", "Cần Thơ"];

// Labelled hourly table with every measurement present
fn create_test_table(locations: usize, hours: usize) -> ObservationTable {
    let t0 = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let series = (0..locations)
        .map(|l| {
            let name = CITIES[l % CITIES.len()];
            let name = if l < CITIES.len() {
                name.to_string()
            } else {
                format!("{} {}", name, l)
            };
            let timestamps = (0..hours).map(|h| t0 + Duration::hours(h as i64)).collect();
            let mut s = LocationSeries::new(Location::new(name, 16.0, 107.0), timestamps);
            for (i, m) in Measurement::ALL.iter().enumerate() {
                let values = (0..hours)
                    .map(|h| Some(10.0 + i as f64 + ((h * 13 + l * 7 + i) % 31) as f64))
                    .collect();
                s.insert_column(m.column_name(), ColumnData::Float(values)).unwrap();
            }
            s
        })
        .collect();

    RegionLabelClassifier::new()
        .apply(ObservationTable::new(series).unwrap())
        .unwrap()
}

fn benchmark_feature_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_engine");

    for &(locations, days) in &[(2, 30), (6, 90), (6, 365)] {
        let table = create_test_table(locations, days * 24);
        group.bench_with_input(
            BenchmarkId::new("all_groups", format!("{}x{}d", locations, days)),
            &table,
            |b, table| {
                let engine = FeatureEngine::new();
                b.iter(|| engine.apply(black_box(table.clone()), None).unwrap())
            },
        );
    }

    group.finish();
}

fn benchmark_split(c: &mut Criterion) {
    let table = FeatureEngine::new()
        .apply(create_test_table(6, 365 * 24), None)
        .unwrap();

    c.bench_function("temporal_split_6x365d", |b| {
        let splitter = TemporalSplitter::new();
        b.iter(|| splitter.split(black_box(table.clone())).unwrap())
    });
}

fn benchmark_windows(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..24 * 365).map(|h| Some((h % 97) as f64)).collect();

    let mut group = c.benchmark_group("windows");
    group.bench_function("shift_1", |b| b.iter(|| shift(black_box(&values), 1)));
    group.bench_function("rolling_mean_24", |b| b.iter(|| rolling_mean(black_box(&values), 24)));
    group.bench_function("rolling_std_6", |b| b.iter(|| rolling_std(black_box(&values), 6)));
    group.finish();
}

criterion_group!(benches, benchmark_feature_engine, benchmark_split, benchmark_windows);
criterion_main!(benches);
