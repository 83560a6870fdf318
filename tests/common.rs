#![allow(dead_code)]

use hydro_series::DataMatrix;

pub const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

pub fn monthly_labels() -> Vec<String> {
    let mut labels = vec!["YEAR".to_string()];
    labels.extend(MONTHS.iter().map(|m| m.to_string()));
    labels
}

/// Cell `(row, column)` of the reference grid holds `column + row + 1.1`.
fn grid_value(row: usize, column: usize) -> f64 {
    column as f64 + row as f64 + 1.1
}

fn grid(first_year: i32, years: usize, missing: &[(usize, usize)]) -> DataMatrix {
    let rows = (0..years)
        .map(|r| {
            (0..12)
                .map(|c| {
                    if missing.contains(&(r, c)) {
                        None
                    } else {
                        Some(grid_value(r, c))
                    }
                })
                .collect()
        })
        .collect();
    let years = (0..years as i32).map(|i| first_year + i).collect();
    DataMatrix::new(years, rows, monthly_labels()).unwrap()
}

/// 1950-1952 monthly flows; 1952 only has January to March.
pub fn monthly() -> DataMatrix {
    let missing: Vec<(usize, usize)> = (3..12).map(|c| (2, c)).collect();
    grid(1950, 3, &missing)
}

/// 1950-1952 annual flows; 1952 is missing.
pub fn annual() -> DataMatrix {
    DataMatrix::annual(
        vec![1950, 1951, 1952],
        vec![Some(1.1), Some(2.1), None],
        "YEAR",
        "FLOW",
    )
    .unwrap()
}

/// 1950-1952 monthly flows with scattered gaps, including one at each end of
/// the series.
pub fn lost() -> DataMatrix {
    grid(1950, 3, &[(0, 0), (0, 8), (1, 7), (2, 11)])
}

/// 1950-1953 monthly flows with an isolated April 1951 gap and a 1953 that
/// stops after March.
pub fn mensual1() -> DataMatrix {
    let mut missing = vec![(1, 3)];
    missing.extend((3..12).map(|c| (3, c)));
    grid(1950, 4, &missing)
}

pub fn annual_series(first_year: i32, values: &[Option<f64>]) -> DataMatrix {
    let years = (0..values.len() as i32).map(|i| first_year + i).collect();
    DataMatrix::annual(years, values.to_vec(), "YEAR", "FLOW").unwrap()
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}
