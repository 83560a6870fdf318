//! Calendar transforms for monthly flow matrices.
//!
//! Flows are mean monthly discharges in m³/s; volumes are reported in
//! millions of cubic meters.

use tracing::debug;

use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;
use crate::utils::{days_in_month, month_number};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLION: f64 = 1.0e6;

/// Label given to the value column of annual volume matrices.
pub const VOLUME_LABEL: &str = "Vol[MMm3]";

/// Annual volume of every complete year (or of the requested years).
///
/// Each month's flow is multiplied by that month's day count and by the
/// seconds in a day, then summed over the row. Months are identified by
/// their column labels; after a December column the calendar year advances,
/// so rows realigned to hydrological years get the right February.
/// Years with any missing month are left out.
pub fn annual_volume(
    flows: &DataMatrix,
    years: Option<&[i32]>,
) -> Result<DataMatrix, AnalysisError> {
    let months = flows
        .column_labels()
        .iter()
        .map(|label| {
            month_number(label).ok_or_else(|| {
                AnalysisError::invalid(format!("column label '{label}' is not a month"))
            })
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let rows: Vec<usize> = match years {
        Some(years) => years
            .iter()
            .map(|&y| flows.row_index(y))
            .collect::<Result<_, _>>()?,
        None => (0..flows.len()).collect(),
    };

    let mut out_years = Vec::new();
    let mut volumes = Vec::new();

    for row in rows {
        let year = flows.years()[row];
        if !flows.row_is_complete(row) {
            debug!("Skipping incomplete year {} in volume computation", year);
            continue;
        }

        let mut calendar_year = year;
        let mut total = 0.0;
        for (column, &month) in months.iter().enumerate() {
            let days = days_in_month(calendar_year, month).ok_or_else(|| {
                AnalysisError::invalid(format!("no calendar for {calendar_year}-{month}"))
            })?;
            let flow = flows.value(row, column).unwrap_or_default();
            total += flow * days as f64 * SECONDS_PER_DAY;
            if month == 12 {
                calendar_year += 1;
            }
        }

        out_years.push(year);
        volumes.push(Some(total / MILLION));
    }

    DataMatrix::annual(out_years, volumes, flows.year_label(), VOLUME_LABEL)
}

/// Realign a 12-month calendar matrix to hydrological years.
///
/// Each output row starts at `driest_month` (1-12) of its year and continues
/// into the first months of the following calendar year. Years whose next
/// calendar year is not in the matrix (including the final year) are dropped.
/// Labels rotate with the columns.
pub fn to_hydrological_year(
    monthly: &DataMatrix,
    driest_month: u32,
) -> Result<DataMatrix, AnalysisError> {
    if monthly.width() != 12 {
        return Err(AnalysisError::invalid(format!(
            "hydrological years need 12 monthly columns, got {}",
            monthly.width()
        )));
    }
    if !(1..=12).contains(&driest_month) {
        return Err(AnalysisError::invalid(format!(
            "driest month must be within 1-12, got {driest_month}"
        )));
    }

    let start = (driest_month - 1) as usize;
    let column_labels = monthly.column_labels();

    let mut labels = vec![monthly.year_label().to_string()];
    labels.extend_from_slice(&column_labels[start..]);
    labels.extend_from_slice(&column_labels[..start]);

    let mut years = Vec::new();
    let mut rows = Vec::new();
    for (window, pair) in monthly.rows().windows(2).zip(monthly.years().windows(2)) {
        let year = pair[0];
        if pair[1] != year + 1 {
            debug!(
                "Dropping hydrological year {}: next row is {}, not {}",
                year,
                pair[1],
                year + 1
            );
            continue;
        }
        let mut row = window[0][start..].to_vec();
        row.extend_from_slice(&window[1][..start]);
        years.push(year);
        rows.push(row);
    }

    DataMatrix::new(years, rows, labels)
}
