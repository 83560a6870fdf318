//! Shared utility functions for the hydrology analyses

/// Map a month column label to its calendar month number (1-12)
///
/// Labels are matched on their first three letters, case-insensitively, so
/// both "JAN" and "January" resolve to 1.
///
/// # Examples
///
/// ```
/// use hydro_series::utils::month_number;
///
/// assert_eq!(month_number("JAN"), Some(1));
/// assert_eq!(month_number("dec"), Some(12));
/// assert_eq!(month_number("September"), Some(9));
/// assert_eq!(month_number("YEAR"), None);
/// ```
pub fn month_number(label: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    let prefix: String = label.trim().chars().take(3).collect();
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(&prefix))
        .map(|idx| idx as u32 + 1)
}

/// Number of days in `month` of `year`, honoring leap years
pub fn days_in_month(year: i32, month: u32) -> Option<i64> {
    use chrono::NaiveDate;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days())
}

/// Parse a textual column selector into a column index
///
/// Only non-negative integers are accepted; range checks happen against the
/// matrix the index is used with.
pub fn parse_column_index(value: &str) -> Result<usize, crate::AnalysisError> {
    value.trim().parse::<usize>().map_err(|_| {
        crate::AnalysisError::InvalidArgument(format!(
            "column index must be a non-negative integer, got '{value}'"
        ))
    })
}
