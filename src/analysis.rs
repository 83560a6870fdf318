// Analysis module
//
// Pure transformations over `DataMatrix` values:
// - columns: flatten a matrix into one labeled series
// - gaps / neighbors: locate missing cells and their bracketing values
// - interpolation: gap filling with optional companion-station correction
// - regression / concurrency: cross-station alignment and OLS fits
// - volume / stats / classification: annual volumes and dry/normal/wet years

pub mod classification;
pub mod columns;
pub mod concurrency;
pub mod gaps;
pub mod interpolation;
pub mod neighbors;
pub mod regression;
pub mod stats;
pub mod volume;

pub use classification::{classify_flow_years, classify_years, VolumeThresholds, YearBuckets};
pub use columns::{extract_column, ExtractedColumn};
pub use concurrency::{concurrent_runs, concurrent_subset, concurrent_years};
pub use gaps::{gap_years_by_station, locate_gap_rows, locate_gaps, years_with_gaps, GapCoord};
pub use interpolation::{fill_single_gaps, FillDiagnostic, FillOutcome, GapFiller};
pub use neighbors::{find_neighbors, neighbor_estimate, CellRef, NeighborResult};
pub use regression::{fit_pairs, linear_regression, predict_from_companion, RegressionParams};
pub use stats::{percentile, quartiles, summary, SeriesSummary};
pub use volume::{annual_volume, to_hydrological_year};
