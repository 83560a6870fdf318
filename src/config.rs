use std::env;

use thiserror::Error;

use crate::analysis::interpolation::DEFAULT_LONG_GAP_RUN;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be at least {min}, got {value}")]
    BelowMinimum { name: &'static str, min: usize, value: usize },

    #[error("{name} must be within 0-100, got {value}")]
    PercentileOutOfRange { name: &'static str, value: f64 },

    #[error("dry percentile {dry} must be below wet percentile {wet}")]
    PercentileOrder { dry: f64, wet: f64 },

    #[error("HYDRO_DRIEST_MONTH must be within 1-12, got {0}")]
    MonthOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Uncorrected interpolations over longer runs are flagged
    pub long_gap_run: usize,
    pub dry_percentile: f64,
    pub wet_percentile: f64,
    /// First month of the hydrological year
    pub driest_month: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            long_gap_run: DEFAULT_LONG_GAP_RUN,
            dry_percentile: 25.0,
            wet_percentile: 75.0,
            driest_month: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let config = Config {
            long_gap_run: env::var("HYDRO_LONG_GAP_RUN")
                .unwrap_or_else(|_| defaults.long_gap_run.to_string())
                .parse()
                .unwrap_or(defaults.long_gap_run),
            dry_percentile: env::var("HYDRO_DRY_PERCENTILE")
                .unwrap_or_else(|_| defaults.dry_percentile.to_string())
                .parse()
                .unwrap_or(defaults.dry_percentile),
            wet_percentile: env::var("HYDRO_WET_PERCENTILE")
                .unwrap_or_else(|_| defaults.wet_percentile.to_string())
                .parse()
                .unwrap_or(defaults.wet_percentile),
            driest_month: env::var("HYDRO_DRIEST_MONTH")
                .unwrap_or_else(|_| defaults.driest_month.to_string())
                .parse()
                .unwrap_or(defaults.driest_month),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.long_gap_run < 2 {
            return Err(ConfigError::BelowMinimum {
                name: "HYDRO_LONG_GAP_RUN",
                min: 2,
                value: self.long_gap_run,
            });
        }
        for (name, value) in [
            ("HYDRO_DRY_PERCENTILE", self.dry_percentile),
            ("HYDRO_WET_PERCENTILE", self.wet_percentile),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::PercentileOutOfRange { name, value });
            }
        }
        if self.dry_percentile >= self.wet_percentile {
            return Err(ConfigError::PercentileOrder {
                dry: self.dry_percentile,
                wet: self.wet_percentile,
            });
        }
        if !(1..=12).contains(&self.driest_month) {
            return Err(ConfigError::MonthOutOfRange(self.driest_month));
        }
        Ok(())
    }
}
