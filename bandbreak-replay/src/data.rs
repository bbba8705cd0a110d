//! Replay input: bars with precomputed band values, loaded from CSV.
//!
//! Band computation stays upstream — a row carries the indicator's
//! upper/lower values alongside OHLC, and the loader only validates shape:
//! sane OHLC, non-inverted bands, strictly increasing timestamps.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Minimum bars for a meaningful replay: two completed plus one forming.
pub const MIN_BARS: usize = 3;

/// One bar of the replay feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub band_top: f64,
    pub band_bottom: f64,
}

impl BandBar {
    pub fn is_sane(&self) -> bool {
        let vals = [
            self.open,
            self.high,
            self.low,
            self.close,
            self.band_top,
            self.band_bottom,
        ];
        vals.iter().all(|v| v.is_finite())
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.band_top >= self.band_bottom
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: insane bar or inverted band")]
    InvalidRow { row: usize },

    #[error("row {row}: timestamps not strictly increasing")]
    OutOfOrder { row: usize },

    #[error("need at least {needed} bars, found {found}")]
    TooShort { needed: usize, found: usize },
}

/// Load and validate a replay feed.
pub fn load_band_bars(path: &Path) -> Result<Vec<BandBar>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars: Vec<BandBar> = Vec::new();
    for (index, record) in reader.deserialize::<BandBar>().enumerate() {
        let bar = record?;
        let row = index + 1;
        if !bar.is_sane() {
            return Err(DataError::InvalidRow { row });
        }
        if let Some(prev) = bars.last() {
            if bar.timestamp <= prev.timestamp {
                return Err(DataError::OutOfOrder { row });
            }
        }
        bars.push(bar);
    }
    if bars.len() < MIN_BARS {
        return Err(DataError::TooShort {
            needed: MIN_BARS,
            found: bars.len(),
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn write_csv(contents: &str) -> temppath::TempCsv {
        temppath::TempCsv::new(contents)
    }

    /// Minimal temp-file helper; std-only, removed on drop.
    mod temppath {
        use std::path::PathBuf;
        use std::sync::atomic::{AtomicUsize, Ordering};

        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        pub struct TempCsv {
            pub path: PathBuf,
        }

        impl TempCsv {
            pub fn new(contents: &str) -> Self {
                let mut path = std::env::temp_dir();
                let unique = format!(
                    "bandbreak-test-{}-{}.csv",
                    std::process::id(),
                    COUNTER.fetch_add(1, Ordering::Relaxed)
                );
                path.push(unique);
                std::fs::write(&path, contents).unwrap();
                Self { path }
            }
        }

        impl Drop for TempCsv {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }

    const HEADER: &str = "timestamp,open,high,low,close,band_top,band_bottom\n";

    fn row(ts: &str, close: f64) -> String {
        format!(
            "{ts},{o},{h},{l},{c},1.1050,1.1020\n",
            o = close - 0.0002,
            h = close + 0.0005,
            l = close - 0.0005,
            c = close
        )
    }

    #[test]
    fn loads_valid_feed() {
        let mut contents = String::from(HEADER);
        contents.push_str(&row("2024-06-03T09:00:00", 1.1030));
        contents.push_str(&row("2024-06-03T09:05:00", 1.1032));
        contents.push_str(&row("2024-06-03T09:10:00", 1.1031));
        let file = write_csv(&contents);

        let bars = load_band_bars(&file.path).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(
            bars[0].timestamp.date(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
        assert_eq!(bars[1].close, 1.1032);
        assert_eq!(bars[2].band_top, 1.1050);
    }

    #[test]
    fn rejects_short_feed() {
        let mut contents = String::from(HEADER);
        contents.push_str(&row("2024-06-03T09:00:00", 1.1030));
        let file = write_csv(&contents);

        match load_band_bars(&file.path) {
            Err(DataError::TooShort { needed: 3, found: 1 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let mut contents = String::from(HEADER);
        contents.push_str(&row("2024-06-03T09:05:00", 1.1030));
        contents.push_str(&row("2024-06-03T09:00:00", 1.1032));
        contents.push_str(&row("2024-06-03T09:10:00", 1.1031));
        let file = write_csv(&contents);

        match load_band_bars(&file.path) {
            Err(DataError::OutOfOrder { row: 2 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_band() {
        let mut contents = String::from(HEADER);
        contents.push_str(&row("2024-06-03T09:00:00", 1.1030));
        contents.push_str(
            "2024-06-03T09:05:00,1.1030,1.1035,1.1025,1.1032,1.1020,1.1050\n",
        );
        contents.push_str(&row("2024-06-03T09:10:00", 1.1031));
        let file = write_csv(&contents);

        match load_band_bars(&file.path) {
            Err(DataError::InvalidRow { row: 2 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_high_below_low() {
        let mut contents = String::from(HEADER);
        contents.push_str(&row("2024-06-03T09:00:00", 1.1030));
        contents.push_str(
            "2024-06-03T09:05:00,1.1030,1.1020,1.1035,1.1032,1.1050,1.1020\n",
        );
        contents.push_str(&row("2024-06-03T09:10:00", 1.1031));
        let file = write_csv(&contents);

        assert!(matches!(
            load_band_bars(&file.path),
            Err(DataError::InvalidRow { row: 2 })
        ));
    }

    #[test]
    fn sane_check_catches_nan() {
        let mut bar = BandBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            open: 1.1030,
            high: 1.1035,
            low: 1.1025,
            close: 1.1032,
            band_top: 1.1050,
            band_bottom: 1.1020,
        };
        assert!(bar.is_sane());
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }
}
