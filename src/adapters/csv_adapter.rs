//! CSV file data adapter.
//!
//! One file per symbol, `<SYMBOL>.csv`, with header
//! `date,open,high,low,close,volume`. Volume may be blank.

use crate::domain::error::EodError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str, EodError> {
    record.get(idx).map(str::trim).ok_or_else(|| EodError::Data {
        reason: format!("missing {} column", name),
    })
}

fn price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, EodError> {
    column(record, idx, name)?
        .parse()
        .map_err(|e| EodError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, EodError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| EodError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| EodError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = column(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                EodError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            let volume = match record.get(5).map(str::trim) {
                None | Some("") => 0.0,
                Some(v) => v.parse().unwrap_or_else(|_| {
                    warn!(%date, value = v, "unparseable volume, using 0");
                    0.0
                }),
            };

            let bar = OhlcvBar {
                date,
                open: price(&record, 1, "open")?,
                high: price(&record, 2, "high")?,
                low: price(&record, 3, "low")?,
                close: price(&record, 4, "close")?,
                volume,
            };
            if bar.high < bar.low {
                warn!(%date, high = bar.high, low = bar.low, "skipping bar with high below low");
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");

        if bars.is_empty() {
            return Err(EodError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}
