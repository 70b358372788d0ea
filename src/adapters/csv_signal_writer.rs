//! CSV signal log writer.
//!
//! Columns: date,symbol,side,entry,stop,tp,volume,r,outcome,exit_price,r_multiple.
//! Rejected signals leave the numeric columns empty and carry their reason
//! code in `outcome`.

use crate::domain::error::EodError;
use crate::domain::trade_plan::Decision;
use crate::ports::report_port::{ReportPort, SignalRow};
use std::path::Path;
use tracing::info;

pub const HEADER: [&str; 11] = [
    "date",
    "symbol",
    "side",
    "entry",
    "stop",
    "tp",
    "volume",
    "r",
    "outcome",
    "exit_price",
    "r_multiple",
];

pub struct CsvSignalWriter;

fn num(v: f64) -> String {
    format!("{:.5}", v)
}

impl CsvSignalWriter {
    pub fn row_fields(row: &SignalRow<'_>) -> Vec<String> {
        let side = row
            .record
            .decision
            .direction()
            .map(|d| d.to_string())
            .unwrap_or_default();
        let mut fields = vec![
            row.record.date.format("%Y-%m-%d").to_string(),
            row.symbol.to_string(),
            side,
        ];

        match &row.record.decision {
            Decision::Trade(plan) => {
                fields.push(num(plan.entry_price));
                fields.push(num(plan.stop_price));
                fields.push(num(plan.take_profit_price));
                fields.push(format!("{:.2}", plan.volume));
                fields.push(num(plan.risk_per_unit()));
                match &row.outcome {
                    Some(o) => {
                        fields.push(o.exit_reason.to_string());
                        fields.push(num(o.exit_price));
                        fields.push(format!("{:.2}", o.r_multiple));
                    }
                    None => {
                        fields.push("pending".to_string());
                        fields.push(String::new());
                        fields.push(String::new());
                    }
                }
            }
            Decision::NoTrade(reason) => {
                fields.extend(std::iter::repeat_n(String::new(), 5));
                fields.push(reason.code().to_string());
                fields.push(String::new());
                fields.push(String::new());
            }
        }
        fields
    }

    pub fn write_to<W: std::io::Write>(rows: &[SignalRow<'_>], out: W) -> Result<(), EodError> {
        let mut wtr = csv::Writer::from_writer(out);
        let to_err = |e: csv::Error| EodError::Data {
            reason: format!("CSV write error: {}", e),
        };
        wtr.write_record(HEADER).map_err(to_err)?;
        for row in rows {
            wtr.write_record(Self::row_fields(row)).map_err(to_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvSignalWriter {
    fn write_signals(&self, rows: &[SignalRow<'_>], output_path: &Path) -> Result<(), EodError> {
        let file = std::fs::File::create(output_path)?;
        Self::write_to(rows, file)?;
        info!(path = %output_path.display(), rows = rows.len(), "signal log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::SignalRecord;
    use crate::domain::signal::Direction;
    use crate::domain::simulation::{ExitReason, TradeOutcome};
    use crate::domain::trade_plan::{NoTradeReason, TradePlan};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn trade_record() -> SignalRecord {
        SignalRecord {
            index: 20,
            date: d(5),
            decision: Decision::Trade(TradePlan {
                direction: Direction::Buy,
                entry_price: 1.2,
                stop_price: 1.195,
                take_profit_price: 1.21,
                volume: 0.2,
            }),
        }
    }

    #[test]
    fn trade_row_with_outcome() {
        let record = trade_record();
        let row = SignalRow {
            symbol: "EURUSD",
            record: &record,
            outcome: Some(TradeOutcome {
                exit_date: d(8),
                exit_price: 1.21,
                exit_reason: ExitReason::TakeProfit,
                pnl: 0.01,
                r_multiple: 2.0,
            }),
        };
        assert_eq!(
            CsvSignalWriter::row_fields(&row),
            vec![
                "2024-02-05", "EURUSD", "BUY", "1.20000", "1.19500", "1.21000", "0.20",
                "0.00500", "TP", "1.21000", "2.00"
            ]
        );
    }

    #[test]
    fn rejected_signal_row() {
        let record = SignalRecord {
            index: 21,
            date: d(6),
            decision: Decision::NoTrade(NoTradeReason::NoValidStop {
                direction: Direction::Sell,
            }),
        };
        let row = SignalRow {
            symbol: "EURUSD",
            record: &record,
            outcome: None,
        };
        let fields = CsvSignalWriter::row_fields(&row);
        assert_eq!(fields.len(), HEADER.len());
        assert_eq!(fields[2], "SELL");
        assert_eq!(fields[8], "no_valid_stop");
        assert!(fields[3].is_empty());
    }

    #[test]
    fn writes_header_and_rows() {
        let record = trade_record();
        let rows = [SignalRow {
            symbol: "EURUSD",
            record: &record,
            outcome: None,
        }];
        let mut buf = Vec::new();
        CsvSignalWriter::write_to(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADER.join(","));
        assert!(lines.next().unwrap().ends_with(",pending,,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn write_signals_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("signals.csv");
        let record = trade_record();
        let rows = [SignalRow {
            symbol: "EURUSD",
            record: &record,
            outcome: None,
        }];
        CsvSignalWriter
            .write_signals(&rows, &path)
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn write_signals_keeps_non_utf8_path() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir
            .path()
            .join(std::ffi::OsStr::from_bytes(b"signals-\xff.csv"));
        let record = trade_record();
        let rows = [SignalRow {
            symbol: "EURUSD",
            record: &record,
            outcome: None,
        }];
        CsvSignalWriter.write_signals(&rows, &path).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("signals-\u{fffd}.csv").exists());
    }
}
