//! End-to-end tests through the CLI entry points and file adapters.

mod common;

use common::*;
use eodtrader::adapters::csv_adapter::CsvAdapter;
use eodtrader::adapters::csv_signal_writer::{CsvSignalWriter, HEADER};
use eodtrader::adapters::file_config_adapter::FileConfigAdapter;
use eodtrader::adapters::paper_execution::PaperExecutionAdapter;
use eodtrader::cli::{build_strategy_config, evaluate_latest, load_config, replay_pipeline};
use eodtrader::domain::error::EodError;
use eodtrader::domain::evaluation::{Evaluation, Timeframe};
use eodtrader::domain::trade_plan::Decision;
use eodtrader::ports::report_port::ReportPort;
use std::fs;
use tempfile::TempDir;

const MINIMAL_INI: &str = "\
[strategy]
symbol = EURUSD

[levels]
sr1 = 1.2000
sr2 = 1.1950
";

fn write_csv(dir: &TempDir, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    fs::write(dir.path().join(format!("{symbol}.csv")), content).unwrap();
}

/// Index of the first bar in `wave_bars(120)` that produces a trade plan.
fn first_trade_index() -> usize {
    let port = MockDataPort::new().with_bars("WAVE", wave_bars(120));
    let result = replay_pipeline(&port, &wave_config()).unwrap();
    result
        .records
        .iter()
        .find(|r| r.decision.plan().is_some())
        .map(|r| r.index)
        .unwrap()
}

mod config {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let adapter = FileConfigAdapter::from_string(MINIMAL_INI).unwrap();
        let config = build_strategy_config(&adapter).unwrap();

        assert_eq!(config.symbol, "EURUSD");
        assert_eq!(config.timeframe, Timeframe::Daily);
        assert_eq!(config.indicators.ema_fast, 5);
        assert_eq!(config.indicators.ema_slow, 10);
        assert_eq!(config.indicators.stoch_k, 14);
        assert_eq!(config.risk.risk_percent, 1.0);
        assert_eq!(config.risk.near_sr_tolerance_pct, 0.5);
        assert!(!config.risk.allow_counter_trend);
        assert_eq!(config.quantization.pip_size, 0.0001);
        assert_eq!(config.quantization.pip_value_per_lot, 10.0);
        assert_eq!(config.account.balance, 10_000.0);
        assert!(!config.auto_trade);
        assert_eq!(
            config.levels.enabled().collect::<Vec<_>>(),
            vec![1.2000, 1.1950]
        );
    }

    #[test]
    fn missing_symbol_is_config_error() {
        let adapter = FileConfigAdapter::from_string("[strategy]\ntimeframe = daily\n").unwrap();
        let err = build_strategy_config(&adapter).unwrap_err();
        assert!(matches!(err, EodError::ConfigMissing { ref key, .. } if key == "symbol"));
    }

    #[test]
    fn unknown_timeframe_is_config_error() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nsymbol = X\ntimeframe = monthly\n")
                .unwrap();
        let err = build_strategy_config(&adapter).unwrap_err();
        assert!(matches!(err, EodError::ConfigInvalid { ref key, .. } if key == "timeframe"));
    }

    #[test]
    fn load_config_reads_and_validates_file() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.ini");
        fs::write(&good, MINIMAL_INI).unwrap();
        assert!(load_config(&good).is_ok());

        let bad = dir.path().join("bad.ini");
        fs::write(&bad, "[strategy]\nsymbol = X\n\n[risk]\nrisk_percent = -1\n").unwrap();
        assert!(matches!(
            load_config(&bad),
            Err(EodError::ConfigInvalid { .. })
        ));

        assert!(load_config(&dir.path().join("absent.ini")).is_err());
    }

    #[test]
    fn nan_or_malformed_numbers_are_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        for (name, body, bad_key) in [
            ("nan_risk.ini", "[risk]\nrisk_percent = nan\n", "risk_percent"),
            ("nan_balance.ini", "[account]\nbalance = nan\n", "balance"),
            ("percent_sign.ini", "[risk]\nrisk_percent = 5%\n", "risk_percent"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, format!("[strategy]\nsymbol = X\n\n{body}")).unwrap();
            let err = load_config(&path).unwrap_err();
            assert!(
                matches!(err, EodError::ConfigInvalid { ref key, .. } if key == bad_key),
                "{name}: {err}"
            );
        }
    }
}

mod evaluate {
    use super::*;

    #[test]
    fn signal_only_without_auto_trade() {
        let n = first_trade_index();
        let port = MockDataPort::new().with_bars("WAVE", wave_bars(n + 1));
        let mut broker = PaperExecutionAdapter::new();

        let latest = evaluate_latest(&port, &mut broker, &wave_config(), false).unwrap();
        assert!(matches!(
            latest.evaluation,
            Evaluation::Decided {
                decision: Decision::Trade(_),
                ..
            }
        ));
        assert!(latest.execution.is_none());
        assert!(broker.submitted.is_empty());
    }

    #[test]
    fn auto_trade_submits_plan() {
        let n = first_trade_index();
        let port = MockDataPort::new().with_bars("WAVE", wave_bars(n + 1));
        let mut broker = PaperExecutionAdapter::new();
        let mut config = wave_config();
        config.auto_trade = true;

        let latest = evaluate_latest(&port, &mut broker, &config, false).unwrap();
        let report = latest.execution.unwrap();
        assert_eq!(report.order_id, 1);
        assert_eq!(report.symbol, "WAVE");
        assert_eq!(Some(&report.plan), latest_plan(&latest.evaluation));
        assert_eq!(broker.submitted.len(), 1);
    }

    #[test]
    fn live_mode_ignores_forming_bar() {
        let n = first_trade_index();
        let mut bars = wave_bars(n + 1);
        let mut forming = bars[n].clone();
        forming.date += chrono::Duration::days(1);
        forming.close = 1_000.0;
        bars.push(forming);
        let port = MockDataPort::new().with_bars("WAVE", bars.clone());
        let mut broker = PaperExecutionAdapter::new();

        let latest = evaluate_latest(&port, &mut broker, &wave_config(), true).unwrap();
        match latest.evaluation {
            Evaluation::Decided { date, decision } => {
                assert_eq!(date, bars[n].date);
                assert_eq!(decision.plan().unwrap().entry_price, bars[n].close);
            }
            other => panic!("expected decision, got {other:?}"),
        }
    }

    fn latest_plan(e: &Evaluation) -> Option<&eodtrader::domain::trade_plan::TradePlan> {
        match e {
            Evaluation::Decided { decision, .. } => decision.plan(),
            Evaluation::Skipped(_) => None,
        }
    }
}

mod replay_files {
    use super::*;

    #[test]
    fn csv_data_replays_like_in_memory_data() {
        let dir = TempDir::new().unwrap();
        let bars = wave_bars(120);
        write_csv(&dir, "WAVE", &bars);
        let config = wave_config();

        let from_file = replay_pipeline(&CsvAdapter::new(dir.path().to_path_buf()), &config).unwrap();
        let in_memory =
            replay_pipeline(&MockDataPort::new().with_bars("WAVE", bars), &config).unwrap();

        assert_eq!(from_file.records.len(), in_memory.records.len());
        for (a, b) in from_file.records.iter().zip(&in_memory.records) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.decision.direction(), b.decision.direction());
        }
    }

    #[test]
    fn signal_log_has_a_row_per_signal() {
        let dir = TempDir::new().unwrap();
        let config = wave_config();
        let port = MockDataPort::new().with_bars("WAVE", wave_bars(120));
        let result = replay_pipeline(&port, &config).unwrap();

        let out = dir.path().join("signals.csv");
        CsvSignalWriter
            .write_signals(&result.rows(&config.symbol), &out)
            .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADER.join(","));
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), result.records.len());
        assert!(rows.iter().all(|r| r.split(',').nth(1) == Some("WAVE")));
        assert!(rows
            .iter()
            .all(|r| matches!(r.split(',').nth(2), Some("BUY") | Some("SELL"))));
    }

    #[test]
    fn missing_symbol_file_fails_replay() {
        let dir = TempDir::new().unwrap();
        let err = replay_pipeline(&CsvAdapter::new(dir.path().to_path_buf()), &wave_config())
            .unwrap_err();
        assert!(matches!(err, EodError::Data { .. }));
    }
}
