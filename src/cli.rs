//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_signal_writer::CsvSignalWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_execution::PaperExecutionAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::EodError;
use crate::domain::evaluation::{AccountState, Evaluation, SignalRecord, Timeframe};
use crate::domain::indicator::{IndicatorParams, IndicatorSet};
use crate::domain::simulation::{self, SimulationSummary, TradeOutcome};
use crate::domain::sizing::InstrumentQuantization;
use crate::domain::sr_levels::{SrLevelSet, MAX_LEVELS};
use crate::domain::strategy::StrategyConfig;
use crate::domain::trade_plan::{Decision, RiskConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::execution_port::{ExecutionPort, ExecutionReport};
use crate::ports::report_port::{ReportPort, SignalRow};

#[derive(Parser, Debug)]
#[command(name = "eodtrader", about = "End-of-day EMA/stochastic signals at support/resistance")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the latest closed bar
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// Treat the last CSV row as the still-forming bar
        #[arg(long)]
        live: bool,
    },
    /// Evaluate every bar in the data file and simulate the trades
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Evaluate { config, data, live } => run_evaluate(&config, &data, live),
        Command::Replay {
            config,
            data,
            output,
        } => run_replay(&config, &data, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, EodError> {
    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, EodError> {
    let symbol = adapter.require_string("strategy", "symbol")?;
    let timeframe = match adapter.get_string("strategy", "timeframe") {
        Some(tf) => tf
            .parse::<Timeframe>()
            .map_err(|reason| EodError::invalid("strategy", "timeframe", reason))?,
        None => Timeframe::Daily,
    };
    let period = |key: &str, default: i64| -> Result<usize, EodError> {
        usize::try_from(adapter.get_int("strategy", key, default))
            .ok()
            .filter(|&p| p >= 1)
            .ok_or_else(|| EodError::invalid("strategy", key, "period must be at least 1"))
    };

    let mut levels = [0.0; MAX_LEVELS];
    for (i, slot) in levels.iter_mut().enumerate() {
        *slot = adapter.get_double("levels", &format!("sr{}", i + 1), 0.0);
    }

    let quantization = InstrumentQuantization {
        pip_size: adapter.get_double("instrument", "pip_size", 0.0001),
        pip_value_per_lot: adapter.get_double("instrument", "pip_value", 10.0),
        min_volume: adapter.get_double("instrument", "min_volume", 0.01),
        volume_step: adapter.get_double("instrument", "volume_step", 0.01),
    };
    if quantization.uses_fallback_pip_value() {
        warn!(
            pip_value = quantization.pip_value_per_lot,
            "pip_value <= 0, sizing with a pip value of 1.0"
        );
    }

    let config = StrategyConfig {
        symbol,
        timeframe,
        indicators: IndicatorParams {
            ema_fast: period("ema_fast", 5)?,
            ema_slow: period("ema_slow", 10)?,
            stoch_k: period("stoch_k", 14)?,
            stoch_k_smooth: period("stoch_k_smooth", 3)?,
            stoch_d: period("stoch_d", 3)?,
        },
        risk: RiskConfig {
            risk_percent: adapter.get_double("risk", "risk_percent", 1.0),
            near_sr_tolerance_pct: adapter.get_double("risk", "near_sr_tolerance_pct", 0.5),
            allow_counter_trend: adapter.get_bool("risk", "allow_counter_trend", false),
            take_profit_r: adapter.get_double("risk", "take_profit_r", 2.0),
        },
        levels: SrLevelSet::new(levels),
        quantization,
        account: AccountState {
            balance: adapter.get_double("account", "balance", 10_000.0),
        },
        auto_trade: adapter.get_bool("strategy", "auto_trade", false),
    };

    if config.levels.is_empty() {
        warn!("no SR levels enabled; every signal will be rejected as not_near_sr");
    }
    Ok(config)
}

/// Result of evaluating the latest bar.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestEvaluation {
    pub evaluation: Evaluation,
    pub execution: Option<ExecutionReport>,
}

/// Evaluate the most recent closed bar and, with `auto_trade`, submit the plan.
pub fn evaluate_latest(
    data_port: &dyn DataPort,
    execution_port: &mut dyn ExecutionPort,
    config: &StrategyConfig,
    live: bool,
) -> Result<LatestEvaluation, EodError> {
    let bars = data_port.fetch_bars(&config.symbol)?;
    let indicators = IndicatorSet::compute(&bars, &config.indicators);
    let eval_loop = config.evaluation_loop();

    let evaluation = if live {
        eval_loop.on_live_bars(config.timeframe, &bars, &indicators, &config.account)?
    } else {
        eval_loop.on_bar(
            config.timeframe,
            bars.len().saturating_sub(1),
            &bars,
            &indicators,
            &config.account,
        )?
    };

    let execution = match &evaluation {
        Evaluation::Decided {
            decision: Decision::Trade(plan),
            ..
        } if config.auto_trade => Some(execution_port.submit(&config.symbol, plan)?),
        Evaluation::Decided {
            decision: Decision::Trade(_),
            ..
        } => {
            info!("auto_trade is off; signal only");
            None
        }
        _ => None,
    };

    Ok(LatestEvaluation {
        evaluation,
        execution,
    })
}

/// Signals from a replay with the simulated outcome of each plan.
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub records: Vec<SignalRecord>,
    pub outcomes: Vec<Option<TradeOutcome>>,
    pub summary: SimulationSummary,
}

impl ReplayResult {
    pub fn rows<'a>(&'a self, symbol: &'a str) -> Vec<SignalRow<'a>> {
        self.records
            .iter()
            .zip(&self.outcomes)
            .map(|(record, outcome)| SignalRow {
                symbol,
                record,
                outcome: *outcome,
            })
            .collect()
    }
}

pub fn replay_pipeline(
    data_port: &dyn DataPort,
    config: &StrategyConfig,
) -> Result<ReplayResult, EodError> {
    let bars = data_port.fetch_bars(&config.symbol)?;
    if bars.is_empty() {
        return Err(EodError::NoData {
            symbol: config.symbol.clone(),
        });
    }
    info!(
        symbol = %config.symbol,
        bars = bars.len(),
        "replaying {} to {}",
        bars[0].date,
        bars[bars.len() - 1].date
    );
    let indicators = IndicatorSet::compute(&bars, &config.indicators);
    let records = config
        .evaluation_loop()
        .replay(&bars, &indicators, &config.account)?;

    let outcomes: Vec<Option<TradeOutcome>> = records
        .iter()
        .map(|r| {
            r.decision
                .plan()
                .and_then(|plan| simulation::simulate(r.date, plan, &bars))
        })
        .collect();
    let summary = SimulationSummary::from_outcomes(outcomes.iter().flatten());

    Ok(ReplayResult {
        records,
        outcomes,
        summary,
    })
}

fn run_evaluate(config_path: &Path, data_dir: &Path, live: bool) -> Result<(), EodError> {
    let adapter = load_config(config_path)?;
    let config = build_strategy_config(&adapter)?;
    let data_port = CsvAdapter::new(data_dir.to_path_buf());
    let mut broker = PaperExecutionAdapter::new();

    let latest = evaluate_latest(&data_port, &mut broker, &config, live)?;
    match &latest.evaluation {
        Evaluation::Skipped(reason) => println!("{}: skipped ({:?})", config.symbol, reason),
        Evaluation::Decided {
            date,
            decision: Decision::Trade(plan),
        } => {
            println!(
                "{} {} {}: entry={:.5} sl={:.5} tp={:.5} volume={:.2}",
                date,
                config.symbol,
                plan.direction,
                plan.entry_price,
                plan.stop_price,
                plan.take_profit_price,
                plan.volume
            );
            if let Some(report) = &latest.execution {
                println!("order executed ticket={}", report.order_id);
            }
        }
        Evaluation::Decided {
            date,
            decision: Decision::NoTrade(reason),
        } => println!("{} {}: no trade ({})", date, config.symbol, reason),
    }
    Ok(())
}

fn run_replay(config_path: &Path, data_dir: &Path, output: Option<&Path>) -> Result<(), EodError> {
    let adapter = load_config(config_path)?;
    let config = build_strategy_config(&adapter)?;
    let data_port = CsvAdapter::new(data_dir.to_path_buf());

    let result = replay_pipeline(&data_port, &config)?;
    let trades = result.records.iter().filter(|r| r.decision.plan().is_some()).count();
    let s = &result.summary;

    println!("=== {} replay ===", config.symbol);
    println!("Signals:        {}", result.records.len());
    println!("Trade plans:    {}", trades);
    println!("Resolved:       {} won / {} lost / {} open", s.wins, s.losses, s.open);
    println!("Win rate:       {:.1}%", s.win_rate() * 100.0);
    println!("Total R:        {:.2}", s.total_r);
    println!("Average R:      {:.2}", s.avg_r());
    println!("Max drawdown:   {:.2}R", s.max_drawdown_r);

    let output = output.unwrap_or(Path::new("signals.csv"));
    CsvSignalWriter.write_signals(&result.rows(&config.symbol), output)?;
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), EodError> {
    let adapter = load_config(config_path)?;
    let config = build_strategy_config(&adapter)?;

    println!("symbol:         {}", config.symbol);
    println!("timeframe:      {}", config.timeframe);
    println!(
        "indicators:     EMA({}) / EMA({}), STOCH({},{},{})",
        config.indicators.ema_fast,
        config.indicators.ema_slow,
        config.indicators.stoch_k,
        config.indicators.stoch_k_smooth,
        config.indicators.stoch_d
    );
    let levels: Vec<String> = config.levels.enabled().map(|l| l.to_string()).collect();
    println!("SR levels:      {}", levels.join(", "));
    println!(
        "risk:           {}% per trade, TP {}R, tolerance {}%",
        config.risk.risk_percent, config.risk.take_profit_r, config.risk.near_sr_tolerance_pct
    );
    println!("auto trade:     {}", config.auto_trade);
    println!("configuration is valid");
    Ok(())
}
