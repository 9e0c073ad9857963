//! Terminal host for the lucky draw core.
//!
//! # Responsibility
//! - Drive spin/commit, range, history and export use-cases from the shell.
//! - Own the reveal delay between drawing a number and committing it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lucky_draw_core::{
    export_file_name, init_logging, slot_digits, ExportFormat, LuckyDrawConfig, LuckyDrawService,
    SqliteStore,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "lucky-draw", version, about = "Non-repeating lucky number draws")]
struct Cli {
    /// SQLite file holding history and preferences.
    #[arg(long, global = true, default_value = "lucky_draw.sqlite3")]
    db: PathBuf,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw one number and record it.
    Spin {
        /// Commit immediately instead of waiting for the reveal delay.
        #[arg(long)]
        no_delay: bool,
    },
    /// Show range, remaining numbers and the last draw.
    Status,
    /// Set the inclusive draw range.
    Range { min: i64, max: i64 },
    /// List drawn numbers in order.
    History,
    /// Delete all history.
    Clear,
    /// Write history to a dated file.
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Replace history with a previously exported JSON file.
    Import { file: PathBuf },
    /// Remove every stored setting, layout and history entry.
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LuckyDrawConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LuckyDrawConfig::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir).context("initializing logging")?;
    }

    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("opening store {}", cli.db.display()))?;
    let mut service = LuckyDrawService::with_config(store, config);

    run(cli.command, &mut service)
}

fn run(command: Command, service: &mut LuckyDrawService<SqliteStore>) -> Result<()> {
    match command {
        Command::Spin { no_delay } => {
            let number = service.spin(&mut rand::rng())?;
            if !no_delay {
                std::thread::sleep(Duration::from_millis(service.config().reveal_delay_ms));
            }
            service.commit_spin()?;
            let [a, b, c] = slot_digits(Some(number));
            println!("[{a}] [{b}] [{c}]  -> {number}");
            println!("remaining: {}", service.available_count()?);
        }
        Command::Status => {
            println!("range: {}", service.range());
            match service.available_count() {
                Ok(count) => println!("remaining: {count}"),
                Err(err) => println!("remaining: unavailable ({err})"),
            }
            println!("spins: {}", service.spin_count());
            match service.current_number() {
                Some(number) => println!("last: {number}"),
                None => println!("last: -"),
            }
        }
        Command::Range { min, max } => {
            let range = service.set_range(min, max)?;
            println!("range set to {range}");
        }
        Command::History => {
            let Some(history) = service.history().filter(|history| !history.is_empty()) else {
                println!("no spins yet");
                return Ok(());
            };
            for (index, record) in history.records.iter().enumerate() {
                println!(
                    "{:>4}. {:>6}  [{}, {}]  {}",
                    index + 1,
                    record.number,
                    record.min_range,
                    record.max_range,
                    record.timestamp
                );
            }
        }
        Command::Clear => {
            service.clear_history();
            println!("history cleared");
        }
        Command::Export { format, out } => {
            let format = ExportFormat::from(format);
            let bytes = service.export(format)?;
            let today = chrono::Local::now().date_naive();
            let path = out.join(export_file_name(format, today));
            std::fs::write(&path, bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        Command::Import { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let count = service.import_json(&bytes)?;
            println!("imported {count} record(s)");
        }
        Command::Reset => {
            if service.is_drawing() {
                bail!("a draw is in progress");
            }
            let removed = service.reset_all();
            println!("removed {removed} stored entr{}", if removed == 1 { "y" } else { "ies" });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::{CommandFactory, Parser};
    use lucky_draw_core::{LuckyDrawService, SqliteStore};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_range_and_export_flags() {
        let cli = Cli::parse_from(["lucky-draw", "--db", "x.db", "range", "5", "10"]);
        assert!(matches!(cli.command, Command::Range { min: 5, max: 10 }));

        let cli = Cli::parse_from(["lucky-draw", "export", "--format", "csv", "--out", "/tmp"]);
        assert!(matches!(cli.command, Command::Export { .. }));
    }

    #[test]
    fn spin_without_delay_records_history() {
        let mut service = LuckyDrawService::new(SqliteStore::open_in_memory().unwrap());
        run(Command::Range { min: 1, max: 1 }, &mut service).unwrap();
        run(Command::Spin { no_delay: true }, &mut service).unwrap();
        assert_eq!(service.current_number(), Some(1));
        assert!(run(Command::Spin { no_delay: true }, &mut service).is_err());
    }
}
