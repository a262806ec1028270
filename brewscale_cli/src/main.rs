//! Entry point: argument parsing, logging setup, command dispatch.

mod cli;
mod error_fmt;
mod run;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = try_main(&cli) {
        if cli.json {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn try_main(cli: &Cli) -> eyre::Result<()> {
    color_eyre::install()?;
    let cfg = load_config(&cli.config)?;
    init_tracing(cli, &cfg.logging);

    match cli.cmd {
        Commands::Run { sim, ticks } => run::run(&cfg, sim, ticks),
        Commands::SelfCheck { sim } => {
            let frame = run::self_check(&cfg, sim)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "ok": true, "raw": frame.raw, "units": frame.units })
                );
            } else {
                println!("self-check: ok (raw {}, {:.2} g)", frame.raw, frame.units);
            }
            Ok(())
        }
    }
}

/// A missing config file is not an error: the shipped defaults are the
/// reference tuning.
fn load_config(path: &Path) -> eyre::Result<brewscale_config::Config> {
    if !path.exists() {
        return Ok(brewscale_config::Config::default());
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = brewscale_config::load_toml(&text).wrap_err("parsing config TOML")?;
    cfg.validate().wrap_err("invalid config")?;
    Ok(cfg)
}

/// Console layer (pretty or JSON) plus an optional non-blocking JSON file
/// appender per `[logging]`.
fn init_tracing(cli: &Cli, logging: &brewscale_config::Logging) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // The CLI flag wins when set away from its default; otherwise the config
    // file's level applies.
    let level = if cli.log_level != "info" {
        cli.log_level.as_str()
    } else {
        logging.level.as_deref().unwrap_or("info")
    };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    type Boxed = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;
    let console: Boxed = if cli.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };
    let mut layers = vec![console];

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "brewscale.log".into());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_writer(writer).boxed());
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
}
