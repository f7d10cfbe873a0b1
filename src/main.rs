use colored::*;
use env_logger::{Builder, Env, Target};
use gridfind::cli::{Cli, OutputFormat};
use gridfind::error::{GridfindError, Result};
use gridfind::output::{format_json, format_text};
use gridfind::{EngineConfig, Parser, SearchEngine, Table};
use log::info;
use std::fs;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let start_time = Instant::now();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };

    let table = Table::load(&cli.file, cli.delimiter_char()?)?;
    info!(
        "Loaded {} row(s) x {} column(s) from {}",
        table.rows.len(),
        table.headers.len(),
        cli.file.display()
    );

    let descriptor = cli.descriptor(&config.defaults)?;
    let hidden = cli.hidden.clone().unwrap_or_default();
    let columns = table.columns(&hidden);

    let mut engine = SearchEngine::new(config, move || columns.clone())?
        .with_diagnostics(|d| eprintln!("{} {}", "warning:".yellow().bold(), d));
    let results = engine.apply_descriptors(vec![descriptor], &table.rows)?;

    match cli.format {
        OutputFormat::Text => println!("{}", format_text(results)),
        OutputFormat::Json => println!(
            "{}",
            format_json(results, &cli.query, table.rows.len())?
        ),
    }

    if cli.metrics {
        eprintln!("{}", engine.metrics().gather());
    }

    info!("Completed in {:.2?}", start_time.elapsed());
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| GridfindError::Other(e.to_string()))?;
    Ok(())
}
