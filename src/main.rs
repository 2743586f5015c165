//! NeuroSheets - a spreadsheet with a terminal grid

mod config;
mod session;
mod tui;

use anyhow::{Context, Result};
use neurosheets_engine::engine::format_result;
use session::{Session, SheetLocation};
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NEUROSHEETS_LOG";
const LOG_FILE: &str = "neurosheets.log";

fn print_usage() {
    eprintln!("Usage: neurosheets [OPTIONS] [SHEET_ID]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [SHEET_ID]                Repository sheet to open (default: the current sheet)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --store <DIR>         Sheet store directory");
    eprintln!("      --config <FILE>       Config file (default: <config dir>/neurosheets/config.toml)");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and print it");
    eprintln!("  -o, --output <FILE>       Export to .csv or .xls (non-interactive)");
    eprintln!("      --import <FILE>       Replace the sheet's cells with a CSV file and save");
    eprintln!("      --list                List sheets in the store");
    eprintln!("      --new <TITLE>         Create a sheet and print its id");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Set {}=debug for more logging.", LOG_ENV);
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    help: bool,
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    command: Option<String>,
    output: Option<PathBuf>,
    import: Option<PathBuf>,
    list: bool,
    new_title: Option<String>,
    sheet_id: Option<String>,
}

impl Options {
    /// Without any of the one-shot flags the grid is opened.
    fn is_interactive(&self) -> bool {
        self.command.is_none()
            && self.output.is_none()
            && self.import.is_none()
            && !self.list
            && self.new_title.is_none()
    }
}

fn take_value(args: &[String], i: &mut usize, name: &str) -> std::result::Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", name))
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut opts = Options::default();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |name: &str| take_value(args, &mut i, name);

        match arg {
            "-h" | "--help" => {
                opts.help = true;
                return Ok(opts);
            }
            "-s" | "--store" => opts.store = Some(PathBuf::from(value("--store")?)),
            "--config" => opts.config = Some(PathBuf::from(value("--config")?)),
            "-c" | "--command" => opts.command = Some(value("--command")?),
            "-o" | "--output" => opts.output = Some(PathBuf::from(value("--output")?)),
            "--import" => opts.import = Some(PathBuf::from(value("--import")?)),
            "--list" => opts.list = true,
            "--new" => opts.new_title = Some(value("--new")?),
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if opts.sheet_id.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                opts.sheet_id = Some(arg.to_string());
            }
        }
        i += 1;
    }
    Ok(opts)
}

/// Install the tracing subscriber. While the grid owns the terminal, logs go
/// to a file in the store directory instead of stderr.
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        None => builder.with_writer(std::io::stderr).init(),
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => builder.with_writer(Mutex::new(file)).with_ansi(false).init(),
            Err(_) => builder.with_writer(std::io::sink).init(),
        },
    }
}

fn run(opts: Options) -> Result<()> {
    let (config, warnings) = config::load_config(opts.config.as_deref());
    let store_dir = opts
        .store
        .clone()
        .or_else(|| config.store_dir())
        .context("Could not determine a data directory; use --store <DIR>")?;

    let location = match &opts.sheet_id {
        Some(id) => SheetLocation::Sheet(id.clone()),
        None => SheetLocation::Slot,
    };
    let mut session = Session::open(&store_dir, location)?;

    let interactive = opts.is_interactive();
    let log_path = session.store_dir().join(LOG_FILE);
    init_logging(interactive.then_some(log_path.as_path()));
    for warning in &warnings {
        warn!("{}", warning);
    }

    if opts.list {
        for sheet in session.list()? {
            println!(
                "{}\t{}\t{}",
                sheet.id,
                sheet.title,
                sheet.updated_at.to_rfc3339()
            );
        }
        return Ok(());
    }

    if let Some(title) = &opts.new_title {
        let summary = session.create(title)?;
        println!("{}", summary.id);
        return Ok(());
    }

    if interactive {
        let mut app = tui::App::with_session(session, &config)?;
        if let Some(warning) = warnings.first() {
            app.status_message = format!("Warning: {}", warning);
        }
        tui::run(&mut app).context("Terminal error")?;
        return Ok(());
    }

    let mut doc = session.load()?;

    if let Some(path) = &opts.import {
        let count = doc
            .import_csv(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        session.save(&mut doc)?;
        println!("Imported {} cells from {}", count, path.display());
    }

    if let Some(formula) = &opts.command {
        println!("{}", format_result(&doc.evaluate(formula), None));
    }

    if let Some(path) = &opts.output {
        doc.export(path, &config.export_range())
            .with_context(|| format!("Failed to export {}", path.display()))?;
        println!("Exported to {}", path.display());
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_usage();
            std::process::exit(1);
        }
    };

    if opts.help {
        print_usage();
        return;
    }

    if let Err(e) = run(opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults_to_interactive_slot() {
        let opts = parse_args(&[]).unwrap();
        assert_eq!(opts, Options::default());
        assert!(opts.is_interactive());
    }

    #[test]
    fn test_parse_args_all_options() {
        let opts = parse_args(&args(&[
            "-s", "/tmp/store", "--config", "c.toml", "-c", "=1+1", "-o", "out.csv", "--import",
            "in.csv", "abc-123",
        ]))
        .unwrap();
        assert_eq!(opts.store, Some(PathBuf::from("/tmp/store")));
        assert_eq!(opts.config, Some(PathBuf::from("c.toml")));
        assert_eq!(opts.command.as_deref(), Some("=1+1"));
        assert_eq!(opts.output, Some(PathBuf::from("out.csv")));
        assert_eq!(opts.import, Some(PathBuf::from("in.csv")));
        assert_eq!(opts.sheet_id.as_deref(), Some("abc-123"));
        assert!(!opts.is_interactive());
    }

    #[test]
    fn test_parse_args_list_and_new() {
        assert!(parse_args(&args(&["--list"])).unwrap().list);
        let opts = parse_args(&args(&["--new", "Q1 Budget"])).unwrap();
        assert_eq!(opts.new_title.as_deref(), Some("Q1 Budget"));
    }

    #[test]
    fn test_parse_args_errors() {
        assert_eq!(
            parse_args(&args(&["--bogus"])),
            Err("Unknown option: --bogus".to_string())
        );
        assert_eq!(
            parse_args(&args(&["-o"])),
            Err("--output requires a value".to_string())
        );
        assert_eq!(
            parse_args(&args(&["one", "two"])),
            Err("Unexpected argument: two".to_string())
        );
    }

    #[test]
    fn test_help_stops_parsing() {
        let opts = parse_args(&args(&["-h", "--bogus"])).unwrap();
        assert!(opts.help);
    }
}
