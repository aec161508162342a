// XCompose CLI
// Compile Compose files and drive compose sessions from the command line

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use xcompose_core::{
    dump, keysym_from_name, BuiltinKeysyms, ComposeState, ComposeTable, FeedResult, Settings,
};

/// XCompose table compiler
#[derive(Parser, Debug)]
#[command(name = "xcompose")]
#[command(version)]
#[command(about = "Compile XCompose files and test compose sequences", long_about = None)]
struct Args {
    /// TOML settings file (default: ~/.config/xcompose/settings.toml)
    #[arg(short, long, value_name = "SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Compile a Compose file and print every sequence it defines
    Compile {
        /// Compose file (default: $XCOMPOSEFILE, then ~/.XCompose)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Feed keysyms to a compose session and print the state after each one
    Feed {
        /// Compose file (default: $XCOMPOSEFILE, then ~/.XCompose)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Keysym names, e.g. Multi_key o c
        #[arg(value_name = "KEYSYM", required = true)]
        keysyms: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_default().context("failed to load default settings")?,
    };
    Ok(settings)
}

fn compile(settings: &Settings, file: Option<PathBuf>) -> anyhow::Result<ComposeTable> {
    let Some(path) = file.or_else(|| settings.compose_file()) else {
        bail!("no Compose file given and no home directory to look for ~/.XCompose");
    };
    log::debug!("compiling {}", path.display());
    let table = ComposeTable::from_path(&path, &settings.include_resolver())
        .with_context(|| format!("failed to compile {}", path.display()))?;
    log::info!("{}: {} sequences", path.display(), table.len());
    Ok(table)
}

/// One line of `feed` output
fn format_step(name: &str, result: FeedResult, state: &ComposeState) -> String {
    let mut line = format!(
        "{:<16} {:<8} {:<9}",
        name,
        result.to_string(),
        state.status().to_string()
    );
    if !state.utf8().is_empty() {
        line.push_str(&format!(" {:?}", state.utf8()));
    }
    if let Some(keysym) = state.keysym() {
        line.push_str(&format!(" {}", keysym));
    }
    line.trim_end().to_string()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = load_settings(args.settings.as_deref())?;

    match args.command {
        Command::Compile { file } => {
            let table = compile(&settings, file)?;
            let stdout = io::stdout().lock();
            dump(&table, &BuiltinKeysyms, BufWriter::new(stdout))?;
        }
        Command::Feed { file, keysyms } => {
            let table = Arc::new(compile(&settings, file)?);
            let mut state = ComposeState::new(table);
            for name in &keysyms {
                let keysym = keysym_from_name(name)
                    .with_context(|| format!("unknown keysym \"{}\"", name))?;
                let result = state.feed(keysym);
                println!("{}", format_step(name, result, &state));
            }
        }
    }
    Ok(())
}
