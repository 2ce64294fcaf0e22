#![forbid(unsafe_code)]

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::{IntoDiagnostic, NamedSource};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yul_ast::{Block, DialectKind, Name};
use yul_interpret::{dump, interpret, InterpreterState};
use yul_opt::CleanerSettings;

mod config;

use config::ResolvedConfig;

#[derive(Parser, Debug)]
#[command(name = "yul", version, about = "Yul variable name cleaner and reference interpreter")]
struct Cli {
    /// Configuration file. Defaults to the nearest `yul.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Builtin set reserved by the dialect: `evm` or `none`. Overrides `yul.toml`.
    #[arg(long, global = true)]
    dialect: Option<DialectKind>,

    /// More logging on stderr (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Clean variable names and print the program
    Clean {
        /// Path to a .yul file; if omitted, reads from stdin
        file: Option<PathBuf>,

        #[command(flatten)]
        cleaner: CleanerArgs,
    },

    /// Interpret a program and print its trace, memory and storage
    Run {
        /// Path to a .yul file; if omitted, reads from stdin
        file: Option<PathBuf>,
    },

    /// Interpret a program before and after cleaning and compare the dumps
    Diff {
        /// Path to a .yul file; if omitted, reads from stdin
        file: Option<PathBuf>,

        #[command(flatten)]
        cleaner: CleanerArgs,
    },
}

#[derive(Args, Debug)]
struct CleanerArgs {
    /// Name the cleaner must not assign (repeatable, merged with `yul.toml`)
    #[arg(long = "blacklist", value_name = "NAME")]
    blacklist: Vec<String>,

    /// Do not reserve function names and unsuffixed variable names of the program
    #[arg(long, default_value_t = false)]
    no_reserve_program_names: bool,

    /// Highest numeric suffix (exclusive) tried before giving up
    #[arg(long, value_name = "N")]
    suffix_limit: Option<u64>,
}

impl CleanerArgs {
    fn apply(&self, settings: &mut CleanerSettings) {
        settings
            .blacklist
            .extend(self.blacklist.iter().map(|n| Name::from(n.as_str())));
        if self.no_reserve_program_names {
            settings.reserve_program_names = false;
        }
        if let Some(limit) = self.suffix_limit {
            settings.suffix_limit = limit;
        }
    }
}

fn init_logging(verbose: u8) {
    let filter_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file = match &cli.cmd {
        Cmd::Clean { file, .. } | Cmd::Run { file } | Cmd::Diff { file, .. } => file.clone(),
    };

    let start = match file.as_deref().and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir().into_diagnostic()?,
    };
    let mut cfg = config::load_config(cli.config.as_deref(), &start)?;
    if let Some(path) = &cfg.config_path {
        info!(config = %path.display(), "loaded configuration");
    }
    if let Some(dialect) = cli.dialect {
        cfg.dialect = dialect;
    }

    let (name, src) = read_source(file.as_deref())?;

    match cli.cmd {
        Cmd::Clean { cleaner, .. } => {
            cleaner.apply(&mut cfg.cleaner);
            let mut ast = parse(&name, &src)?;
            clean(&mut ast, &cfg, &name, &src)?;
            print!("{}", yul_parse::format_block(&ast));
            Ok(())
        }
        Cmd::Run { .. } => {
            let ast = parse(&name, &src)?;
            print!("{}", run_to_dump(&ast, &cfg, &name, &src)?);
            Ok(())
        }
        Cmd::Diff { cleaner, .. } => {
            cleaner.apply(&mut cfg.cleaner);
            let original = parse(&name, &src)?;
            let mut cleaned = original.clone();
            clean(&mut cleaned, &cfg, &name, &src)?;

            let before = run_to_dump(&original, &cfg, &name, &src)?;
            let after = run_to_dump(&cleaned, &cfg, &name, &src)?;
            if before == after {
                debug!("dumps match");
                print!("{before}");
                return Ok(());
            }

            println!("=== original ===");
            print!("{before}");
            println!("=== cleaned ===");
            print!("{after}");
            println!("=== cleaned program ===");
            print!("{}", yul_parse::format_block(&cleaned));
            Err(miette::miette!(
                "interpreted traces for cleaned and original code differ"
            ))
        }
    }
}

fn read_source(file: Option<&Path>) -> miette::Result<(String, String)> {
    match file {
        Some(path) => {
            let src = std::fs::read_to_string(path).into_diagnostic()?;
            Ok((path.display().to_string(), src))
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            Ok(("<stdin>".to_string(), buf))
        }
    }
}

fn parse(name: &str, src: &str) -> miette::Result<Block> {
    yul_parse::parse_source(src)
        .map_err(|e| e.with_source_code(NamedSource::new(name, src.to_string())))
}

fn clean(ast: &mut Block, cfg: &ResolvedConfig, name: &str, src: &str) -> miette::Result<()> {
    let dialect = cfg.dialect.instantiate();
    yul_opt::clean_names(ast, dialect.as_ref(), &cfg.cleaner)
        .map_err(|e| miette::Report::new(e).with_source_code(NamedSource::new(name, src.to_string())))
}

fn run_to_dump(ast: &Block, cfg: &ResolvedConfig, name: &str, src: &str) -> miette::Result<String> {
    let mut state: InterpreterState = cfg.interpreter_state();
    let outcome = interpret(ast, &mut state)
        .map_err(|e| miette::Report::new(e).with_source_code(NamedSource::new(name, src.to_string())))?;
    if let Some(reason) = outcome.termination() {
        debug!(%reason, "execution terminated early");
    }
    Ok(dump(&state))
}
