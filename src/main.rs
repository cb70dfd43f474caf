use std::{
    io::{self, BufRead},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use flexi_logger::{Logger, LoggerHandle};
use log::info;

use taskline::{Error, LoadPolicy, Session, Store};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Main verb. If omitted, `shell` is default action.
    #[command(subcommand)]
    verb: Option<Verb>,

    /// Task store, one record per line.
    #[arg(
        short,
        long,
        env = "TASKLINE_FILE",
        value_hint = ValueHint::FilePath,
        default_value = "data/tasks.txt"
    )]
    file: PathBuf,

    /// Diagnostics level on stderr. RUST_LOG wins when set.
    #[arg(long, env = "TASKLINE_LOG", default_value = "warn")]
    log_level: String,

    /// Skip records that fail to decode instead of refusing to start.
    #[arg(long, env = "TASKLINE_SKIP_MALFORMED")]
    skip_malformed: bool,
}

#[derive(Subcommand, Debug)]
enum Verb {
    /// Read command lines from stdin until `bye`.
    Shell,
    /// Run one command line, e.g. `run deadline return book /by 2023/12/02`.
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Print every task as JSON.
    Export,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(&cli.log_level)?;
    info!(
        "event=app_start module=cli status=ok version={}",
        env!("CARGO_PKG_VERSION")
    );

    let policy = if cli.skip_malformed {
        LoadPolicy::SkipMalformed
    } else {
        LoadPolicy::Strict
    };
    let mut session = Session::open(Store::new(&cli.file), policy)
        .with_context(|| format!("loading tasks from {}", cli.file.display()))?;

    match cli.verb.unwrap_or(Verb::Shell) {
        Verb::Shell => shell(&mut session)?,
        Verb::Run { words } => {
            let reply = session.handle(&words.join(" "))?;
            println!("{}", reply.message);
        }
        Verb::Export => {
            let json = serde_json::to_string_pretty(session.tasks().as_slice())
                .context("serializing tasks")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Interactive loop. Bad input is reported and the loop goes on; a failed
/// save ends it.
fn shell(session: &mut Session) -> Result<()> {
    println!("Hello! What can I do for you?");
    for line in io::stdin().lock().lines() {
        let line = line.context("reading input")?;
        if line.trim().is_empty() {
            continue;
        }
        match session.handle(&line) {
            Ok(reply) => {
                println!("{}", reply.message);
                if reply.exit {
                    return Ok(());
                }
            }
            Err(e @ Error::Io { .. }) => return Err(e).context("saving tasks"),
            Err(e) => println!("Oops! {e}"),
        }
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<LoggerHandle> {
    Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log level `{level}`"))?
        .log_to_stderr()
        .format(flexi_logger::detailed_format)
        .start()
        .context("starting logger")
}
