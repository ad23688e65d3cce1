//! # Sale Wizard Library
//!
//! Terminal front end for composing a sale in three steps.
//!
//! ## Module Organization
//! ```text
//! sale_wizard/
//! ├── lib.rs          ◄─── You are here (startup & command loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── WizardConfig (TOML + GEST_* env)
//! │   ├── controller.rs ◄─ SaleDraftController
//! │   └── events.rs   ◄─── DraftEvent / DraftView
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command parser and help
//! │   └── session.rs  ◄─── Executes commands
//! ├── render.rs       ◄─── Event → terminal lines
//! └── error.rs        ◄─── AppError for every command
//! ```
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Main Task (owns the Session)                         │
//! │                                                                         │
//! │   tokio::select! (biased)                                              │
//! │     ├── DraftEvent  (broadcast) ──► render::draft_event ──► stdout      │
//! │     ├── SearchEvent (mpsc)      ──► session.on_search_event ──► stdout  │
//! │     └── stdin line              ──► session.handle_line ──► stdout      │
//! │                                                                         │
//! │   Pending events are printed before the next line is read.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod render;
pub mod state;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use gest_lookup::{DebounceConfig, HttpProductLookup, ProductLookup, SaleSubmitter, SearchDebouncer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use commands::Session;
use error::{AppError, AppResult};
use state::{SaleDraftController, WizardConfig};

/// Runs the wizard until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// 1. Initialize logging (stderr, RUST_LOG overrides the default filter)
/// 2. Load WizardConfig (--config path or platform config dir, then env)
/// 3. Build the HTTP lookup, the search debouncer and the sale submitter
/// 4. Create the controller, prefill the sale date with the local clock
/// 5. Enter the command loop
/// ```
pub async fn run() -> AppResult<()> {
    init_tracing();

    let config = WizardConfig::load(config_path_from_args(std::env::args().skip(1))?)?;
    info!(
        base_url = %config.lookup.base_url,
        tax_rate_bps = config.sale.tax_rate_bps,
        "Starting sale wizard"
    );

    let lookup: Arc<dyn ProductLookup> = Arc::new(HttpProductLookup::new(config.lookup.clone())?);
    let (search, mut search_events) =
        SearchDebouncer::new(lookup, DebounceConfig::from(&config.lookup)).start();
    let sink = Arc::new(SaleSubmitter::new(config.lookup.clone())?);

    let mut controller = SaleDraftController::new(&config);
    controller.set_sale_date(chrono::Local::now().naive_local());
    let mut draft_events = controller.subscribe();

    let mut session = Session::new(controller, search, sink, config.currency.clone());
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Sale wizard. Type 'help' for commands.");
    print_prompt(&session.prompt());

    loop {
        tokio::select! {
            biased;

            event = draft_events.recv() => match event {
                Ok(event) => print_lines(&render::draft_event(&event, session.currency())),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Draft events lagged");
                }
                Err(RecvError::Closed) => break,
            },

            Some(event) = search_events.recv() => {
                print_lines(&session.on_search_event(&event));
                print_prompt(&session.prompt());
            }

            line = input.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };
                if line.trim().is_empty() {
                    print_prompt(&session.prompt());
                    continue;
                }

                let reply = session.handle_line(&line).await;
                print_lines(&reply.lines);
                if reply.quit {
                    break;
                }

                // Let the events of this command print before the prompt
                while let Ok(event) = draft_events.try_recv() {
                    print_lines(&render::draft_event(&event, session.currency()));
                }
                print_prompt(&session.prompt());
            }
        }
    }

    session.shutdown().await;
    info!("Sale wizard stopped");
    Ok(())
}

/// Reads `--config <path>` (or `--config=<path>`) from the arguments.
pub fn config_path_from_args<I>(args: I) -> AppResult<Option<PathBuf>>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut path = None;

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--config=") {
            path = Some(PathBuf::from(value));
        } else if arg == "--config" {
            let value = args
                .next()
                .ok_or_else(|| AppError::config("--config needs a path"))?;
            path = Some(PathBuf::from(value));
        } else {
            warn!(%arg, "Ignoring unknown argument");
        }
    }

    Ok(path)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gest=trace` - Show trace for the gest crates only
/// - Default: INFO, DEBUG for the wizard crates
///
/// Logs go to stderr so they never mix with the wizard output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gest=debug,sale_wizard=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_prompt(prompt: &str) {
    print!("{}", prompt);
    if let Err(e) = std::io::stdout().flush() {
        debug!(error = %e, "stdout flush failed");
    }
}
