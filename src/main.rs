#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::path;
use std::process;

use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::application::cli;
use crate::application::repl;
use crate::domain::services::actions::ActionsService;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! BioCopilot has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn debug_log_dir() -> String {
    return env::var("BIOCOPILOT_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("biocopilot")
            .to_string_lossy()
            .to_string();
    });
}

async fn run() -> Result<()> {
    let Some(config) = cli::parse().await? else {
        return Ok(());
    };
    let context = cli::open_context(config)?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let actions_context = context.clone();
    let actions_future = tokio::spawn(async move {
        return ActionsService::start(actions_context, event_tx, &mut action_rx).await;
    });

    let repl_future = repl::start(context, action_tx, &mut event_rx);

    tokio::select!(
        res = actions_future => res??,
        res = repl_future => res?,
    );

    return Ok(());
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let log_dir = path::PathBuf::from(debug_log_dir());
    let file_appender = tracing_appender::rolling::never(log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("biocopilot")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    if let Err(err) = run().await {
        handle_error(err);
    }

    process::exit(0);
}
