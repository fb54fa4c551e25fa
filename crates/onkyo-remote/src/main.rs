//! Onkyo Remote - console remote control for the receiver daemon.
//!
//! Connects to the onkyocontrol daemon, prints receiver status changes as
//! they arrive, and sends the commands typed on stdin.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

mod config;
mod console;
mod frontend;
mod signals;

use onkyo_client::ReceiverClient;

use crate::console::Flow;
use crate::frontend::Frontend;

#[tokio::main]
async fn main() -> Result<()> {
    let args = config::Args::parse(std::env::args().skip(1))?;
    let config = config::load_config(args.config.as_deref())?;
    let config = config::apply_env_overrides(config)?;

    // Initialize logging; stdout belongs to the console
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive: Directive = format!("onkyo={}", config.logging.log_level)
                .parse()
                .context("Invalid log level")?;
            EnvFilter::new("warn").add_directive(directive)
        }
    };
    let logger = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if config.logging.json {
        logger.json().init();
    } else {
        logger.init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.client.host,
        port = config.client.port,
        "Starting Onkyo remote"
    );

    let (mut client, mut notes) = ReceiverClient::new(config.client);
    let mut state_rx = client.watch_state();
    let mut frontend = Frontend::new(client.status_handle());
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown_rx = signals::setup_signal_handlers()?;

    if !client.establish_connection().await {
        println!("daemon not reachable, retrying in the background");
    }
    println!("{}", console::HELP);

    loop {
        tokio::select! {
            // Connection readable or retry due
            event = client.next_event() => {
                if let Err(e) = client.handle_event(event).await {
                    warn!(error = %e, "Client error");
                    println!("error: {e}");
                }
            }

            // New status available
            Some(_) = notes.changed() => {
                frontend.refresh(&mut client).await;
            }

            Ok(()) = state_rx.changed() => {
                let state = *state_rx.borrow_and_update();
                frontend::print_connection_state(state);
            }

            line = stdin.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("End of input");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        break;
                    }
                };

                match console::parse(&line) {
                    Ok(Some(command)) => match console::execute(&mut client, &frontend, command).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(e) => println!("error: {e}"),
                    },
                    Ok(None) => {}
                    Err(e) => println!("error: {e}"),
                }
            }

            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    client.shutdown();

    info!("Onkyo remote stopped");
    Ok(())
}
