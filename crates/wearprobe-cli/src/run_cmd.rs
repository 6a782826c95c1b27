//! `wearprobe run` command: one unattended pass through the harness.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use wearprobe_core::IntegrationHarness;
use wearprobe_core::sdk::SimulatedSdk;

use crate::config::WearprobeConfig;
use crate::surface::{self, LogTail};

/// What to do once the harness is up.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub register: bool,
    pub unregister: bool,
    pub links: Vec<String>,
    /// Keep pumping events for this long instead of stopping when idle.
    pub wait: Option<Duration>,
    pub json: bool,
}

/// Build a harness around the simulated SDK described by `config`.
pub fn build_harness(config: &WearprobeConfig) -> IntegrationHarness {
    let sdk = SimulatedSdk::new(config.simulator.clone());
    IntegrationHarness::new(
        Arc::new(sdk),
        config.source.clone(),
        config.harness.to_options(),
    )
}

/// Run the run command.
pub async fn run(config: &WearprobeConfig, options: RunOptions) -> Result<()> {
    let mut harness = build_harness(config);
    let mut tail = LogTail::default();
    let mut stdout = io::stdout();

    // Ctrl+C stops the pump; in-flight calls are abandoned.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        cancel_clone.cancel();
    });

    harness.start();
    if options.register {
        harness.register();
    }
    if options.unregister {
        harness.unregister();
    }
    for link in &options.links {
        harness.handle_incoming_link(link.clone());
    }
    if !options.json {
        tail.print_new(&harness, &mut stdout)?;
    }

    let deadline = options.wait.map(|w| Instant::now() + w);
    let mut interrupted = false;
    loop {
        if deadline.is_none() && harness.in_flight() == 0 {
            harness.process_pending();
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                interrupted = true;
                break;
            }
            _ = until(deadline) => break,
            open = harness.process_next() => {
                if !open {
                    break;
                }
            }
        }
        if !options.json {
            tail.print_new(&harness, &mut stdout)?;
        }
    }

    let snapshot = harness.snapshot();
    if options.json {
        let json = serde_json::to_string_pretty(&snapshot).context("failed to serialize snapshot")?;
        println!("{json}");
    } else {
        tail.print_new(&harness, &mut stdout)?;
        println!();
        surface::write_summary(&snapshot, &mut stdout)?;
        if interrupted {
            println!("Interrupted with {} call(s) still in flight.", snapshot.in_flight);
        }
    }

    harness.teardown();
    Ok(())
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
