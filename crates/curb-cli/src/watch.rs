//! # Watch Subcommand
//!
//! Live 1 Hz countdown for a marker's declaration. Fetches state once,
//! then drives the presenter loop against the cached declaration — the
//! server is not polled per tick.

use std::io::Write;

use clap::Args;

use curb_client::{format_duration, run_countdown, MarkerClient, WatchEnd};
use curb_core::MarkerCode;

/// Arguments for `curb watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// The marker code.
    pub code: String,
}

/// `curb watch` — count down until final unlock is permitted.
pub async fn run_watch(client: &MarkerClient, args: &WatchArgs) -> anyhow::Result<()> {
    let code = MarkerCode::new(args.code.as_str())?;
    let entry = client.marker(&code).await?;

    let Some(declaration) = entry.declaration else {
        println!("{code} has no declaration — run `curb temp {code}` first");
        std::process::exit(1);
    };

    let end = run_countdown(&declaration, |view| {
        print!(
            "\r{code}: eligible in {:<12} expires in {:<12}",
            format_duration(view.secs_to_eligible),
            format_duration(view.secs_to_expiry),
        );
        let _ = std::io::stdout().flush();
    })
    .await;
    println!();

    match end {
        WatchEnd::Eligible => {
            println!("final unlock permitted now: curb final {code}");
            Ok(())
        }
        WatchEnd::Finalized => {
            println!("{code} is already finalized");
            Ok(())
        }
        WatchEnd::Expired => {
            println!("the temporary unlock expired — run `curb temp {code}` to restart");
            std::process::exit(1);
        }
    }
}
