//! # Marker Subcommands
//!
//! `show`, `temp`, `final`, and `coupons`: one request each, summarized
//! for the terminal.

use anyhow::Context;
use clap::Args;

use curb_client::{format_duration, ClientError, CountdownView, MarkerClient};
use curb_core::{MarkerCode, Timestamp};

/// Arguments shared by every marker-addressed subcommand.
#[derive(Args, Debug)]
pub struct MarkerArgs {
    /// The marker code (as printed on the physical tag).
    pub code: String,
}

/// Arguments for `curb temp`.
#[derive(Args, Debug)]
pub struct TempArgs {
    /// The marker code.
    pub code: String,

    /// Free-text notes stored with the declaration.
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for `curb final`.
#[derive(Args, Debug)]
pub struct FinalArgs {
    /// The marker code.
    pub code: String,

    /// Owner e-mail attached to the coupon issuance.
    #[arg(long)]
    pub email: Option<String>,
}

fn parse_code(code: &str) -> anyhow::Result<MarkerCode> {
    MarkerCode::new(code).context("invalid marker code")
}

/// `curb show` — current marker state with one-shot countdowns.
pub async fn run_show(client: &MarkerClient, args: &MarkerArgs) -> anyhow::Result<()> {
    let code = parse_code(&args.code)?;
    let entry = client.marker(&code).await?;

    println!("marker:  {}", entry.marker.code);
    println!("report:  {} ({})", entry.report.status, entry.report.id);
    if !entry.report.ocr_text.is_empty() {
        println!("ocr:     {}", entry.report.ocr_text);
    }

    match &entry.declaration {
        None => println!("declaration: none"),
        Some(d) => {
            println!("declared:     {}", d.declared_at);
            println!("eligible at:  {}", d.eligible_final_at);
            println!("expires at:   {}", d.expires_at);
            println!("status:       {}", d.status);
            if let Some(finalized_at) = d.finalized_at {
                println!("finalized:    {finalized_at}");
            }

            let view = CountdownView::compute(d, Timestamp::now());
            if view.finalized {
                // Nothing to count down.
            } else if view.expired {
                println!("state:        expired");
            } else if view.eligible {
                println!("state:        eligible for final unlock");
            } else {
                println!(
                    "state:        eligible in {}, expires in {}",
                    format_duration(view.secs_to_eligible),
                    format_duration(view.secs_to_expiry),
                );
            }
        }
    }
    Ok(())
}

/// `curb temp` — temporarily unlock a marker.
pub async fn run_temp(client: &MarkerClient, args: &TempArgs) -> anyhow::Result<()> {
    let code = parse_code(&args.code)?;
    let declaration = client.unlock_temp(&code, args.notes.as_deref()).await?;

    println!("temporary unlock declared for {code}");
    println!("eligible for final unlock at {}", declaration.eligible_final_at);
    println!("expires at {}", declaration.expires_at);

    let view = CountdownView::compute(&declaration, Timestamp::now());
    println!(
        "final unlock permitted in {}",
        format_duration(view.secs_to_eligible)
    );
    Ok(())
}

/// `curb final` — permanently unlock a marker.
pub async fn run_final(client: &MarkerClient, args: &FinalArgs) -> anyhow::Result<()> {
    let code = parse_code(&args.code)?;

    match client.unlock_final(&code, args.email.as_deref()).await {
        Ok(result) => {
            println!("final unlock complete for {code}");
            println!("finalized at {}", result.finalized_at);
            match result.coupon {
                Some(coupon) => {
                    println!("coupon: {} - {}", coupon.name, coupon.description);
                    println!(
                        "        discount {} ({}) at {}, valid until {}",
                        coupon.discount, coupon.discount_type, coupon.shop_name, coupon.expires_at,
                    );
                    println!("        redeem with id {}", coupon.id);
                }
                None => println!("no coupon available this time"),
            }
            Ok(())
        }
        Err(ClientError::Api {
            code: ref api_code,
            eligible_final_at: Some(eligible),
            ..
        }) if api_code == "TOO_EARLY" => {
            let remaining = Timestamp::now().seconds_until(eligible).max(0) as u64;
            println!("not yet eligible — final unlock permitted at {eligible}");
            println!("({} remaining; `curb watch {code}` counts it down)", format_duration(remaining));
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// `curb coupons` — coupons issued against a marker.
pub async fn run_coupons(client: &MarkerClient, args: &MarkerArgs) -> anyhow::Result<()> {
    let code = parse_code(&args.code)?;
    let listing = client.coupons(&code).await?;

    if listing.coupons.is_empty() {
        println!("no coupons issued for {code}");
        return Ok(());
    }

    for coupon in &listing.coupons {
        println!(
            "{}  {} ({} {}) — valid until {}",
            coupon.id, coupon.name, coupon.discount, coupon.discount_type, coupon.expires_at
        );
    }
    Ok(())
}
