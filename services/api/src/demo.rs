use crate::infra::{Backends, Services};
use chrono::{Duration, TimeZone, Utc};
use clap::Args;
use dari::error::AppError;
use dari::marketplace::accounts::{Registration, UserId};
use dari::marketplace::assistant::FixedCompletionClient;
use dari::marketplace::listings::{PropertyDraft, PropertyKind, TransactionKind};
use dari::marketplace::media::{ArchiveVideoStore, PublicImageStore};
use dari::marketplace::moderation::{
    AppealCooldown, AppealDecision, AppealResolution, AppealSubmission, ReportDecision,
    ReportReason, ReportResolution, ReportSubmission, MAX_APPEAL_COOLDOWN_HOURS,
};
use dari::marketplace::{ManualClock, MemoryStore};
use std::fmt::Display;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Hours an owner must wait between appeals on the same listing
    #[arg(long, default_value_t = 24)]
    pub(crate) cooldown_hours: i64,
    /// Stop after the report decision
    #[arg(long)]
    pub(crate) skip_appeal: bool,
}

fn failed(step: &str, err: impl Display) -> AppError {
    AppError::Demo(format!("{step}: {err}"))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        cooldown_hours,
        skip_appeal,
    } = args;
    let cooldown = AppealCooldown::from_hours(cooldown_hours).ok_or_else(|| {
        AppError::Demo(format!(
            "cooldown hours must be between 0 and {MAX_APPEAL_COOLDOWN_HOURS}"
        ))
    })?;

    let start = Utc
        .with_ymd_and_hms(2025, 5, 12, 9, 0, 0)
        .single()
        .ok_or_else(|| AppError::Demo("invalid demo start time".to_string()))?;
    let clock = Arc::new(ManualClock::new(start));
    let services = Services::new(
        Arc::new(MemoryStore::new()),
        Backends {
            clock: clock.clone(),
            images: Arc::new(PublicImageStore::new("http://127.0.0.1:3000/media")),
            videos: Arc::new(ArchiveVideoStore::new("https://archive.org")),
            completions: Arc::new(FixedCompletionClient::new(
                r#"{"wilaya": "Oran", "transaction": "sale", "min_rooms": 3}"#,
            )),
            appeal_cooldown: cooldown,
        },
    );

    println!("Dari moderation demo");
    let admin = UserId("ops-admin".to_string());
    services
        .accounts
        .bootstrap_admin(&admin)
        .map_err(|err| failed("seed admin", err))?;
    let owner = register(&services, "yacine", "Yacine B.")?;
    let reporter = register(&services, "lina", "Lina K.")?;

    let listing = services
        .listings
        .create(&owner, demo_listing())
        .map_err(|err| failed("create listing", err))?;
    println!(
        "- {} published \"{}\" ({}) -> {}",
        owner, listing.title, listing.id, listing.status
    );

    let assisted = services
        .assistant
        .search("F4 à vendre à Oran, au moins 3 pièces")
        .await
        .map_err(|err| failed("assistant search", err))?;
    println!(
        "- Assistant search for wilaya {:?} found {} listing(s)",
        assisted.filters.wilaya,
        assisted.results.len()
    );

    let report = services
        .moderation
        .submit_report(
            &reporter,
            ReportSubmission {
                property_id: listing.id.clone(),
                reason: ReportReason::ScamFraud,
                comments: "asks for a deposit before any visit".to_string(),
            },
        )
        .map_err(|err| failed("submit report", err))?;
    println!(
        "- {} reported {} as {}",
        reporter,
        listing.id,
        report.reason.code()
    );

    let outcome = services
        .moderation
        .resolve_report(
            &admin,
            &report.id,
            ReportResolution {
                decision: ReportDecision::Delete,
                notes: "fraudulent listing".to_string(),
            },
        )
        .map_err(|err| failed("resolve report", err))?;
    if let Some(property) = &outcome.property {
        println!(
            "- Admin deleted {}: reason \"{}\"",
            property.id,
            property.deletion_reason.as_deref().unwrap_or_default()
        );
    }
    if let Some(trust) = outcome.owner_trust {
        println!("  Owner trust level is now {trust}");
    }
    println!("  Report status: {}", outcome.report.status);

    if skip_appeal {
        return Ok(());
    }

    println!("\nAppeal flow (cooldown {cooldown_hours}h)");
    let appeal = |message: &str| AppealSubmission {
        property_id: listing.id.clone(),
        message: message.to_string(),
    };
    let first = services
        .moderation
        .submit_appeal(&owner, appeal("The deposit request came from an impersonator"))
        .map_err(|err| failed("submit appeal", err))?;
    let kept = services
        .moderation
        .resolve_appeal(
            &admin,
            &first.id,
            AppealResolution {
                decision: AppealDecision::Delete,
                notes: String::new(),
            },
        )
        .map_err(|err| failed("resolve appeal", err))?;
    println!("- First appeal {} -> {}", first.id, kept.appeal.status);

    clock.advance(Duration::hours(1));
    let second = match services
        .moderation
        .submit_appeal(&owner, appeal("Adding the police report"))
    {
        Ok(early) => {
            println!("- Second appeal accepted after one hour as {}", early.id);
            early
        }
        Err(err) => {
            println!("- Second appeal one hour later rejected: {err}");
            clock.advance(cooldown.window());
            services
                .moderation
                .submit_appeal(&owner, appeal("Adding the police report"))
                .map_err(|err| failed("submit second appeal", err))?
        }
    };
    let published = services
        .moderation
        .resolve_appeal(
            &admin,
            &second.id,
            AppealResolution {
                decision: AppealDecision::Publish,
                notes: "identity verified".to_string(),
            },
        )
        .map_err(|err| failed("publish appeal", err))?;
    println!(
        "- Second appeal {} -> {}; listing {} is {}",
        second.id, published.appeal.status, published.property.id, published.property.status
    );
    println!("  Owner trust level restored to {}", published.owner_trust);

    let stats = services
        .moderation
        .stats(&admin)
        .map_err(|err| failed("dashboard stats", err))?;
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("\nDashboard stats:\n{json}"),
        Err(err) => println!("\nDashboard stats unavailable: {err}"),
    }

    Ok(())
}

fn register(
    services: &Services<MemoryStore>,
    id: &str,
    name: &str,
) -> Result<UserId, AppError> {
    let id = UserId(id.to_string());
    services
        .accounts
        .register(
            &id,
            Registration {
                display_name: name.to_string(),
                email: format!("{}@example.dz", id.0),
                advertiser: false,
            },
        )
        .map_err(|err| failed("register user", err))?;
    Ok(id)
}

fn demo_listing() -> PropertyDraft {
    PropertyDraft {
        title: "F4 Haï Khemisti".to_string(),
        description: "Fourth floor, lift, close to the tramway".to_string(),
        wilaya: 31,
        commune: Some("Bir El Djir".to_string()),
        transaction: TransactionKind::Sale,
        kind: PropertyKind::Apartment,
        price: 21_500_000,
        surface_m2: Some(96),
        rooms: Some(4),
    }
}
