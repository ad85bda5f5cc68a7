mod cli;

use livestream_scheduler::{config, eligibility, logging, run};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { dry_run } => {
            let config = config::load_config_from(cli.config.as_deref())?;
            let mail_log = logging::MailLog::new();
            let _guard = logging::init(&config.logging, cli.verbose, mail_log.clone())?;

            let rt = tokio::runtime::Runtime::new()?;
            let outcomes = rt.block_on(run::run(&config, dry_run, mail_log))?;

            let failed = outcomes.iter().filter(|o| o.is_failed()).count();
            tracing::info!(
                "Run finished: {} thumbnails handled, {} failed",
                outcomes.len(),
                failed
            );
            Ok(())
        }
        Commands::Authorize => {
            let config = config::load_config_from(cli.config.as_deref())?;
            let _guard = logging::init(&config.logging, cli.verbose, logging::MailLog::new())?;

            let rt = tokio::runtime::Runtime::new()?;
            let credential = rt.block_on(run::authorize(&config))?;
            println!("✓ Authorized, token stored in {:?}", config.auth.token_store);
            if let Some(expiry) = credential.expiry {
                println!("  Access token expires {}", expiry.to_rfc3339());
            }
            Ok(())
        }
        Commands::Check { names } => {
            let config = config::load_config_from(cli.config.as_deref())?;
            check_names(&config, &names)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("livestream-scheduler {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_names(config: &config::Config, names: &[String]) -> Result<()> {
    let zone = config.schedule_zone()?;
    let window = config.creation_window()?;
    let now = Utc::now();

    for name in names {
        println!("{}", name);

        let Some(parsed) = livestream_naming::parse(name) else {
            println!("  ✗ doesn't match {}", livestream_naming::NAME_FORMAT);
            continue;
        };
        let Some(scheduled) = zone.resolve(&parsed) else {
            println!("  ✗ not a valid date and time in the schedule zone");
            continue;
        };

        println!("  Start: {}", scheduled.to_rfc3339());
        if let Some(title) = &parsed.title {
            println!("  Title: {}", title);
        }
        let verdict = match eligibility::classify(scheduled.with_timezone(&Utc), now, window) {
            eligibility::Verdict::Eligible => "due, would be created now",
            eligibility::Verdict::PastDue => "start is in the past",
            eligibility::Verdict::TooFar => "start is beyond the creation window",
        };
        println!("  {}", verdict);
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    if let Some(p) = path {
        println!("Validating config: {:?}", p);
    }
    let config = config::load_config_from(path)?;

    println!("✓ Configuration is valid");
    println!(
        "  Creation distance: {}",
        humantime::format_duration(config.creation_distance)
    );
    println!(
        "  Timezone: {}",
        config.timezone.as_deref().unwrap_or("system local")
    );
    println!("  Queue backend: {:?}", config.queue.backend);
    println!("  Queue: {}", config.queue.queue);
    println!("  Done: {}", config.queue.done);
    println!("  Mail enabled: {}", config.mail.enabled);

    Ok(())
}
