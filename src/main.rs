use clap::{Parser, Subcommand};
use secmap::{app, color, config, data, map, partition};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and summarize the map snapshot for one week
    Snapshot {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        week: u32,
    },
    /// Replay a range of weeks through the reconciler and report layer churn
    Timeline {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// How many weeks back to start the replay from
        #[arg(long, default_value_t = 12)]
        weeks: u32,
    },
    /// Fetch the scan report for one organization
    Report {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        organization: String,
        #[arg(short, long, default_value_t = 0)]
        week: u32,
    },
    /// Fetch rankings and aggregate statistics for one week
    Stats {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        week: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Snapshot { config, week } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let client = data::DataClient::new(&app_config.backend)?;

            println!(
                "Fetching snapshot for {}/{} at week {}...",
                app_config.map.country, app_config.map.category, week
            );
            let snapshot = client
                .fetch_snapshot(&app_config.map.country, &app_config.map.category, *week)
                .await?;

            let (regions, points) = partition::partition(&snapshot);
            println!(
                "Got {} features: {} regions, {} points",
                snapshot.len(),
                regions.len(),
                points.len()
            );

            let mut red = 0;
            let mut orange = 0;
            let mut yellow = 0;
            let mut green = 0;
            let mut unknown = 0;
            for feature in &snapshot.features {
                match color::classify(feature.properties.color.as_deref()) {
                    color::ColorBucket::Red => red += 1,
                    color::ColorBucket::Orange => orange += 1,
                    color::ColorBucket::Yellow => yellow += 1,
                    color::ColorBucket::Green => green += 1,
                    color::ColorBucket::Unknown => unknown += 1,
                }
            }
            println!(
                "By status: {} red, {} orange, {} yellow, {} green, {} unknown",
                red, orange, yellow, green, unknown
            );
        }
        Commands::Timeline { config, weeks } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let client = data::DataClient::new(&app_config.backend)?;
            let mut dashboard =
                app::Dashboard::new(map::RecordingBackend::new(), &app_config.map);

            println!(
                "Replaying {} weeks of {}/{} through the reconciler...",
                weeks, app_config.map.country, app_config.map.category
            );

            // Oldest week first, so each fetch reconciles into the previous one
            for week in (0..=*weeks).rev() {
                let mark = dashboard.map().backend().ops.len();
                match client
                    .fetch_snapshot(&app_config.map.country, &app_config.map.category, week)
                    .await
                {
                    Ok(snapshot) => {
                        if snapshot.is_empty() {
                            println!("week {:>2}: empty response, keeping previous layers", week);
                            continue;
                        }
                        dashboard.plot_snapshot(&snapshot);
                        let (adds, removes, restyles) =
                            dashboard.map().backend().churn_since(mark);
                        println!(
                            "week {:>2}: {} features -> +{} / -{} / ~{} layers ({} rendered)",
                            week,
                            snapshot.len(),
                            adds,
                            removes,
                            restyles,
                            dashboard.map().len()
                        );
                    }
                    Err(e) => {
                        // Stale layers stay on screen for this cycle
                        tracing::warn!("snapshot fetch failed for week {}: {:#}", week, e);
                    }
                }
            }
        }
        Commands::Report {
            config,
            organization,
            week,
        } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let client = data::DataClient::new(&app_config.backend)?;

            let report = client
                .fetch_report(
                    &app_config.map.country,
                    &app_config.map.category,
                    organization,
                    *week,
                )
                .await?;

            let name = report
                .organization_name
                .as_deref()
                .unwrap_or(organization.as_str());
            println!("Report for {} (week {})", name, week);
            println!(
                "  totals: {} high, {} medium, {} low",
                report.high, report.medium, report.low
            );
            if let Some(rating) = report.rating {
                println!("  rating: {}", rating);
            }
            if let Some(when) = &report.when {
                println!("  scanned: {}", when);
            }
            if let Some(handle) = &report.twitter_handle {
                println!("  social: {}", handle);
            }
            for url in &report.urls {
                println!(
                    "  {}: {} high, {} medium, {} low",
                    url.url, url.high, url.medium, url.low
                );
            }
        }
        Commands::Stats { config, week } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let client = data::DataClient::new(&app_config.backend)?;
            let country = &app_config.map.country;
            let category = &app_config.map.category;

            let stats = client.fetch_stats(country, category, *week).await?;
            println!(
                "Organizations by status: {} red, {} orange, {} yellow, {} green, {} unknown",
                stats.red, stats.orange, stats.yellow, stats.green, stats.unknown
            );

            let failing = client.fetch_top_fail(country, category, *week).await?;
            println!("Top failing:");
            for (i, org) in failing.iter().take(10).enumerate() {
                println!(
                    "  {:>2}. {} ({} high, {} medium, {} low)",
                    i + 1,
                    org.organization_name,
                    org.high,
                    org.medium,
                    org.low
                );
            }

            let improving = client.fetch_top_win(country, category, *week).await?;
            println!("Top improving:");
            for (i, org) in improving.iter().take(10).enumerate() {
                println!(
                    "  {:>2}. {} ({} high, {} medium, {} low)",
                    i + 1,
                    org.organization_name,
                    org.high,
                    org.medium,
                    org.low
                );
            }

            let series = client
                .fetch_vulnerability_series(country, category, *week)
                .await?;
            if let Some(latest) = series.last() {
                println!(
                    "Latest vulnerability counts ({}): {} high, {} medium, {} low",
                    latest.date, latest.high, latest.medium, latest.low
                );
            }
        }
    }

    Ok(())
}
