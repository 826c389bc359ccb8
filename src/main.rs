use anyhow::Context;
use dotenv::dotenv;
use log::{LevelFilter, info, warn};
use pib_tracker::{
    config::TrackerConfig,
    pipeline::{export_new_items, run_with_context},
    report::{ReportFormat, render_json, render_table},
    scraping_context::ScrapingContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = TrackerConfig::new()?;
    let ctx = ScrapingContext::new(config)?;

    let report = run_with_context(&ctx)
        .await
        .context("press release run failed")?;

    match ctx.config.report_format {
        ReportFormat::Table => {
            println!("New press releases ({}):", report.new_ones.len());
            println!("{}", render_table(&report.new_ones));
            println!("All tracked press releases ({}):", report.combined.len());
            println!("{}", render_table(&report.combined));
        }
        ReportFormat::Json => println!("{}", render_json(&report)?),
    }

    if report.new_ones.is_empty() {
        info!("No new press releases this run");
    }
    if let Err(e) = export_new_items(&report, &ctx.config.new_items_path) {
        warn!("Could not export new press releases: {e}");
    }

    if let Some(e) = report.save_error {
        return Err(e).context("press releases were collected but not saved");
    }
    Ok(())
}
