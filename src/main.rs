use clap::Parser;
use doc_harvest::convert::convert_directory;
use doc_harvest::{Harvest, RunSummary};
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::{Args, Command, ConvertArgs, CrawlArgs};

#[tokio::main]
async fn main() -> ExitCode {
    // Progress lines are the primary output, so default to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Crawl(crawl) => run_crawl(crawl).await,
        Command::Convert(convert) => run_convert(convert).await,
    }
}

async fn run_crawl(args: CrawlArgs) -> ExitCode {
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let strict = config.strict;

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL if not using {}", config.webdriver_url);

    let start_time = std::time::Instant::now();
    let summary = match Harvest::new(config).run().await {
        Ok(summary) => summary,
        Err(e) => {
            ::log::error!("Harvest aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };
    ::log::info!(
        "Harvest finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    if let Some(path) = &args.summary {
        if let Err(e) = write_summary(path, &summary) {
            ::log::error!("Failed to write summary to {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    if summary.is_failure(strict) {
        ::log::error!(
            "{} of {} pages could not be archived",
            summary.failed_count(),
            summary.total_links
        );
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run_convert(args: ConvertArgs) -> ExitCode {
    match convert_directory(&args.html_dir, &args.text_dir).await {
        Ok(report) => {
            ::log::info!(
                "Converted {} files, {} failed",
                report.converted.len(),
                report.failed.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Conversion aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> doc_harvest::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
