use std::process::exit;

use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use registry_retention::cli::args::Input;
use registry_retention::client::builder::RegistryClientBuilder;
use registry_retention::core::delete_tags::{delete_stale_tags, log_summary, report_stale_tags};
use registry_retention::core::select_tags::{select_stale_tags, SweepConfig};
use registry_retention::matchers::Matchers;

#[tokio::main()]
async fn main() {
    // Validate inputs
    let input = Input::parse();

    // Set up logging
    let indicatif_layer = IndicatifLayer::new();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(input.log_level.to_string()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .init();
    debug!("Logging initialized");

    info!("Using registry {}", input.registry_url);

    // Create client
    let client = match RegistryClientBuilder::new()
        .generate_urls(&input.registry_url)
        .set_http_headers()
        .and_then(RegistryClientBuilder::create_http_client)
        .and_then(RegistryClientBuilder::build)
    {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to build registry client: {e:?}");
            exit(1);
        }
    };

    let config = SweepConfig {
        cut_off: *input.cut_off,
        repository_matchers: Matchers::from(&input.repositories),
        tag_matchers: Matchers::from(&input.tags),
    };

    let stale_tags = match select_stale_tags(&client, &config, Local::now().naive_local()).await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to select tags: {e:?}");
            exit(1);
        }
    };

    report_stale_tags(&stale_tags);

    let summary = match delete_stale_tags(&client, &stale_tags, input.dry_run).await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to delete tags: {e:?}");
            exit(1);
        }
    };

    log_summary(&summary, input.dry_run);
}
