use anyhow::Context;
use beanclass_classifiers::{predict, LoadedModel};
use beanclass_core::{report, FEATURE_SCHEMA};
use beanclass_server::cli::{Cli, Commands};
use beanclass_server::config::ServerConfig;
use beanclass_server::server::run_server;
use beanclass_server::source::BatchSource;
use beanclass_server::state::AppState;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overrides = cli.command.overrides();

    match cli.command {
        Commands::Serve { verbose, .. } => {
            init_logging(verbose);

            let config = ServerConfig::load(&cli.config, &overrides)?;
            let addr: SocketAddr = config.bind_address().parse()?;
            let metrics = init_metrics()?;

            let state = AppState::new(config, metrics).context("Failed to load model")?;

            println!();
            println!("  ┌─────────────────────────────────────────┐");
            println!("  │         Dry Bean Classifier             │");
            println!("  └─────────────────────────────────────────┘");
            println!();
            println!("  Model:       {} v{}", state.model.name, state.model.version);
            println!("  Trees:       {}", state.model.n_trees);
            println!("  Confidence:  {}", state.predictor.mode());
            println!();
            println!("  Open http://{} in your browser", addr);
            println!();

            run_server(state, addr).await?;
        }

        Commands::Predict {
            input,
            output,
            verbose,
            ..
        } => {
            init_logging(verbose);

            let config = ServerConfig::load(&cli.config, &overrides)?;
            let model = LoadedModel::load(config.classifier.to_model_config())
                .context("Failed to load model")?;

            let client = reqwest::Client::builder()
                .timeout(config.fetch_timeout())
                .build()?;
            let matrix = BatchSource::from_arg(&input)?
                .resolve(&client, config.max_upload_bytes)
                .await?;

            if matrix.is_empty() {
                println!("No data rows in {}", input);
                return Ok(());
            }

            let batch = predict(&matrix, &model, config.classifier.confidence)?;
            print!("{}", report::render_table(&batch.results));
            println!("{}", report::elapsed_message(batch.elapsed));

            if let Some(path) = output {
                if let Some(csv) = report::download_csv(&batch.results)? {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), rows = batch.results.len(), "Wrote predictions");
                }
            }
        }

        Commands::Schema => {
            println!("{:<18} {:>14}", "feature", "default");
            for field in FEATURE_SCHEMA.iter() {
                println!("{:<18} {:>14}", field.name, field.default);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "beanclass=debug,tower_http=debug"
    } else {
        "beanclass=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "beanclass_predictions_total",
        "Model invocations by confidence mode"
    );
    metrics::describe_counter!(
        "beanclass_predicted_rows_total",
        "Feature rows classified"
    );
    metrics::describe_counter!(
        "beanclass_prediction_cache_hits_total",
        "Predictions served from the memoization cache"
    );
    metrics::describe_counter!(
        "beanclass_rejections_total",
        "Requests rejected or failed, by error type"
    );
    metrics::describe_histogram!(
        "beanclass_prediction_latency_us",
        metrics::Unit::Microseconds,
        "Model invocation latency in microseconds"
    );

    Ok(handle)
}
