//! Watch command - process files from a directory until interrupted.

use super::{build_engine, build_remote, spawn_scheduler};
use crate::cli::WatchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use relstream_domain::RelationExtractor;
use relstream_model::MockExtractor;
use relstream_pipeline::{Pipeline, ResultSink};
use relstream_watcher::DirectoryWatcher;
use tracing::info;

/// Watch the input directory and run the pipeline until Ctrl+C.
pub async fn execute_watch(args: WatchArgs, mut config: Config) -> Result<()> {
    config.apply(&args.shared);
    if let Some(input_dir) = args.input_dir {
        config.watch.input_dir = Some(input_dir);
    }
    if let Some(archive_dir) = args.archive_dir {
        config.watch.archive_dir = Some(archive_dir);
    }
    if let Some(output_dir) = args.output_dir {
        config.watch.output_dir = Some(output_dir);
    }
    if let Some(extension) = args.extension {
        config.watch.extension = extension;
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.watch.debounce_ms = debounce_ms;
    }

    let watcher_config = config.watcher_config()?;
    if !watcher_config.input_dir.is_dir() {
        return Err(CliError::Config(format!(
            "input directory {} does not exist",
            watcher_config.input_dir.display()
        )));
    }

    if args.shared.mock {
        run_session(MockExtractor::new(), &config).await
    } else {
        run_session(build_remote(&config), &config).await
    }
}

async fn run_session<E>(extractor: E, config: &Config) -> Result<()>
where
    E: RelationExtractor + Send + Sync + 'static,
{
    let watcher_config = config.watcher_config()?;
    let archive_dir = config.archive_dir();
    let output_dir = config.output_dir();

    info!(
        input_dir = %watcher_config.input_dir.display(),
        archive_dir = %archive_dir.display(),
        output_dir = %output_dir.display(),
        "watching for documents"
    );

    let (watcher_handle, events) = DirectoryWatcher::new(watcher_config)?.spawn();
    let (handle, results, runner) = spawn_scheduler(config, extractor)?;

    let pipeline = Pipeline::new(build_engine(config), handle, results)
        .with_sink(ResultSink::new(&output_dir))
        .with_archive_dir(&archive_dir);
    let pipeline_task = tokio::spawn(pipeline.run(events));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Runtime(format!("cannot listen for shutdown signal: {}", e)))?;
    info!("shutdown signal received, draining");

    watcher_handle.stop().await;
    let summary = pipeline_task
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))??;
    runner
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    println!(
        "Processed {} documents ({} triplets, {} failed)",
        summary.documents, summary.triplets, summary.failures
    );
    Ok(())
}
