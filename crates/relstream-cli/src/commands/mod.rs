//! Command implementations.

pub mod process;
pub mod watch;

pub use self::process::execute_process;
pub use self::watch::execute_watch;

use crate::config::Config;
use relstream_scheduler::{BatchScheduler, SchedulerHandle};
use relstream_domain::{DocumentResult, RelationExtractor};
use relstream_model::RemoteExtractor;
use relstream_segment::{ScriptDetector, SegmentEngine, Segmenter, WhitespaceCounter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The segment engine every command uses.
pub(crate) fn build_engine(config: &Config) -> SegmentEngine<ScriptDetector, WhitespaceCounter> {
    SegmentEngine::new(
        ScriptDetector,
        Segmenter::new(WhitespaceCounter, config.pipeline.max_length),
    )
}

/// The remote extractor from the model section.
pub(crate) fn build_remote(config: &Config) -> RemoteExtractor {
    RemoteExtractor::new(&config.model.endpoint)
        .with_device(config.model.device)
        .with_max_retries(config.model.max_retries)
}

/// Construct scheduler parts and spawn its run loop.
pub(crate) fn spawn_scheduler<E>(
    config: &Config,
    extractor: E,
) -> crate::Result<(
    SchedulerHandle,
    mpsc::Receiver<DocumentResult>,
    JoinHandle<()>,
)>
where
    E: RelationExtractor + Send + Sync + 'static,
{
    let (handle, scheduler, results) = BatchScheduler::new(config.scheduler_config(), extractor)?;
    let runner = tokio::spawn(scheduler.run());
    Ok((handle, results, runner))
}
