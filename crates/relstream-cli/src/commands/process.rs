//! Process command - one-shot extraction over files or literal text.

use super::{build_engine, build_remote, spawn_scheduler};
use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use relstream_domain::{Document, RelationExtractor};
use relstream_model::MockExtractor;
use relstream_pipeline::{memory_source, Pipeline, ResultSink};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

/// Process the given files or text once and exit.
pub async fn execute_process(args: ProcessArgs, mut config: Config) -> Result<()> {
    config.apply(&args.shared);

    let documents = collect_documents(&args).await?;
    let output_dir = args.output_dir.clone();
    let language = args.language.clone();

    if args.shared.mock {
        run_session(MockExtractor::new(), &config, documents, output_dir, language).await
    } else {
        run_session(build_remote(&config), &config, documents, output_dir, language).await
    }
}

async fn collect_documents(args: &ProcessArgs) -> Result<Vec<Document>> {
    if let Some(text) = &args.text {
        return Ok(vec![Document::anonymous(text.clone())]);
    }
    if args.files.is_empty() {
        return Err(CliError::InvalidInput(
            "nothing to process: pass files or --text".to_string(),
        ));
    }

    let mut documents = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CliError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            CliError::InvalidInput(format!(
                "{} is not valid UTF-8: {}",
                path.display(),
                e.utf8_error()
            ))
        })?;
        documents.push(Document::from_file(path, text));
    }
    Ok(documents)
}

async fn run_session<E>(
    extractor: E,
    config: &Config,
    documents: Vec<Document>,
    output_dir: Option<PathBuf>,
    language: Option<String>,
) -> Result<()>
where
    E: RelationExtractor + Send + Sync + 'static,
{
    let (handle, results, runner) = spawn_scheduler(config, extractor)?;
    let (forward_tx, mut forwarded) = mpsc::channel(64);

    let mut pipeline =
        Pipeline::new(build_engine(config), handle, results).with_forward(forward_tx);
    let print_to_stdout = output_dir.is_none();
    if let Some(output_dir) = output_dir {
        pipeline = pipeline.with_sink(ResultSink::new(output_dir));
    }
    if let Some(language) = language {
        pipeline = pipeline.with_language(language);
    }

    let source = memory_source(documents);
    let pipeline_task = tokio::spawn(pipeline.run(source));

    while let Some(result) = forwarded.recv().await {
        if print_to_stdout {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    let summary = pipeline_task
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))??;
    runner
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    info!(
        documents = summary.documents,
        triplets = summary.triplets,
        failures = summary.failures,
        "processing complete"
    );
    Ok(())
}
