use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::DocumentError;
use crate::io::parse_document_file;
use crate::models::Utterance;
use crate::stages::extract_utterances;

/// Configuration for the corpus scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Documents extracted at once; 1 keeps the scan on the calling thread
    pub jobs: usize,
    /// Parse budget per document; `None` disables the guard
    pub document_timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            document_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Result of scanning a corpus
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Utterances from every successfully extracted document, in discovery
    /// order
    pub utterances: Vec<Utterance>,
    /// Documents handed to the scanner
    pub documents_discovered: usize,
    /// Documents extracted without error
    pub documents_processed: usize,
    /// Documents skipped, with the cause
    pub failures: Vec<DocumentError>,
}

impl ScanResult {
    fn from_outcomes(outcomes: Vec<Result<Vec<Utterance>, DocumentError>>) -> Self {
        let mut result = Self {
            documents_discovered: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(utterances) => {
                    result.documents_processed += 1;
                    result.utterances.extend(utterances);
                }
                Err(error) => {
                    warn!("Skipping document: {}", error);
                    result.failures.push(error);
                }
            }
        }

        info!(
            "Scanned {} documents: {} processed, {} failed, {} utterances",
            result.documents_discovered,
            result.documents_processed,
            result.failures.len(),
            result.utterances.len()
        );
        result
    }
}

/// Parse and extract one transcript. The parse budget starts when this
/// document's work starts.
pub fn extract_document(
    path: &Path,
    timeout: Option<Duration>,
) -> Result<Vec<Utterance>, DocumentError> {
    let deadline = timeout.map(|t| Instant::now() + t);
    let doc = parse_document_file(path, deadline)?;
    let utterances = extract_utterances(&doc);
    debug!("{:?}: {} utterances", path, utterances.len());
    Ok(utterances)
}

/// Scan documents one at a time, in order. A failing document contributes
/// nothing and does not stop the scan.
pub fn scan_documents(paths: &[PathBuf], config: &ScanConfig) -> ScanResult {
    let outcomes = paths
        .iter()
        .map(|path| extract_document(path, config.document_timeout))
        .collect();
    ScanResult::from_outcomes(outcomes)
}

/// Scan documents on the blocking pool, at most `config.jobs` at a time.
/// Output order matches `paths` regardless of completion order.
pub async fn scan_documents_concurrent(paths: Vec<PathBuf>, config: &ScanConfig) -> ScanResult {
    if config.jobs <= 1 {
        return scan_documents(&paths, config);
    }

    let semaphore = Arc::new(Semaphore::new(config.jobs.min(Semaphore::MAX_PERMITS)));
    let mut tasks = JoinSet::new();
    let mut outcomes: Vec<Option<Result<Vec<Utterance>, DocumentError>>> =
        paths.iter().map(|_| None).collect();

    for (index, path) in paths.iter().cloned().enumerate() {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let timeout = config.document_timeout;
        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, extract_document(&path, timeout))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => warn!("Extraction worker failed: {}", e),
        }
    }

    // Slots left empty belong to workers that panicked or never started
    let outcomes = outcomes
        .into_iter()
        .zip(paths)
        .map(|(outcome, path)| {
            outcome.unwrap_or_else(|| {
                Err(DocumentError::Worker {
                    path,
                    message: "extraction did not return a result".to_string(),
                })
            })
        })
        .collect();
    ScanResult::from_outcomes(outcomes)
}
