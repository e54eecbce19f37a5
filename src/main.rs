use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use parlaflat::{
    discover_documents, execute_render, execute_resolve, scan_documents_concurrent,
    DiscoveryConfig, OutputFormat, Registries, RegistryPaths, RenderConfig, ScanConfig,
};

#[derive(Parser)]
#[command(name = "parlaflat")]
#[command(author, version, about = "Flatten a TEI parliamentary corpus into one row per utterance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the corpus and its registries live
#[derive(Args)]
struct CorpusArgs {
    /// Corpus root directory
    root: PathBuf,

    /// Speaker registry (listPerson); found under the root if omitted
    #[arg(long)]
    speakers: Option<PathBuf>,

    /// Organization registry (listOrg); found under the root if omitted
    #[arg(long)]
    orgs: Option<PathBuf>,

    /// Political orientation taxonomy; found under the root if omitted
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Transcript glob, relative to the root
    #[arg(long, default_value = "**/*.xml")]
    pattern: String,

    /// Skip files whose name contains this keyword (repeatable)
    #[arg(long, default_values = ["listPerson", "listOrg", "taxonomy"])]
    exclude: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl CorpusArgs {
    fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            pattern: self.pattern.clone(),
            exclude: self.exclude.clone(),
        }
    }

    fn registry_paths(&self) -> Result<RegistryPaths> {
        RegistryPaths::resolve(
            &self.root,
            self.speakers.clone(),
            self.taxonomy.clone(),
            self.orgs.clone(),
        )
        .context("Failed to locate registry documents")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a corpus into a flat utterance table
    Convert {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Do not prefix CSV output with a byte-order mark
        #[arg(long)]
        no_bom: bool,

        /// Documents to extract concurrently
        #[arg(long, default_value = "1")]
        jobs: usize,

        /// Parse budget per transcript in seconds (0 disables it)
        #[arg(long, default_value = "60")]
        document_timeout_secs: u64,
    },

    /// Report on the registries and discovered transcripts without converting
    Analyze {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            corpus,
            output,
            format,
            no_bom,
            jobs,
            document_timeout_secs,
        } => {
            setup_logging(corpus.verbose);
            let scan_config = ScanConfig {
                jobs: jobs.max(1),
                document_timeout: (document_timeout_secs > 0)
                    .then(|| Duration::from_secs(document_timeout_secs)),
            };
            let render_config = RenderConfig {
                format,
                byte_order_mark: !no_bom,
            };
            convert_corpus(corpus, output, scan_config, render_config).await
        }
        Commands::Analyze { corpus } => {
            setup_logging(corpus.verbose);
            analyze_corpus(corpus)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn convert_corpus(
    corpus: CorpusArgs,
    output: PathBuf,
    scan_config: ScanConfig,
    render_config: RenderConfig,
) -> Result<()> {
    // Registries first: without them nothing can be resolved
    let registries =
        Registries::load(&corpus.registry_paths()?).context("Failed to load registries")?;

    let documents = discover_documents(&corpus.root, &corpus.discovery_config())
        .context("Failed to discover transcripts")?;
    info!("Found {} transcript documents", documents.len());

    let scan = scan_documents_concurrent(documents, &scan_config).await;
    for failure in &scan.failures {
        warn!("Skipped {:?}", failure.path());
    }

    let resolved = execute_resolve(scan.utterances, &registries);
    let rendered = execute_render(&resolved.records, &output, &render_config)?;

    info!(
        "Complete: {}/{} documents processed, {} records written to {:?}",
        scan.documents_processed,
        scan.documents_discovered,
        rendered.records_written,
        rendered.path
    );

    Ok(())
}

fn analyze_corpus(corpus: CorpusArgs) -> Result<()> {
    let paths = corpus.registry_paths()?;
    let registries = Registries::load(&paths).context("Failed to load registries")?;
    let documents = discover_documents(&corpus.root, &corpus.discovery_config())
        .context("Failed to discover transcripts")?;

    let speakers = &registries.speakers;
    let with_party = speakers.iter().filter(|s| s.party_ref.is_some()).count();

    println!("Corpus Analysis");
    println!("===============");
    println!("Speakers: {:?}", paths.speakers);
    println!("Organizations: {:?}", paths.organizations);
    println!("Taxonomy: {:?}", paths.taxonomy);
    println!("Transcript documents: {}", documents.len());
    println!();

    println!("Speakers");
    println!("--------");
    println!("Total: {}", speakers.len());
    println!("With party affiliation: {}", with_party);
    println!("Without party affiliation: {}", speakers.len() - with_party);
    println!();

    let orgs = &registries.organizations;
    let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unresolved = 0;
    for (_, label) in orgs.party_orientations() {
        match label {
            Some(label) => *labels.entry(label).or_default() += 1,
            None => unresolved += 1,
        }
    }

    println!("Organizations");
    println!("-------------");
    println!("Total: {}", orgs.len());
    println!("Political parties: {}", orgs.party_count());
    println!("Parties with orientation: {}", orgs.party_count() - unresolved);
    println!("Parties without orientation: {}", unresolved);
    println!();

    println!("Orientation Distribution");
    println!("------------------------");
    for (label, count) in &labels {
        println!("{}: {}", label, count);
    }

    Ok(())
}
