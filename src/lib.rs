pub mod error;
pub mod io;
pub mod models;
pub mod stages;

pub use error::{DocumentError, RegistryError, RegistryKind, XmlError};
pub use io::{
    discover_documents, parse_document, parse_document_file, DiscoveryConfig, Document,
    RegistryPaths,
};
pub use models::{normalize_ref, ResolvedRecord, Speaker, Utterance};
pub use stages::{
    execute_render, execute_resolve, extract_utterances, scan_documents,
    scan_documents_concurrent, OutputFormat, Registries, RenderConfig, ScanConfig,
};
