use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{RegistryError, RegistryKind};

/// Configuration for transcript discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Glob pattern relative to the corpus root
    pub pattern: String,
    /// File names containing any of these keywords are not transcripts
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pattern: "**/*.xml".to_string(),
            exclude: vec![
                "listPerson".to_string(),
                "listOrg".to_string(),
                "taxonomy".to_string(),
            ],
        }
    }
}

/// Find transcript documents under `root`, sorted by path
pub fn discover_documents(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<Vec<PathBuf>, RegistryError> {
    let mut paths: Vec<PathBuf> = glob_under(root, &config.pattern)?
        .into_iter()
        .filter(|path| !is_excluded(path, &config.exclude))
        .collect();
    paths.sort();
    debug!("Discovered {} documents under {:?}", paths.len(), root);
    Ok(paths)
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    exclude.iter().any(|keyword| name.contains(keyword.as_str()))
}

fn glob_under(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, RegistryError> {
    // The root is a literal path; only `pattern` may contain wildcards
    let root = glob::Pattern::escape(&root.display().to_string());
    let full_pattern = Path::new(&root).join(pattern).display().to_string();
    let entries = glob::glob(&full_pattern).map_err(|source| RegistryError::Pattern {
        pattern: full_pattern.clone(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path: {}", e),
        }
    }
    Ok(paths)
}

/// Locations of the three registry documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPaths {
    pub speakers: PathBuf,
    pub taxonomy: PathBuf,
    pub organizations: PathBuf,
}

impl RegistryPaths {
    /// Locate the registries under a corpus root by their file-name suffix
    pub fn discover(root: &Path) -> Result<Self, RegistryError> {
        Ok(Self {
            speakers: find_registry(root, RegistryKind::Speakers)?,
            taxonomy: find_registry(root, RegistryKind::Taxonomy)?,
            organizations: find_registry(root, RegistryKind::Organizations)?,
        })
    }

    /// Discover the registries, then replace any that were given explicitly
    pub fn resolve(
        root: &Path,
        speakers: Option<PathBuf>,
        taxonomy: Option<PathBuf>,
        organizations: Option<PathBuf>,
    ) -> Result<Self, RegistryError> {
        let find = |given: Option<PathBuf>, kind| match given {
            Some(path) => Ok(path),
            None => find_registry(root, kind),
        };
        Ok(Self {
            speakers: find(speakers, RegistryKind::Speakers)?,
            taxonomy: find(taxonomy, RegistryKind::Taxonomy)?,
            organizations: find(organizations, RegistryKind::Organizations)?,
        })
    }
}

fn registry_pattern(kind: RegistryKind) -> &'static str {
    match kind {
        RegistryKind::Speakers => "**/*listPerson.xml",
        RegistryKind::Taxonomy => "**/*taxonomy-politicalOrientation.xml",
        RegistryKind::Organizations => "**/*listOrg.xml",
    }
}

fn find_registry(root: &Path, kind: RegistryKind) -> Result<PathBuf, RegistryError> {
    let mut candidates = glob_under(root, registry_pattern(kind))?;
    candidates.sort();
    if candidates.len() > 1 {
        warn!(
            "Found {} {} documents, using {:?}",
            candidates.len(),
            kind,
            candidates[0]
        );
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| RegistryError::NotFound {
            kind,
            root: root.to_path_buf(),
        })
}
