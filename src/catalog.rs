use crate::archive::{ParseDiagnostic, ParseLevel, ParsingResult};
use crate::facade::{ArchiveService, TopologyLookup};
use crate::topology::{IntoTopology, Topology, TopologyDocument};
use ahash::AHashMap;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// An in-process topology registry that reads `TopologyDocument` JSON files.
///
/// An archive is either a single `.json` file or a directory whose top-level
/// `.json` files are each one document. Nothing is registered from an archive
/// that produced an error.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    topologies: RwLock<AHashMap<String, Vec<Topology>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a topology directly. Returns false if that name and version already exist.
    pub fn register(&self, topology: Topology) -> bool {
        let mut topologies = self
            .topologies
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let versions = topologies.entry(topology.name.clone()).or_default();
        if versions.iter().any(|t| t.version == topology.version) {
            return false;
        }
        versions.push(topology);
        true
    }

    pub fn contains(&self, name: &str, version: &str) -> bool {
        self.topologies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|versions| versions.iter().any(|t| t.version == version))
    }

    pub fn versions(&self, name: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .topologies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|v| v.iter().map(|t| t.version.clone()).collect())
            .unwrap_or_default();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    /// Registers every parsed document, or none if any name and version is taken.
    ///
    /// The check and the insert happen under one write lock.
    fn register_all(
        &self,
        parsed: Vec<(String, Topology)>,
        registered: &mut Option<String>,
    ) -> Vec<ParseDiagnostic> {
        let mut topologies = self
            .topologies
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let conflicts: Vec<ParseDiagnostic> = parsed
            .iter()
            .filter(|(_, topology)| {
                topologies
                    .get(&topology.name)
                    .is_some_and(|versions| versions.iter().any(|t| t.version == topology.version))
            })
            .map(|(file, topology)| {
                ParseDiagnostic::new(
                    ParseLevel::Error,
                    format!(
                        "topology '{}' version '{}' already exists",
                        topology.name, topology.version
                    ),
                )
                .in_file(file.clone())
            })
            .collect();
        if !conflicts.is_empty() {
            return conflicts;
        }

        parsed
            .into_iter()
            .map(|(file, topology)| {
                let diagnostic = ParseDiagnostic::new(
                    ParseLevel::Info,
                    format!(
                        "registered topology '{}' version '{}'",
                        topology.name, topology.version
                    ),
                )
                .in_file(file);
                *registered = Some(topology.name.clone());
                topologies
                    .entry(topology.name.clone())
                    .or_default()
                    .push(topology);
                diagnostic
            })
            .collect()
    }

    fn documents(archive: &Path) -> Result<Vec<PathBuf>, ParseDiagnostic> {
        if archive.is_file() {
            return Ok(vec![archive.to_path_buf()]);
        }
        let entries = fs::read_dir(archive).map_err(|e| {
            ParseDiagnostic::new(
                ParseLevel::Error,
                format!("cannot read archive '{}': {}", archive.display(), e),
            )
        })?;
        let mut documents: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        documents.sort();
        Ok(documents)
    }
}

impl ArchiveService for InMemoryCatalog {
    fn upload(&self, archive: &Path) -> ParsingResult {
        let mut result = ParsingResult::default();

        let documents = match Self::documents(archive) {
            Ok(documents) => documents,
            Err(diagnostic) => {
                result.diagnostics.push(diagnostic);
                return result;
            }
        };
        if documents.is_empty() {
            result.diagnostics.push(ParseDiagnostic::new(
                ParseLevel::Error,
                format!("archive '{}' contains no topology document", archive.display()),
            ));
            return result;
        }

        let mut parsed: Vec<(String, Topology)> = Vec::new();
        for path in &documents {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let topology = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| TopologyDocument::from_json(&json).map_err(|e| e.to_string()))
                .and_then(|doc| doc.into_topology().map_err(|e| e.to_string()));

            match topology {
                Ok(topology) => {
                    if let Some((earlier, _)) = parsed.iter().find(|(_, t)| {
                        t.name == topology.name && t.version == topology.version
                    }) {
                        result.diagnostics.push(
                            ParseDiagnostic::new(
                                ParseLevel::Error,
                                format!(
                                    "topology '{}' version '{}' is also declared in {}",
                                    topology.name, topology.version, earlier
                                ),
                            )
                            .in_file(file),
                        );
                        continue;
                    }
                    if topology.nodes.is_empty() {
                        result.diagnostics.push(
                            ParseDiagnostic::new(
                                ParseLevel::Warning,
                                format!("topology '{}' declares no nodes", topology.name),
                            )
                            .in_file(file.clone()),
                        );
                    }
                    parsed.push((file, topology));
                }
                Err(message) => {
                    result
                        .diagnostics
                        .push(ParseDiagnostic::new(ParseLevel::Error, message).in_file(file));
                }
            }
        }

        if result.has_errors() {
            return result;
        }
        result.diagnostics.extend(self.register_all(parsed, &mut result.topology));
        result
    }
}

impl TopologyLookup for InMemoryCatalog {
    fn latest(&self, name: &str) -> Option<Topology> {
        self.topologies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)?
            .iter()
            .max_by(|a, b| compare_versions(&a.version, &b.version))
            .cloned()
    }
}

/// Compares dotted versions segment by segment, numerically where both segments are numbers.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
