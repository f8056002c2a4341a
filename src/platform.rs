//! The platform ties the collaborators together and exposes the entry points an
//! embedding orchestrator calls.
//!
//! Every entry point takes the [`ActingIdentity`] on whose behalf it runs; there
//! is no ambient "current user". A `Platform` holds no mutable state of its own,
//! so one instance can serve several deployments from different threads.

use crate::archive::{ArchiveStager, ParsingResult, StagedArchive};
use crate::error::TransformError;
use crate::facade::{ArchiveService, AttributeResolver, TopologyLookup};
use crate::transformer::{TransformedApplication, Transformer};
use ahash::AHashMap;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// May register archives and types.
    Admin,
    /// May transform registered topologies.
    Operator,
}

/// The actor an operation is performed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingIdentity {
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl ActingIdentity {
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, [Role::Admin, Role::Operator])
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Self::new(name, [Role::Operator])
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    fn require(&self, role: Role, operation: &str) -> Result<(), TransformError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(TransformError::PermissionDenied {
                actor: self.name.clone(),
                operation: operation.to_string(),
            })
        }
    }
}

/// Outcome of loading one member directory of a type bundle.
#[derive(Debug)]
pub struct BundleMember {
    pub name: String,
    pub result: Result<ParsingResult, TransformError>,
}

pub struct Platform {
    archives: Arc<dyn ArchiveService>,
    topologies: Arc<dyn TopologyLookup>,
    resolver: Arc<dyn AttributeResolver>,
    stager: ArchiveStager,
    type_mappings: AHashMap<String, String>,
}

impl Platform {
    pub fn new(
        archives: Arc<dyn ArchiveService>,
        topologies: Arc<dyn TopologyLookup>,
        resolver: Arc<dyn AttributeResolver>,
    ) -> Result<Self, TransformError> {
        Ok(Self {
            archives,
            topologies,
            resolver,
            stager: ArchiveStager::new()?,
            type_mappings: AHashMap::new(),
        })
    }

    /// Maps a topology node type onto an entity type for every transformation.
    pub fn with_type_mapping(mut self, node_type: &str, entity_type: &str) -> Self {
        self.type_mappings
            .insert(node_type.to_string(), entity_type.to_string());
        self
    }

    pub fn stager(&self) -> &ArchiveStager {
        &self.stager
    }

    /// Uploads an archive already on disk.
    ///
    /// Advisory diagnostics are logged; any error-level diagnostic fails the
    /// upload with every diagnostic included in the message.
    pub fn upload_archive(
        &self,
        actor: &ActingIdentity,
        archive: &Path,
        caller_reference: &str,
    ) -> Result<ParsingResult, TransformError> {
        actor.require(Role::Admin, "upload archives")?;

        let result = self.archives.upload(archive);
        if !result.diagnostics.is_empty() {
            debug!(
                archive = caller_reference,
                actor = %actor.name,
                "parse notes:\n  {}",
                result.diagnostics.iter().join("\n  ")
            );
        }
        if result.has_errors() {
            return Err(TransformError::ParseDiagnostic {
                archive: caller_reference.to_string(),
                diagnostics: result.diagnostics,
            });
        }

        info!(archive = caller_reference, actor = %actor.name, "archive uploaded");
        Ok(result)
    }

    /// Uploads a staged unit and removes it from disk afterwards, whatever the outcome.
    pub fn upload_staged(
        &self,
        actor: &ActingIdentity,
        staged: StagedArchive,
    ) -> Result<ParsingResult, TransformError> {
        let result = self.upload_archive(actor, &staged.path, &staged.name);
        let path = staged.path.clone();
        if let Err(e) = staged.discard() {
            warn!(path = %path.display(), error = %e, "failed to remove staged archive");
        }
        result
    }

    /// Stages a single document read from `reader` and uploads it.
    pub fn upload_single_document<R: Read>(
        &self,
        actor: &ActingIdentity,
        reader: R,
        caller_reference: &str,
    ) -> Result<ParsingResult, TransformError> {
        actor.require(Role::Admin, "upload archives")?;
        let staged = self.stager.stage_stream(reader, caller_reference)?;
        self.upload_staged(actor, staged)
    }

    /// Stages a local file or directory of type definitions and uploads it.
    pub fn load_types_from_path(
        &self,
        actor: &ActingIdentity,
        path: &Path,
    ) -> Result<ParsingResult, TransformError> {
        actor.require(Role::Admin, "load types")?;
        let staged = self.stager.stage_path(path)?;
        self.upload_staged(actor, staged)
    }

    /// Loads every child directory of `bundle` as its own archive.
    ///
    /// A member that fails to stage or upload is logged and skipped; the
    /// remaining members are still loaded. Results come back in directory
    /// name order.
    pub fn load_type_bundle(
        &self,
        actor: &ActingIdentity,
        bundle: &Path,
    ) -> Result<Vec<BundleMember>, TransformError> {
        actor.require(Role::Admin, "load types")?;
        let bundle_name = bundle.display().to_string();
        let entries = fs::read_dir(bundle).map_err(|e| TransformError::Staging {
            archive: bundle_name.clone(),
            message: e.to_string(),
        })?;
        let mut members: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        members.sort();

        let results: Vec<BundleMember> = members
            .into_iter()
            .map(|member| {
                let name = member
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let result = self
                    .stager
                    .stage_path(&member)
                    .and_then(|staged| self.upload_staged(actor, staged));
                if let Err(e) = &result {
                    warn!(bundle = %bundle_name, member = %name, error = %e, "cannot load type archive");
                }
                BundleMember { name, result }
            })
            .collect();

        info!(
            bundle = %bundle_name,
            loaded = results.iter().filter(|m| m.result.is_ok()).count(),
            failed = results.iter().filter(|m| m.result.is_err()).count(),
            "type bundle loaded"
        );
        Ok(results)
    }

    /// Transforms the latest version of a registered topology.
    pub fn transform(
        &self,
        actor: &ActingIdentity,
        topology_name: &str,
    ) -> Result<TransformedApplication, TransformError> {
        actor.require(Role::Operator, "transform topologies")?;
        let topology = self
            .topologies
            .latest(topology_name)
            .ok_or_else(|| TransformError::TopologyNotFound(topology_name.to_string()))?;

        info!(topology = topology_name, actor = %actor.name, "transformation requested");
        Transformer::builder(&topology, Arc::clone(&self.resolver))
            .with_type_mappings(
                self.type_mappings
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            )
            .build()
            .transform()
    }
}
