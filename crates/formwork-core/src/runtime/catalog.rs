// crates/formwork-core/src/runtime/catalog.rs
// ============================================================================
// Module: Formwork Catalog Sources
// Description: File-backed and in-memory catalog sources.
// Purpose: Load descriptor catalogs and degrade failures to "absent".
// Dependencies: crate::core, crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! [`FileCatalogSource`] maps a catalog id to `<root>/<id>.json` and reads it
//! with a size limit. [`InMemoryCatalogSource`] serves preloaded catalogs.
//! [`load_catalog_or_absent`] is the entry point editing code uses: any
//! failure yields `None`, which projects to empty view lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::audit::EditAuditEvent;
use crate::audit::EditAuditKind;
use crate::audit::EditAuditSink;
use crate::core::CatalogError;
use crate::core::CatalogId;
use crate::core::DescriptorCatalog;
use crate::interfaces::CatalogSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog file size in bytes.
pub const MAX_CATALOG_FILE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: File Source
// ============================================================================

/// Catalog source reading `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    /// Directory holding catalog files.
    root: PathBuf,
    /// Maximum accepted file size.
    max_bytes: usize,
}

impl FileCatalogSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: MAX_CATALOG_FILE_BYTES,
        }
    }

    /// Overrides the file size limit.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Returns the file path used for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for ids that are empty or could
    /// escape the root directory.
    pub fn path_for(&self, id: &CatalogId) -> Result<PathBuf, CatalogError> {
        let name = id.as_str();
        let safe = !name.is_empty()
            && name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
        if !safe {
            return Err(CatalogError::NotFound(format!("invalid catalog id `{name}`")));
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch_catalog(&self, id: &CatalogId) -> Result<DescriptorCatalog, CatalogError> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        let bytes = read_catalog_file(&path, self.max_bytes)?;
        DescriptorCatalog::from_json_slice(&bytes)
    }
}

/// Reads a catalog file, failing once `max_bytes` is exceeded.
///
/// # Errors
///
/// Returns [`CatalogError::Source`] when the file cannot be read or is too
/// large.
pub fn read_catalog_file(path: &Path, max_bytes: usize) -> Result<Vec<u8>, CatalogError> {
    let file = fs::File::open(path)
        .map_err(|err| CatalogError::Source(format!("{}: {err}", path.display())))?;
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    file.take(limit)
        .read_to_end(&mut bytes)
        .map_err(|err| CatalogError::Source(format!("{}: {err}", path.display())))?;
    if bytes.len() > max_bytes {
        return Err(CatalogError::Source(format!(
            "{}: catalog exceeds size limit of {max_bytes} bytes",
            path.display()
        )));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: In-Memory Source
// ============================================================================

/// Catalog source serving preloaded catalogs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    /// Catalogs by id.
    catalogs: BTreeMap<CatalogId, DescriptorCatalog>,
}

impl InMemoryCatalogSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a catalog, replacing any previous one under `id`.
    pub fn insert(&mut self, id: impl Into<CatalogId>, catalog: DescriptorCatalog) {
        self.catalogs.insert(id.into(), catalog);
    }

    /// Registers a catalog and returns the source.
    #[must_use]
    pub fn with_catalog(mut self, id: impl Into<CatalogId>, catalog: DescriptorCatalog) -> Self {
        self.insert(id, catalog);
        self
    }
}

impl CatalogSource for InMemoryCatalogSource {
    fn fetch_catalog(&self, id: &CatalogId) -> Result<DescriptorCatalog, CatalogError> {
        let catalog =
            self.catalogs.get(id).cloned().ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }
}

// ============================================================================
// SECTION: Degradation
// ============================================================================

/// Fetches a catalog, degrading any failure to `None`.
///
/// Failures are reported as `catalog_unavailable` audit events.
#[must_use]
pub fn load_catalog_or_absent(
    source: &dyn CatalogSource,
    id: &CatalogId,
    audit: &dyn EditAuditSink,
) -> Option<DescriptorCatalog> {
    match source.fetch_catalog(id) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            audit.record(
                &EditAuditEvent::new(EditAuditKind::CatalogUnavailable)
                    .with_message(format!("{id}: {err}")),
            );
            None
        }
    }
}
