// ============================================================================
// upmix-core/src/resource.rs
// ============================================================================
//
// RESOURCE HANDLES: Durable Tokens and Scoped File Access
//
// This module converts live, user-granted paths into durable tokens and
// back, bracketing every filesystem touch with an explicit begin/end access
// pair so that access is never held longer than one operation.
//
// KEY COMPONENTS:
// - ResourceToken: opaque, serializable, re-resolvable file reference
// - ResourceProvider: trait seam for token creation and scoped access
// - AccessScope: RAII guard guaranteeing release on every exit path
// - StdFsResourceProvider: std::fs-backed implementation
//
// Environments with a real cross-permission grant model (security-scoped
// bookmarks and the like) implement ResourceProvider against that model;
// StdFsResourceProvider substitutes plain validated paths while preserving
// the scoped-acquisition contract.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CoreError, CoreResult};
use crate::utils::get_filename_safe;

/// Durable, re-resolvable reference to a filesystem location.
///
/// Two tokens refer to the same resource iff their originally-granted
/// paths are equal. The serialized form (`to_bytes`/`from_bytes`) is the
/// durable representation that outlives the live grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceToken {
    source_path: PathBuf,
    /// Canonical path recorded at grant time; used to detect staleness.
    canonical_path: Option<PathBuf>,
}

impl ResourceToken {
    /// Creates a token from an originally-granted path and the canonical
    /// path recorded at grant time. Called by `ResourceProvider`
    /// implementations; consumers obtain tokens through a provider.
    pub fn new(source_path: PathBuf, canonical_path: Option<PathBuf>) -> Self {
        Self {
            source_path,
            canonical_path,
        }
    }

    /// The originally-granted path.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Canonical path recorded when the token was granted, if any.
    pub fn canonical_path(&self) -> Option<&Path> {
        self.canonical_path.as_deref()
    }

    /// Filename of the referenced location, for display and logging.
    pub fn display_name(&self) -> String {
        get_filename_safe(&self.source_path)
            .unwrap_or_else(|_| self.source_path.display().to_string())
    }

    /// Serializes the token into its durable byte form.
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CoreError::TokenError(format!("failed to serialize token: {e}")))
    }

    /// Reconstructs a token from its durable byte form.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CoreError::TokenError(format!("failed to deserialize token: {e}")))
    }
}

impl PartialEq for ResourceToken {
    fn eq(&self, other: &Self) -> bool {
        self.source_path == other.source_path
    }
}

impl Eq for ResourceToken {}

/// RAII guard for one open access window.
///
/// Dropping the scope ends access, on normal return, early return and
/// unwind alike.
pub struct AccessScope {
    path: PathBuf,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl AccessScope {
    /// Creates a scope over `path` with an optional release hook run when
    /// the scope is dropped.
    pub fn new(path: PathBuf, release: Option<Box<dyn FnOnce() + Send>>) -> Self {
        Self { path, release }
    }

    /// The resolved path this scope grants access to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AccessScope {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Trait for converting live paths into durable tokens and opening scoped
/// access windows against them.
pub trait ResourceProvider: Send + Sync {
    /// Creates a durable token from a path the caller currently has live
    /// access to. Fails with `PermissionDenied` when the path cannot be
    /// scoped.
    fn create_token(&self, path: &Path) -> CoreResult<ResourceToken>;

    /// Re-derives a usable path from a token.
    ///
    /// Stale tokens (still resolvable, but whose recorded grant no longer
    /// matches the live filesystem) log a warning and resolve best-effort
    /// rather than failing.
    fn resolve(&self, token: &ResourceToken) -> CoreResult<PathBuf>;

    /// Opens an access window for the token's location. Fails with
    /// `PermissionDenied` when access cannot be acquired.
    fn begin_access(&self, token: &ResourceToken) -> CoreResult<AccessScope>;

    /// Runs `op` against the resolved path inside an access window,
    /// guaranteeing the window is closed on every exit path. `op` is never
    /// invoked when access acquisition fails; its error is propagated
    /// unchanged otherwise.
    fn with_scope<T, F>(&self, token: &ResourceToken, op: F) -> CoreResult<T>
    where
        Self: Sized,
        F: FnOnce(&Path) -> CoreResult<T>,
    {
        let scope = self.begin_access(token)?;
        op(scope.path())
    }
}

/// Standard implementation of `ResourceProvider` backed by std::fs
/// validation.
///
/// Tracks the number of open scopes so callers (and tests) can assert
/// balanced begin/end bracketing.
#[derive(Debug, Clone, Default)]
pub struct StdFsResourceProvider {
    open_scopes: Arc<AtomicUsize>,
}

impl StdFsResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of access scopes currently open.
    pub fn active_scopes(&self) -> usize {
        self.open_scopes.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for StdFsResourceProvider {
    fn create_token(&self, path: &Path) -> CoreResult<ResourceToken> {
        if let Err(e) = std::fs::metadata(path) {
            return Err(CoreError::PermissionDenied(format!(
                "cannot scope {}: {e}",
                path.display()
            )));
        }
        let canonical = std::fs::canonicalize(path).ok();
        Ok(ResourceToken::new(path.to_path_buf(), canonical))
    }

    fn resolve(&self, token: &ResourceToken) -> CoreResult<PathBuf> {
        let live = std::fs::canonicalize(token.source_path()).ok();
        if live.as_deref() != token.canonical_path() {
            log::warn!(
                "resource token for {} is stale; resolving best-effort",
                token.source_path().display()
            );
        }
        Ok(token.source_path().to_path_buf())
    }

    fn begin_access(&self, token: &ResourceToken) -> CoreResult<AccessScope> {
        let path = self.resolve(token)?;
        if let Err(e) = std::fs::metadata(&path) {
            return Err(CoreError::PermissionDenied(format!(
                "cannot access {}: {e}",
                path.display()
            )));
        }
        self.open_scopes.fetch_add(1, Ordering::SeqCst);
        let counter = Arc::clone(&self.open_scopes);
        Ok(AccessScope::new(
            path,
            Some(Box::new(move || {
                counter.fetch_sub(1, Ordering::SeqCst);
            })),
        ))
    }
}
