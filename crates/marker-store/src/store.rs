use crate::diagnostic::{ClearScope, Diagnostic};
use crate::errors::Result;
use log::error;

/// Storage for lint diagnostics, keyed by workspace-relative file path.
///
/// Writes issued between `begin_operation` and the matching `end_operation` are
/// staged and become visible to readers together when the outermost operation
/// ends. Operations nest; only the outermost one publishes.
pub trait MarkerStore: Send + Sync {
    fn create_diagnostic(&self, diagnostic: Diagnostic) -> Result<()>;

    /// Remove the diagnostics covered by `scope`, returning how many were removed.
    fn clear_diagnostics(&self, path: &str, scope: ClearScope) -> Result<usize>;

    /// Published diagnostics of one file, in recording order.
    fn diagnostics(&self, path: &str) -> Result<Vec<Diagnostic>>;

    /// Every published diagnostic, ordered by path.
    fn all_diagnostics(&self) -> Result<Vec<Diagnostic>>;

    fn begin_operation(&self) -> Result<()>;

    fn end_operation(&self) -> Result<()>;
}

/// Scope guard for one marker store operation; ends the operation when dropped.
pub struct StoreOperation<'a> {
    store: &'a dyn MarkerStore,
}

impl<'a> StoreOperation<'a> {
    pub fn begin(store: &'a dyn MarkerStore) -> Result<Self> {
        store.begin_operation()?;
        Ok(Self { store })
    }
}

impl Drop for StoreOperation<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.end_operation() {
            error!("Failed to publish marker store operation: {e}");
        }
    }
}
