use crate::diagnostic::{ClearScope, Diagnostic, MarkerTable};
use crate::errors::Result;
use crate::ledger::MarkerLedger;
use crate::store::MarkerStore;

/// Process-local marker store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryMarkerStore {
    ledger: MarkerLedger,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: MarkerTable) -> Self {
        Self {
            ledger: MarkerLedger::new(table),
        }
    }

    /// Copy of the published table.
    pub fn snapshot(&self) -> Result<MarkerTable> {
        self.ledger.read(MarkerTable::clone)
    }

    pub fn in_operation(&self) -> Result<bool> {
        self.ledger.in_operation()
    }
}

impl MarkerStore for InMemoryMarkerStore {
    fn create_diagnostic(&self, diagnostic: Diagnostic) -> Result<()> {
        self.ledger.write(|table| table.insert(diagnostic))?;
        Ok(())
    }

    fn clear_diagnostics(&self, path: &str, scope: ClearScope) -> Result<usize> {
        let (removed, _) = self.ledger.write(|table| table.clear(path, scope))?;
        Ok(removed)
    }

    fn diagnostics(&self, path: &str) -> Result<Vec<Diagnostic>> {
        self.ledger.read(|table| table.diagnostics(path))
    }

    fn all_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        self.ledger.read(|table| table.iter().cloned().collect())
    }

    fn begin_operation(&self) -> Result<()> {
        self.ledger.begin()
    }

    fn end_operation(&self) -> Result<()> {
        self.ledger.end()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreOperation;

    #[test]
    fn test_writes_outside_operation_are_visible_immediately() {
        let store = InMemoryMarkerStore::new();
        store
            .create_diagnostic(Diagnostic::warning("a.js", 1, "one"))
            .unwrap();

        assert_eq!(store.diagnostics("a.js").unwrap().len(), 1);
        assert_eq!(store.clear_diagnostics("a.js", ClearScope::File).unwrap(), 1);
        assert!(store.all_diagnostics().unwrap().is_empty());
    }

    #[test]
    fn test_operation_hides_intermediate_state() {
        let store = InMemoryMarkerStore::new();
        store
            .create_diagnostic(Diagnostic::warning("a.js", 1, "old"))
            .unwrap();

        {
            let _operation = StoreOperation::begin(&store).unwrap();
            store.clear_diagnostics("a.js", ClearScope::File).unwrap();
            store
                .create_diagnostic(Diagnostic::warning("a.js", 2, "new"))
                .unwrap();

            let visible = store.diagnostics("a.js").unwrap();
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].message, "old");
            assert!(store.in_operation().unwrap());
        }

        let visible = store.diagnostics("a.js").unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "new");
        assert!(!store.in_operation().unwrap());
    }

    #[test]
    fn test_nested_operations_publish_once() {
        let store = InMemoryMarkerStore::new();

        store.begin_operation().unwrap();
        store.begin_operation().unwrap();
        store
            .create_diagnostic(Diagnostic::warning("a.js", 1, "one"))
            .unwrap();
        store.end_operation().unwrap();
        assert!(store.diagnostics("a.js").unwrap().is_empty());

        store.end_operation().unwrap();
        assert_eq!(store.diagnostics("a.js").unwrap().len(), 1);
    }

    #[test]
    fn test_unbalanced_end_is_ignored() {
        let store = InMemoryMarkerStore::new();
        store.end_operation().unwrap();
        store
            .create_diagnostic(Diagnostic::warning("a.js", 1, "one"))
            .unwrap();
        assert_eq!(store.all_diagnostics().unwrap().len(), 1);
    }
}
