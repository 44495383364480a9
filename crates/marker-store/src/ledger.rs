use crate::diagnostic::MarkerTable;
use crate::errors::{MarkerStoreError, Result};
use log::warn;
use std::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct Pending {
    depth: usize,
    staged: Option<MarkerTable>,
}

/// Committed table plus the working copy of the open operation, if any.
///
/// Lock order is always `pending` before `committed`; readers only take `committed`.
#[derive(Debug, Default)]
pub(crate) struct MarkerLedger {
    committed: RwLock<MarkerTable>,
    pending: Mutex<Pending>,
}

impl MarkerLedger {
    pub(crate) fn new(table: MarkerTable) -> Self {
        Self {
            committed: RwLock::new(table),
            pending: Mutex::new(Pending::default()),
        }
    }

    /// Apply `f` to the staged table if an operation is open, else to the committed one.
    /// The flag tells whether the write was published immediately.
    pub(crate) fn write<F, R>(&self, f: F) -> Result<(R, bool)>
    where
        F: FnOnce(&mut MarkerTable) -> R,
    {
        let mut pending = self.lock_pending()?;
        if let Some(staged) = pending.staged.as_mut() {
            return Ok((f(staged), false));
        }

        let mut committed = self
            .committed
            .write()
            .map_err(|_| MarkerStoreError::LockPoisoned("committed"))?;
        Ok((f(&mut committed), true))
    }

    pub(crate) fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&MarkerTable) -> R,
    {
        let committed = self
            .committed
            .read()
            .map_err(|_| MarkerStoreError::LockPoisoned("committed"))?;
        Ok(f(&committed))
    }

    pub(crate) fn begin(&self) -> Result<()> {
        let mut pending = self.lock_pending()?;
        if pending.staged.is_none() {
            let snapshot = self.read(MarkerTable::clone)?;
            pending.staged = Some(snapshot);
        }
        pending.depth += 1;
        Ok(())
    }

    /// Close one operation level. Returns `true` when the outermost level closed and
    /// the staged table was published.
    pub(crate) fn end(&self) -> Result<bool> {
        let mut pending = self.lock_pending()?;
        if pending.depth == 0 {
            warn!("end_operation called without a matching begin_operation");
            return Ok(false);
        }

        pending.depth -= 1;
        if pending.depth > 0 {
            return Ok(false);
        }

        if let Some(staged) = pending.staged.take() {
            let mut committed = self
                .committed
                .write()
                .map_err(|_| MarkerStoreError::LockPoisoned("committed"))?;
            *committed = staged;
        }
        Ok(true)
    }

    pub(crate) fn in_operation(&self) -> Result<bool> {
        Ok(self.lock_pending()?.depth > 0)
    }

    fn lock_pending(&self) -> Result<std::sync::MutexGuard<'_, Pending>> {
        self.pending
            .lock()
            .map_err(|_| MarkerStoreError::LockPoisoned("pending"))
    }
}
