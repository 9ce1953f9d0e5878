//! Best-effort resynchronization of serial primary-key sequences after a
//! copy, so inserts with generated ids do not collide with migrated rows
//! that carried explicit ids.

use crate::store::PgStore;
use tracing::debug;

/// Serial column every resync table uses for its primary key.
const PK_COLUMN: &str = "id";

/// Advances each table's `id` sequence to at least the current maximum
/// id, flooring at 1 for empty tables. Failures are logged and ignored;
/// resync is cleanup, never fatal.
pub struct SequenceResync<'a> {
    target: &'a PgStore,
}

impl<'a> SequenceResync<'a> {
    pub fn new(target: &'a PgStore) -> Self {
        Self { target }
    }

    /// Resync every listed table, returning how many succeeded.
    pub async fn resync_all(&self, tables: &[&str]) -> usize {
        let mut succeeded = 0;
        for table in tables {
            match self.target.reset_sequence(table, PK_COLUMN).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    debug!("no sequence reset for {}: {}", table, e);
                }
            }
        }
        succeeded
    }
}
