//! Transaction data model.

/// What a begin call hands back for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransContext {
    /// Identifier to commit the transaction with.
    pub trans_id: i64,
    /// Snapshot timestamp assigned at begin.
    pub timestamp: u64,
    pub read_only: bool,
}
