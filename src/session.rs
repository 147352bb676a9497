//! Per-session UI state for the two-step delete flow.

/// Delete-confirmation state machine:
/// `Idle -> PendingConfirm(id) -> {deleted (confirm) | Idle (cancel)}`.
///
/// Requesting deletion of a different entry while one is pending simply
/// retargets the pending id.
#[derive(Debug, Default)]
pub struct DeleteConfirm {
    pending: Option<u64>,
}

impl DeleteConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as pending deletion, replacing any previously pending id.
    pub fn request(&mut self, id: u64) {
        self.pending = Some(id);
    }

    /// Take the pending id, returning the machine to idle.
    /// `None` when no deletion was pending.
    pub fn confirm(&mut self) -> Option<u64> {
        self.pending.take()
    }

    /// Abandon any pending deletion.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }
}
