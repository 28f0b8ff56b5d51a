/// Orders the responses of fetches that replace a whole piece of state.
///
/// Each fetch takes a ticket before its request goes out; when the response
/// comes back it is applied only if no later ticket has been applied yet.
#[derive(Debug, Default, Clone)]
pub struct RequestSequence {
    issued: u64,
    applied: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Marks `ticket` as applied. Returns false for a response older than the
    /// last applied one, which the caller must drop.
    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    /// True while the newest issued ticket has not been applied.
    pub fn pending(&self) -> bool {
        self.applied < self.issued
    }
}
