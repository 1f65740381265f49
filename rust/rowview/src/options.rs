/// Behavioral options shared by the cursors a [`CursorFactory`](crate::CursorFactory)
/// creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorOptions {
    /// Seek the wrapped source back to the current row before every column read
    /// if it was moved in the meantime (e.g. by a sibling cursor over the same
    /// source).
    ///
    /// This keeps sibling cursors independent only while they are driven from
    /// one thread at a time. The seek and the read that follows are not atomic
    /// with respect to the shared source, so a sibling on another thread can
    /// move the source in between. Concurrent readers of one source need
    /// external synchronization.
    ///
    /// When disabled, reads go to whatever row the wrapped source is positioned
    /// at, which is only correct as long as a single view drives the source.
    pub resync_source_on_read: bool,
}

impl Default for CursorOptions {
    fn default() -> Self {
        CursorOptions {
            resync_source_on_read: true,
        }
    }
}

impl CursorOptions {
    pub fn new() -> CursorOptions {
        CursorOptions::default()
    }

    pub fn with_resync_source_on_read(mut self, resync: bool) -> CursorOptions {
        self.resync_source_on_read = resync;
        self
    }
}
