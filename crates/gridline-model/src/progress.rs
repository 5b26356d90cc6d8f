//! Progress reporting boundary.
//!
//! Long-running operations (validate-all) report
//! `(processed, total, operation)` tuples to a caller-supplied sink.
//! Processed counts are monotonically increasing within one operation.

use crossbeam_channel::Sender;

pub trait ProgressSink: Send + Sync {
    fn report(&self, processed: usize, total: usize, operation: &str);
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _processed: usize, _total: usize, _operation: &str) {}
}

/// One progress tuple as forwarded by [`ChannelProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub processed: usize,
    pub total: usize,
    pub operation: String,
}

/// Sink that forwards updates over a channel to a decoupled consumer.
///
/// Send failures are ignored: a consumer that went away must not abort
/// the operation it was observing.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: Sender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, processed: usize, total: usize, operation: &str) {
        let _ = self.sender.try_send(ProgressUpdate {
            processed,
            total,
            operation: operation.to_string(),
        });
    }
}
