use std::thread::{self, JoinHandle};

use alloy_primitives::{Bloom, Log};
use crossbeam_channel::Sender;
use tracing::trace;

use crate::{constants::LOG_TARGET, logs_bloom, Receipt};

/// Errors raised by a receipt post-processor.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    /// The background worker could not be started.
    #[error("failed to spawn receipt worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// The background worker panicked before finishing its work.
    #[error("receipt worker panicked")]
    WorkerPanicked,
    /// The worker produced a different number of results than receipts were submitted.
    #[error("receipt worker returned {produced} results for {submitted} receipts")]
    Incomplete {
        /// Receipts submitted.
        submitted: usize,
        /// Results produced.
        produced: usize,
    },
}

/// Derives the bloom of one receipt's logs.
pub type BloomFn = fn(&[Log]) -> Bloom;

fn receipt_bloom(logs: &[Log]) -> Bloom {
    logs_bloom(logs)
}

/// A hook invoked on every finished receipt before it is handed back to the caller.
pub trait ReceiptProcessor {
    /// Processes one finished receipt.
    fn apply(&mut self, receipt: &mut Receipt);
}

impl<T: ReceiptProcessor + ?Sized> ReceiptProcessor for &mut T {
    fn apply(&mut self, receipt: &mut Receipt) {
        (**self).apply(receipt)
    }
}

/// Computes the receipt bloom inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptBloomGenerator;

impl ReceiptProcessor for ReceiptBloomGenerator {
    fn apply(&mut self, receipt: &mut Receipt) {
        receipt.bloom = logs_bloom(receipt.raw_logs());
    }
}

/// Computes receipt blooms on a background worker thread.
///
/// Every [`ReceiptProcessor::apply`] call hands the receipt's logs to the worker.
/// [`Self::close`] is the barrier: it waits until all submitted receipts are processed and
/// returns their blooms in submission order. Dropping the generator without closing it performs
/// the same wait and discards the results, so the worker never outlives its owner.
#[derive(Debug)]
pub struct AsyncReceiptBloomGenerator {
    sender: Option<Sender<Vec<Log>>>,
    worker: Option<JoinHandle<Vec<Bloom>>>,
    submitted: usize,
}

impl AsyncReceiptBloomGenerator {
    /// Spawns the worker. `expected` sizes the result buffer.
    pub fn new(expected: usize) -> Result<Self, PostProcessError> {
        Self::with_bloom_fn(expected, receipt_bloom)
    }

    /// Spawns a worker deriving every bloom with `bloom`.
    pub fn with_bloom_fn(expected: usize, bloom: BloomFn) -> Result<Self, PostProcessError> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Vec<Log>>();
        let worker = thread::Builder::new().name("receipt-bloom".to_string()).spawn(move || {
            let mut blooms = Vec::with_capacity(expected);
            for logs in receiver {
                blooms.push(bloom(&logs));
            }
            blooms
        })?;
        Ok(Self { sender: Some(sender), worker: Some(worker), submitted: 0 })
    }

    /// Number of receipts submitted so far.
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Waits for the worker to drain and returns one bloom per submitted receipt, in submission
    /// order.
    pub fn close(mut self) -> Result<Vec<Bloom>, PostProcessError> {
        let blooms = self.join()?;
        if blooms.len() != self.submitted {
            return Err(PostProcessError::Incomplete {
                submitted: self.submitted,
                produced: blooms.len(),
            });
        }
        trace!(target: LOG_TARGET, receipts = blooms.len(), "Receipt blooms generated");
        Ok(blooms)
    }

    fn join(&mut self) -> Result<Vec<Bloom>, PostProcessError> {
        // Closing the channel ends the worker loop.
        self.sender.take();
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| PostProcessError::WorkerPanicked),
            None => Ok(Vec::new()),
        }
    }
}

impl ReceiptProcessor for AsyncReceiptBloomGenerator {
    fn apply(&mut self, receipt: &mut Receipt) {
        self.submitted += 1;
        if let Some(sender) = &self.sender {
            // A send only fails once the worker is gone, which `close` reports.
            let _ = sender.send(receipt.raw_logs().cloned().collect());
        }
    }
}

impl Drop for AsyncReceiptBloomGenerator {
    fn drop(&mut self) {
        let _ = self.join();
    }
}
