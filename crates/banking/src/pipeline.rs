use crate::batch::{BatchState, TransactionBatch};
use crate::intake::IntakeQueue;
use crate::resource_monitor::ResourceMonitor;
use crate::stage_queue::StageQueue;
use crate::stats::PipelineStats;
use crate::traits::{ExecutionEngine, LedgerSink};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use vcore_metrics::BANKING_METRICS;
use vcore_types::{base58_signature, Block, PublicKey, Transaction, ValidatorCoreConfig};

const MIN_BATCH_SIZE: usize = 16;
const MAX_BATCH_SIZE: usize = 256;
const BUILDER_POLL: Duration = Duration::from_millis(10);
const OVERLOAD_SLEEP: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub max_parallel_batches: usize,
    pub cpu_overload_pct: f32,
    pub rss_overload_mb: u64,
}

impl From<&ValidatorCoreConfig> for PipelineConfig {
    fn from(cfg: &ValidatorCoreConfig) -> Self {
        PipelineConfig {
            batch_size: cfg.batch_size,
            batch_timeout: cfg.batch_timeout(),
            max_parallel_batches: cfg.parallel_stages,
            cpu_overload_pct: 80.0,
            rss_overload_mb: 1024,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::from(&ValidatorCoreConfig::default())
    }
}

type CompletionCallback = dyn Fn(&TransactionBatch) + Send + Sync;

struct Shared {
    config: PipelineConfig,
    intake: IntakeQueue,
    validation_queue: StageQueue,
    execution_queue: StageQueue,
    commitment_queue: StageQueue,
    stop: std::sync::atomic::AtomicBool,
    suggested_batch_size: AtomicUsize,
    next_batch_id: AtomicU64,
    resource_monitor: ResourceMonitor,
    ledger_sink: Option<Arc<dyn LedgerSink>>,
    execution_engine: Option<Arc<dyn ExecutionEngine>>,
    completion_callback: Mutex<Option<Box<CompletionCallback>>>,
    stats: PipelineStats,
    local_identity: PublicKey,
}

/// Three-stage `validate -> execute -> commit` transaction processor. Each
/// stage owns its own worker pool; stages forward the same batch object so
/// identity and `creation_time` survive the whole pipeline.
pub struct BankingPipeline {
    shared: Arc<Shared>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

pub struct BankingPipelineBuilder {
    config: PipelineConfig,
    local_identity: PublicKey,
    ledger_sink: Option<Arc<dyn LedgerSink>>,
    execution_engine: Option<Arc<dyn ExecutionEngine>>,
    completion_callback: Option<Box<CompletionCallback>>,
}

impl BankingPipelineBuilder {
    pub fn new(config: PipelineConfig, local_identity: PublicKey) -> Self {
        BankingPipelineBuilder {
            config,
            local_identity,
            ledger_sink: None,
            execution_engine: None,
            completion_callback: None,
        }
    }

    pub fn with_ledger_sink(mut self, sink: Arc<dyn LedgerSink>) -> Self {
        self.ledger_sink = Some(sink);
        self
    }

    pub fn with_execution_engine(mut self, engine: Arc<dyn ExecutionEngine>) -> Self {
        self.execution_engine = Some(engine);
        self
    }

    pub fn with_completion_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TransactionBatch) + Send + Sync + 'static,
    {
        self.completion_callback = Some(Box::new(callback));
        self
    }

    pub fn start(self) -> BankingPipeline {
        let shared = Arc::new(Shared {
            resource_monitor: ResourceMonitor::start(
                self.config.cpu_overload_pct,
                self.config.rss_overload_mb,
            ),
            suggested_batch_size: AtomicUsize::new(self.config.batch_size),
            config: self.config,
            intake: IntakeQueue::new(),
            validation_queue: StageQueue::new(),
            execution_queue: StageQueue::new(),
            commitment_queue: StageQueue::new(),
            stop: std::sync::atomic::AtomicBool::new(false),
            next_batch_id: AtomicU64::new(1),
            ledger_sink: self.ledger_sink,
            execution_engine: self.execution_engine,
            completion_callback: Mutex::new(self.completion_callback),
            stats: PipelineStats::new(),
            local_identity: self.local_identity,
        });

        let mut threads = Vec::new();

        {
            let shared = Arc::clone(&shared);
            threads.push(thread::spawn(move || builder_loop(shared)));
        }
        for _ in 0..shared.config.max_parallel_batches {
            let shared = Arc::clone(&shared);
            threads.push(thread::spawn(move || validation_worker(shared)));
        }
        for _ in 0..shared.config.max_parallel_batches {
            let shared = Arc::clone(&shared);
            threads.push(thread::spawn(move || execution_worker(shared)));
        }
        for _ in 0..shared.config.max_parallel_batches {
            let shared = Arc::clone(&shared);
            threads.push(thread::spawn(move || commitment_worker(shared)));
        }

        BankingPipeline {
            shared,
            threads: Mutex::new(threads),
        }
    }
}

impl BankingPipeline {
    pub fn submit_transaction(&self, tx: Transaction) {
        BANKING_METRICS.tx_submitted.inc();
        self.shared.intake.submit(tx);
    }

    pub fn submit_transaction_with_priority(&self, tx: Transaction, priority: u64) {
        BANKING_METRICS.tx_submitted.inc();
        self.shared.intake.submit_with_priority(tx, priority);
    }

    /// Bypasses batching entirely: pushed straight into validation.
    pub fn submit_batch(&self, transactions: Vec<Transaction>) {
        BANKING_METRICS.tx_submitted.inc_by(transactions.len() as u64);
        let batch_id = self.shared.next_batch_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .validation_queue
            .push(TransactionBatch::new(batch_id, transactions));
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.shared.stats
    }

    pub fn pending_count(&self) -> usize {
        self.shared.intake.len()
            + self.shared.validation_queue.len()
            + self.shared.execution_queue.len()
            + self.shared.commitment_queue.len()
    }

    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.validation_queue.close();
        self.shared.execution_queue.close();
        self.shared.commitment_queue.close();
        let mut threads = self.threads.lock().unwrap();
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for BankingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn adjust_batch_size(shared: &Shared) {
    let cpu = shared.resource_monitor.cpu_pct();
    let tps = shared.stats.tps();
    let mut size = shared.suggested_batch_size.load(Ordering::Relaxed);
    if cpu > 80.0 {
        size = (size / 2).max(MIN_BATCH_SIZE);
    } else if cpu < 50.0 && tps < 1000.0 {
        size = (size * 2).min(MAX_BATCH_SIZE);
    }
    shared.suggested_batch_size.store(size, Ordering::Relaxed);
}

fn builder_loop(shared: Arc<Shared>) {
    let mut current: Vec<Transaction> = Vec::new();
    let mut batch_start = Instant::now();
    while !shared.stop.load(Ordering::Acquire) {
        adjust_batch_size(&shared);
        let target = shared.suggested_batch_size.load(Ordering::Relaxed);

        while current.len() < target {
            match shared.intake.pop_timeout(BUILDER_POLL) {
                Some(tx) => current.push(tx),
                None => break,
            }
            if shared.stop.load(Ordering::Acquire) {
                break;
            }
        }

        let timed_out = batch_start.elapsed() >= shared.config.batch_timeout;
        if !current.is_empty() && (current.len() >= target || timed_out) {
            let batch_id = shared.next_batch_id.fetch_add(1, Ordering::Relaxed);
            let batch = TransactionBatch::new(batch_id, std::mem::take(&mut current));
            shared.validation_queue.push(batch);
            batch_start = Instant::now();
            BANKING_METRICS.batches_sealed.inc();
        }

        BANKING_METRICS.suggested_batch_size.set(target as i64);
        BANKING_METRICS.intake_queue_depth.set(shared.intake.len() as i64);
        BANKING_METRICS.pipeline_tps.set(shared.stats.tps());

        if shared.resource_monitor.is_overloaded() {
            thread::sleep(OVERLOAD_SLEEP);
        }
    }
    // Seal whatever is left so shutdown doesn't silently drop transactions.
    if !current.is_empty() {
        let batch_id = shared.next_batch_id.fetch_add(1, Ordering::Relaxed);
        shared
            .validation_queue
            .push(TransactionBatch::new(batch_id, current));
    }
}

fn finish_batch(shared: &Shared, batch: &TransactionBatch) {
    if let Some(callback) = shared.completion_callback.lock().unwrap().as_ref() {
        callback(batch);
    }
}

fn validation_worker(shared: Arc<Shared>) {
    while let Some(mut batch) = shared.validation_queue.pop() {
        let started = Instant::now();
        batch.state = BatchState::Processing;
        for (i, tx) in batch.transactions.iter().enumerate() {
            batch.results[i] = tx.verify_structure().is_ok();
        }
        let ok = batch.all_succeeded();
        let failed = batch.failed_count() as u64;
        let succeeded = batch.transactions.len() as u64 - failed;

        if ok {
            shared.execution_queue.push(batch);
        } else {
            batch.state = BatchState::Failed;
            shared
                .stats
                .record_batch(succeeded, failed, started.elapsed().as_micros() as u64, true);
            BANKING_METRICS.tx_failed.inc_by(failed);
            BANKING_METRICS.batches_failed.inc();
            finish_batch(&shared, &batch);
        }
    }
}

fn execution_worker(shared: Arc<Shared>) {
    while let Some(mut batch) = shared.execution_queue.pop() {
        let started = Instant::now();
        for (i, tx) in batch.transactions.iter().enumerate() {
            let ok = match &shared.execution_engine {
                Some(engine) => engine.execute(tx).is_ok(),
                None => true,
            };
            batch.results[i] = ok;
        }
        let ok = batch.all_succeeded();
        let failed = batch.failed_count() as u64;
        let succeeded = batch.transactions.len() as u64 - failed;

        if ok {
            shared.commitment_queue.push(batch);
        } else {
            batch.state = BatchState::Failed;
            shared
                .stats
                .record_batch(succeeded, failed, started.elapsed().as_micros() as u64, true);
            BANKING_METRICS.tx_failed.inc_by(failed);
            BANKING_METRICS.batches_failed.inc();
            finish_batch(&shared, &batch);
        }
    }
}

fn commitment_worker(shared: Arc<Shared>) {
    while let Some(mut batch) = shared.commitment_queue.pop() {
        let started = Instant::now();
        let outcome = commit_batch(&shared, &batch);
        batch.state = if outcome.is_ok() {
            BatchState::Completed
        } else {
            BatchState::Failed
        };

        let failed = if outcome.is_ok() { 0 } else { batch.transactions.len() as u64 };
        let succeeded = batch.transactions.len() as u64 - failed;
        let elapsed_micros = started.elapsed().as_micros() as u64;
        shared.stats.record_batch(succeeded, failed, elapsed_micros, outcome.is_err());
        BANKING_METRICS
            .batch_commit_latency_ms
            .observe(elapsed_micros as f64 / 1000.0);
        if outcome.is_ok() {
            BANKING_METRICS.tx_completed.inc_by(succeeded);
        } else {
            BANKING_METRICS.tx_failed.inc_by(failed);
            BANKING_METRICS.batches_failed.inc();
        }
        if let Err(err) = &outcome {
            warn!(batch_id = batch.batch_id, error = %err, "batch commit failed");
        }
        finish_batch(&shared, &batch);
    }
}

fn commit_batch(shared: &Shared, batch: &TransactionBatch) -> Result<(), String> {
    for tx in &batch.transactions {
        if let Some(sig) = tx.signatures.first() {
            info!(tx = %base58_signature(sig), "committing transaction");
        }
    }

    match &shared.ledger_sink {
        Some(sink) => {
            let slot = sink.get_latest_slot() + 1;
            let parent_hash = sink.get_latest_block_hash();
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64;
            let block = Block::new(
                slot,
                parent_hash,
                shared.local_identity,
                batch.transactions.clone(),
                timestamp,
            );
            sink.store_block(block).map_err(|e| e.to_string())
        }
        None => {
            info!(batch_id = batch.batch_id, "no ledger sink bound, treating batch as committed");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64 as StdAtomicU64;
    use std::sync::Mutex as StdMutex;
    use vcore_types::{Hash, Signature, Slot};

    struct RecordingSink {
        slot: StdAtomicU64,
        hash: StdMutex<Hash>,
        stored: StdMutex<Vec<Block>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                slot: StdAtomicU64::new(0),
                hash: StdMutex::new(Hash::zero()),
                stored: StdMutex::new(Vec::new()),
            }
        }
    }

    impl LedgerSink for RecordingSink {
        fn get_latest_slot(&self) -> Slot {
            self.slot.load(Ordering::SeqCst)
        }
        fn get_latest_block_hash(&self) -> Hash {
            *self.hash.lock().unwrap()
        }
        fn store_block(&self, block: Block) -> vcore_types::Result<()> {
            self.slot.store(block.slot, Ordering::SeqCst);
            *self.hash.lock().unwrap() = block.block_hash;
            self.stored.lock().unwrap().push(block);
            Ok(())
        }
    }

    fn valid_tx() -> Transaction {
        Transaction::new(vec![Signature::zero()], b"payload".to_vec())
    }

    fn invalid_tx() -> Transaction {
        let mut tx = Transaction::new(vec![Signature::zero()], b"payload".to_vec());
        tx.hash = Hash::zero();
        tx
    }

    #[test]
    fn submit_batch_commits_through_ledger_sink() {
        let sink = Arc::new(RecordingSink::new());
        let pipeline = BankingPipelineBuilder::new(PipelineConfig::default(), PublicKey::zero())
            .with_ledger_sink(sink.clone())
            .start();

        pipeline.submit_batch(vec![valid_tx(), valid_tx()]);

        let deadline = Instant::now() + Duration::from_secs(2);
        while sink.stored.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(sink.stored.lock().unwrap().len(), 1);
        assert_eq!(pipeline.stats().transactions_processed(), 2);
        pipeline.shutdown();
    }

    #[test]
    fn failed_validation_never_reaches_execution_engine() {
        struct CountingEngine(StdAtomicU64);
        impl ExecutionEngine for CountingEngine {
            fn execute(&self, _tx: &Transaction) -> vcore_types::Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
        let engine = Arc::new(CountingEngine(StdAtomicU64::new(0)));
        let pipeline = BankingPipelineBuilder::new(PipelineConfig::default(), PublicKey::zero())
            .with_execution_engine(engine.clone())
            .start();

        pipeline.submit_batch(vec![invalid_tx()]);

        let deadline = Instant::now() + Duration::from_secs(2);
        while pipeline.stats().failed_batches() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(pipeline.stats().failed_batches(), 1);
        assert_eq!(engine.0.load(Ordering::SeqCst), 0);
        pipeline.shutdown();
    }

    #[test]
    fn completion_callback_fires_for_every_terminal_batch() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let pipeline = BankingPipelineBuilder::new(PipelineConfig::default(), PublicKey::zero())
            .with_completion_callback(move |batch| {
                seen2.lock().unwrap().push(batch.state);
            })
            .start();

        pipeline.submit_batch(vec![valid_tx()]);
        pipeline.submit_batch(vec![invalid_tx()]);

        let deadline = Instant::now() + Duration::from_secs(2);
        while seen.lock().unwrap().len() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(seen.lock().unwrap().len(), 2);
        pipeline.shutdown();
    }

    #[test]
    fn submit_transaction_flows_through_batch_builder() {
        let sink = Arc::new(RecordingSink::new());
        let pipeline = BankingPipelineBuilder::new(PipelineConfig::default(), PublicKey::zero())
            .with_ledger_sink(sink.clone())
            .start();

        for _ in 0..4 {
            pipeline.submit_transaction(valid_tx());
        }

        let deadline = Instant::now() + Duration::from_secs(3);
        while sink.stored.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert!(!sink.stored.lock().unwrap().is_empty());
        pipeline.shutdown();
    }
}
