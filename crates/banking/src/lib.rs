// ============================================================================
// VALIDATOR CORE BANKING PIPELINE (C5)
// ============================================================================
// PURPOSE: validate -> execute -> commit transaction processing, with
// adaptive batching and resource-aware throttling.
// ============================================================================

pub mod batch;
pub mod intake;
pub mod pipeline;
pub mod resource_monitor;
pub mod stage_queue;
pub mod stats;
pub mod traits;

pub use batch::{BatchState, TransactionBatch};
pub use pipeline::{BankingPipeline, BankingPipelineBuilder, PipelineConfig};
pub use stats::PipelineStats;
pub use traits::{ExecutionEngine, LedgerSink};
