//! The dispatch pipeline
//!
//! [`LoggingPipeline`] is the top of the logging subsystem. Producers call
//! [`LoggingPipeline::submit`] to hand a record to a bounded ingress queue;
//! a dispatcher task classifies each record by its destination URL scheme
//! and routes it to one of two sinks:
//!
//! - `http`/`https` records go to a fixed pool of workers that deliver them
//!   one at a time as HTTP cloud events, with bounded retry;
//! - blob-scheme records flow through a batching strategy whose output is
//!   written to a [`Store`](inflog_store::Store).
//!
//! Workers rendezvous with the dispatcher through a channel of channels:
//! each worker pushes the sender of its own work channel onto an idle queue
//! and the dispatcher pops one per HTTP record, blocking while all workers
//! are busy. Dropping the pipeline closes the ingress and lets every task
//! drain and exit; [`LoggingPipeline::shutdown`] is the forced variant.

mod error;
mod metrics;
mod pipeline;
mod sink;
mod worker;

pub use error::{DeliverError, PipelineError};
pub use metrics::{PipelineMetrics, PipelineSnapshot};
pub use pipeline::{LoggingPipeline, PipelineConfig};
pub use sink::{HttpSink, HttpSinkConfig};
