//! Draw scheduling: synchronous plans, time-sliced edge batch jobs and
//! the camera-settle debounce.
//!
//! Scheduling never talks to the GPU. Both the synchronous path and the
//! batched path produce plain descriptions of draws (group coordinates
//! plus element ranges) that the renderer executes against uploaded
//! buffers, which keeps cursor arithmetic, cancellation and batching
//! policy testable on their own.

mod debounce;
mod job;
mod scheduler;

pub use debounce::ApplyDebounce;
pub use job::{BatchDraw, EdgeBatchJob, JobSlot, JobState};
pub use scheduler::{PlanOp, active_runs, plan_sync};
