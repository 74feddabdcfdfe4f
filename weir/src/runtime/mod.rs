/// Run supervision: the per-run state machine and result delivery.
pub mod supervisor;
/// Worker pools and the producer/consumer task bodies.
pub(crate) mod worker;

pub use supervisor::{RunId, WorkloadError, WorkloadRuntime, WorkloadStats};
