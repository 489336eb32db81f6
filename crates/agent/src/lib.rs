pub mod executor;
pub mod workflow;

pub use executor::SimulatedExecutor;
pub use workflow::{enqueue_acquisition, AcquisitionPlan};
