pub mod models;
pub mod services;

pub use models::{Allocation, AllocationLine};
pub use services::AllocationEngine;
