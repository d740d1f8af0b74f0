mod allocation_engine;

pub use allocation_engine::AllocationEngine;
