mod allocation_line;

pub use allocation_line::{Allocation, AllocationLine};
