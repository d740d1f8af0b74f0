pub mod allocation;
pub mod instruments;
pub mod obligations;
pub mod settlements;
pub mod taxes;
