pub mod models;
pub mod repositories;

pub use models::{Obligation, ObligationDetailDto, ObligationListDto};
pub use repositories::{HttpObligationRepository, ObligationRepository};
