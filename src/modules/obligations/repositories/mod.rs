mod obligation_repository;

pub use obligation_repository::{HttpObligationRepository, ObligationRepository};
