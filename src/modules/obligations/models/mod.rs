mod obligation;

pub use obligation::{Obligation, ObligationDetailDto, ObligationListDto};
