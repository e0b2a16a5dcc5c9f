//! Stateless repositories. Every method takes `&Connection`.

pub mod position;
pub mod residency;

pub use position::PositionRepo;
pub use residency::ResidencyRepo;
