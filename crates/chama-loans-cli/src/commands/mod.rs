pub mod affordability;
pub mod lending;
