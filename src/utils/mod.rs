pub mod tags;
pub mod validation;
