pub mod dataset;
pub mod expr;
