pub mod dataset;
pub mod estimate;
