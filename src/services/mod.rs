pub mod dataset_loader;
pub mod estimator;
pub mod heatmap;
