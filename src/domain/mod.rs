// Domain layer - Canonical readings and the water-quality rules applied to them
pub mod feed;
pub mod history;
pub mod normalizer;
pub mod quality;
pub mod reading;
pub mod recommendations;
pub mod trend;
