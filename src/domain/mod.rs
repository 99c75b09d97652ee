pub mod chart;
pub mod errors;
pub mod logging;
pub mod market_data;
pub mod repositories;
pub mod sequencing;
