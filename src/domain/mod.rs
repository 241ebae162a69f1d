pub mod chart;
pub mod errors;
pub mod events;
pub mod indicators;
pub mod logging;
pub mod market_data;
pub mod state;
