//! Market data aggregate: candles, the snapshot store and the fetch port.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use repositories::MarketDataRepository;
pub use value_objects::*;
