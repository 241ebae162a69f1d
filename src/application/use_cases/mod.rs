pub mod live_session;

pub use live_session::{LiveSession, Scheduler, TaskSpawner};
