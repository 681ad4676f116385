#![forbid(unsafe_code)]

pub mod attendance;
pub mod error;
pub mod model;
pub mod progression;
pub mod search;
pub mod time;

pub use error::Error;
pub use time::Clock;
