//! Adapter implementations of application ports.

mod gateway;
mod system_clock;

pub use gateway::{AllowedHosts, HttpApiGateway};
pub use system_clock::SystemClock;
