//! Command implementations
//!
//! Each resource family gets its own module; `async_utils` and `utils` hold
//! the pieces shared between them.

pub mod api;
pub mod async_utils;
pub mod floating_ip;
pub mod gpu_image;
pub mod profile;
pub mod task;
pub mod utils;
