//! common - 通用类型和工具库

pub mod singleflight;
pub mod types;

pub use singleflight::*;
pub use types::*;
