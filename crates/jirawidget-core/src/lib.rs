pub mod error;
pub mod models;
pub mod progress;
pub mod storage;

pub use error::{Error, Result};
pub use progress::ActivityProgress;
