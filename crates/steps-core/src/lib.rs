pub mod client;
pub mod credentials;
pub mod error;
pub mod records;
pub mod report;
pub mod window;

pub use error::{Result, StepsError};
