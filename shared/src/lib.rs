pub mod protocol;
pub mod timestamp;
pub mod types;
