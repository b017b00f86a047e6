pub mod auth;
pub mod circular;
pub mod pairs;

pub use circular::{CircularBuffer, Endstop, LinearBuffer, DELIMITER};
pub use pairs::extract_pairs;
