//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod response;

pub use response::*;
