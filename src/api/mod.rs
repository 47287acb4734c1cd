// Analysis service client module
//
// This module handles all communication with the analysis service:
// - Low-level HTTP client (timeouts, transport error classification)
// - Recording upload and response normalization
// - Error payload decoding

pub mod analysis;
pub mod client;
pub mod error;
pub mod types;
