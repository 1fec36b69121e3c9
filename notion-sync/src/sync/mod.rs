pub mod backoff;
pub mod engine;
pub mod properties;
