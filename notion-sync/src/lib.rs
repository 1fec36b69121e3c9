pub mod config;
pub mod entity;
pub mod event;
pub mod mapping;
pub mod sync;
