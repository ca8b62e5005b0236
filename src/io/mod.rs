pub mod cache;
pub mod config_io;
pub mod snapshots;
