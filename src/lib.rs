#![doc(html_root_url = "https://docs.rs/lapse/0.1.0")]
#![doc = include_str!("../README.md")]

// exposed modules
pub mod cache;
pub mod expiration;

// internal modules
mod entry;
mod sweeper;

// lifted types to the top level
pub use crate::cache::{Cache, DEFAULT_FREQUENCY};
pub use crate::expiration::CacheExpiration;
