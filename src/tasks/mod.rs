//! Background Tasks Module
//!
//! Work that outlives the request that started it.
//!
//! # Tasks
//! - Revalidation: refreshes a cached response from the network

mod revalidate;

pub use revalidate::spawn_revalidation;
