//! Proxy Module
//!
//! Request classification, cache strategies, and the lifecycle worker.

pub mod classifier;
pub mod clients;
mod message;
pub mod network;
pub mod strategy;
pub mod worker;

pub use classifier::{RequestClassifier, Strategy};
pub use clients::Clients;
pub use message::{strip_hop_by_hop, ProxyRequest, ProxyResponse};
pub use network::{HttpNetwork, Network};
pub use worker::{Interception, ProxyWorker, WorkerState};
