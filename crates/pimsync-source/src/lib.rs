//! Reader for product records published by the PIM's GraphQL webservice.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::PimClient;
pub use error::SourceError;
pub use normalize::node_to_record;
pub use types::RawProductNode;
