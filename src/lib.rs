//! # Flowpath
//!
//! Flowpath computes a shortest path of active links between two switch
//! endpoints and compiles it into the flow-programming commands that the
//! switches along the path must install.
//!
//! ## Core Features
//!
//! - **Path discovery**: hop-bounded shortest path over active switches and links
//! - **Flow compilation**: ingress, transit and egress segments for both directions
//! - **Identifier allocation**: UUID flow ids and tracked transit vlan tags
//! - **Pluggable storage**: in-memory storage (testing) and PostgreSQL (production)
//! - **Event-driven**: every provisioning state transition is broadcast and persisted
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowpath::{ProvisionRequest, ProvisionerBuilder};
//!
//! let provisioner = ProvisionerBuilder::new().build()?;
//! provisioner.launch();
//!
//! let request = ProvisionRequest::from_json(body)?;
//! let response = provisioner.provision(&request);
//! println!("{}", response.to_json()?);
//! ```

pub mod allocator;
mod builder;
pub mod bus;
mod common;
pub mod compiler;
mod config;
mod error;
pub mod events;
pub mod message;
mod model;
mod provisioner;
mod runtime;
pub mod store;
pub mod topology;
mod utils;

use std::sync::{Arc, RwLock};

pub use builder::ProvisionerBuilder;
pub use config::*;
pub use error::FlowpathError;
pub use model::*;
pub use provisioner::{FlowRecord, Provisioner};
pub use runtime::{Channel, ChannelEvent, ChannelOptions};

/// Result type alias for Flowpath operations.
pub type Result<T> = std::result::Result<T, FlowpathError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
