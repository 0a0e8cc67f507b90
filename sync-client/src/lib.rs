//! # sync-client
//!
//! Client library for tidesync.
//!
//! A [`Client`] multiplexes named services over one [`Transport`]
//! connection. Three service façades are provided:
//!
//! - [`Messaging`] - named participants exchanging direct messages
//! - [`PubSub`] - channel broadcast
//! - [`DataSync`] - pushed deltas replayed on local collections through
//!   [`DeltaProcessor`]
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tidesync_client::{Client, ClientConfig, DataSync, DeltaProcessor, MockTransport};
//! use tidesync_core::{SequenceCollection, SharedVec};
//!
//! let client = Arc::new(Client::new(ClientConfig::default(), MockTransport::new()));
//! client.connect().await?;
//!
//! let players = SharedVec::<Player>::new();
//! let datasync = DataSync::attach(&client);
//! datasync.bind(
//!     "Player",
//!     Arc::new(DeltaProcessor::new(
//!         Box::new(SequenceCollection::new(players.clone())),
//!         |a: &Player, b: &Player| a.id == b.id,
//!     )),
//! );
//! datasync.acquire_subscription(&token).await?;
//! client.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod datasync;
pub mod messaging;
pub mod pubsub;
pub mod transport;

pub use client::{Client, ClientError, NotificationHandler, RpcChannel};
pub use config::{ClientConfig, ConfigError};
pub use datasync::{DataSync, DeltaError, DeltaProcessor, DeltaRouter, DeltaSink, DATASYNC_SERVICE};
pub use messaging::{Messaging, MESSAGING_SERVICE};
pub use pubsub::{PubSub, PUBSUB_SERVICE};
pub use transport::{MockTransport, Transport, TransportError};
