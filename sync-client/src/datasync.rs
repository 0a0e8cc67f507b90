//! DataSync - mirror server-side models into local collections.
//!
//! After [`DataSync::acquire_subscription`] the server pushes a `delta`
//! notification whenever a subscribed model changes. Each delta is routed
//! by model name to a [`DeltaSink`], normally a [`DeltaProcessor`] that
//! replays it on a [`Collection`]:
//!
//! | delta    | effect on the collection                              |
//! |----------|-------------------------------------------------------|
//! | `insert` | `insert(data)`                                        |
//! | `update` | first item matching `oldData` is updated to `newData` |
//! | `delete` | first item matching `data` is removed                 |

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tidesync_core::{Collection, Cursor, CursorError, Signal};
use tidesync_types::{message_type, Delta};

use crate::client::{Client, ClientError, NotificationHandler, RpcChannel};
use crate::transport::Transport;

/// Default service name for data sync.
pub const DATASYNC_SERVICE: &str = "datasync";

/// Failure to apply a delta.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// The payload does not deserialize into the collection's raw type.
    #[error("cannot decode {model} payload: {source}")]
    Decode {
        /// Model the delta was for
        model: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// An update or delete named an item the collection does not hold.
    #[error("no {model} item matches the delta")]
    NoMatch {
        /// Model the delta was for
        model: String,
    },

    /// Nothing is bound to the delta's model.
    #[error("no collection bound to model {model}")]
    UnboundModel {
        /// Model the delta was for
        model: String,
    },

    /// The collection's cursor rejected the operation.
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Something that can absorb deltas for one model.
pub trait DeltaSink: Send + Sync {
    /// Apply one delta.
    fn apply(&self, delta: &Delta) -> Result<(), DeltaError>;
}

type SameItem<T, R> = Box<dyn Fn(&T, &R) -> bool + Send + Sync>;

/// Replays deltas on a [`Collection`].
///
/// `same_item` decides whether a stored item is the one a delta's payload
/// refers to, usually by comparing primary keys.
pub struct DeltaProcessor<T, R = T> {
    collection: Box<dyn Collection<T, R>>,
    same_item: SameItem<T, R>,
}

impl<T, R> DeltaProcessor<T, R>
where
    R: DeserializeOwned,
{
    /// Create a processor over `collection`.
    pub fn new(
        collection: Box<dyn Collection<T, R>>,
        same_item: impl Fn(&T, &R) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            collection,
            same_item: Box::new(same_item),
        }
    }

    /// The collection deltas are applied to.
    pub fn collection(&self) -> &dyn Collection<T, R> {
        self.collection.as_ref()
    }

    fn decode(model: &str, payload: &Value) -> Result<R, DeltaError> {
        serde_json::from_value(payload.clone()).map_err(|source| DeltaError::Decode {
            model: model.to_string(),
            source,
        })
    }

    /// Open a cursor positioned on the item matching `target`.
    fn locate(
        &self,
        model: &str,
        target: &R,
    ) -> Result<Box<dyn Cursor<T, R> + Send>, DeltaError> {
        let mut cursor = self.collection.cursor();
        let found = cursor.seek(&mut |item: &T| (self.same_item)(item, target))?;
        if found {
            Ok(cursor)
        } else {
            Err(DeltaError::NoMatch {
                model: model.to_string(),
            })
        }
    }
}

impl<T, R> DeltaSink for DeltaProcessor<T, R>
where
    R: DeserializeOwned,
{
    fn apply(&self, delta: &Delta) -> Result<(), DeltaError> {
        match delta {
            Delta::Insert { model, data } => {
                self.collection.insert(Self::decode(model, data)?);
            }
            Delta::Update {
                model,
                new_data,
                old_data,
            } => {
                let old = Self::decode(model, old_data)?;
                let new = Self::decode(model, new_data)?;
                self.locate(model, &old)?.update(new)?;
            }
            Delta::Delete { model, data } => {
                let old = Self::decode(model, data)?;
                self.locate(model, &old)?.remove()?;
            }
        }
        Ok(())
    }
}

impl<T, R> std::fmt::Debug for DeltaProcessor<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaProcessor").finish_non_exhaustive()
    }
}

/// Routes deltas to the sink bound for their model.
#[derive(Default)]
pub struct DeltaRouter {
    sinks: RwLock<HashMap<String, Arc<dyn DeltaSink>>>,
    delta_applied: Signal<Delta>,
}

impl DeltaRouter {
    /// Create a router with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send deltas for `model` to `sink`, replacing any previous binding.
    pub fn bind(&self, model: &str, sink: Arc<dyn DeltaSink>) -> Option<Arc<dyn DeltaSink>> {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model.to_string(), sink)
    }

    /// Stop routing deltas for `model`.
    pub fn unbind(&self, model: &str) -> Option<Arc<dyn DeltaSink>> {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(model)
    }

    /// Apply `delta` to its model's sink, then fire
    /// [`delta_applied`](Self::delta_applied).
    pub fn apply(&self, delta: &Delta) -> Result<(), DeltaError> {
        let sink = self
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(delta.model())
            .cloned()
            .ok_or_else(|| DeltaError::UnboundModel {
                model: delta.model().to_string(),
            })?;

        sink.apply(delta)?;
        self.delta_applied.dispatch(delta);
        Ok(())
    }

    /// Fired after each delta has been applied successfully.
    pub fn delta_applied(&self) -> &Signal<Delta> {
        &self.delta_applied
    }
}

impl NotificationHandler for DeltaRouter {
    fn on_notification(&self, message: &Value) {
        if message_type(message) != Some("delta") {
            tracing::error!("unknown message type in datasync service");
            return;
        }
        let delta = match message
            .get("delta")
            .map(|body| serde_json::from_value::<Delta>(body.clone()))
        {
            Some(Ok(delta)) => delta,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "malformed delta");
                return;
            }
            None => {
                tracing::warn!("delta notification without a delta");
                return;
            }
        };

        match self.apply(&delta) {
            Ok(()) => tracing::debug!(model = delta.model(), "delta applied"),
            Err(e) => tracing::warn!(model = delta.model(), error = %e, "delta not applied"),
        }
    }
}

impl std::fmt::Debug for DeltaRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let models: Vec<String> = self
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("DeltaRouter")
            .field("models", &models)
            .finish_non_exhaustive()
    }
}

/// Client-side façade for the data sync service.
pub struct DataSync {
    service: String,
    rpc: Arc<dyn RpcChannel>,
    router: Arc<DeltaRouter>,
}

impl DataSync {
    /// Create a façade calling `service` through `rpc`.
    pub fn new(service: &str, rpc: Arc<dyn RpcChannel>) -> Self {
        Self {
            service: service.to_string(),
            rpc,
            router: Arc::new(DeltaRouter::new()),
        }
    }

    /// Create a façade on [`DATASYNC_SERVICE`] and register its handler.
    pub fn attach<T: Transport + 'static>(client: &Arc<Client<T>>) -> Self {
        let datasync = Self::new(DATASYNC_SERVICE, client.clone());
        client.register_service(DATASYNC_SERVICE, datasync.handler());
        datasync
    }

    /// The notification handler applying pushed deltas.
    pub fn handler(&self) -> Arc<dyn NotificationHandler> {
        self.router.clone()
    }

    /// The router deltas go through.
    pub fn router(&self) -> &DeltaRouter {
        &self.router
    }

    /// Mirror `model` into `sink`.
    pub fn bind(&self, model: &str, sink: Arc<dyn DeltaSink>) -> Option<Arc<dyn DeltaSink>> {
        self.router.bind(model, sink)
    }

    /// Stop mirroring `model`.
    pub fn unbind(&self, model: &str) -> Option<Arc<dyn DeltaSink>> {
        self.router.unbind(model)
    }

    /// Redeem a subscription token issued by the application server.
    ///
    /// From then on the server pushes deltas for the subscribed models.
    pub async fn acquire_subscription(&self, token: &str) -> Result<(), ClientError> {
        self.rpc
            .call(&self.service, "acquireSubscription", json!({ "token": token }))
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for DataSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSync")
            .field("service", &self.service)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
