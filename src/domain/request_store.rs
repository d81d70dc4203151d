//! Concurrent swap-request storage.
//!
//! [`RequestStore`] keeps all [`SwapRequest`] records in a `HashMap` behind
//! a [`tokio::sync::RwLock`]. Status resolution goes through
//! [`RequestStore::compare_and_set_status`], which is how at most one of
//! {accept, reject} ever moves a request out of `Pending`.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{RequestFeed, RequestId, RequestStatus, SwapRequest, UserId};
use crate::error::MarketError;

/// Central store for all swap requests. Sole owner of request records;
/// slot records are referenced by ID only.
#[derive(Debug, Default)]
pub struct RequestStore {
    requests: RwLock<HashMap<RequestId, SwapRequest>>,
}

impl RequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new request record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Conflict`] if a request with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, request: SwapRequest) -> Result<RequestId, MarketError> {
        let request_id = request.id;
        let mut map = self.requests.write().await;
        if map.contains_key(&request_id) {
            return Err(MarketError::Conflict(format!(
                "request {request_id} already exists"
            )));
        }
        map.insert(request_id, request);
        Ok(request_id)
    }

    /// Returns a copy of the request record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RequestNotFound`] if no request with the
    /// given ID exists.
    pub async fn get(&self, request_id: RequestId) -> Result<SwapRequest, MarketError> {
        let map = self.requests.read().await;
        map.get(&request_id)
            .cloned()
            .ok_or(MarketError::RequestNotFound(request_id))
    }

    /// Sets the request's status to `new` only if it currently equals
    /// `expected`, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RequestNotFound`] if the request does not
    /// exist, or [`MarketError::Conflict`] if the stored status no longer
    /// matches `expected` (the other side of a resolution race won).
    pub async fn compare_and_set_status(
        &self,
        request_id: RequestId,
        expected: RequestStatus,
        new: RequestStatus,
    ) -> Result<SwapRequest, MarketError> {
        let mut map = self.requests.write().await;
        let request = map
            .get_mut(&request_id)
            .ok_or(MarketError::RequestNotFound(request_id))?;
        if request.status != expected {
            return Err(MarketError::Conflict(format!(
                "request {request_id} is {}, expected {}",
                request.status.as_str(),
                expected.as_str()
            )));
        }
        request.status = new;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    /// Removes a request, returning its record. Used only to undo a
    /// request creation whose slot claims lost a race.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RequestNotFound`] if no request with the
    /// given ID exists.
    pub async fn delete(&self, request_id: RequestId) -> Result<SwapRequest, MarketError> {
        let mut map = self.requests.write().await;
        map.remove(&request_id)
            .ok_or(MarketError::RequestNotFound(request_id))
    }

    /// Returns the user's view of the request book: incoming requests
    /// (user is responder) and outgoing requests (user is requester),
    /// each newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> RequestFeed {
        let map = self.requests.read().await;
        let mut feed = RequestFeed::default();
        for request in map.values() {
            if request.responder_id == user_id {
                feed.incoming.push(request.clone());
            } else if request.requester_id == user_id {
                feed.outgoing.push(request.clone());
            }
        }
        feed.incoming
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        feed.outgoing
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        feed
    }

    /// Returns a copy of every request record, for snapshot persistence.
    pub async fn dump(&self) -> Vec<SwapRequest> {
        self.requests.read().await.values().cloned().collect()
    }

    /// Replaces the store contents with the given records, for snapshot
    /// restore at startup.
    pub async fn seed(&self, requests: Vec<SwapRequest>) {
        let mut map = self.requests.write().await;
        map.clear();
        map.extend(requests.into_iter().map(|request| (request.id, request)));
    }

    /// Returns the number of requests in the store.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Returns `true` if the store contains no requests.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}
