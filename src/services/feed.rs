// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location feed seam.
//!
//! The platform location provider sits behind `LocationFeed`. Delivery is
//! push-based over a bounded channel; the tracker never polls.

use crate::models::LocationFix;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Default buffered fixes per subscription.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Event delivered to the subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Fix(LocationFix),
    /// Location permission was withdrawn while subscribed.
    PermissionRevoked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("No active location subscription")]
    NotSubscribed,

    #[error("Location feed buffer full")]
    Full,
}

/// Source of location fixes.
pub trait LocationFeed: Send + Sync {
    /// Start delivering events. Replaces any previous subscription.
    fn subscribe(&self) -> Result<mpsc::Receiver<FeedEvent>, FeedError>;

    /// Stop delivering events. Safe to call repeatedly.
    fn unsubscribe(&self);
}

/// Feed driven by pushes from the platform layer (or tests).
#[derive(Debug)]
pub struct ChannelLocationFeed {
    capacity: usize,
    permission_granted: AtomicBool,
    subscriber: Mutex<Option<mpsc::Sender<FeedEvent>>>,
}

impl Default for ChannelLocationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChannelLocationFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            permission_granted: AtomicBool::new(true),
            subscriber: Mutex::new(None),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock_subscriber()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }

    /// Grant or revoke location permission.
    ///
    /// Revoking while subscribed notifies the subscriber and ends delivery.
    pub fn set_permission(&self, granted: bool) {
        let was_granted = self.permission_granted.swap(granted, Ordering::SeqCst);
        if granted || !was_granted {
            return;
        }

        tracing::warn!("Location permission revoked");
        if let Some(tx) = self.lock_subscriber().take() {
            if tx.try_send(FeedEvent::PermissionRevoked).is_err() {
                tracing::warn!("Subscriber missed permission revocation (buffer full or closed)");
            }
        }
    }

    /// Deliver one fix to the current subscriber.
    pub fn push_fix(&self, fix: LocationFix) -> Result<(), FeedError> {
        if !self.permission_granted() {
            return Err(FeedError::PermissionDenied);
        }

        let guard = self.lock_subscriber();
        let tx = guard.as_ref().ok_or(FeedError::NotSubscribed)?;
        tx.try_send(FeedEvent::Fix(fix)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => FeedError::Full,
            mpsc::error::TrySendError::Closed(_) => FeedError::NotSubscribed,
        })
    }

    fn lock_subscriber(&self) -> std::sync::MutexGuard<'_, Option<mpsc::Sender<FeedEvent>>> {
        self.subscriber.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocationFeed for ChannelLocationFeed {
    fn subscribe(&self) -> Result<mpsc::Receiver<FeedEvent>, FeedError> {
        if !self.permission_granted() {
            return Err(FeedError::PermissionDenied);
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        *self.lock_subscriber() = Some(tx);
        tracing::debug!(capacity = self.capacity, "Location feed subscribed");
        Ok(rx)
    }

    fn unsubscribe(&self) {
        if self.lock_subscriber().take().is_some() {
            tracing::debug!("Location feed unsubscribed");
        }
    }
}
