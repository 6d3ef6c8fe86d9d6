//! Observability and Metrics
//!
//! Counters for packet decoding and dispatch.
//!
//! Each `Dispatcher` owns its own `Metrics`; there is no global instance.
//! Atomic counters let `dispatch(&self)` record without a lock.

use crate::core::packet::MessageType;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Packet counters for one dispatcher
#[derive(Debug)]
pub struct Metrics {
    /// Packets decoded successfully
    pub packets_decoded: AtomicU64,
    /// Packets handed to a handler
    pub packets_dispatched: AtomicU64,
    /// Packets rejected during decode
    pub decode_errors: AtomicU64,
    /// Bytes consumed by successfully decoded packets, headers included
    pub bytes_received: AtomicU64,
    /// Decoded packets by type, indexed by `type byte - 1`
    per_type: [AtomicU64; 4],
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            packets_decoded: AtomicU64::new(0),
            packets_dispatched: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            per_type: Default::default(),
            start_time: Instant::now(),
        }
    }

    /// Record a decoded packet of `byte_count` bytes
    pub fn packet_decoded(&self, message_type: MessageType, byte_count: usize) {
        self.packets_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(byte_count as u64, Ordering::Relaxed);
        self.per_type[message_type as usize - 1].fetch_add(1, Ordering::Relaxed);
    }

    pub fn packet_dispatched(&self) {
        self.packets_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failed(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Decoded packets of one type
    pub fn decoded_of(&self, message_type: MessageType) -> u64 {
        self.per_type[message_type as usize - 1].load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_decoded: self.packets_decoded.load(Ordering::Relaxed),
            packets_dispatched: self.packets_dispatched.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            player_updates: self.decoded_of(MessageType::PlayerUpdate),
            chat_messages: self.decoded_of(MessageType::ChatMessage),
            object_updates: self.decoded_of(MessageType::ObjectUpdate),
            pings: self.decoded_of(MessageType::Ping),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_decoded = snapshot.packets_decoded,
            packets_dispatched = snapshot.packets_dispatched,
            decode_errors = snapshot.decode_errors,
            bytes_received = snapshot.bytes_received,
            player_updates = snapshot.player_updates,
            chat_messages = snapshot.chat_messages,
            object_updates = snapshot.object_updates,
            pings = snapshot.pings,
            uptime_seconds = snapshot.uptime_seconds,
            "Dispatcher metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets_decoded: u64,
    pub packets_dispatched: u64,
    pub decode_errors: u64,
    pub bytes_received: u64,
    pub player_updates: u64,
    pub chat_messages: u64,
    pub object_updates: u64,
    pub pings: u64,
    pub uptime_seconds: u64,
}
