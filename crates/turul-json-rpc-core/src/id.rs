//! Request id generation for outgoing calls.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::RequestId;

/// Source of fresh request ids, shared by every call a client makes.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> RequestId;
}

/// Monotonic numeric ids starting at a configurable value.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicI64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RequestId {
        RequestId::Number(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Random v4 UUID string ids.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> RequestId {
        RequestId::String(uuid::Uuid::new_v4().to_string())
    }
}
