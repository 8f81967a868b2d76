//! Event system for pipeline notifications
//!
//! This module provides:
//! - Event types for document status, progress, analyses and queries
//! - Event bus for internal pub/sub

mod bus;
mod event;

pub use bus::{EventBus, EventSubscriber};
pub use event::PipelineEvent;
