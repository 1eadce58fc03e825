//! Message delivery between nodes.
//!
//! The messenger of a run is picked once, at construction: a reducing
//! messenger when the computation declares a [`Reducer`], otherwise the
//! asynchronous or the synchronous queue messenger depending on the config.

pub mod async_queue;
pub mod queue;
pub mod reducer;
pub mod reducing;
pub mod sync_queue;

use crate::{config::PregelConfig, errors::PregelError, memory::MemoryRange};
use async_queue::AsyncQueueMessenger;
use pregel_api::VID;
use queue::QueueIter;
use reducing::ReducingMessenger;
use serde::{Deserialize, Serialize};
use std::fmt;
use sync_queue::SyncQueueMessenger;

pub use reducer::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessengerKind {
    Sync,
    Async,
    Reducing,
}

impl MessengerKind {
    pub fn select(config: &PregelConfig, has_reducer: bool) -> Self {
        if has_reducer {
            MessengerKind::Reducing
        } else if config.is_asynchronous {
            MessengerKind::Async
        } else {
            MessengerKind::Sync
        }
    }
}

impl fmt::Display for MessengerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessengerKind::Sync => "sync queues",
            MessengerKind::Async => "async queues",
            MessengerKind::Reducing => "reducing",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Messenger {
    Sync(SyncQueueMessenger),
    Async(AsyncQueueMessenger),
    Reducing(ReducingMessenger),
}

impl Messenger {
    pub fn new(
        node_count: usize,
        config: &PregelConfig,
        reducer: Option<Reducer>,
    ) -> Result<Self, PregelError> {
        let messenger = match reducer {
            Some(reducer) => Messenger::Reducing(ReducingMessenger::new(node_count, reducer)?),
            None if config.is_asynchronous => {
                Messenger::Async(AsyncQueueMessenger::new(node_count))
            }
            None => Messenger::Sync(SyncQueueMessenger::new(node_count)),
        };
        Ok(messenger)
    }

    pub fn kind(&self) -> MessengerKind {
        match self {
            Messenger::Sync(_) => MessengerKind::Sync,
            Messenger::Async(_) => MessengerKind::Async,
            Messenger::Reducing(_) => MessengerKind::Reducing,
        }
    }

    /// Prepare for the next superstep. Requires that no worker is sending.
    pub fn init_iteration(&mut self) {
        match self {
            Messenger::Sync(m) => m.init_iteration(),
            Messenger::Async(m) => m.init_iteration(),
            Messenger::Reducing(m) => m.init_iteration(),
        }
    }

    #[inline]
    pub fn send_to(&self, target: VID, message: f64) {
        match self {
            Messenger::Sync(m) => m.send_to(target, message),
            Messenger::Async(m) => m.send_to(target, message),
            Messenger::Reducing(m) => m.send_to(target, message),
        }
    }

    /// The inbox of `node`. Only the worker owning `node` may read it.
    pub fn messages(&self, node: VID) -> Messages<'_> {
        let inner = match self {
            Messenger::Sync(m) => MessagesInner::Queue(m.messages(node)),
            Messenger::Async(m) => MessagesInner::Async { messenger: m, node },
            Messenger::Reducing(m) => MessagesInner::Reduced(m.message(node)),
        };
        Messages { inner }
    }

    pub fn memory_estimation(kind: MessengerKind, node_count: usize) -> MemoryRange {
        match kind {
            MessengerKind::Sync => SyncQueueMessenger::memory_estimation(node_count),
            MessengerKind::Async => AsyncQueueMessenger::memory_estimation(node_count),
            MessengerKind::Reducing => ReducingMessenger::memory_estimation(node_count),
        }
    }
}

enum MessagesInner<'a> {
    Queue(QueueIter<'a>),
    Async {
        messenger: &'a AsyncQueueMessenger,
        node: VID,
    },
    Reduced(Option<f64>),
}

/// The messages a node receives in the current superstep.
pub struct Messages<'a> {
    inner: MessagesInner<'a>,
}

impl Messages<'_> {
    /// Whether no message is left to read.
    pub fn is_empty(&self) -> bool {
        match &self.inner {
            MessagesInner::Queue(iter) => iter.is_empty(),
            MessagesInner::Async { messenger, node } => messenger.is_empty(*node),
            MessagesInner::Reduced(message) => message.is_none(),
        }
    }
}

impl Iterator for Messages<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            MessagesInner::Queue(iter) => iter.next(),
            MessagesInner::Async { messenger, node } => messenger.pop(*node),
            MessagesInner::Reduced(message) => message.take(),
        }
    }
}
