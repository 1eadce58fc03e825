use super::reducer::Reducer;
use crate::{
    errors::PregelError,
    memory::{size_of_slice, MemoryRange},
};
use pregel_api::{atomic_extra::AtomicF64, VID};
use rayon::prelude::*;
use std::{mem, sync::atomic::Ordering};

/// Combines messages on arrival, keeping a single value per node.
#[derive(Debug)]
pub struct ReducingMessenger {
    send: Vec<AtomicF64>,
    receive: Vec<AtomicF64>,
    reducer: Reducer,
}

impl ReducingMessenger {
    pub fn new(node_count: usize, reducer: Reducer) -> Result<Self, PregelError> {
        let identity = reducer.identity();
        if identity.is_nan() {
            return Err(PregelError::InvalidReducerIdentity);
        }
        let filled = || {
            (0..node_count)
                .into_par_iter()
                .map(|_| AtomicF64::new(identity))
                .collect::<Vec<_>>()
        };
        Ok(Self {
            send: filled(),
            receive: filled(),
            reducer,
        })
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    pub fn init_iteration(&mut self) {
        mem::swap(&mut self.send, &mut self.receive);
        let identity = self.reducer.identity();
        self.send
            .par_iter()
            .for_each(|slot| slot.store(identity, Ordering::Relaxed));
    }

    pub fn send_to(&self, target: VID, message: f64) {
        let reducer = self.reducer;
        self.send[target.index()].update(|current| reducer.reduce(current, message));
    }

    /// The combined messages of the previous superstep, unless nothing changed the identity.
    pub fn message(&self, node: VID) -> Option<f64> {
        let value = self.receive[node.index()].load(Ordering::Acquire);
        (value != self.reducer.identity()).then_some(value)
    }

    pub fn memory_estimation(node_count: usize) -> MemoryRange {
        MemoryRange::of(size_of_slice::<AtomicF64>(node_count)).times(2)
    }
}

#[cfg(test)]
mod reducing_tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn nan_identity_is_rejected() {
        let reducer = Reducer::Custom {
            identity: f64::NAN,
            combine: f64::max,
        };
        assert!(matches!(
            ReducingMessenger::new(1, reducer),
            Err(PregelError::InvalidReducerIdentity)
        ));
    }

    #[test]
    fn combines_on_send_and_delivers_next_superstep() {
        let mut messenger = ReducingMessenger::new(3, Reducer::Sum).unwrap();
        messenger.init_iteration();
        messenger.send_to(VID(2), 1.5);
        messenger.send_to(VID(2), 2.0);
        assert_eq!(messenger.message(VID(2)), None);

        messenger.init_iteration();
        assert_eq!(messenger.message(VID(2)), Some(3.5));
        assert_eq!(messenger.message(VID(0)), None);

        messenger.init_iteration();
        assert_eq!(messenger.message(VID(2)), None);
    }

    #[test]
    fn concurrent_senders() {
        let mut messenger = ReducingMessenger::new(1, Reducer::Count).unwrap();
        messenger.init_iteration();
        let messenger = Arc::new(messenger);
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let messenger = messenger.clone();
                std::thread::spawn(move || (0..1_000).for_each(|_| messenger.send_to(VID(0), 9.0)))
            })
            .collect();
        threads.into_iter().for_each(|t| t.join().unwrap());
        let mut messenger = Arc::into_inner(messenger).unwrap();
        messenger.init_iteration();
        assert_eq!(messenger.message(VID(0)), Some(4_000.0));
    }
}
