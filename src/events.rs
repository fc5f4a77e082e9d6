use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::warn;

use crate::cells::Coordinate;
use crate::errors::*;
use crate::grid::Maze;

/// Progress report for one carve: a snapshot of the (possibly partial) maze
/// and the cell that was just carved into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationStep {
    pub maze: Maze,
    pub current: Coordinate,
    /// Zero based count of carves before this one.
    pub index: usize,
}

pub type StepHandler = Box<dyn FnMut(&GenerationStep) -> Result<()> + Send>;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub struct SubscriptionId(usize);

/// The observers of a single generation run, owned by whoever asked for the maze.
#[derive(Default)]
pub struct GenerationEvents {
    handlers: Vec<(SubscriptionId, StepHandler)>,
    next_id: usize,
}

impl GenerationEvents {
    pub fn new() -> GenerationEvents {
        GenerationEvents::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
        where F: FnMut(&GenerationStep) -> Result<()> + Send + 'static
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if the subscription was not (or no longer) registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|&(handler_id, _)| handler_id != id);
        self.handlers.len() != before
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver a step to every handler in subscription order.
    ///
    /// A handler that errors or panics is logged and skipped, delivery continues
    /// with the next one. Returns how many handlers failed.
    pub fn publish(&mut self, step: &GenerationStep) -> usize {
        let mut failures = 0;
        for (id, handler) in self.handlers.iter_mut() {
            let delivery = panic::catch_unwind(AssertUnwindSafe(|| handler(step)));
            let failure = match delivery {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(payload) => ErrorKind::ObserverFailed(panic_message(payload.as_ref())).into(),
            };
            failures += 1;
            warn!("generation observer {:?} failed on step {} at {}: {}",
                  id, step.index, step.current, failure);
        }
        failures
    }
}

impl fmt::Debug for GenerationEvents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ids = self.handlers.iter().map(|&(id, _)| id).collect::<Vec<_>>();
        write!(f, "GenerationEvents :: subscriptions: {:?}", ids)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        String::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}
