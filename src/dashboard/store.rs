/// Single-writer state container
use std::sync::Arc;

use chrono::NaiveDate;

use super::render::{render, Frame};
use super::state::{ApplicationState, StateUpdate};

/// Where rendered frames end up; replaces its whole content on every call.
pub trait Mount {
    fn mount(&mut self, frame: &Frame);
}

pub struct Store<M: Mount> {
    snapshot: Arc<ApplicationState>,
    mount: M,
    clock: fn() -> NaiveDate,
}

impl<M: Mount> Store<M> {
    pub fn new(initial: ApplicationState, mount: M, clock: fn() -> NaiveDate) -> Self {
        Self {
            snapshot: Arc::new(initial),
            mount,
            clock,
        }
    }

    pub fn get(&self) -> Arc<ApplicationState> {
        Arc::clone(&self.snapshot)
    }

    /// Replace one top-level key, then render and mount the new snapshot.
    ///
    /// The returned frame carries the data needs of the new snapshot.
    pub fn update(&mut self, update: StateUpdate) -> Frame {
        self.snapshot = Arc::new(self.snapshot.with(update));
        self.render_current()
    }

    pub fn render_current(&mut self) -> Frame {
        let frame = render(&self.snapshot, (self.clock)());
        self.mount.mount(&frame);
        frame
    }

    pub fn mount_ref(&self) -> &M {
        &self.mount
    }
}
