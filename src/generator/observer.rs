use crate::grid::{GridData, NodeIndex};

use super::{Generator, GridNode};

/// Update sent by a [`Generator`] to its observers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationUpdate {
    /// A node has been reduced to a single possible pattern
    Generated(GridNode),
    /// The generator was reinitialized to its initial state, with a new seed.
    Reinitialized(u64),
    /// The generation failed due to a contradiction at the specified node_index
    Failed(NodeIndex),
}

/// Observer with a queue of the [`GenerationUpdate`] sent by the [`Generator`] and which maintains a [`GridData`] of the generated nodes.
pub struct QueuedStatefulObserver {
    grid_data: GridData<Option<GridNode>>,
    receiver: crossbeam_channel::Receiver<GenerationUpdate>,
}

impl QueuedStatefulObserver {
    /// Creates a new [`QueuedStatefulObserver`] for a given [`Generator`]
    pub fn new(generator: &mut Generator) -> Self {
        let receiver = generator.add_observer_queue();
        QueuedStatefulObserver {
            grid_data: generator.grid().new_grid_data(None),
            receiver,
        }
    }

    /// Returns the current state of the observed grid
    pub fn grid_data(&self) -> &GridData<Option<GridNode>> {
        &self.grid_data
    }

    /// Updates the internal state of the observer by dequeuing all queued updates.
    pub fn dequeue_all(&mut self) {
        while let Ok(update) = self.receiver.try_recv() {
            self.apply(update);
        }
    }

    /// Updates the internal state of the observer by dequeuing 1 queued update.
    ///
    /// Returns [`Some(GenerationUpdate)`] if there was an update to process, else returns `None`.
    pub fn dequeue_one(&mut self) -> Option<GenerationUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => {
                self.apply(update);
                Some(update)
            }
            Err(_) => None,
        }
    }

    fn apply(&mut self, update: GenerationUpdate) {
        match update {
            GenerationUpdate::Generated(grid_node) => {
                self.grid_data.set(grid_node.node_index, Some(grid_node))
            }
            GenerationUpdate::Reinitialized(_) | GenerationUpdate::Failed(_) => {
                self.grid_data.reset(None)
            }
        }
    }
}

/// Observer with a queue of the [`GenerationUpdate`] sent by the [`Generator`]
pub struct QueuedObserver {
    receiver: crossbeam_channel::Receiver<GenerationUpdate>,
}

impl QueuedObserver {
    /// Creates a new [`QueuedObserver`] for a given [`Generator`]
    pub fn new(generator: &mut Generator) -> Self {
        let receiver = generator.add_observer_queue();
        QueuedObserver { receiver }
    }

    /// Dequeues all queued updates.
    ///
    /// Returns all retrieved [`GenerationUpdate`] in a `Vec`.
    /// The `Vec` may be empty if no update was queued.
    pub fn dequeue_all(&mut self) -> Vec<GenerationUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.receiver.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Dequeues 1 queued update.
    pub fn dequeue_one(&mut self) -> Option<GenerationUpdate> {
        self.receiver.try_recv().ok()
    }
}
