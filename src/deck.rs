use std::collections::{HashSet, VecDeque};

use log::error;

use crate::error::DeckError;
use crate::item::{DeckItem, Edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub left: usize,
    pub right: usize,
    pub backlog: usize,
}

/// Unseen backlog plus the two sorted collections.
#[derive(Debug, Clone)]
pub struct DeckStore<T> {
    backlog: VecDeque<T>,
    left: Vec<T>,
    right: Vec<T>,
    owned: HashSet<String>,
    sorted: HashSet<String>,
}

impl<T> Default for DeckStore<T> {
    fn default() -> Self {
        Self {
            backlog: VecDeque::new(),
            left: Vec::new(),
            right: Vec::new(),
            owned: HashSet::new(),
            sorted: HashSet::new(),
        }
    }
}

impl<T: DeckItem> DeckStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the backlog with `items` in order. Sorted collections are
    /// kept unless `reset_outputs` is set. Items whose id is already in the
    /// deck are dropped.
    pub fn load(&mut self, items: Vec<T>, reset_outputs: bool) {
        if reset_outputs {
            self.left.clear();
            self.right.clear();
            self.sorted.clear();
        }
        let mut owned = self.sorted.clone();
        self.backlog = items
            .into_iter()
            .filter(|item| {
                let fresh = owned.insert(item.id().to_owned());
                if !fresh {
                    error!("dropping item with duplicate id `{}`", item.id());
                }
                fresh
            })
            .collect();
        self.owned = owned;
    }

    /// Pops up to `max_count` items off the front of the backlog.
    pub fn take_next(&mut self, max_count: usize) -> Vec<T> {
        let count = max_count.min(self.backlog.len());
        self.backlog.drain(..count).collect()
    }

    pub fn record_outcome(&mut self, item: T, side: Edge) -> Result<(), DeckError> {
        let id = item.id().to_owned();
        if !self.owned.contains(&id) {
            return Err(DeckError::UnknownItem(id));
        }
        if !self.sorted.insert(id.clone()) {
            return Err(DeckError::DuplicateOutcome(id));
        }
        match side {
            Edge::Left => self.left.push(item),
            Edge::Right => self.right.push(item),
        }
        Ok(())
    }

    pub fn counts(&self) -> Counts {
        Counts {
            left: self.left.len(),
            right: self.right.len(),
            backlog: self.backlog.len(),
        }
    }

    pub fn backlog(&self) -> impl Iterator<Item = &T> {
        self.backlog.iter()
    }

    pub fn left(&self) -> &[T] {
        &self.left
    }

    pub fn right(&self) -> &[T] {
        &self.right
    }

    pub fn is_backlog_empty(&self) -> bool {
        self.backlog.is_empty()
    }
}
