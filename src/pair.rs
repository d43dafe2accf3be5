use std::collections::BTreeSet;

use log::debug;

use crate::deck::DeckStore;
use crate::error::DeckError;
use crate::item::{DeckItem, Edge, Role};
use crate::schedule::{AutoResolve, Generation};

pub const PAIR_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Filled,
    Resolving,
    Draining,
}

#[derive(Debug, Clone)]
pub struct ActiveCard<T> {
    item: T,
    role: Role,
    exit: Option<Edge>,
    offset: f64,
}

impl<T: DeckItem> ActiveCard<T> {
    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn id(&self) -> &str {
        self.item.id()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn exit_edge(&self) -> Option<Edge> {
        self.exit
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_in_flight(&self) -> bool {
        self.exit.is_some()
    }

    fn commit(&mut self, edge: Edge) {
        self.exit = Some(edge);
        self.offset = edge.exit_offset();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub count: usize,
    pub sides: BTreeSet<Edge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    Filled(usize),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dismissal {
    /// Not active, already locked, or otherwise raced the state.
    Ignored,
    Accepted { paired: Option<AutoResolve> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Ignored,
    Pending,
    Resolved(Announcement),
}

#[derive(Debug, Clone)]
pub struct ActivePairController<T> {
    active: Vec<ActiveCard<T>>,
    phase: Phase,
    locked: bool,
    exhausted: bool,
    resolved_edges: Vec<Edge>,
    max_active: usize,
    generation: Generation,
}

impl<T> Default for ActivePairController<T> {
    fn default() -> Self {
        Self::with_max_active(PAIR_SIZE)
    }
}

impl<T> ActivePairController<T> {
    /// `max_active` is clamped to 1..=2.
    pub fn with_max_active(max_active: usize) -> Self {
        Self {
            active: Vec::with_capacity(PAIR_SIZE),
            phase: Phase::Idle,
            locked: false,
            exhausted: false,
            resolved_edges: Vec::with_capacity(PAIR_SIZE),
            max_active: max_active.clamp(1, PAIR_SIZE),
            generation: Generation::default(),
        }
    }
}

impl<T: DeckItem> ActivePairController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn active(&self) -> &[ActiveCard<T>] {
        &self.active
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Pulls the next batch from `store`. Does nothing while cards are still
    /// active.
    pub fn prepare_next(&mut self, store: &mut DeckStore<T>) -> Prepared {
        if !self.active.is_empty() {
            debug!("prepare_next ignored: {} card(s) still active", self.active.len());
            return Prepared::Filled(self.active.len());
        }
        self.finish_draining();

        let batch = store.take_next(self.max_active);
        if batch.is_empty() {
            self.exhausted = true;
            return Prepared::Exhausted;
        }

        let roles = Role::for_batch(batch.len());
        self.active = batch
            .into_iter()
            .zip(roles.iter().copied())
            .map(|(item, role)| ActiveCard {
                item,
                role,
                exit: None,
                offset: 0.0,
            })
            .collect();
        self.exhausted = false;
        self.phase = Phase::Filled;
        Prepared::Filled(self.active.len())
    }

    /// Commits `id` to `edge`. If it has a partner, the returned
    /// [`AutoResolve`] must be applied later through [`Self::auto_resolve`].
    pub fn dismiss(&mut self, id: &str, edge: Edge) -> Dismissal {
        if self.locked || self.phase != Phase::Filled {
            debug!("dismiss of `{}` ignored: controller is {:?}", id, self.phase);
            return Dismissal::Ignored;
        }
        let Some(index) = self.position(id) else {
            debug!("dismiss of `{}` ignored: not active", id);
            return Dismissal::Ignored;
        };

        self.locked = true;
        self.phase = Phase::Resolving;
        self.active[index].commit(edge);
        self.resolved_edges.push(edge);

        let paired = self
            .active
            .iter()
            .find(|card| !card.is_in_flight())
            .map(|partner| AutoResolve {
                item_id: partner.id().to_owned(),
                edge: edge.opposite(),
                generation: self.generation,
            });
        Dismissal::Accepted { paired }
    }

    /// Applies a scheduled partner dismissal. Returns `false` for stale or
    /// already settled requests.
    pub fn auto_resolve(&mut self, request: &AutoResolve) -> bool {
        if request.generation != self.generation {
            debug!(
                "auto-resolve of `{}` dropped: generation {} superseded by {}",
                request.item_id,
                request.generation.value(),
                self.generation.value()
            );
            return false;
        }
        if self.phase != Phase::Resolving {
            return false;
        }
        let Some(index) = self.position(&request.item_id) else {
            debug!("auto-resolve of `{}` dropped: not active", request.item_id);
            return false;
        };
        let card = &mut self.active[index];
        if card.is_in_flight() {
            return false;
        }
        card.commit(request.edge);
        self.resolved_edges.push(request.edge);
        true
    }

    /// Moves a committed card into its output collection. On error the card
    /// stays active and nothing is recorded.
    pub fn complete_dismissal(
        &mut self,
        id: &str,
        store: &mut DeckStore<T>,
    ) -> Result<Completion, DeckError> {
        let Some(index) = self.position(id) else {
            debug!("completion of `{}` ignored: not active", id);
            return Ok(Completion::Ignored);
        };
        let Some(edge) = self.active[index].exit else {
            debug!("completion of `{}` ignored: not dismissed", id);
            return Ok(Completion::Ignored);
        };

        store.record_outcome(self.active[index].item.clone(), edge)?;
        self.active.remove(index);

        if !self.active.is_empty() {
            return Ok(Completion::Pending);
        }

        let announcement = Announcement {
            count: self.resolved_edges.len(),
            sides: self.resolved_edges.drain(..).collect(),
        };
        self.locked = false;
        self.phase = Phase::Draining;
        Ok(Completion::Resolved(announcement))
    }

    pub fn finish_draining(&mut self) {
        if self.phase == Phase::Draining {
            self.phase = Phase::Idle;
        }
    }

    pub fn set_offset(&mut self, id: &str, offset: f64) -> bool {
        if self.locked {
            return false;
        }
        match self.position(id) {
            Some(index) if !self.active[index].is_in_flight() => {
                self.active[index].offset = offset;
                true
            }
            _ => false,
        }
    }

    /// Drops every active card and starts a new generation. Returns the
    /// active items so the caller can account for them.
    pub fn reset(&mut self) -> Vec<T> {
        self.generation = self.generation.next();
        self.phase = Phase::Idle;
        self.locked = false;
        self.exhausted = false;
        self.resolved_edges.clear();
        self.active.drain(..).map(|card| card.item).collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|card| card.id() == id)
    }
}
