use std::collections::HashSet;
use std::time::Duration;

use log::{debug, error, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SessionConfig;
use crate::deck::{Counts, DeckStore};
use crate::error::DeckError;
use crate::item::{DeckItem, Direction, Edge, Role};
use crate::pair::{
    ActiveCard, ActivePairController, Announcement, Completion, Dismissal, Phase, Prepared,
};
use crate::schedule::{Generation, Scheduler, Task};

/// What the rendering layer should react to, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Reloaded { generation: Generation, cards: usize },
    Presented(Vec<String>),
    Announced(Announcement),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveView {
    pub id: String,
    pub role: Role,
    pub exit: Option<Edge>,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub active: Vec<ActiveView>,
    pub counts: Counts,
    pub exhausted: bool,
    pub locked: bool,
    pub phase: Phase,
}

/// Deck, active pair, timers and favorites behind one command surface.
///
/// Single-threaded: the owner forwards gestures, animation completions and
/// elapsed time, then polls [`Self::snapshot`] or drains events.
#[derive(Debug)]
pub struct SortSession<T> {
    config: SessionConfig,
    items: Vec<T>,
    favorites: HashSet<String>,
    show_only_favorites: bool,
    store: DeckStore<T>,
    controller: ActivePairController<T>,
    scheduler: Scheduler,
    events: Vec<SessionEvent>,
}

impl<T: DeckItem> SortSession<T> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            controller: ActivePairController::with_max_active(config.max_active),
            config,
            items: Vec::new(),
            favorites: HashSet::new(),
            show_only_favorites: false,
            store: DeckStore::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
        }
    }

    pub fn with_items(config: SessionConfig, items: Vec<T>) -> Self {
        let mut session = Self::new(config);
        session.load(items);
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replaces the full item list and starts over.
    pub fn load(&mut self, items: Vec<T>) {
        self.items = items;
        self.restart();
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);
        self.restart();
    }

    pub fn set_show_only_favorites(&mut self, enabled: bool) {
        if self.show_only_favorites == enabled {
            return;
        }
        self.show_only_favorites = enabled;
        self.restart();
    }

    pub fn toggle_show_only_favorites(&mut self) -> bool {
        self.set_show_only_favorites(!self.show_only_favorites);
        self.show_only_favorites
    }

    pub fn show_only_favorites(&self) -> bool {
        self.show_only_favorites
    }

    /// Flips the favorite mark on `id` and returns the new state. The deck
    /// in play is left alone until the next reload.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.to_owned());
            true
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Forwards a resolved swipe. Returns whether it was accepted.
    pub fn dismiss(&mut self, id: &str, direction: Direction) -> bool {
        let Some(edge) = direction.edge() else {
            debug!("dismiss of `{}` ignored: {:?} is not a sorting edge", id, direction);
            return false;
        };
        match self.controller.dismiss(id, edge) {
            Dismissal::Ignored => false,
            Dismissal::Accepted { paired } => {
                if let Some(auto) = paired {
                    self.scheduler
                        .schedule(self.config.auto_resolve_delay(), Task::AutoResolve(auto));
                }
                true
            }
        }
    }

    /// Forwards the end of an exit animation.
    pub fn complete_dismissal(&mut self, id: &str) -> Result<(), DeckError> {
        let completion = self
            .controller
            .complete_dismissal(id, &mut self.store)
            .map_err(|err| {
                error!("deck invariant violated: {}", err);
                err
            })?;

        if let Completion::Resolved(announcement) = completion {
            info!(
                "sorted {} card(s) toward {:?}",
                announcement.count, announcement.sides
            );
            self.events.push(SessionEvent::Announced(announcement));

            let delay = self.config.next_pair_delay();
            if delay.is_zero() {
                self.prepare();
            } else {
                let generation = self.controller.generation();
                self.scheduler.schedule(delay, Task::PrepareNext { generation });
            }
        }
        Ok(())
    }

    /// Drag progress for a card that has not been committed yet.
    pub fn set_offset(&mut self, id: &str, offset: f64) -> bool {
        self.controller.set_offset(id, offset)
    }

    /// Moves the session clock and runs whatever fell due.
    pub fn advance(&mut self, elapsed: Duration) {
        for task in self.scheduler.advance(elapsed) {
            let current = self.controller.generation();
            if task.generation() != current {
                debug!(
                    "dropping stale {:?} from generation {}",
                    task,
                    task.generation().value()
                );
                continue;
            }
            match task {
                Task::AutoResolve(auto) => {
                    self.controller.auto_resolve(&auto);
                }
                Task::PrepareNext { .. } => {
                    if self.controller.phase() == Phase::Draining {
                        self.prepare();
                    }
                }
            }
        }
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.scheduler.next_due_in()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            active: self
                .controller
                .active()
                .iter()
                .map(|card| ActiveView {
                    id: card.id().to_owned(),
                    role: card.role(),
                    exit: card.exit_edge(),
                    offset: card.offset(),
                })
                .collect(),
            counts: self.store.counts(),
            exhausted: self.controller.is_exhausted(),
            locked: self.controller.is_locked(),
            phase: self.controller.phase(),
        }
    }

    pub fn active(&self) -> &[ActiveCard<T>] {
        self.controller.active()
    }

    pub fn counts(&self) -> Counts {
        self.store.counts()
    }

    pub fn left(&self) -> &[T] {
        self.store.left()
    }

    pub fn right(&self) -> &[T] {
        self.store.right()
    }

    pub fn backlog(&self) -> impl Iterator<Item = &T> {
        self.store.backlog()
    }

    pub fn is_exhausted(&self) -> bool {
        self.controller.is_exhausted()
    }

    pub fn is_locked(&self) -> bool {
        self.controller.is_locked()
    }

    pub fn generation(&self) -> Generation {
        self.controller.generation()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    fn visible_items(&self) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| !self.show_only_favorites || self.favorites.contains(item.id()))
            .cloned()
            .collect()
    }

    fn restart(&mut self) {
        self.controller.reset();
        let visible = self.visible_items();
        self.store.load(visible, true);
        let generation = self.controller.generation();
        let cards = self.store.counts().backlog;
        info!(
            "deck reloaded with {} card(s), generation {}",
            cards,
            generation.value()
        );
        self.events.push(SessionEvent::Reloaded { generation, cards });
        self.prepare();
    }

    fn prepare(&mut self) {
        match self.controller.prepare_next(&mut self.store) {
            Prepared::Filled(_) => {
                let ids = self
                    .controller
                    .active()
                    .iter()
                    .map(|card| card.id().to_owned())
                    .collect();
                self.events.push(SessionEvent::Presented(ids));
            }
            Prepared::Exhausted => {
                info!("deck exhausted");
                self.events.push(SessionEvent::Exhausted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn instant() -> SessionConfig {
        SessionConfig {
            auto_resolve_delay_ms: 200,
            next_pair_delay_ms: 0,
            ..SessionConfig::default()
        }
    }

    fn cards(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn load_presents_first_pair() {
        let mut session = SortSession::with_items(instant(), cards(&["A", "B", "C"]));
        let events = session.drain_events();
        assert!(matches!(events[0], SessionEvent::Reloaded { cards: 3, .. }));
        assert_eq!(events[1], SessionEvent::Presented(cards(&["A", "B"])));
        assert_eq!(session.counts().backlog, 1);
    }

    #[test]
    fn vertical_swipes_are_ignored() {
        let mut session = SortSession::with_items(instant(), cards(&["A", "B"]));
        assert!(!session.dismiss("A", Direction::Up));
        assert!(!session.is_locked());
        assert_eq!(session.next_due_in(), None);
    }

    #[test]
    fn auto_resolve_waits_for_its_delay() {
        let mut session = SortSession::with_items(instant(), cards(&["A", "B"]));
        assert!(session.dismiss("A", Direction::Left));
        assert_eq!(session.next_due_in(), Some(Duration::from_millis(200)));

        session.advance(Duration::from_millis(199));
        assert_eq!(session.snapshot().active[1].exit, None);

        session.advance(Duration::from_millis(1));
        assert_eq!(session.snapshot().active[1].exit, Some(Edge::Right));
    }

    #[test]
    fn shuffle_invalidates_pending_auto_resolve() {
        let mut session = SortSession::with_items(instant(), cards(&["A", "B", "C", "D"]));
        let before = session.generation();
        assert!(session.dismiss("A", Direction::Left));

        session.shuffle(&mut StdRng::seed_from_u64(7));
        assert!(session.generation() > before);
        let fresh = session.snapshot();

        session.advance(Duration::from_secs(1));
        assert_eq!(session.snapshot(), fresh);
        assert!(fresh.active.iter().all(|card| card.exit.is_none()));
        assert_eq!(fresh.counts.left + fresh.counts.right, 0);
    }

    #[test]
    fn favorites_filter_reloads_the_deck() {
        let mut session = SortSession::with_items(instant(), cards(&["A", "B", "C"]));
        assert!(session.toggle_favorite("C"));
        assert!(session.is_favorite("C"));
        session.drain_events();

        assert!(session.toggle_show_only_favorites());
        let events = session.drain_events();
        assert!(matches!(events[0], SessionEvent::Reloaded { cards: 1, .. }));
        assert_eq!(events[1], SessionEvent::Presented(cards(&["C"])));
        assert_eq!(session.snapshot().active[0].role, Role::Single);

        assert!(!session.toggle_favorite("C"));
        assert!(!session.toggle_show_only_favorites());
        assert_eq!(session.counts().backlog, 1);
    }

    #[test]
    fn empty_favorites_filter_is_exhausted() {
        let mut session = SortSession::with_items(instant(), cards(&["A"]));
        session.set_show_only_favorites(true);
        assert!(session.is_exhausted());
        assert_eq!(session.drain_events().last(), Some(&SessionEvent::Exhausted));
    }

    #[test]
    fn delayed_next_pair_goes_through_draining() {
        let config = SessionConfig {
            auto_resolve_delay_ms: 100,
            next_pair_delay_ms: 300,
            ..SessionConfig::default()
        };
        let mut session = SortSession::with_items(config, cards(&["A", "B", "C"]));
        session.dismiss("B", Direction::Right);
        session.advance(Duration::from_millis(100));
        session.complete_dismissal("A").unwrap();
        session.complete_dismissal("B").unwrap();

        assert_eq!(session.snapshot().phase, Phase::Draining);
        assert!(session.active().is_empty());

        session.advance(Duration::from_millis(300));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Filled);
        assert_eq!(snapshot.active[0].id, "C");
        assert_eq!(snapshot.active[0].role, Role::Single);
        assert_eq!(session.left(), ["A".to_string()]);
        assert_eq!(session.right(), ["B".to_string()]);
    }
}
