/// Anything that can sit in a deck. The core only ever looks at the id.
pub trait DeckItem: Clone {
    fn id(&self) -> &str;
}

impl DeckItem for String {
    fn id(&self) -> &str {
        self
    }
}

/// The two sides a card can be dismissed toward, each bound to one output
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Edge {
    Left,
    Right,
}

impl Edge {
    pub fn opposite(self) -> Self {
        match self {
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }

    /// Signed exit offset a renderer can animate toward.
    pub fn exit_offset(self) -> f64 {
        match self {
            Edge::Left => -1.0,
            Edge::Right => 1.0,
        }
    }
}

/// Direction resolved by the gesture layer. Only horizontal swipes sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn edge(self) -> Option<Edge> {
        match self {
            Direction::Left => Some(Edge::Left),
            Direction::Right => Some(Edge::Right),
            Direction::Up | Direction::Down => None,
        }
    }
}

impl From<Edge> for Direction {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Left => Direction::Left,
            Edge::Right => Direction::Right,
        }
    }
}

/// Layout slot of an active card. Says nothing about where it ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Single,
    LeftSlot,
    RightSlot,
}

impl Role {
    /// Roles for a batch of `count` freshly pulled cards, in pull order.
    pub fn for_batch(count: usize) -> &'static [Role] {
        match count {
            0 => &[],
            1 => &[Role::Single],
            _ => &[Role::LeftSlot, Role::RightSlot],
        }
    }
}
