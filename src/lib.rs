pub mod config;
pub mod data;
pub mod deck;
pub mod error;
pub mod item;
pub mod pair;
pub mod schedule;
pub mod session;

pub use config::SessionConfig;
pub use data::{fallback_cards, load_cards, Card};
pub use deck::{Counts, DeckStore};
pub use error::{DataError, DeckError};
pub use item::{DeckItem, Direction, Edge, Role};
pub use pair::{ActivePairController, Announcement, Phase};
pub use schedule::Generation;
pub use session::{SessionEvent, Snapshot, SortSession};
