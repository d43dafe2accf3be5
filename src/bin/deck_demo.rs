use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use split_rail_deck::data::CHARACTERS_FILE;
use split_rail_deck::{load_cards, Direction, SessionConfig, SessionEvent, SortSession};

const FRAME: Duration = Duration::from_millis(16);

/// Sorts the sample deck headlessly, alternating swipe directions.
#[derive(Debug, Parser)]
#[command(name = "deck_demo")]
struct Args {
    /// Character file to build cards from.
    #[arg(long, default_value = CHARACTERS_FILE)]
    characters: PathBuf,
    /// Optional JSON session config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep only this many cards.
    #[arg(long)]
    display_size: Option<usize>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load_or_default(path),
        None => SessionConfig::default(),
    };
    if args.display_size.is_some() {
        config.display_size = args.display_size;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let cards = load_cards(&args.characters, config.display_size, &mut rng);
    let mut session = SortSession::with_items(config, cards);
    session.shuffle(&mut rng);

    let mut direction = Direction::Left;
    while !session.is_exhausted() {
        let snapshot = session.snapshot();
        if !snapshot.locked {
            if let Some(first) = snapshot.active.first() {
                session.dismiss(&first.id, direction);
                direction = match direction {
                    Direction::Left => Direction::Right,
                    _ => Direction::Left,
                };
            }
        }

        let in_flight: Vec<String> = session
            .snapshot()
            .active
            .into_iter()
            .filter(|card| card.exit.is_some())
            .map(|card| card.id)
            .collect();
        for id in in_flight {
            if let Err(err) = session.complete_dismissal(&id) {
                eprintln!("aborting: {err}");
                std::process::exit(1);
            }
        }

        session.advance(FRAME);
        for event in session.drain_events() {
            if let SessionEvent::Announced(announcement) = event {
                info!(
                    "{} card(s) sorted toward {:?}",
                    announcement.count, announcement.sides
                );
            }
        }
    }

    let counts = session.counts();
    println!("left: {}  right: {}", counts.left, counts.right);
    for card in session.left() {
        println!("  < {:>3} {}", card.number, card.title);
    }
    for card in session.right() {
        println!("  > {:>3} {}", card.number, card.title);
    }
}
