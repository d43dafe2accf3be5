use std::collections::HashSet;
use std::path::Path;

use log::warn;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{read_resource, DataError};
use crate::item::DeckItem;

pub const CHARACTERS_FILE: &str = "split_rail_characters_v1.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterFile {
    pub version: String,
    pub generated_at: String,
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub label: String,
    pub role: String,
    pub age_band: String,
    pub group_size: u32,
    pub legal_status: String,
    pub vulnerability: String,
    pub dependents: u32,
    pub relationship: String,
    pub future_impact_mu: f64,
    pub future_impact_sigma: f64,
    pub certainty_base: f64,
    pub lens_tags: Vec<String>,
    pub opt_out_sensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardColor {
    Green,
    Blue,
    Yellow,
    Red,
    Orange,
    Brown,
    Purple,
    Pink,
    Teal,
    Indigo,
}

const COLORS: [CardColor; 10] = [
    CardColor::Green,
    CardColor::Blue,
    CardColor::Yellow,
    CardColor::Red,
    CardColor::Orange,
    CardColor::Brown,
    CardColor::Purple,
    CardColor::Pink,
    CardColor::Teal,
    CardColor::Indigo,
];

const SYMBOLS: [&str; 10] = [
    "person",
    "figure.walk",
    "figure.wave",
    "star",
    "bolt",
    "globe",
    "heart",
    "leaf",
    "briefcase",
    "graduationcap",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub number: usize,
    pub title: String,
    pub body: String,
    pub color: CardColor,
    pub symbol: &'static str,
}

impl Card {
    pub fn new(id: impl Into<String>, number: usize, title: String, body: String) -> Self {
        let id = id.into();
        let hash = stable_hash(&id) as usize;
        Self {
            color: COLORS[hash % COLORS.len()],
            symbol: SYMBOLS[hash % SYMBOLS.len()],
            id,
            number,
            title,
            body,
        }
    }
}

impl DeckItem for Card {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Character {
    pub fn to_card(&self, number: usize) -> Card {
        let title = format!(
            "{} • {}",
            capitalize_words(&self.role),
            capitalize_words(&self.age_band)
        );
        let body = format!(
            "Status: {}\nVulnerability: {}\nRelationship: {}",
            self.legal_status.replace('_', " "),
            self.vulnerability.replace('_', " "),
            self.relationship.replace('_', " ")
        );
        Card::new(self.id.clone(), number, title, body)
    }
}

pub fn parse_characters(text: &str) -> Result<Vec<Character>, DataError> {
    let file: CharacterFile = serde_json::from_str(text).map_err(DataError::parse)?;
    Ok(file.characters)
}

pub fn read_characters(path: &Path) -> Result<Vec<Character>, DataError> {
    parse_characters(&read_resource(path)?)
}

/// Reads the character file, yielding nothing if it is missing or malformed.
pub fn load_characters(path: &Path) -> Vec<Character> {
    match read_characters(path) {
        Ok(characters) => characters,
        Err(err) => {
            warn!("Could not load {}: {}", path.display(), err);
            Vec::new()
        }
    }
}

/// Maps characters to cards numbered from 1, optionally keeping a random
/// subset of `display_size` cards (source order kept, renumbered). Repeated
/// ids get a `-2`, `-3`, ... suffix.
pub fn cards_from_characters<R: Rng + ?Sized>(
    characters: &[Character],
    display_size: Option<usize>,
    rng: &mut R,
) -> Vec<Card> {
    let picked: Vec<&Character> = match display_size {
        Some(size) if size < characters.len() => {
            let mut indices = rand::seq::index::sample(rng, characters.len(), size).into_vec();
            indices.sort_unstable();
            indices.into_iter().map(|i| &characters[i]).collect()
        }
        _ => characters.iter().collect(),
    };

    let mut seen = HashSet::new();
    picked
        .into_iter()
        .enumerate()
        .map(|(index, character)| {
            let mut card = character.to_card(index + 1);
            let id = ensure_unique_id(&mut seen, card.id.clone());
            if id != card.id {
                warn!("Character id `{}` repeats, using `{}`", card.id, id);
                card = Card::new(id, card.number, card.title, card.body);
            }
            card
        })
        .collect()
}

fn ensure_unique_id(seen: &mut HashSet<String>, base: String) -> String {
    if seen.insert(base.clone()) {
        return base;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Sample cards from `path`, or the built-in set when that yields nothing.
pub fn load_cards<R: Rng + ?Sized>(
    path: &Path,
    display_size: Option<usize>,
    rng: &mut R,
) -> Vec<Card> {
    let cards = cards_from_characters(&load_characters(path), display_size, rng);
    if cards.is_empty() {
        warn!("Using built-in fallback cards");
        return fallback_cards();
    }
    cards
}

pub fn fallback_cards() -> Vec<Card> {
    const HOBBIES: [(&str, &str); 8] = [
        ("Painting", "Color, brushes and a blank canvas."),
        ("Hiking", "Long trails and a good pair of boots."),
        ("Chess", "Sixty-four squares of quiet tension."),
        ("Baking", "Flour, butter and patience."),
        ("Cycling", "Two wheels and an open road."),
        ("Photography", "Catching light at the right moment."),
        ("Gardening", "Dirt under the nails, green on the windowsill."),
        ("Music", "Scales first, songs later."),
    ];

    HOBBIES
        .iter()
        .enumerate()
        .map(|(index, (name, text))| {
            Card::new(
                format!("hobby-{}", index + 1),
                index + 1,
                (*name).to_string(),
                (*text).to_string(),
            )
        })
        .collect()
}

fn stable_hash(id: &str) -> u64 {
    Sha256::digest(id.as_bytes())
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

fn capitalize_words(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE: &str = r#"{
        "version": "1",
        "generatedAt": "2025-09-30T00:00:00Z",
        "characters": [
            {
                "id": "c-001",
                "label": "A",
                "role": "nurse",
                "ageBand": "adult",
                "groupSize": 1,
                "legalStatus": "permanent_resident",
                "vulnerability": "low_income",
                "dependents": 2,
                "relationship": "stranger",
                "futureImpactMu": 0.4,
                "futureImpactSigma": 0.1,
                "certaintyBase": 0.8,
                "lensTags": ["care"],
                "optOutSensitive": false
            }
        ]
    }"#;

    #[test]
    fn capitalize_words_basic() {
        assert_eq!(capitalize_words("young adult"), "Young Adult");
        assert_eq!(capitalize_words("NURSE"), "Nurse");
    }

    #[test]
    fn character_maps_to_card() {
        let characters = parse_characters(SAMPLE).unwrap();
        let card = characters[0].to_card(1);
        assert_eq!(card.id, "c-001");
        assert_eq!(card.number, 1);
        assert_eq!(card.title, "Nurse • Adult");
        assert_eq!(
            card.body,
            "Status: permanent resident\nVulnerability: low income\nRelationship: stranger"
        );
    }

    #[test]
    fn color_and_symbol_are_stable() {
        let a = Card::new("c-001", 1, String::new(), String::new());
        let b = Card::new("c-001", 7, "x".into(), "y".into());
        assert_eq!(a.color, b.color);
        assert_eq!(a.symbol, b.symbol);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(matches!(
            parse_characters("{\"version\": 1}"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn subsample_renumbers() {
        let template = parse_characters(SAMPLE).unwrap().remove(0);
        let characters: Vec<Character> = (0..10)
            .map(|i| Character {
                id: format!("c-{i}"),
                ..template.clone()
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(3);
        let cards = cards_from_characters(&characters, Some(4), &mut rng);
        assert_eq!(cards.len(), 4);
        assert_eq!(
            cards.iter().map(|c| c.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let all = cards_from_characters(&characters, Some(50), &mut rng);
        assert_eq!(all.len(), 10);
        assert_eq!(all[9].id, "c-9");
    }

    #[test]
    fn repeated_ids_get_suffixes() {
        let template = parse_characters(SAMPLE).unwrap().remove(0);
        let characters = vec![template.clone(), template.clone(), template];

        let mut rng = StdRng::seed_from_u64(5);
        let cards = cards_from_characters(&characters, None, &mut rng);
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-001", "c-001-2", "c-001-3"]);
        assert_eq!(cards[2].number, 3);
        assert_eq!(cards[2].title, "Nurse • Adult");
    }

    #[test]
    fn missing_file_uses_fallback() {
        let mut rng = StdRng::seed_from_u64(1);
        let path = Path::new("/no/such/dir").join(CHARACTERS_FILE);
        assert!(load_characters(&path).is_empty());
        assert_eq!(load_cards(&path, None, &mut rng), fallback_cards());
    }
}
