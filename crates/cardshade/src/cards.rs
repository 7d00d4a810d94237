use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shaderlib::CardIdentity;

/// One entry of a card list file.
/// Unknown fields such as titles are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardRecord {
    #[serde(alias = "episode_number_overall")]
    pub id_overall: i64,
    #[serde(alias = "season_number")]
    pub id_group: i64,
}

impl CardRecord {
    pub fn identity(&self) -> CardIdentity {
        CardIdentity::new(self.id_overall, self.id_group)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CardFile {
    List(Vec<CardRecord>),
    Wrapped { cards: Vec<CardRecord> },
}

pub fn parse_cards(input: &str) -> Result<Vec<CardRecord>> {
    let file: CardFile = serde_json::from_str(input).context("failed to parse card list")?;
    Ok(match file {
        CardFile::List(cards) | CardFile::Wrapped { cards } => cards,
    })
}

pub fn load_cards(path: &Path) -> Result<Vec<CardRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read card list {}", path.display()))?;
    parse_cards(&raw).with_context(|| format!("invalid card list {}", path.display()))
}

/// Numbers cards 1..=count, ten to a group.
pub fn synthesise_cards(count: usize) -> Vec<CardRecord> {
    (0..count)
        .map(|index| CardRecord {
            id_overall: index as i64 + 1,
            id_group: (index / 10) as i64 + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_field_spellings() {
        let cards = parse_cards(
            r#"[
                {"id_overall": 3, "id_group": 1},
                {"episode_number_overall": 12, "season_number": 2, "title": "Twelve"}
            ]"#,
        )
        .unwrap();
        assert_eq!(cards[0].identity(), CardIdentity::new(3, 1));
        assert_eq!(cards[1].identity(), CardIdentity::new(12, 2));
    }

    #[test]
    fn accepts_wrapped_list() {
        let cards = parse_cards(r#"{"cards": [{"id_overall": -4, "id_group": 1}]}"#).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id_overall, -4);
    }

    #[test]
    fn missing_identity_is_an_error() {
        assert!(parse_cards(r#"[{"id_overall": 1}]"#).is_err());
    }

    #[test]
    fn synthesised_cards_group_by_ten() {
        let cards = synthesise_cards(21);
        assert_eq!(cards.len(), 21);
        assert_eq!(cards[0].identity(), CardIdentity::new(1, 1));
        assert_eq!(cards[9].identity(), CardIdentity::new(10, 1));
        assert_eq!(cards[10].identity(), CardIdentity::new(11, 2));
        assert_eq!(cards[20].identity(), CardIdentity::new(21, 3));
    }
}
