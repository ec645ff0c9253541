//! Paired-deck shuffling.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use memoria_protocol::Card;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::DeckError;

/// How big a deck is and how its cards are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckConfig {
    /// Distinct faces per deck. The deck holds twice as many cards.
    pub limit: usize,
    /// Id of the first card; the rest follow sequentially.
    pub first_id: u32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            limit: 12,
            first_id: 1,
        }
    }
}

impl DeckConfig {
    /// Number of cards in a dealt deck.
    pub fn deck_size(&self) -> usize {
        self.limit.saturating_mul(2)
    }

    /// Ids a dealt deck will carry, or `None` when the last one would
    /// not fit in a `u32` (or the deck is empty).
    pub fn card_ids(&self) -> Option<RangeInclusive<u32>> {
        let span = u32::try_from(self.deck_size()).ok()?.checked_sub(1)?;
        let last = self.first_id.checked_add(span)?;
        Some(self.first_id..=last)
    }
}

/// Deals a deck from `faces` using the thread-local RNG.
///
/// # Errors
/// See [`deal_with_rng`].
pub fn deal(faces: &[String], config: &DeckConfig) -> Result<Vec<Card>, DeckError> {
    deal_with_rng(faces, config, &mut rand::rng())
}

/// Deals a deck from `faces`.
///
/// Picks `config.limit` distinct faces uniformly at random, puts two of
/// each into the deck, shuffles it, and numbers the cards from
/// `config.first_id`. The pool itself is left untouched and duplicate
/// entries in it count once.
///
/// # Errors
/// - [`DeckError::EmptyDeck`]: `config.limit` is 0
/// - [`DeckError::IdOverflow`]: numbering from `first_id` runs past `u32::MAX`
/// - [`DeckError::NotEnoughFaces`]: fewer distinct faces than `limit`
pub fn deal_with_rng<R: Rng + ?Sized>(
    faces: &[String],
    config: &DeckConfig,
    rng: &mut R,
) -> Result<Vec<Card>, DeckError> {
    if config.limit == 0 {
        return Err(DeckError::EmptyDeck);
    }
    let ids = config.card_ids().ok_or(DeckError::IdOverflow {
        first_id: config.first_id,
        cards: config.deck_size(),
    })?;

    let mut seen = HashSet::new();
    let mut chosen: Vec<&str> = faces
        .iter()
        .map(String::as_str)
        .filter(|face| seen.insert(*face))
        .collect();

    if chosen.len() < config.limit {
        return Err(DeckError::NotEnoughFaces {
            available: chosen.len(),
            required: config.limit,
        });
    }

    chosen.shuffle(rng);
    chosen.truncate(config.limit);

    let mut pairs: Vec<&str> = chosen.iter().chain(chosen.iter()).copied().collect();
    pairs.shuffle(rng);

    let deck: Vec<Card> = pairs
        .into_iter()
        .zip(ids)
        .map(|(src, id)| Card::new(src, id))
        .collect();

    tracing::debug!(cards = deck.len(), "deck dealt");
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn faces(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("/img/face-{i}.png")).collect()
    }

    fn counts(deck: &[Card]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for card in deck {
            *counts.entry(card.src.as_str()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_deal_default_limit_gives_24_paired_cards() {
        let pool = faces(20);
        let deck = deal(&pool, &DeckConfig::default()).unwrap();

        assert_eq!(deck.len(), 24);
        let counts = counts(&deck);
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&n| n == 2), "every face exactly twice");

        let ids: HashSet<u32> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 24, "ids must be unique");
    }

    #[test]
    fn test_deal_ids_are_sequential_from_first_id() {
        let config = DeckConfig {
            limit: 3,
            first_id: 1,
        };
        let deck = deal(&faces(3), &config).unwrap();
        let ids: Vec<u32> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_deal_zero_based_ids() {
        let config = DeckConfig {
            limit: 2,
            first_id: 0,
        };
        let deck = deal(&faces(2), &config).unwrap();
        let ids: Vec<u32> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_deal_cards_start_unmatched() {
        let deck = deal(&faces(12), &DeckConfig::default()).unwrap();
        assert!(deck.iter().all(|c| !c.matched));
    }

    #[test]
    fn test_deal_does_not_mutate_pool() {
        let pool = faces(15);
        let copy = pool.clone();
        let _ = deal(&pool, &DeckConfig::default()).unwrap();
        assert_eq!(pool, copy);
    }

    #[test]
    fn test_deal_exact_pool_uses_every_face() {
        let pool = faces(12);
        let deck = deal(&pool, &DeckConfig::default()).unwrap();
        let counts = counts(&deck);
        for face in &pool {
            assert_eq!(counts.get(face.as_str()), Some(&2));
        }
    }

    #[test]
    fn test_deal_not_enough_faces() {
        let result = deal(&faces(5), &DeckConfig::default());
        assert!(matches!(
            result,
            Err(DeckError::NotEnoughFaces {
                available: 5,
                required: 12
            })
        ));
    }

    #[test]
    fn test_deal_duplicate_pool_entries_count_once() {
        let mut pool = faces(2);
        pool.push(pool[0].clone());
        let config = DeckConfig {
            limit: 3,
            first_id: 1,
        };
        let result = deal(&pool, &config);
        assert!(matches!(
            result,
            Err(DeckError::NotEnoughFaces { available: 2, .. })
        ));
    }

    #[test]
    fn test_deal_zero_limit_is_error() {
        let config = DeckConfig {
            limit: 0,
            first_id: 1,
        };
        assert!(matches!(deal(&faces(3), &config), Err(DeckError::EmptyDeck)));
    }

    #[test]
    fn test_deal_last_id_may_be_u32_max() {
        let config = DeckConfig {
            limit: 12,
            first_id: u32::MAX - 23,
        };
        let deck = deal(&faces(12), &config).unwrap();
        assert_eq!(deck.len(), 24);
        assert_eq!(deck.iter().map(|c| c.id).max(), Some(u32::MAX));
        assert_eq!(deck.iter().map(|c| c.id).min(), Some(u32::MAX - 23));
    }

    #[test]
    fn test_deal_ids_past_u32_max_is_error() {
        let config = DeckConfig {
            limit: 12,
            first_id: u32::MAX - 22,
        };
        assert!(matches!(
            deal(&faces(12), &config),
            Err(DeckError::IdOverflow { cards: 24, .. })
        ));
    }

    #[test]
    fn test_card_ids_span_whole_deck() {
        let config = DeckConfig {
            limit: 3,
            first_id: 10,
        };
        assert_eq!(config.deck_size(), 6);
        assert_eq!(config.card_ids(), Some(10..=15));

        let empty = DeckConfig {
            limit: 0,
            first_id: 1,
        };
        assert_eq!(empty.card_ids(), None);

        let huge = DeckConfig {
            limit: usize::MAX,
            first_id: 0,
        };
        assert_eq!(huge.card_ids(), None);
    }

    #[test]
    fn test_deal_with_same_seed_is_reproducible() {
        let pool = faces(30);
        let config = DeckConfig::default();
        let a = deal_with_rng(&pool, &config, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = deal_with_rng(&pool, &config, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deal_picks_different_subsets_across_seeds() {
        let pool = faces(30);
        let config = DeckConfig::default();
        let subsets: HashSet<Vec<String>> = (0..8)
            .map(|seed| {
                let deck =
                    deal_with_rng(&pool, &config, &mut StdRng::seed_from_u64(seed))
                        .unwrap();
                let mut srcs: Vec<String> = deck.into_iter().map(|c| c.src).collect();
                srcs.sort();
                srcs.dedup();
                srcs
            })
            .collect();
        assert!(subsets.len() > 1, "face selection should vary");
    }
}
