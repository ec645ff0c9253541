//! Error types for deck generation.

use std::path::PathBuf;

/// Errors that can occur while collecting faces or dealing a deck.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The pool has fewer distinct faces than one deck needs.
    #[error("not enough card faces: {available} available, {required} required")]
    NotEnoughFaces { available: usize, required: usize },

    /// A deck of zero pairs was requested.
    #[error("deck limit must be at least 1")]
    EmptyDeck,

    /// Numbering the deck from `first_id` would run past `u32::MAX`.
    #[error("{cards} card ids starting at {first_id} do not fit in u32")]
    IdOverflow { first_id: u32, cards: usize },

    /// The face directory could not be read.
    #[error("cannot read card directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
