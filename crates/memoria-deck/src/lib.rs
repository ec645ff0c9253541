//! Card decks for Memoria.
//!
//! A deck is `limit` randomly chosen card faces, each present twice,
//! shuffled and numbered. Where the faces come from is a [`FacePool`]:
//!
//! - [`DirectoryPool`]: scans an image directory at deal time
//! - [`FixedPool`]: a fixed list (the legacy six-face set)
//!
//! [`FaceSource`] picks one of the two at runtime.

#![allow(async_fn_in_trait)]

mod deal;
mod error;
mod pool;

pub use deal::{DeckConfig, deal, deal_with_rng};
pub use error::DeckError;
pub use pool::{DirectoryPool, FacePool, FaceSource, FixedPool, LEGACY_FACES};
