//! Where card faces come from.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::DeckError;

/// File extensions treated as card faces (compared case-insensitively).
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// The six faces the first release shipped with, under `/img`.
pub const LEGACY_FACES: [&str; 6] = [
    "/img/helmet-1.png",
    "/img/potion-1.png",
    "/img/ring-1.png",
    "/img/scroll-1.png",
    "/img/shield-1.png",
    "/img/sword-1.png",
];

/// Supplies the face references a deck is dealt from.
///
/// Called once per `newGame` request, outside the session coordinator,
/// so implementations are free to do I/O.
pub trait FacePool: Send + Sync + 'static {
    /// Returns every available face reference.
    fn faces(&self) -> impl Future<Output = Result<Vec<String>, DeckError>> + Send;
}

// ---------------------------------------------------------------------------
// DirectoryPool
// ---------------------------------------------------------------------------

/// Serves every image file found in a directory.
///
/// The directory is rescanned on each call, so faces can be added or
/// removed while the server runs. A file `helmet.png` in `dir` becomes
/// `"{url_prefix}/helmet.png"`. Results are sorted by name.
#[derive(Debug, Clone)]
pub struct DirectoryPool {
    dir: PathBuf,
    url_prefix: String,
}

impl DirectoryPool {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

impl FacePool for DirectoryPool {
    async fn faces(&self) -> Result<Vec<String>, DeckError> {
        let io_err = |source| DeckError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        let prefix = self.url_prefix.trim_end_matches('/');
        let mut faces = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if !is_image(&path) {
                continue;
            }
            match entry.file_type().await {
                Ok(kind) if kind.is_file() => {}
                _ => continue,
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::debug!(?path, "skipping face with non-UTF-8 name");
                continue;
            };
            faces.push(format!("{prefix}/{name}"));
        }

        faces.sort();
        tracing::debug!(dir = %self.dir.display(), faces = faces.len(), "scanned card faces");
        Ok(faces)
    }
}

// ---------------------------------------------------------------------------
// FixedPool
// ---------------------------------------------------------------------------

/// Serves a fixed list of faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPool {
    faces: Vec<String>,
}

impl FixedPool {
    pub fn new<I, S>(faces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            faces: faces.into_iter().map(Into::into).collect(),
        }
    }

    /// The six-face set of the first release.
    pub fn legacy() -> Self {
        Self::new(LEGACY_FACES)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FacePool for FixedPool {
    async fn faces(&self) -> Result<Vec<String>, DeckError> {
        Ok(self.faces.clone())
    }
}

// ---------------------------------------------------------------------------
// FaceSource
// ---------------------------------------------------------------------------

/// A pool chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum FaceSource {
    Directory(DirectoryPool),
    Fixed(FixedPool),
}

impl FacePool for FaceSource {
    async fn faces(&self) -> Result<Vec<String>, DeckError> {
        match self {
            Self::Directory(pool) => pool.faces().await,
            Self::Fixed(pool) => pool.faces().await,
        }
    }
}
