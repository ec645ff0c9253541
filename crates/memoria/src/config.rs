//! Process configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `MEMORIA_BIND` | `0.0.0.0:$PORT` |
//! | `PORT` | `3001` |
//! | `MEMORIA_ALLOWED_ORIGIN` | `http://localhost:3000` (`*` = any) |
//! | `MEMORIA_ROOMS` | the nine default room names, comma-separated |
//! | `MEMORIA_FACE_SOURCE` | `directory` (or `fixed`) |
//! | `MEMORIA_CARD_DIR` | `build/img` |
//! | `MEMORIA_CARD_URL_PREFIX` | `/img` |
//! | `MEMORIA_DECK_LIMIT` | `12` |
//! | `MEMORIA_CARD_ID_BASE` | `1` |

use std::path::PathBuf;
use std::str::FromStr;

use memoria_deck::{DeckConfig, DirectoryPool, FaceSource, FixedPool, LEGACY_FACES};
use memoria_room::default_room_names;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_CARD_DIR: &str = "build/img";
const DEFAULT_CARD_URL_PREFIX: &str = "/img";

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Which [`FaceSource`] to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSourceKind {
    /// Scan the card directory on every deal.
    Directory,
    /// The built-in six-face list.
    Fixed,
}

impl FromStr for FaceSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" => Ok(Self::Directory),
            "fixed" | "legacy" => Ok(Self::Fixed),
            other => Err(ConfigError::Invalid {
                var: "MEMORIA_FACE_SOURCE",
                reason: format!("expected `directory` or `fixed`, got `{other}`"),
            }),
        }
    }
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `None` disables the origin check.
    pub allowed_origin: Option<String>,
    pub rooms: Vec<String>,
    pub face_source: FaceSourceKind,
    pub card_dir: PathBuf,
    pub card_url_prefix: String,
    pub deck: DeckConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            allowed_origin: Some(DEFAULT_ALLOWED_ORIGIN.to_string()),
            rooms: default_room_names(),
            face_source: FaceSourceKind::Directory,
            card_dir: PathBuf::from(DEFAULT_CARD_DIR),
            card_url_prefix: DEFAULT_CARD_URL_PREFIX.to_string(),
            deck: DeckConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for unparsable or inconsistent
    /// values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value. Unset and empty variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("MEMORIA_BIND") {
            config.bind_addr = bind.trim().to_string();
        } else if let Some(port) = get("PORT") {
            let port: u16 = parse("PORT", &port)?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(origin) = get("MEMORIA_ALLOWED_ORIGIN") {
            let origin = origin.trim();
            config.allowed_origin = (origin != "*").then(|| origin.to_string());
        }

        if let Some(rooms) = lookup("MEMORIA_ROOMS") {
            config.rooms = rooms.split(',').map(|name| name.trim().to_string()).collect();
        }

        if let Some(source) = get("MEMORIA_FACE_SOURCE") {
            config.face_source = source.parse()?;
        }
        if let Some(dir) = get("MEMORIA_CARD_DIR") {
            config.card_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("MEMORIA_CARD_URL_PREFIX") {
            config.card_url_prefix = prefix.trim().to_string();
        }
        if let Some(limit) = get("MEMORIA_DECK_LIMIT") {
            config.deck.limit = parse("MEMORIA_DECK_LIMIT", &limit)?;
        }
        if let Some(base) = get("MEMORIA_CARD_ID_BASE") {
            config.deck.first_id = parse("MEMORIA_CARD_ID_BASE", &base)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the values against each other.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.is_empty() || self.rooms.iter().any(|name| name.is_empty()) {
            return Err(ConfigError::Invalid {
                var: "MEMORIA_ROOMS",
                reason: "room names must be non-empty".into(),
            });
        }
        if self.deck.limit == 0 {
            return Err(ConfigError::Invalid {
                var: "MEMORIA_DECK_LIMIT",
                reason: "must be at least 1".into(),
            });
        }
        if self.deck.card_ids().is_none() {
            return Err(ConfigError::Invalid {
                var: "MEMORIA_CARD_ID_BASE",
                reason: format!(
                    "{} cards numbered from {} overflow u32",
                    self.deck.deck_size(),
                    self.deck.first_id
                ),
            });
        }
        if self.face_source == FaceSourceKind::Fixed && self.deck.limit > LEGACY_FACES.len() {
            return Err(ConfigError::Invalid {
                var: "MEMORIA_DECK_LIMIT",
                reason: format!(
                    "the fixed face source has only {} faces",
                    LEGACY_FACES.len()
                ),
            });
        }
        Ok(())
    }

    /// Builds the configured face pool.
    pub fn face_source(&self) -> FaceSource {
        match self.face_source {
            FaceSourceKind::Directory => FaceSource::Directory(DirectoryPool::new(
                &self.card_dir,
                &self.card_url_prefix,
            )),
            FaceSourceKind::Fixed => FaceSource::Fixed(FixedPool::legacy()),
        }
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("`{}`: {e}", value.trim()),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_empty_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.allowed_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.rooms.len(), 9);
        assert_eq!(config.deck.limit, 12);
        assert_eq!(config.deck.first_id, 1);
    }

    #[test]
    fn test_port_sets_bind_addr() {
        let config = config_from(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_bind_overrides_port() {
        let config =
            config_from(&[("PORT", "8080"), ("MEMORIA_BIND", "127.0.0.1:9000")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn test_wildcard_origin_disables_check() {
        let config = config_from(&[("MEMORIA_ALLOWED_ORIGIN", "*")]).unwrap();
        assert_eq!(config.allowed_origin, None);
    }

    #[test]
    fn test_rooms_are_split_and_trimmed() {
        let config = config_from(&[("MEMORIA_ROOMS", "Alpha, Beta ,Gamma")]).unwrap();
        assert_eq!(config.rooms, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_blank_room_name_is_rejected() {
        let err = config_from(&[("MEMORIA_ROOMS", "Alpha,,Gamma")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_ROOMS", .. }));

        let err = config_from(&[("MEMORIA_ROOMS", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_ROOMS", .. }));
    }

    #[test]
    fn test_face_source_parsing() {
        assert_eq!("fixed".parse::<FaceSourceKind>().unwrap(), FaceSourceKind::Fixed);
        assert_eq!(
            " Directory ".parse::<FaceSourceKind>().unwrap(),
            FaceSourceKind::Directory
        );
        assert!("s3".parse::<FaceSourceKind>().is_err());
    }

    #[test]
    fn test_zero_deck_limit_is_rejected() {
        let err = config_from(&[("MEMORIA_DECK_LIMIT", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_DECK_LIMIT", .. }));
    }

    #[test]
    fn test_card_id_base_must_leave_room_for_the_deck() {
        let err = config_from(&[("MEMORIA_CARD_ID_BASE", "4294967295")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_CARD_ID_BASE", .. }));

        // 24 cards from u32::MAX - 23 end exactly at u32::MAX.
        let config = config_from(&[("MEMORIA_CARD_ID_BASE", "4294967272")]).unwrap();
        assert_eq!(config.deck.card_ids(), Some(u32::MAX - 23..=u32::MAX));

        let err = config_from(&[
            ("MEMORIA_CARD_ID_BASE", "4294967272"),
            ("MEMORIA_DECK_LIMIT", "13"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_CARD_ID_BASE", .. }));
    }

    #[test]
    fn test_fixed_source_caps_deck_limit() {
        let err = config_from(&[("MEMORIA_FACE_SOURCE", "fixed")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MEMORIA_DECK_LIMIT", .. }));

        let config = config_from(&[
            ("MEMORIA_FACE_SOURCE", "fixed"),
            ("MEMORIA_DECK_LIMIT", "6"),
            ("MEMORIA_CARD_ID_BASE", "0"),
        ])
        .unwrap();
        assert_eq!(config.deck, DeckConfig { limit: 6, first_id: 0 });
        assert!(matches!(config.face_source(), FaceSource::Fixed(_)));
    }

    #[test]
    fn test_directory_source_uses_card_dir() {
        let config = config_from(&[
            ("MEMORIA_CARD_DIR", "/srv/cards"),
            ("MEMORIA_CARD_URL_PREFIX", "/static/cards"),
        ])
        .unwrap();
        match config.face_source() {
            FaceSource::Directory(pool) => {
                assert_eq!(pool.dir(), std::path::Path::new("/srv/cards"));
            }
            other => panic!("expected directory pool, got {other:?}"),
        }
    }
}
