//! Typed, layered configuration: a checked-in default
//! TOML (`default.toml`, next to this crate's `Cargo.toml`) overridden by
//! `GT__SECTION__KEY`-style environment variables, deserialized once and
//! exposed through a [`get_config_element`] accessor backed by a
//! `lazy_static` global, the same shape the reference workspace's
//! `util::config` module uses.

use crate::error::{Error, Result};
use config::Config;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::RwLock;

#[derive(Debug, Clone, Deserialize)]
pub struct Web {
    pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub default_resolution: usize,
    pub default_color_ramp: String,
    pub worker_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub catalog: Catalog,
    pub pipeline: Pipeline,
}

lazy_static::lazy_static! {
    static ref SETTINGS: RwLock<Settings> =
        RwLock::new(load_settings().expect("default.toml must parse into Settings"));
}

fn load_settings() -> Result<Settings, config::ConfigError> {
    let config = Config::builder()
        .add_source(config::File::with_name(concat!(env!("CARGO_MANIFEST_DIR"), "/default.toml")))
        .add_source(config::Environment::with_prefix("GT").separator("__"))
        .build()?;
    config.try_deserialize()
}

/// Returns a clone of one top-level configuration section, e.g.
/// `get_config_element::<Web>()`.
///
/// # Errors
/// Fails if the global settings lock is poisoned (a prior panic while a
/// writer held it) or the section fails to re-deserialize.
pub fn get_config_element<T>() -> Result<T>
where
    T: TryFrom<Settings> + 'static,
{
    let settings = SETTINGS
        .read()
        .map_err(|_| Error::Internal {
            reason: "settings lock poisoned".to_string(),
        })?
        .clone();
    T::try_from(settings).map_err(|_| Error::Internal {
        reason: "could not extract configuration section".to_string(),
    })
}

impl TryFrom<Settings> for Web {
    type Error = ();
    fn try_from(settings: Settings) -> std::result::Result<Self, Self::Error> {
        Ok(settings.web)
    }
}

impl TryFrom<Settings> for Catalog {
    type Error = ();
    fn try_from(settings: Settings) -> std::result::Result<Self, Self::Error> {
        Ok(settings.catalog)
    }
}

impl TryFrom<Settings> for Pipeline {
    type Error = ();
    fn try_from(settings: Settings) -> std::result::Result<Self, Self::Error> {
        Ok(settings.pipeline)
    }
}
