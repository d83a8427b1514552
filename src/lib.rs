//! # shoutbox
//!
//! Rewrites chat-bridge relay lines in a TheLounge page so they read as if
//! the bridged user had sent them.
//!
//! A [`Session`] ties one page's [`Document`] to one reconciliation engine:
//! the host publishes [`HostEvent`]s through [`Session::sender`] and calls
//! [`Session::run`] from its own loop.
//!
//! ```toml
//! [classifier]
//! matchers = ["Chatbot", { pattern = ".+?-web" }]
//! metadata = "SB"
//!
//! [classifier.rank]
//! force_abbreviate = true
//!
//! [engine]
//! remove_join_quit = true
//! decorator_left = "["
//! decorator_right = "]"
//! ```

use bus::{Bus, HostEvent};
use classify::{Classifier, ClassifierConfig, ClassifierError};
use core_types::SharedUserList;
use dom::Document;
use reconcile::{Coordinator, EngineConfig, HostSchema, LoungeDirectory};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Everything user-tunable. Missing keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Parse and validate. Bot matcher patterns are compiled here so a bad
    /// pattern is reported at load time.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.build_classifier()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!(target: "shoutbox", "loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn build_classifier(&self) -> Result<Classifier, ClassifierError> {
        Classifier::from_config(&self.classifier)
    }
}

/// One page, one engine.
pub struct Session {
    bus: Bus,
    coordinator: Coordinator,
    directory: LoungeDirectory,
}

impl Session {
    /// Start observing `doc`. `users` is the active channel's user list,
    /// when the host has one.
    pub fn new(doc: &mut Document, config: &Config, users: Option<SharedUserList>) -> Result<Self, ConfigError> {
        let classifier = Rc::new(config.build_classifier()?);
        let schema = HostSchema::THELOUNGE;
        Ok(Self {
            bus: Bus::new(),
            coordinator: Coordinator::with_schema(doc, classifier, config.engine.clone(), schema),
            directory: LoungeDirectory::new(schema, users),
        })
    }

    pub fn sender(&self) -> Sender<HostEvent> {
        self.bus.sender()
    }

    /// Point autocomplete at another channel's user list.
    pub fn set_users(&mut self, users: Option<SharedUserList>) {
        self.directory.set_users(users);
    }

    /// Handle every event published since the last call. Returns how many.
    pub fn run(&mut self, doc: &mut Document) -> usize {
        let events = self.bus.drain();
        let count = events.len();
        for event in events {
            self.coordinator.handle(doc, &mut self.directory, event);
        }
        count
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}
