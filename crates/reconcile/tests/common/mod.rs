#![allow(dead_code)]

use bus::HostEvent;
use classify::{Classifier, ClassifierConfig};
use core_types::Millis;
use dom::NodeKey;
use host_test_support::LoungeHost;
use reconcile::{Coordinator, EngineConfig, HostSchema, LoungeDirectory};
use std::rc::Rc;

/// A scripted page plus one engine instance driven tick by tick.
pub struct Harness {
    pub host: LoungeHost,
    pub engine: Coordinator,
    pub directory: LoungeDirectory,
    pub now: u64,
}

impl Harness {
    pub fn new(host: LoungeHost) -> Self {
        Self::with(host, default_classifier(), EngineConfig::default())
    }

    pub fn with(mut host: LoungeHost, classifier: Classifier, config: EngineConfig) -> Self {
        let engine = Coordinator::new(&mut host.doc, Rc::new(classifier), config);
        let directory = LoungeDirectory::new(HostSchema::THELOUNGE, Some(host.users.clone()));
        Self {
            host,
            engine,
            directory,
            now: 0,
        }
    }

    pub fn send(&mut self, event: HostEvent) {
        self.engine.handle(&mut self.host.doc, &mut self.directory, event);
    }

    /// Advance the clock by `ms` and run one scheduling turn.
    pub fn tick(&mut self, ms: u64) {
        self.now += ms;
        self.send(HostEvent::Tick {
            now: Millis(self.now),
        });
    }

    pub fn visible(&mut self, row: NodeKey, visible: bool) {
        self.send(HostEvent::Visibility { row, visible });
    }
}

pub fn default_classifier() -> Classifier {
    Classifier::from_config(&ClassifierConfig::default()).expect("default classifier config is valid")
}
