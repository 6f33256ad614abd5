// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Name-based selector lookup.

use std::collections::BTreeMap;

use rand::RngCore;
use tracing::debug;

use super::{ensure_supported, DefaultSelector, ElectrodeSelector, RandomSelector, WeakerSelector};
use crate::blueprint::Blueprint;
use crate::channelmap::ChannelMap;
use crate::error::{NpxError, NpxResult};

/// Constructor for a fresh selector instance with default options.
pub type SelectorFactory = fn() -> Box<dyn ElectrodeSelector>;

/// Selectors keyed by their unique name.
#[derive(Clone)]
pub struct SelectorRegistry {
    factories: BTreeMap<String, SelectorFactory>,
}

impl SelectorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding `default`, `weaker` and `random`.
    pub fn with_defaults() -> Self {
        let mut ret = Self::new();
        ret.register(DefaultSelector::NAME, new_default);
        ret.register(WeakerSelector::NAME, new_weaker);
        ret.register(RandomSelector::NAME, new_random);
        ret
    }

    /// Register `factory` under `name`, returning the factory it replaced.
    pub fn register(&mut self, name: impl Into<String>, factory: SelectorFactory) -> Option<SelectorFactory> {
        self.factories.insert(name.into(), factory)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn new_selector(&self, name: &str) -> NpxResult<Box<dyn ElectrodeSelector>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| NpxError::UnknownSelector(name.to_string()))
    }

    /// Look up `name`, apply `options` and run it on `blueprint`.
    pub fn select_with_options(
        &self,
        name: &str,
        options: &BTreeMap<String, String>,
        blueprint: &dyn Blueprint,
        rng: &mut dyn RngCore,
    ) -> NpxResult<ChannelMap> {
        let mut selector = self.new_selector(name)?;
        ensure_supported(selector.as_ref(), blueprint.probe_type())?;
        for (key, value) in options {
            selector.set_option(key, value)?;
        }
        debug!(
            "[SELECT] running '{}' on {} with {:?}",
            name,
            blueprint.probe_type(),
            selector.options()
        );
        selector.select(blueprint, rng)
    }

    pub fn select(&self, name: &str, blueprint: &dyn Blueprint, rng: &mut dyn RngCore) -> NpxResult<ChannelMap> {
        self.select_with_options(name, &BTreeMap::new(), blueprint, rng)
    }
}

fn new_default() -> Box<dyn ElectrodeSelector> {
    Box::new(DefaultSelector)
}

fn new_weaker() -> Box<dyn ElectrodeSelector> {
    Box::new(WeakerSelector)
}

fn new_random() -> Box<dyn ElectrodeSelector> {
    Box::new(RandomSelector::default())
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
