// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Free-form acquisition metadata attached to a channel map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const KEY_SERIAL_NUMBER: &str = "imDatPrb_sn";
const KEY_IMRO_TABLE: &str = "~imroTbl";

/// Key/value metadata as recorded by the acquisition software.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpxMeta {
    entries: BTreeMap<String, String>,
}

impl NpxMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Probe serial number.
    pub fn serial_number(&self) -> Option<&str> {
        self.get(KEY_SERIAL_NUMBER)
    }

    /// Raw IMRO table the recording was made with.
    pub fn imro_table(&self) -> Option<&str> {
        self.get(KEY_IMRO_TABLE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NpxMeta {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
