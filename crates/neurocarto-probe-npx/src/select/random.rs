// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Uniform random selector, mainly a baseline for the other selectors.
//!
//! Options:
//! - `ignore_preselected` (`0`/`1`): treat pre-selected electrodes as ordinary candidates
//! - `ignore_exclude` (`0`/`1`): allow excluded electrodes to be picked

use std::collections::BTreeMap;

use rand::RngCore;
use tracing::debug;

use super::toolkit::{SelectionToolkit, CATE_INVALIDED};
use super::{ensure_supported, format_flag, parse_flag, ElectrodeSelector};
use crate::blueprint::{Blueprint, CATE_EXCLUDED, CATE_SET};
use crate::channelmap::ChannelMap;
use crate::error::NpxResult;

pub const OPTION_IGNORE_PRESELECTED: &str = "ignore_preselected";
pub const OPTION_IGNORE_EXCLUDE: &str = "ignore_exclude";

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector {
    pub ignore_preselected: bool,
    pub ignore_exclude: bool,
}

impl RandomSelector {
    pub const NAME: &'static str = "random";
}

impl ElectrodeSelector for RandomSelector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn options(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (OPTION_IGNORE_PRESELECTED.to_string(), format_flag(self.ignore_preselected)),
            (OPTION_IGNORE_EXCLUDE.to_string(), format_flag(self.ignore_exclude)),
        ])
    }

    fn set_option(&mut self, name: &str, value: &str) -> NpxResult<()> {
        match name {
            OPTION_IGNORE_PRESELECTED => self.ignore_preselected = parse_flag(name, value)?,
            OPTION_IGNORE_EXCLUDE => self.ignore_exclude = parse_flag(name, value)?,
            _ => {}
        }
        Ok(())
    }

    fn select(&self, blueprint: &dyn Blueprint, rng: &mut dyn RngCore) -> NpxResult<ChannelMap> {
        ensure_supported(self, blueprint.probe_type())?;

        let mut tool = SelectionToolkit::new(blueprint);
        let mut chmap = ChannelMap::new(blueprint.probe_type());

        if !self.ignore_preselected {
            for i in tool.indices(CATE_SET) {
                tool.place(&mut chmap, i)?;
            }
        }

        let ignore_exclude = self.ignore_exclude;
        while tool.count_invalided() < tool.len() {
            let candidates = tool.indices_where(|c| {
                c != CATE_INVALIDED && (ignore_exclude || c != CATE_EXCLUDED)
            });
            let Some(i) = SelectionToolkit::pick(&candidates, rng) else {
                break;
            };
            tool.place(&mut chmap, i)?;
        }

        debug!(
            "[SELECT-RANDOM] finished with {}/{} channels",
            chmap.size(),
            chmap.capacity()
        );
        Ok(chmap)
    }
}
