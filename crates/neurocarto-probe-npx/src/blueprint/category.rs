// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Electrode category and state codes.
//!
//! Codes are plain integers so that blueprint tables round-trip through
//! external files unchanged. [`Category`] is the typed view used by the
//! selection algorithms; codes outside it are carried but never selected.

use serde::{Deserialize, Serialize};

pub const STATE_UNUSED: i32 = 0;
pub const STATE_USED: i32 = 1;
pub const STATE_DISABLED: i32 = 2;

pub const CATE_UNSET: i32 = 0;
/// Pre-selected; must appear in every selection result.
pub const CATE_SET: i32 = 1;
pub const CATE_EXCLUDED: i32 = 2;
pub const CATE_LOW: i32 = 3;
pub const CATE_FULL: i32 = 11;
pub const CATE_HALF: i32 = 12;
pub const CATE_QUARTER: i32 = 13;

/// Typed electrode category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Unset,
    /// Pre-selected
    Set,
    Excluded,
    Low,
    Full,
    Half,
    Quarter,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Unset,
        Category::Set,
        Category::Excluded,
        Category::Low,
        Category::Full,
        Category::Half,
        Category::Quarter,
    ];

    pub const fn code(self) -> i32 {
        match self {
            Category::Unset => CATE_UNSET,
            Category::Set => CATE_SET,
            Category::Excluded => CATE_EXCLUDED,
            Category::Low => CATE_LOW,
            Category::Full => CATE_FULL,
            Category::Half => CATE_HALF,
            Category::Quarter => CATE_QUARTER,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            CATE_UNSET => Some(Category::Unset),
            CATE_SET => Some(Category::Set),
            CATE_EXCLUDED => Some(Category::Excluded),
            CATE_LOW => Some(Category::Low),
            CATE_FULL => Some(Category::Full),
            CATE_HALF => Some(Category::Half),
            CATE_QUARTER => Some(Category::Quarter),
            _ => None,
        }
    }

    /// Density categories carry a spatial pattern.
    pub const fn is_density(self) -> bool {
        matches!(self, Category::Full | Category::Half | Category::Quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<i32> = Category::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 11, 12, 13]);
        for c in Category::ALL {
            assert_eq!(Category::from_code(c.code()), Some(c));
        }
        assert_eq!(Category::from_code(4), None);
        assert_eq!(Category::from_code(i32::MAX), None);
    }
}
