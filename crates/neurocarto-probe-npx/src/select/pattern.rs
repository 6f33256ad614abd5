// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Density patterns shared by the selectors.

Each density category describes the neighborhood of a chosen electrode as a
list of `(column, row)` offsets with a [`Role`]. The selectors interpret the
roles with their own acceptance policy: the default selector places and
invalidates, the weaker selector raises and lowers scores.

```text
  full         half          quarter
  . s .        t b t         . b .         p  pair
  p e p        b e b         b b b         s  sweep
  . s .        t b t         b e b         t  step
                             b b b         b  block
                             t b t   (t at column +-1, row +-2)
```
*/

use crate::blueprint::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Same-row partner that joins the chosen electrode.
    Pair,
    /// Row continuation of a contiguous full-density block.
    Sweep,
    /// Next site of a sparse lattice.
    Step,
    /// Site that must stay empty.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub column: i32,
    pub row: i32,
    pub role: Role,
}

const fn n(column: i32, row: i32, role: Role) -> Neighbor {
    Neighbor { column, row, role }
}

const FULL: &[Neighbor] = &[
    n(1, 0, Role::Pair),
    n(-1, 0, Role::Pair),
    n(0, 1, Role::Sweep),
    n(0, -1, Role::Sweep),
];

const HALF: &[Neighbor] = &[
    n(1, 0, Role::Block),
    n(-1, 0, Role::Block),
    n(0, 1, Role::Block),
    n(0, -1, Role::Block),
    n(1, 1, Role::Step),
    n(1, -1, Role::Step),
    n(-1, 1, Role::Step),
    n(-1, -1, Role::Step),
];

const QUARTER: &[Neighbor] = &[
    n(1, 0, Role::Block),
    n(-1, 0, Role::Block),
    n(0, 1, Role::Block),
    n(0, -1, Role::Block),
    n(1, 1, Role::Block),
    n(1, -1, Role::Block),
    n(-1, 1, Role::Block),
    n(-1, -1, Role::Block),
    n(0, 2, Role::Block),
    n(0, -2, Role::Block),
    n(1, 2, Role::Step),
    n(1, -2, Role::Step),
    n(-1, 2, Role::Step),
    n(-1, -2, Role::Step),
];

/// Neighborhood of `category`; empty for non-density categories.
pub fn density_pattern(category: Category) -> &'static [Neighbor] {
    match category {
        Category::Full => FULL,
        Category::Half => HALF,
        Category::Quarter => QUARTER,
        _ => &[],
    }
}
