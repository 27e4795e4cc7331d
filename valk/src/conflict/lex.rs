/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Ordering;

use crate::conflict::{select_first_max, Activation, ConflictResolutionStrategy};

/// Recency order: the descending timestamp sequences of the candidate
/// matches are compared lexicographically, so the match built on the
/// most recently asserted facts wins. Ties fall back to token depth,
/// then agenda order.
#[derive(Debug, Default)]
pub struct LexStrategy;

pub(crate) fn compare_recency(a: &[u64], b: &[u64]) -> Ordering {
    // Lexicographic; a longer sequence beats its own prefix
    a.iter().cmp(b.iter())
}

impl ConflictResolutionStrategy for LexStrategy {
    fn select(&mut self, agenda: &[Activation]) -> Option<usize> {
        select_first_max(agenda, |a, b| {
            compare_recency(&a.recency, &b.recency).then(a.depth.cmp(&b.depth))
        })
    }
}
