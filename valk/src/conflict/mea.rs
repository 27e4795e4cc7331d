/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::conflict::lex::compare_recency;
use crate::conflict::{select_first_max, Activation, ConflictResolutionStrategy};

/// Means-ends analysis: the recency of the fact matched by the rule's
/// first condition (the goal anchor) has absolute priority; the
/// remaining positions break ties the recency way, then depth, then
/// agenda order.
#[derive(Debug, Default)]
pub struct MeaStrategy;

fn beyond_anchor(activation: &Activation) -> Vec<u64> {
    let mut rest = activation.recency.clone();
    if let Some(position) = rest
        .iter()
        .position(|&timestamp| timestamp == activation.first_timestamp)
    {
        rest.remove(position);
    }
    rest
}

impl ConflictResolutionStrategy for MeaStrategy {
    fn select(&mut self, agenda: &[Activation]) -> Option<usize> {
        select_first_max(agenda, |a, b| {
            a.first_timestamp
                .cmp(&b.first_timestamp)
                .then_with(|| compare_recency(&beyond_anchor(a), &beyond_anchor(b)))
                .then(a.depth.cmp(&b.depth))
        })
    }
}
