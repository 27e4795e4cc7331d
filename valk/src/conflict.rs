/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
pub mod default;
pub mod gbb;
pub mod lex;
pub mod mea;

use std::cmp::Ordering;

use crate::rete::{ProductionNodeId, TokenId};

/// One entry of the conflict set: a complete match of one production.
/// Carries everything a strategy may rank on, so strategies never touch
/// network internals.
#[derive(Debug, Clone)]
pub struct Activation {
    pub production: ProductionNodeId,
    pub name: String,
    pub token: TokenId,
    /// Number of conditions matched (token depth).
    pub depth: usize,
    /// Contributing fact timestamps, most recent first.
    pub recency: Vec<u64>,
    /// Timestamp of the fact matched by the rule's first condition.
    pub first_timestamp: u64,
}

/// Policy choosing which matched rule fires each cycle.
pub trait ConflictResolutionStrategy {
    /// Pick one agenda entry by index; `None` only on an empty agenda.
    fn select(&mut self, agenda: &[Activation]) -> Option<usize>;

    /// Reinforcement hook; strategies without learning ignore it.
    fn provide_feedback(&mut self, _production: &str, _success: f64) {}
}

/// Scan for the maximum under `better`, keeping the earliest of equals
/// so agenda insertion order breaks remaining ties.
pub(crate) fn select_first_max(
    agenda: &[Activation],
    better: impl Fn(&Activation, &Activation) -> Ordering,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, activation) in agenda.iter().enumerate() {
        match best {
            Some(current) if better(activation, &agenda[current]) != Ordering::Greater => {}
            _ => best = Some(index),
        }
    }
    best
}
