/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::conflict::{select_first_max, Activation, ConflictResolutionStrategy};

/// Fires the most specific match: the deepest token wins, earlier agenda
/// entries win ties.
#[derive(Debug, Default)]
pub struct DefaultStrategy;

impl ConflictResolutionStrategy for DefaultStrategy {
    fn select(&mut self, agenda: &[Activation]) -> Option<usize> {
        select_first_max(agenda, |a, b| a.depth.cmp(&b.depth))
    }
}
