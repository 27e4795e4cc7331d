/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors surfaced by the embedding API.
#[derive(Debug, Error)]
pub enum ValkError {
    #[error("syntax error in rule conditions: {0}")]
    Parse(String),

    #[error("production {0} has no conditions")]
    EmptyProduction(String),
}
