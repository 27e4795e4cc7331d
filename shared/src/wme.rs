/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use serde::{Deserialize, Serialize};

use crate::terms::Value;

/// A working-memory element: an immutable fact triple. Identifier and
/// attribute are interned symbols; the value is any comparable datum.
/// Equality and hashing are by triple contents.
#[derive(PartialEq, Debug, Clone, Eq, Hash, Serialize, Deserialize)]
pub struct Wme {
    pub identifier: u32,
    pub attribute: u32,
    pub value: Value,
}

impl Wme {
    pub fn new(identifier: u32, attribute: u32, value: Value) -> Self {
        Wme {
            identifier,
            attribute,
            value,
        }
    }

    /// Field access by position: 0 identifier, 1 attribute, 2 value.
    /// Symbol slots come back wrapped so all three compare uniformly.
    pub fn field(&self, index: usize) -> Value {
        match index {
            0 => Value::Symbol(self.identifier),
            1 => Value::Symbol(self.attribute),
            _ => self.value.clone(),
        }
    }
}
