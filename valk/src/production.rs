/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use shared::rule::Condition;
use shared::terms::{Term, Value};
use shared::wme::Wme;

use crate::engine::InferenceEngine;

/// Variable name (without the `?` marker) to bound datum.
pub type Bindings = HashMap<String, Value>;

/// An opaque callable supplied by the embedder. It receives the variable
/// bindings of the fired match and the engine, which it may mutate.
#[derive(Clone)]
pub struct Action(Arc<dyn Fn(&Bindings, &mut InferenceEngine)>);

impl Action {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Bindings, &mut InferenceEngine) + 'static,
    {
        Action(Arc::new(f))
    }

    pub fn call(&self, bindings: &Bindings, engine: &mut InferenceEngine) {
        (self.0)(bindings, engine)
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action(<function>)")
    }
}

/// A production rule: a named conjunction of conditions plus the actions
/// run when the rule fires. Condition order fixes the left-to-right join
/// order in the network.
#[derive(Debug, Clone)]
pub struct Production {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl Production {
    pub fn new(name: &str, conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        Production {
            name: name.to_string(),
            conditions,
            actions,
        }
    }

    /// Extract variable bindings by pairing each condition with the fact
    /// matched at that level, ancestor to leaf. Joins guarantee
    /// consistency, so a later occurrence overwrites with an equal value.
    pub fn bindings_for(&self, wmes: &[&Wme]) -> Bindings {
        let mut bindings = Bindings::new();
        for (condition, wme) in self.conditions.iter().zip(wmes) {
            for (field, term) in condition.fields().into_iter().enumerate() {
                if let Term::Variable(name) = term {
                    bindings.insert(name.clone(), wme.field(field));
                }
            }
        }
        bindings
    }
}
