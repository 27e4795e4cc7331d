/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashSet;

use log::debug;

use shared::rule::Condition;
use shared::terms::{RawTerm, RawValue};
use shared::wme::Wme;

use crate::conflict::default::DefaultStrategy;
use crate::conflict::{Activation, ConflictResolutionStrategy};
use crate::error::ValkError;
use crate::parser;
use crate::production::{Action, Bindings, Production};
use crate::rete::network::ReteNetwork;
use crate::rete::{ProductionNodeId, TokenId};

/// Rule-based inference engine around the discrimination network:
/// working memory, agenda, and the recognize-act loop.
///
/// Each cycle rebuilds the agenda from every production node's match
/// set, asks the strategy to pick one entry, and runs that rule's
/// actions. Fired (production, token) pairs are refracted so a standing
/// match does not fire again; retracting and re-asserting its facts arms
/// it anew.
pub struct InferenceEngine {
    pub network: ReteNetwork,
    strategy: Box<dyn ConflictResolutionStrategy>,
    agenda: Vec<Activation>,
    fired: HashSet<(ProductionNodeId, TokenId)>,
    halted: bool,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine {
    pub fn new() -> Self {
        InferenceEngine {
            network: ReteNetwork::new(),
            strategy: Box::new(DefaultStrategy),
            agenda: Vec::new(),
            fired: HashSet::new(),
            halted: false,
        }
    }

    /// Add a production rule to the engine.
    pub fn add_production(
        &mut self,
        name: &str,
        conditions: Vec<Condition>,
        actions: Vec<Action>,
    ) -> Result<Production, ValkError> {
        let production = Production::new(name, conditions, actions);
        self.network.add_production(production.clone())?;
        Ok(production)
    }

    /// Add a production whose conditions are written in the surface
    /// syntax, e.g. `"?p name ?n . ?p age ?a . legal min-age ?m"`.
    pub fn add_production_from_str(
        &mut self,
        name: &str,
        lhs: &str,
        actions: Vec<Action>,
    ) -> Result<Production, ValkError> {
        let raw = parser::parse_conditions(lhs)?;
        let dictionary = &mut self.network.dictionary;
        let conditions = raw
            .iter()
            .map(|(identifier, attribute, value)| {
                Condition(
                    dictionary.intern_term(identifier),
                    dictionary.intern_term(attribute),
                    dictionary.intern_term(value),
                )
            })
            .collect();
        self.add_production(name, conditions, actions)
    }

    /// Build a condition, interning symbols. Strings with a leading `?`
    /// become variables.
    pub fn condition(
        &mut self,
        identifier: impl Into<RawTerm>,
        attribute: impl Into<RawTerm>,
        value: impl Into<RawTerm>,
    ) -> Condition {
        let identifier = identifier.into();
        let attribute = attribute.into();
        let value = value.into();
        let dictionary = &mut self.network.dictionary;
        Condition(
            dictionary.intern_term(&identifier),
            dictionary.intern_term(&attribute),
            dictionary.intern_term(&value),
        )
    }

    /// Assert a fact. Asserting an equal triple twice is a no-op.
    pub fn add_wme(&mut self, identifier: &str, attribute: &str, value: impl Into<RawValue>) -> Wme {
        let value = self.network.dictionary.intern_value(&value.into());
        let wme = Wme::new(
            self.network.dictionary.encode(identifier),
            self.network.dictionary.encode(attribute),
            value,
        );
        self.network.add_wme(wme.clone());
        wme
    }

    /// Retract a fact; returns whether it was present.
    pub fn remove_wme(&mut self, wme: &Wme) -> bool {
        self.network.remove_wme(wme)
    }

    pub fn set_conflict_resolution_strategy(
        &mut self,
        strategy: Box<dyn ConflictResolutionStrategy>,
    ) {
        self.strategy = strategy;
    }

    /// Forward a success factor in [-1, 1] to the strategy; only
    /// learning strategies react.
    pub fn provide_feedback(&mut self, production: &str, success: f64) {
        self.strategy
            .provide_feedback(production, success.clamp(-1.0, 1.0));
    }

    /// Stop the recognize-act loop after the current action returns.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Run the recognize-act cycle until the agenda is exhausted or the
    /// cycle bound is hit. Returns the number of rules fired.
    pub fn run(&mut self, max_cycles: Option<usize>) -> usize {
        self.halted = false;
        let mut cycles = 0;
        loop {
            self.build_conflict_set();
            if self.agenda.is_empty() {
                break;
            }
            let Some(index) = self.strategy.select(&self.agenda) else {
                break;
            };
            let activation = self.agenda[index].clone();
            self.fired.insert((activation.production, activation.token));
            self.execute(&activation);
            cycles += 1;
            if self.halted || max_cycles.is_some_and(|limit| cycles >= limit) {
                break;
            }
        }
        debug!("run finished after {} cycles", cycles);
        cycles
    }

    /// Current agenda as (production name, bindings) pairs. Rebuilds the
    /// conflict set first.
    pub fn conflict_set(&mut self) -> Vec<(String, Bindings)> {
        self.build_conflict_set();
        self.agenda
            .iter()
            .map(|activation| {
                let node = self.network.production_node(activation.production);
                let wmes = self.network.token_wmes(activation.token);
                (activation.name.clone(), node.production.bindings_for(&wmes))
            })
            .collect()
    }

    /// Debug dump of working memory, network memories, per-rule matches
    /// and the agenda.
    pub fn dump_state(&mut self) -> String {
        self.build_conflict_set();
        let mut out = self.network.dump();
        out.push_str("=== agenda ===\n");
        for activation in &self.agenda {
            out.push_str(&format!(
                "  {} {}\n",
                activation.name,
                self.network.render_chain(activation.token)
            ));
        }
        out
    }

    /// Rebuild the agenda from every production node's match set,
    /// skipping refracted entries. Unconditional rebuilding keeps the
    /// loop robust to mid-cycle working-memory mutation by actions.
    fn build_conflict_set(&mut self) {
        let network = &self.network;
        self.fired.retain(|(_, token)| network.contains_token(*token));

        self.agenda.clear();
        for (id, node) in self.network.production_nodes() {
            for &token in &node.items {
                if self.fired.contains(&(id, token)) {
                    continue;
                }
                let timestamps = self.network.token_timestamps(token);
                let mut recency = timestamps.clone();
                recency.sort_unstable_by(|a, b| b.cmp(a));
                self.agenda.push(Activation {
                    production: id,
                    name: node.production.name.clone(),
                    token,
                    depth: timestamps.len(),
                    recency,
                    first_timestamp: timestamps.first().copied().unwrap_or(0),
                });
            }
        }
    }

    fn execute(&mut self, activation: &Activation) {
        let (production, bindings) = {
            let node = self.network.production_node(activation.production);
            let wmes = self.network.token_wmes(activation.token);
            (node.production.clone(), node.production.bindings_for(&wmes))
        };
        debug!("firing {}", production.name);
        for action in &production.actions {
            action.call(&bindings, self);
        }
    }
}
