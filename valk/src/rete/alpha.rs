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

use shared::rule::Condition;
use shared::terms::{Term, Value};
use shared::wme::Wme;

use crate::rete::{AlphaMemoryId, JoinNodeId, WmeId};

/// Filtered store of facts passing one condition's constant tests.
/// Insertion order is retained for recency-based conflict resolution;
/// duplicates are kept out by the network.
#[derive(Debug, Default)]
pub struct AlphaMemory {
    pub items: Vec<WmeId>,
    pub successors: Vec<JoinNodeId>,
}

/// One level of the alpha discrimination trie. Fields are tested in a
/// fixed order (identifier, attribute, value); a condition with a
/// variable in some field takes the wildcard edge at that level. Leaves
/// sit at depth three and carry the shared alpha memory.
#[derive(Debug, Default)]
pub struct AlphaTrieNode {
    children: HashMap<Value, AlphaTrieNode>,
    wildcard: Option<Box<AlphaTrieNode>>,
    pub memory: Option<AlphaMemoryId>,
}

impl AlphaTrieNode {
    /// Walk or extend the trie along the condition's constant tests and
    /// return the leaf for this condition. Two conditions with identical
    /// constants end on the same leaf, which is what shares their memory.
    pub fn walk_condition(&mut self, condition: &Condition) -> &mut AlphaTrieNode {
        let mut node = self;
        for field in condition.fields() {
            node = match field {
                Term::Constant(value) => node.children.entry(value.clone()).or_default(),
                Term::Variable(_) => &mut **node.wildcard.get_or_insert_with(Default::default),
            };
        }
        node
    }

    /// Collect every alpha memory whose trie path accepts the fact,
    /// descending into both the matching constant edge and the wildcard
    /// edge at each level.
    pub fn matching_memories(&self, wme: &Wme, out: &mut Vec<AlphaMemoryId>) {
        self.collect(wme, 0, out)
    }

    fn collect(&self, wme: &Wme, depth: usize, out: &mut Vec<AlphaMemoryId>) {
        if depth == 3 {
            if let Some(id) = self.memory {
                out.push(id);
            }
            return;
        }
        if let Some(child) = self.children.get(&wme.field(depth)) {
            child.collect(wme, depth + 1, out);
        }
        if let Some(wildcard) = &self.wildcard {
            wildcard.collect(wme, depth + 1, out);
        }
    }
}
