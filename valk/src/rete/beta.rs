/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::wme::Wme;

use crate::production::Production;
use crate::rete::{AlphaMemoryId, BetaMemoryId, JoinNodeId, ProductionNodeId, TokenId, WmeId};

/// Node in a parent-chained list representing a partial match. A token
/// of depth k assigns facts to the first k conditions of some rule;
/// walking `parent` yields the contributing facts in condition order.
/// The dummy top token has neither parent nor fact.
#[derive(Debug)]
pub struct Token {
    pub parent: Option<TokenId>,
    pub wme: Option<WmeId>,
    /// Beta memory whose item list owns this token.
    pub owner: BetaMemoryId,
    pub children: Vec<TokenId>,
}

/// Store of tokens, one per consistent prefix assignment. Children are
/// the join nodes fed by these tokens plus any terminal production node.
#[derive(Debug, Default)]
pub struct BetaMemory {
    pub parent: Option<JoinNodeId>,
    pub items: Vec<TokenId>,
    pub join_children: Vec<JoinNodeId>,
    pub production_children: Vec<ProductionNodeId>,
}

/// Requires the named field of a candidate fact to equal the named field
/// of the fact contributed by an ancestor level of the token chain.
/// `distance` counts up the chain: 0 is the token's own fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTest {
    pub wme_field: usize,
    pub distance: usize,
    pub ancestor_field: usize,
}

impl JoinTest {
    pub fn check(&self, candidate: &Wme, ancestor: &Wme) -> bool {
        candidate.field(self.wme_field) == ancestor.field(self.ancestor_field)
    }
}

/// Tests variable consistency between a beta memory and an alpha memory.
/// The first join of a rule hangs off the beta root and carries no
/// tests, so every alpha fact passes.
#[derive(Debug)]
pub struct JoinNode {
    pub parent: BetaMemoryId,
    pub alpha_memory: AlphaMemoryId,
    pub tests: Vec<JoinTest>,
    pub child: BetaMemoryId,
}

/// Terminal node of one rule. Its items are the rule's complete matches
/// and feed the agenda directly.
#[derive(Debug)]
pub struct ProductionNode {
    pub parent: BetaMemoryId,
    pub production: Production,
    pub items: Vec<TokenId>,
}
