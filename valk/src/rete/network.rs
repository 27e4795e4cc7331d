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

use log::{debug, trace, warn};

use shared::dictionary::Dictionary;
use shared::rule::Condition;
use shared::wme::Wme;

use crate::error::ValkError;
use crate::production::Production;
use crate::rete::alpha::{AlphaMemory, AlphaTrieNode};
use crate::rete::beta::{BetaMemory, JoinNode, JoinTest, ProductionNode, Token};
use crate::rete::{AlphaMemoryId, BetaMemoryId, JoinNodeId, ProductionNodeId, TokenId, WmeId};

/// Fact record in the working-memory arena. The back-references make
/// retraction proportional to the affected matches, not to the network.
#[derive(Debug)]
pub struct WmeEntry {
    pub wme: Wme,
    /// Monotonic assertion index, read by recency-based strategies.
    pub timestamp: u64,
    pub alpha_memories: Vec<AlphaMemoryId>,
    pub tokens: Vec<TokenId>,
}

/// The discrimination network. Owns every node arena plus working
/// memory; all fact and rule traffic is routed through it.
#[derive(Debug)]
pub struct ReteNetwork {
    pub dictionary: Dictionary,

    alpha_root: AlphaTrieNode,
    alpha_memories: Vec<AlphaMemory>,
    beta_memories: Vec<BetaMemory>,
    join_nodes: Vec<JoinNode>,
    productions: Vec<ProductionNode>,

    tokens: HashMap<TokenId, Token>,
    next_token: usize,

    wmes: HashMap<WmeId, WmeEntry>,
    wme_index: HashMap<Wme, WmeId>,
    next_wme: usize,
    clock: u64,

    beta_root: BetaMemoryId,
}

impl Default for ReteNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ReteNetwork {
    pub fn new() -> Self {
        let beta_root = BetaMemoryId(0);
        let dummy_token = TokenId(0);
        let mut tokens = HashMap::new();
        // The dummy token seeds the first join of every rule
        tokens.insert(
            dummy_token,
            Token {
                parent: None,
                wme: None,
                owner: beta_root,
                children: Vec::new(),
            },
        );
        let mut root_memory = BetaMemory::default();
        root_memory.items.push(dummy_token);

        ReteNetwork {
            dictionary: Dictionary::new(),
            alpha_root: AlphaTrieNode::default(),
            alpha_memories: Vec::new(),
            beta_memories: vec![root_memory],
            join_nodes: Vec::new(),
            productions: Vec::new(),
            tokens,
            next_token: 1,
            wmes: HashMap::new(),
            wme_index: HashMap::new(),
            next_wme: 0,
            clock: 0,
            beta_root,
        }
    }

    // ------------------------------------------------------------------
    // Rule addition
    // ------------------------------------------------------------------

    pub fn add_production(&mut self, production: Production) -> Result<ProductionNodeId, ValkError> {
        if production.conditions.is_empty() {
            return Err(ValkError::EmptyProduction(production.name.clone()));
        }
        warn_unjoined_variables(&production);
        debug!("adding production {}", production.name);

        let last = self.build_or_share_network_for_conditions(&production.conditions);
        let id = ProductionNodeId(self.productions.len());
        self.beta_memories[last.0].production_children.push(id);
        self.productions.push(ProductionNode {
            parent: last,
            production,
            items: Vec::new(),
        });

        // A rule added after facts still sees the current partial matches
        let tokens = self.beta_memories[last.0].items.clone();
        for token in tokens {
            self.activate_production(id, token);
        }
        Ok(id)
    }

    /// Walk the conditions left to right, sharing any existing join chain
    /// with identical structure and extending it where it diverges.
    /// Returns the beta memory of the last condition.
    fn build_or_share_network_for_conditions(&mut self, conditions: &[Condition]) -> BetaMemoryId {
        let mut current = self.beta_root;
        for (i, condition) in conditions.iter().enumerate() {
            let alpha = self.build_or_share_alpha_memory(condition);
            let tests = join_tests_for(condition, &conditions[..i]);
            current = self.build_or_share_join(current, alpha, tests);
        }
        current
    }

    fn build_or_share_alpha_memory(&mut self, condition: &Condition) -> AlphaMemoryId {
        let leaf = self.alpha_root.walk_condition(condition);
        if let Some(id) = leaf.memory {
            return id;
        }
        let id = AlphaMemoryId(self.alpha_memories.len());
        leaf.memory = Some(id);
        self.alpha_memories.push(AlphaMemory::default());
        trace!("created alpha memory a{}", id.0);

        // Retro-insert live facts in assertion order so a memory built
        // after facts holds exactly what an early-built one would
        let mut existing: Vec<(u64, WmeId)> = self
            .wmes
            .iter()
            .filter(|(_, entry)| condition.matches_wme(&entry.wme))
            .map(|(wme, entry)| (entry.timestamp, *wme))
            .collect();
        existing.sort_unstable_by_key(|(timestamp, _)| *timestamp);
        for (_, wme) in existing {
            self.alpha_memories[id.0].items.push(wme);
            self.wmes.get_mut(&wme).unwrap().alpha_memories.push(id);
        }
        id
    }

    fn build_or_share_join(
        &mut self,
        parent: BetaMemoryId,
        alpha: AlphaMemoryId,
        tests: Vec<JoinTest>,
    ) -> BetaMemoryId {
        // Structural sharing on the (alpha, tests) key under this parent
        for &join in &self.beta_memories[parent.0].join_children {
            let node = &self.join_nodes[join.0];
            if node.alpha_memory == alpha && node.tests == tests {
                trace!("sharing join node j{}", join.0);
                return node.child;
            }
        }

        let child = BetaMemoryId(self.beta_memories.len());
        self.beta_memories.push(BetaMemory::default());
        let join = JoinNodeId(self.join_nodes.len());
        self.join_nodes.push(JoinNode {
            parent,
            alpha_memory: alpha,
            tests,
            child,
        });
        self.beta_memories[child.0].parent = Some(join);
        self.beta_memories[parent.0].join_children.push(join);
        self.alpha_memories[alpha.0].successors.push(join);
        trace!("created join node j{} -> b{}", join.0, child.0);

        // Populate the new chain from facts already in the alpha memory
        let wmes = self.alpha_memories[alpha.0].items.clone();
        for wme in wmes {
            self.right_activate(join, wme);
        }
        child
    }

    // ------------------------------------------------------------------
    // Fact assertion and retraction
    // ------------------------------------------------------------------

    /// Insert a fact into working memory and propagate it through the
    /// network. Asserting an equal triple again is a silent no-op.
    pub fn add_wme(&mut self, wme: Wme) -> WmeId {
        if let Some(&id) = self.wme_index.get(&wme) {
            return id;
        }
        let id = WmeId(self.next_wme);
        self.next_wme += 1;
        self.clock += 1;
        debug!("t={} assert {}", self.clock, self.dictionary.decode_wme(&wme));
        self.wmes.insert(
            id,
            WmeEntry {
                wme: wme.clone(),
                timestamp: self.clock,
                alpha_memories: Vec::new(),
                tokens: Vec::new(),
            },
        );
        self.wme_index.insert(wme, id);

        let mut memories = Vec::new();
        self.alpha_root.matching_memories(&self.wmes[&id].wme, &mut memories);
        for memory in memories {
            self.activate_alpha_memory(memory, id);
        }
        id
    }

    /// Retract a fact. Removes it from every alpha memory it reached and
    /// tears down every token built on it, children before parents, so
    /// the invariants hold at each intermediate state.
    pub fn remove_wme(&mut self, wme: &Wme) -> bool {
        let Some(id) = self.wme_index.remove(wme) else {
            return false;
        };
        debug!("retract {}", self.dictionary.decode_wme(wme));

        let memories = std::mem::take(&mut self.wmes.get_mut(&id).unwrap().alpha_memories);
        for memory in memories {
            self.alpha_memories[memory.0].items.retain(|&item| item != id);
        }

        let tokens = std::mem::take(&mut self.wmes.get_mut(&id).unwrap().tokens);
        for token in tokens {
            self.remove_token(token);
        }
        self.wmes.remove(&id);
        true
    }

    fn remove_token(&mut self, token: TokenId) {
        // Already gone when an ancestor's cascade got here first
        let Some(node) = self.tokens.get(&token) else {
            return;
        };
        let children = node.children.clone();
        for child in children {
            self.remove_token(child);
        }
        let Some(node) = self.tokens.remove(&token) else {
            return;
        };
        self.beta_memories[node.owner.0].items.retain(|&item| item != token);
        let productions = self.beta_memories[node.owner.0].production_children.clone();
        for production in productions {
            self.productions[production.0].items.retain(|&item| item != token);
        }
        if let Some(parent) = node.parent {
            if let Some(parent) = self.tokens.get_mut(&parent) {
                parent.children.retain(|&child| child != token);
            }
        }
        if let Some(wme) = node.wme {
            if let Some(entry) = self.wmes.get_mut(&wme) {
                entry.tokens.retain(|&item| item != token);
            }
        }
    }

    // ------------------------------------------------------------------
    // Activation protocol
    // ------------------------------------------------------------------

    fn activate_alpha_memory(&mut self, memory: AlphaMemoryId, wme: WmeId) {
        if self.alpha_memories[memory.0].items.contains(&wme) {
            return;
        }
        self.alpha_memories[memory.0].items.push(wme);
        self.wmes.get_mut(&wme).unwrap().alpha_memories.push(memory);
        let successors = self.alpha_memories[memory.0].successors.clone();
        for join in successors {
            self.right_activate(join, wme);
        }
    }

    /// A new fact arrived in the join's alpha memory: test it against
    /// every token of the parent beta memory.
    fn right_activate(&mut self, join: JoinNodeId, wme: WmeId) {
        let parent = self.join_nodes[join.0].parent;
        let tokens = self.beta_memories[parent.0].items.clone();
        for token in tokens {
            if self.join_tests_pass(join, token, wme) {
                let child = self.join_nodes[join.0].child;
                self.activate_beta(child, token, wme);
            }
        }
    }

    /// A new token arrived in the join's parent beta memory: test it
    /// against every fact of the alpha memory.
    fn left_activate_join(&mut self, join: JoinNodeId, token: TokenId) {
        let alpha = self.join_nodes[join.0].alpha_memory;
        let wmes = self.alpha_memories[alpha.0].items.clone();
        for wme in wmes {
            if self.join_tests_pass(join, token, wme) {
                let child = self.join_nodes[join.0].child;
                self.activate_beta(child, token, wme);
            }
        }
    }

    fn join_tests_pass(&self, join: JoinNodeId, token: TokenId, wme: WmeId) -> bool {
        let node = &self.join_nodes[join.0];
        let candidate = &self.wmes[&wme].wme;
        for test in &node.tests {
            let Some(ancestor) = self.nth_token_wme(token, test.distance) else {
                return false;
            };
            if !test.check(candidate, ancestor) {
                return false;
            }
        }
        true
    }

    fn nth_token_wme(&self, token: TokenId, distance: usize) -> Option<&Wme> {
        let mut current = token;
        for _ in 0..distance {
            current = self.tokens[&current].parent?;
        }
        let wme = self.tokens[&current].wme?;
        Some(&self.wmes[&wme].wme)
    }

    /// Grow the token chain by one level, then hand the new token on to
    /// the child join nodes and any terminal production node.
    fn activate_beta(&mut self, memory: BetaMemoryId, parent: TokenId, wme: WmeId) {
        // Chain equality: parent token and fact identify the new token
        let duplicate = self.beta_memories[memory.0].items.iter().any(|&item| {
            let token = &self.tokens[&item];
            token.parent == Some(parent) && token.wme == Some(wme)
        });
        if duplicate {
            return;
        }

        let id = TokenId(self.next_token);
        self.next_token += 1;
        self.tokens.insert(
            id,
            Token {
                parent: Some(parent),
                wme: Some(wme),
                owner: memory,
                children: Vec::new(),
            },
        );
        self.tokens.get_mut(&parent).unwrap().children.push(id);
        self.wmes.get_mut(&wme).unwrap().tokens.push(id);
        self.beta_memories[memory.0].items.push(id);

        let joins = self.beta_memories[memory.0].join_children.clone();
        for join in joins {
            self.left_activate_join(join, id);
        }
        let productions = self.beta_memories[memory.0].production_children.clone();
        for production in productions {
            self.activate_production(production, id);
        }
    }

    fn activate_production(&mut self, production: ProductionNodeId, token: TokenId) {
        let items = &mut self.productions[production.0].items;
        if !items.contains(&token) {
            trace!("production node p{} matched", production.0);
            items.push(token);
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn production_node(&self, id: ProductionNodeId) -> &ProductionNode {
        &self.productions[id.0]
    }

    pub fn production_nodes(&self) -> impl Iterator<Item = (ProductionNodeId, &ProductionNode)> {
        self.productions
            .iter()
            .enumerate()
            .map(|(index, node)| (ProductionNodeId(index), node))
    }

    pub fn contains_wme(&self, wme: &Wme) -> bool {
        self.wme_index.contains_key(wme)
    }

    pub fn wme_count(&self) -> usize {
        self.wmes.len()
    }

    pub(crate) fn contains_token(&self, token: TokenId) -> bool {
        self.tokens.contains_key(&token)
    }

    /// Contributing facts of a token in condition order.
    pub fn token_wmes(&self, token: TokenId) -> Vec<&Wme> {
        let mut wmes = Vec::new();
        let mut current = Some(token);
        while let Some(id) = current {
            let node = &self.tokens[&id];
            if let Some(wme) = node.wme {
                wmes.push(&self.wmes[&wme].wme);
            }
            current = node.parent;
        }
        wmes.reverse();
        wmes
    }

    /// Assertion timestamps of a token's facts in condition order.
    pub fn token_timestamps(&self, token: TokenId) -> Vec<u64> {
        let mut stamps = Vec::new();
        let mut current = Some(token);
        while let Some(id) = current {
            let node = &self.tokens[&id];
            if let Some(wme) = node.wme {
                stamps.push(self.wmes[&wme].timestamp);
            }
            current = node.parent;
        }
        stamps.reverse();
        stamps
    }

    pub fn alpha_memory_count(&self) -> usize {
        self.alpha_memories.len()
    }

    pub fn join_node_count(&self) -> usize {
        self.join_nodes.len()
    }

    pub fn join_node_ids(&self) -> Vec<JoinNodeId> {
        (0..self.join_nodes.len()).map(JoinNodeId).collect()
    }

    /// Number of join levels from the beta root, first-condition joins
    /// being depth one.
    pub fn join_depth(&self, join: JoinNodeId) -> usize {
        let mut depth = 1;
        let mut parent = self.join_nodes[join.0].parent;
        while let Some(above) = self.beta_memories[parent.0].parent {
            depth += 1;
            parent = self.join_nodes[above.0].parent;
        }
        depth
    }

    pub(crate) fn render_chain(&self, token: TokenId) -> String {
        let wmes = self
            .token_wmes(token)
            .iter()
            .map(|wme| self.dictionary.decode_wme(wme))
            .collect::<Vec<_>>()
            .join(" ");
        format!("[{}]", wmes)
    }

    /// Textual dump of working memory and every memory in the network.
    pub fn dump(&self) -> String {
        let mut out = String::new();

        out.push_str("=== working memory ===\n");
        let mut facts: Vec<&WmeEntry> = self.wmes.values().collect();
        facts.sort_by_key(|entry| entry.timestamp);
        for entry in facts {
            out.push_str(&format!(
                "  t={} {}\n",
                entry.timestamp,
                self.dictionary.decode_wme(&entry.wme)
            ));
        }

        out.push_str("=== alpha memories ===\n");
        for (index, memory) in self.alpha_memories.iter().enumerate() {
            let items = memory
                .items
                .iter()
                .map(|wme| self.dictionary.decode_wme(&self.wmes[wme].wme))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  a{}: [{}]\n", index, items));
        }

        out.push_str("=== beta memories ===\n");
        for (index, memory) in self.beta_memories.iter().enumerate() {
            let chains = memory
                .items
                .iter()
                .map(|&token| self.render_chain(token))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  b{}: [{}]\n", index, chains));
        }

        out.push_str("=== productions ===\n");
        for node in &self.productions {
            out.push_str(&format!("  {}:\n", node.production.name));
            for &token in &node.items {
                out.push_str(&format!("    {}\n", self.render_chain(token)));
            }
        }
        out
    }
}

/// Derive the consistency tests for a condition against the conditions
/// before it: one test per earlier condition sharing a variable, nearest
/// ancestor first, which keeps the sharing key stable across rules.
fn join_tests_for(condition: &Condition, earlier: &[Condition]) -> Vec<JoinTest> {
    let mut tests = Vec::new();
    for (field, variable) in condition.variables() {
        for (index, previous) in earlier.iter().enumerate().rev() {
            if let Some((ancestor_field, _)) =
                previous.variables().find(|(_, name)| *name == variable)
            {
                tests.push(JoinTest {
                    wme_field: field,
                    distance: earlier.len() - 1 - index,
                    ancestor_field,
                });
            }
        }
    }
    tests
}

/// A variable occurring in exactly one condition field never joins; the
/// rule is still accepted and the variable matches universally.
fn warn_unjoined_variables(production: &Production) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for condition in &production.conditions {
        for (_, variable) in condition.variables() {
            *counts.entry(variable).or_default() += 1;
        }
    }
    for (variable, count) in counts {
        if count == 1 {
            warn!(
                "production {}: variable ?{} occurs only once and is never joined",
                production.name, variable
            );
        }
    }
}
