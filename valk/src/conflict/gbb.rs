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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::conflict::{Activation, ConflictResolutionStrategy};

#[derive(Debug, Clone)]
pub struct GbbConfig {
    pub initial_weight: f64,
    pub learning_rate: f64,
    /// Weights never fall below this floor, so a rule always keeps a
    /// nonzero chance of being sampled.
    pub epsilon: f64,
}

impl Default for GbbConfig {
    fn default() -> Self {
        GbbConfig {
            initial_weight: 1.0,
            learning_rate: 0.5,
            epsilon: 1e-6,
        }
    }
}

/// Gambler's bucket brigade: fitness-proportional (roulette-wheel)
/// selection over per-production weights, adjusted through external
/// feedback after firing.
#[derive(Debug)]
pub struct GbbStrategy {
    config: GbbConfig,
    weights: HashMap<String, f64>,
    pub last_fired_rule: Option<String>,
    rng: StdRng,
}

impl GbbStrategy {
    pub fn new(config: GbbConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Deterministic sampling for reproducible runs.
    pub fn with_seed(config: GbbConfig, seed: u64) -> Self {
        GbbStrategy {
            config,
            weights: HashMap::new(),
            last_fired_rule: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn weight(&self, production: &str) -> f64 {
        self.weights
            .get(production)
            .copied()
            .unwrap_or(self.config.initial_weight)
    }
}

impl ConflictResolutionStrategy for GbbStrategy {
    fn select(&mut self, agenda: &[Activation]) -> Option<usize> {
        if agenda.is_empty() {
            return None;
        }
        let total: f64 = agenda
            .iter()
            .map(|activation| self.weight(&activation.name))
            .sum();
        let mut draw = self.rng.gen_range(0.0..total);
        let mut selected = agenda.len() - 1;
        for (index, activation) in agenda.iter().enumerate() {
            draw -= self.weight(&activation.name);
            if draw < 0.0 {
                selected = index;
                break;
            }
        }
        self.last_fired_rule = Some(agenda[selected].name.clone());
        Some(selected)
    }

    fn provide_feedback(&mut self, production: &str, success: f64) {
        let updated = (self.weight(production) * (1.0 + self.config.learning_rate * success))
            .max(self.config.epsilon);
        self.weights.insert(production.to_string(), updated);
    }
}
