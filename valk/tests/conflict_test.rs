/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate valk;

use std::cell::RefCell;
use std::rc::Rc;

use valk::conflict::default::DefaultStrategy;
use valk::conflict::gbb::{GbbConfig, GbbStrategy};
use valk::conflict::lex::LexStrategy;
use valk::conflict::mea::MeaStrategy;
use valk::conflict::{Activation, ConflictResolutionStrategy};
use valk::engine::InferenceEngine;
use valk::production::Action;
use valk::rete::{ProductionNodeId, TokenId};

#[cfg(test)]
mod tests {
    use super::*;

    /// Two two-condition rules whose matches coexist; the firing order
    /// depends entirely on the strategy.
    fn two_rule_engine() -> (InferenceEngine, Rc<RefCell<Vec<String>>>) {
        let mut engine = InferenceEngine::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (rule, id_attr, value_attr) in
            [("early-facts", "color", "size"), ("late-facts", "shape", "weight")]
        {
            let sink = Rc::clone(&fired);
            let name = rule.to_string();
            let record = Action::new(move |_, _| sink.borrow_mut().push(name.clone()));
            let conditions = vec![
                engine.condition("?x", id_attr, "?v"),
                engine.condition("?x", value_attr, "?w"),
            ];
            engine.add_production(rule, conditions, vec![record]).unwrap();
        }

        // early-facts matches t1/t2, late-facts matches t3/t4
        engine.add_wme("thing", "color", "red");
        engine.add_wme("thing", "size", "big");
        engine.add_wme("thing", "shape", "round");
        engine.add_wme("thing", "weight", "heavy");
        (engine, fired)
    }

    #[test]
    fn test_default_prefers_agenda_order_on_equal_depth() {
        let (mut engine, fired) = two_rule_engine();
        engine.set_conflict_resolution_strategy(Box::new(DefaultStrategy));
        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["early-facts".to_string()]);
    }

    #[test]
    fn test_lex_prefers_most_recent_facts() {
        let (mut engine, fired) = two_rule_engine();
        engine.set_conflict_resolution_strategy(Box::new(LexStrategy));
        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["late-facts".to_string()]);
    }

    #[test]
    fn test_default_prefers_deeper_tokens() {
        let mut engine = InferenceEngine::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (rule, conditions) in [
            ("shallow", vec![engine.condition("?x", "color", "?v")]),
            (
                "deep",
                vec![
                    engine.condition("?x", "color", "?v"),
                    engine.condition("?x", "size", "?w"),
                ],
            ),
        ] {
            let sink = Rc::clone(&fired);
            let name = rule.to_string();
            let record = Action::new(move |_, _| sink.borrow_mut().push(name.clone()));
            engine.add_production(rule, conditions, vec![record]).unwrap();
        }

        engine.add_wme("thing", "color", "red");
        engine.add_wme("thing", "size", "big");

        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["deep".to_string()]);
    }

    #[test]
    fn test_mea_anchors_on_the_first_condition() {
        // Rule A's anchor fact is older than rule B's, but A's newest
        // fact is the most recent overall: LEX picks A, MEA picks B.
        let build = || {
            let mut engine = InferenceEngine::new();
            let fired = Rc::new(RefCell::new(Vec::new()));
            for (rule, goal, data) in [("rule-a", "goalA", "x"), ("rule-b", "goalB", "y")] {
                let sink = Rc::clone(&fired);
                let name = rule.to_string();
                let record = Action::new(move |_, _| sink.borrow_mut().push(name.clone()));
                let conditions = vec![
                    engine.condition(goal, "active", true),
                    engine.condition("?d", data, "?v"),
                ];
                engine.add_production(rule, conditions, vec![record]).unwrap();
            }
            engine.add_wme("goalA", "active", true); // t1, anchor of A
            engine.add_wme("goalB", "active", true); // t2, anchor of B
            engine.add_wme("data", "y", 9); // t3
            engine.add_wme("data", "x", 7); // t4
            (engine, fired)
        };

        let (mut engine, fired) = build();
        engine.set_conflict_resolution_strategy(Box::new(LexStrategy));
        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["rule-a".to_string()]);

        let (mut engine, fired) = build();
        engine.set_conflict_resolution_strategy(Box::new(MeaStrategy));
        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["rule-b".to_string()]);
    }

    fn activation(name: &str, token: usize) -> Activation {
        Activation {
            production: ProductionNodeId(0),
            name: name.to_string(),
            token: TokenId(token),
            depth: 1,
            recency: vec![1],
            first_timestamp: 1,
        }
    }

    #[test]
    fn test_gbb_weight_update_formula() {
        let mut strategy = GbbStrategy::with_seed(GbbConfig::default(), 7);

        for _ in 0..5 {
            strategy.provide_feedback("r1", 1.0);
        }
        assert!((strategy.weight("r1") - 1.5_f64.powi(5)).abs() < 1e-9);
        // Other weights stay untouched
        assert_eq!(strategy.weight("r2"), 1.0);
    }

    #[test]
    fn test_gbb_weight_never_drops_below_epsilon() {
        let config = GbbConfig {
            learning_rate: 1.0,
            ..GbbConfig::default()
        };
        let epsilon = config.epsilon;
        let mut strategy = GbbStrategy::with_seed(config, 7);

        strategy.provide_feedback("r1", -1.0);
        assert_eq!(strategy.weight("r1"), epsilon);
    }

    #[test]
    fn test_gbb_sampling_converges_to_weight_ratio() {
        let mut strategy = GbbStrategy::with_seed(GbbConfig::default(), 42);
        for _ in 0..5 {
            strategy.provide_feedback("r1", 1.0);
        }

        let agenda = vec![activation("r1", 1), activation("r2", 2)];
        let samples = 10_000;
        let mut hits = 0;
        for _ in 0..samples {
            if strategy.select(&agenda) == Some(0) {
                hits += 1;
            }
        }

        let observed = hits as f64 / samples as f64;
        let expected = 1.5_f64.powi(5) / (1.5_f64.powi(5) + 1.0);
        assert!(
            (observed - expected).abs() < 0.01,
            "observed {} expected {}",
            observed,
            expected
        );
    }

    #[test]
    fn test_gbb_records_last_fired_rule() {
        let mut strategy = GbbStrategy::with_seed(GbbConfig::default(), 3);
        let agenda = vec![activation("only", 1)];
        assert_eq!(strategy.select(&agenda), Some(0));
        assert_eq!(strategy.last_fired_rule.as_deref(), Some("only"));
    }

    #[test]
    fn test_engine_feedback_reaches_the_strategy() {
        let (mut engine, fired) = two_rule_engine();
        // Drive late-facts' weight to the floor so early-facts dominates
        let config = GbbConfig {
            learning_rate: 1.0,
            ..GbbConfig::default()
        };
        engine.set_conflict_resolution_strategy(Box::new(GbbStrategy::with_seed(config, 11)));
        engine.provide_feedback("late-facts", -1.0);

        engine.run(Some(1));
        assert_eq!(&*fired.borrow(), &["early-facts".to_string()]);
    }
}
