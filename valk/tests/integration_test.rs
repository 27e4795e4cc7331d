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

use shared::terms::Value;
use valk::engine::InferenceEngine;
use valk::error::ValkError;
use valk::production::Action;

#[cfg(test)]
mod tests {
    use super::*;

    /// Shared scenario: one rule checking a person's age against a
    /// threshold, recording (name, passed) pairs.
    fn age_check_engine() -> (InferenceEngine, Rc<RefCell<Vec<(String, bool)>>>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut engine = InferenceEngine::new();
        let results = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&results);
        let record = Action::new(move |bindings, engine| {
            let name = engine.network.dictionary.resolve(&bindings["n"]);
            let passed = match (&bindings["a"], &bindings["m"]) {
                (Value::Int(age), Value::Int(min)) => age >= min,
                _ => false,
            };
            sink.borrow_mut().push((name, passed));
        });

        let conditions = vec![
            engine.condition("?p", "name", "?n"),
            engine.condition("?p", "age", "?a"),
            engine.condition("legal", "min-age", "?m"),
        ];
        engine
            .add_production("check-age", conditions, vec![record])
            .unwrap();
        (engine, results)
    }

    #[test]
    fn test_age_check_fires_once() {
        let (mut engine, results) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person1", "age", 25);
        engine.add_wme("legal", "min-age", 18);

        let cycles = engine.run(None);
        assert_eq!(cycles, 1);
        assert_eq!(&*results.borrow(), &[("Alice".to_string(), true)]);
    }

    #[test]
    fn test_no_match_runs_zero_cycles() {
        let (mut engine, results) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");

        let cycles = engine.run(None);
        assert_eq!(cycles, 0);
        assert!(results.borrow().is_empty());
    }

    #[test]
    fn test_underage_person_records_false() {
        let (mut engine, results) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person1", "age", 25);
        engine.add_wme("person2", "name", "Bob");
        engine.add_wme("person2", "age", 15);
        engine.add_wme("legal", "min-age", 18);

        let cycles = engine.run(None);
        assert_eq!(cycles, 2);

        let mut recorded = results.borrow().clone();
        recorded.sort();
        assert_eq!(
            recorded,
            vec![("Alice".to_string(), true), ("Bob".to_string(), false)]
        );
    }

    #[test]
    fn test_retraction_empties_matches_and_reassert_refires() {
        let (mut engine, results) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");
        let age = engine.add_wme("person1", "age", 25);
        engine.add_wme("legal", "min-age", 18);

        assert_eq!(engine.run(None), 1);

        assert!(engine.remove_wme(&age));
        assert!(engine.conflict_set().is_empty());

        // Re-asserting the same fact arms the rule again
        engine.add_wme("person1", "age", 25);
        assert_eq!(engine.run(None), 1);
        assert_eq!(
            &*results.borrow(),
            &[("Alice".to_string(), true), ("Alice".to_string(), true)]
        );
    }

    #[test]
    fn test_duplicate_assertion_is_noop() {
        let (mut engine, _) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person1", "name", "Alice");
        assert_eq!(engine.network.wme_count(), 1);
    }

    #[test]
    fn test_rule_added_after_facts_sees_them() {
        let (mut engine, results) = age_check_engine();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person1", "age", 25);
        engine.add_wme("legal", "min-age", 18);

        // A second rule over the same prefix, added late
        let sink = Rc::clone(&results);
        let record = Action::new(move |bindings, engine| {
            let name = engine.network.dictionary.resolve(&bindings["n"]);
            sink.borrow_mut().push((name, true));
        });
        let conditions = vec![
            engine.condition("?p", "name", "?n"),
            engine.condition("?p", "age", "?a"),
        ];
        engine
            .add_production("greet", conditions, vec![record])
            .unwrap();

        let set = engine.conflict_set();
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|(name, _)| name == "greet"));
    }

    #[test]
    fn test_actions_may_assert_reentrantly() {
        let mut engine = InferenceEngine::new();

        let derive = Action::new(|bindings, engine| {
            let a = engine.network.dictionary.resolve(&bindings["a"]);
            let c = engine.network.dictionary.resolve(&bindings["c"]);
            engine.add_wme(&a, "ancestor", c.as_str());
        });
        let conditions = vec![
            engine.condition("?a", "ancestor", "?b"),
            engine.condition("?b", "ancestor", "?c"),
        ];
        engine
            .add_production("transitive", conditions, vec![derive])
            .unwrap();

        engine.add_wme("a", "ancestor", "b");
        engine.add_wme("b", "ancestor", "c");
        engine.add_wme("c", "ancestor", "d");

        // Four distinct two-step chains exist in the closure
        let cycles = engine.run(None);
        assert_eq!(cycles, 4);
        assert_eq!(engine.network.wme_count(), 6);
    }

    #[test]
    fn test_max_cycles_bounds_the_run() {
        let mut engine = InferenceEngine::new();

        let derive = Action::new(|bindings, engine| {
            let a = engine.network.dictionary.resolve(&bindings["a"]);
            let c = engine.network.dictionary.resolve(&bindings["c"]);
            engine.add_wme(&a, "ancestor", c.as_str());
        });
        let conditions = vec![
            engine.condition("?a", "ancestor", "?b"),
            engine.condition("?b", "ancestor", "?c"),
        ];
        engine
            .add_production("transitive", conditions, vec![derive])
            .unwrap();

        engine.add_wme("a", "ancestor", "b");
        engine.add_wme("b", "ancestor", "c");
        engine.add_wme("c", "ancestor", "d");

        assert_eq!(engine.run(Some(2)), 2);
    }

    #[test]
    fn test_halt_stops_the_loop() {
        let (mut engine, _) = age_check_engine();

        let stop = Action::new(|_, engine| engine.halt());
        let conditions = vec![engine.condition("?p", "name", "?n")];
        engine.add_production("stopper", conditions, vec![stop]).unwrap();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person2", "name", "Bob");

        // The stopper matches twice but halts on its first firing
        assert_eq!(engine.run(None), 1);
    }

    #[test]
    fn test_empty_production_is_rejected() {
        let mut engine = InferenceEngine::new();
        let result = engine.add_production("empty", vec![], vec![]);
        assert!(matches!(result, Err(ValkError::EmptyProduction(_))));
    }

    #[test]
    fn test_singleton_variable_matches_universally() {
        let mut engine = InferenceEngine::new();
        let fired = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&fired);
        let bump = Action::new(move |_, _| *sink.borrow_mut() += 1);
        // ?other never joins; the rule is accepted and matches as given
        let conditions = vec![
            engine.condition("?p", "name", "?n"),
            engine.condition("?q", "age", "?other"),
        ];
        engine.add_production("loose", conditions, vec![bump]).unwrap();

        engine.add_wme("person1", "name", "Alice");
        engine.add_wme("person2", "age", 30);

        assert_eq!(engine.run(None), 1);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_dump_state_lists_sections() {
        let (mut engine, _) = age_check_engine();
        engine.add_wme("person1", "name", "Alice");

        let dump = engine.dump_state();
        assert!(dump.contains("=== working memory ==="));
        assert!(dump.contains("(person1 name Alice)"));
        assert!(dump.contains("=== alpha memories ==="));
        assert!(dump.contains("=== beta memories ==="));
        assert!(dump.contains("=== productions ==="));
        assert!(dump.contains("=== agenda ==="));
    }
}
