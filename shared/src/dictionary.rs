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

use crate::terms::{RawTerm, RawValue, Term, Value};
use crate::wme::Wme;

// Dictionary for encoding and decoding symbols
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dictionary {
    pub string_to_id: HashMap<String, u32>,
    pub id_to_string: HashMap<u32, String>,
    next_id: u32,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            string_to_id: HashMap::new(),
            id_to_string: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn encode(&mut self, value: &str) -> u32 {
        if let Some(&id) = self.string_to_id.get(value) {
            id
        } else {
            let id = self.next_id;
            self.string_to_id.insert(value.to_string(), id);
            self.id_to_string.insert(id, value.to_string());
            self.next_id += 1;
            id
        }
    }

    pub fn decode(&self, id: u32) -> Option<&str> {
        self.id_to_string.get(&id).map(|s| s.as_str())
    }

    /// Intern a surface datum, encoding symbols into the dictionary.
    pub fn intern_value(&mut self, raw: &RawValue) -> Value {
        match raw {
            RawValue::Symbol(s) => Value::Symbol(self.encode(s)),
            RawValue::Str(s) => Value::Str(s.clone()),
            RawValue::Int(i) => Value::Int(*i),
            RawValue::Float(f) => Value::Float(*f),
            RawValue::Bool(b) => Value::Bool(*b),
        }
    }

    /// Intern a surface condition field.
    pub fn intern_term(&mut self, raw: &RawTerm) -> Term {
        match raw {
            RawTerm::Var(name) => Term::Variable(name.clone()),
            RawTerm::Value(value) => Term::Constant(self.intern_value(value)),
        }
    }

    /// Render a datum for display, resolving interned symbols.
    pub fn resolve(&self, value: &Value) -> String {
        match value {
            Value::Symbol(id) => self.decode(*id).unwrap_or("unknown").to_string(),
            Value::Str(s) => format!("\"{}\"", s),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
        }
    }

    pub fn decode_wme(&self, wme: &Wme) -> String {
        let identifier = self.decode(wme.identifier).unwrap_or("unknown");
        let attribute = self.decode(wme.attribute).unwrap_or("unknown");
        format!("({} {} {})", identifier, attribute, self.resolve(&wme.value))
    }
}
