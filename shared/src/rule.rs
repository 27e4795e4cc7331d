use crate::terms::{Term, Value};
use crate::wme::Wme;

/// A single pattern over fact triples. Fields are identifier, attribute,
/// value; each is a constant or a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition(pub Term, pub Term, pub Term);

impl Condition {
    pub fn fields(&self) -> [&Term; 3] {
        [&self.0, &self.1, &self.2]
    }

    /// Iterate the variable fields as (field index, variable name).
    pub fn variables(&self) -> impl Iterator<Item = (usize, &str)> {
        self.fields()
            .into_iter()
            .enumerate()
            .filter_map(|(index, term)| term.as_variable().map(|name| (index, name)))
    }

    /// The constant tests of this condition, in the fixed field order.
    pub fn constants(&self) -> [Option<&Value>; 3] {
        fn field<'a>(term: &'a Term) -> Option<&'a Value> {
            match term {
                Term::Constant(value) => Some(value),
                Term::Variable(_) => None,
            }
        }
        // Borrow each field separately so the array borrows self
        [field(&self.0), field(&self.1), field(&self.2)]
    }

    /// Whether the fact passes every constant test of this condition.
    /// Variable fields accept anything.
    pub fn matches_wme(&self, wme: &Wme) -> bool {
        self.constants()
            .into_iter()
            .enumerate()
            .all(|(index, constant)| match constant {
                Some(value) => *value == wme.field(index),
                None => true,
            })
    }
}
