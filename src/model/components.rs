// Named components held by a `Model`

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::expr::{LinearConstraint, LinearExpr, VarRef};
use super::ModelError;
use crate::domain::program::Column;
use crate::domain::value_objects::OptimizationType;

/// Index of one entry of a component: an element of its set, or `None` for scalars
pub type Index = Option<String>;

/// Renders `name[element]`, or just `name` for scalar entries
pub(crate) struct Label<'a>(pub &'a str, pub Option<&'a str>);

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(element) => write!(f, "{}[{}]", self.0, element),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Ordered collection of distinct element identifiers
#[derive(Debug, Clone)]
pub struct Set {
    name: String,
    elements: IndexSet<String>,
}

impl Set {
    pub(crate) fn new<I, S>(name: &str, elements: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for element in elements {
            let element = element.into();
            if set.contains(&element) {
                return Err(ModelError::DuplicateElement {
                    set: name.to_string(),
                    element,
                });
            }
            set.insert(element);
        }
        Ok(Self {
            name: name.to_string(),
            elements: set,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.iter().map(String::as_str)
    }

    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Fixed numeric data, scalar or keyed by the elements of a set
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) set: Option<String>,
    pub(crate) values: IndexMap<Index, f64>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn get(&self, index: Option<&str>) -> Option<f64> {
        self.values.get(&index.map(str::to_string)).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = (Option<&str>, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_deref(), *v))
    }
}

/// Domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDomain {
    /// {0, 1}
    Binary,
    /// [0, ∞)
    NonNegativeReals,
    /// (-∞, ∞)
    Reals,
    /// {0, 1, 2, ...}
    NonNegativeIntegers,
}

impl VariableDomain {
    pub(crate) fn column(self, name: String) -> Column {
        match self {
            VariableDomain::Binary => Column::binary(name),
            VariableDomain::NonNegativeReals => Column::continuous(name),
            VariableDomain::Reals => Column::continuous(name).with_bounds(f64::NEG_INFINITY, None),
            VariableDomain::NonNegativeIntegers => Column::integer(name),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VariableEntry {
    pub(crate) var: VarRef,
    pub(crate) value: Option<f64>,
}

/// Decision variable, scalar or keyed by the elements of a set
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) set: Option<String>,
    pub(crate) domain: VariableDomain,
    pub(crate) entries: IndexMap<Index, VariableEntry>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn domain(&self) -> VariableDomain {
        self.domain
    }

    pub fn get(&self, index: Option<&str>) -> Option<VarRef> {
        self.entries.get(&index.map(str::to_string)).map(|e| e.var)
    }

    /// Value loaded from the latest optimal solve
    pub fn value(&self, index: Option<&str>) -> Option<f64> {
        self.entries
            .get(&index.map(str::to_string))
            .and_then(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The model's single objective
#[derive(Debug, Clone)]
pub struct Objective {
    pub(crate) name: String,
    pub(crate) expr: LinearExpr,
    pub(crate) sense: OptimizationType,
}

impl Objective {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> OptimizationType {
        self.sense
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstraintEntry {
    pub(crate) constraint: LinearConstraint,
    pub(crate) dual: Option<f64>,
}

/// Named family of constraints, scalar or one per element of a set
#[derive(Debug, Clone)]
pub struct ConstraintGroup {
    pub(crate) name: String,
    pub(crate) set: Option<String>,
    pub(crate) entries: IndexMap<Index, ConstraintEntry>,
}

impl ConstraintGroup {
    pub(crate) fn new(name: &str, set: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            set: set.map(str::to_string),
            entries: IndexMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, index: Index, constraint: LinearConstraint) {
        self.entries.insert(
            index,
            ConstraintEntry {
                constraint,
                dual: None,
            },
        );
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn get(&self, index: Option<&str>) -> Option<&LinearConstraint> {
        self.entries
            .get(&index.map(str::to_string))
            .map(|e| &e.constraint)
    }

    /// Dual loaded from the latest solve, if the backend reported one
    pub fn dual(&self, index: Option<&str>) -> Option<f64> {
        self.entries
            .get(&index.map(str::to_string))
            .and_then(|e| e.dual)
    }

    /// `(index, constraint, dual)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &LinearConstraint, Option<f64>)> + '_ {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_deref(), &e.constraint, e.dual))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_reject_duplicate_elements() {
        let err = Set::new("GENERATORS", ["G1", "G2", "G1"]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateElement {
                set: "GENERATORS".to_string(),
                element: "G1".to_string()
            }
        );
    }

    #[test]
    fn sets_keep_declaration_order() {
        let set = Set::new("S", ["b", "a", "c"]).unwrap();
        assert_eq!(set.elements().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert!(set.contains("a"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn labels_render_scalar_and_indexed_entries() {
        assert_eq!(Label("p", Some("G1")).to_string(), "p[G1]");
        assert_eq!(Label("demand_constraint", None).to_string(), "demand_constraint");
    }

    #[test]
    fn domains_map_to_column_kinds() {
        let u = VariableDomain::Binary.column("u".into());
        assert_eq!(u.upper_bound, Some(1.0));
        assert!(u.is_integer());
        let x = VariableDomain::Reals.column("x".into());
        assert_eq!(x.lower_bound, f64::NEG_INFINITY);
        assert!(!x.is_integer());
    }
}
