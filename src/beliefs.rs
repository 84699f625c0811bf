//! Belief base: facts and rules indexed by literal group.
//!
//! Members of a group keep their insertion order, which is the order in
//! which queries enumerate them.

use std::collections::HashMap;

use crate::term::{LiteralGroup, Term};

/// A belief rule `head :- body`.
///
/// The body is any goal term understood by [`Query`](crate::query::Query),
/// e.g. a conjunction `&(a(X), b(X))`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub head: Term,
    pub body: Term,
}

impl Rule {
    pub fn new(head: Term, body: Term) -> Self {
        Self { head, body }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} :- {}", self.head, self.body)
    }
}

/// An agent's facts and rules.
#[derive(Debug, Clone, Default)]
pub struct BeliefBase {
    facts: HashMap<LiteralGroup, Vec<Term>>,
    rules: HashMap<LiteralGroup, Vec<Rule>>,
}

impl BeliefBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a belief. Returns `false` if the term is not an atom or literal,
    /// or if an identical belief is already present. Identity includes
    /// annotations.
    pub fn add(&mut self, belief: Term) -> bool {
        let Some(group) = belief.literal_group() else {
            return false;
        };
        let members = self.facts.entry(group).or_default();
        if members.contains(&belief) {
            return false;
        }
        members.push(belief);
        true
    }

    /// Remove the first member equal to `belief`.
    pub fn remove(&mut self, belief: &Term) -> bool {
        let Some(group) = belief.literal_group() else {
            return false;
        };
        let Some(members) = self.facts.get_mut(&group) else {
            return false;
        };
        let Some(index) = members.iter().position(|b| b == belief) else {
            return false;
        };
        members.remove(index);
        if members.is_empty() {
            self.facts.remove(&group);
        }
        true
    }

    /// Add a rule, indexed by its head's literal group.
    pub fn add_rule(&mut self, rule: Rule) -> bool {
        let Some(group) = rule.head.literal_group() else {
            return false;
        };
        self.rules.entry(group).or_default().push(rule);
        true
    }

    /// Facts of a group, in insertion order.
    pub fn lookup(&self, group: &LiteralGroup) -> &[Term] {
        self.facts.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rules whose head belongs to `group`, in insertion order.
    pub fn rules(&self, group: &LiteralGroup) -> &[Rule] {
        self.rules.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every group holding at least one fact or rule, sorted.
    pub fn groups(&self) -> Vec<&LiteralGroup> {
        let mut groups: Vec<_> = self.facts.keys().chain(self.rules.keys()).collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Total number of facts.
    pub fn len(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}
