//! Core term types for the akh-bdi engine.
//!
//! A [`Term`] is an immutable value. Compound terms share their children
//! through `Arc`, so cloning a term is cheap and never copies structure.
//! Variables carry no state of their own: what a [`Var`] is bound to lives in
//! a [`Scope`](crate::scope::Scope).

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_VAR: AtomicU64 = AtomicU64::new(1);

/// Identity of a logic variable.
///
/// Allocated from a process-wide counter, so two calls to [`Var::fresh`]
/// never return the same variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u64);

impl Var {
    /// Allocate a variable that has never been seen before.
    pub fn fresh() -> Self {
        Var(NEXT_VAR.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Get the underlying identifier.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_{}", self.0)
    }
}

/// A numeric value, integer or float.
///
/// Equality and ordering are numeric across both representations, so
/// `Int(1) == Float(1.0)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// The value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }

    /// The value as an integer, truncating floats toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(x) => x as i64,
        }
    }

    fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (a, b) => a.as_f64().total_cmp(&b.as_f64()),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A structured literal: `functor(args...)[annots...]`.
///
/// Annotations are carried along for display and for the belief base, but do
/// not take part in unification. Equality is structural and does compare
/// annotations, so `f(1)[a]` unifies with `f(1)` while the two stay distinct
/// beliefs.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    functor: Arc<str>,
    args: Arc<[Term]>,
    annots: Arc<[Term]>,
}

impl Literal {
    /// The functor name.
    pub fn functor(&self) -> &str {
        &self.functor
    }

    /// Positional arguments.
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// Annotation set.
    pub fn annots(&self) -> &[Term] {
        &self.annots
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// The functor/arity key this literal is indexed under.
    pub fn group(&self) -> LiteralGroup {
        LiteralGroup::new(self.functor.as_ref(), self.args.len())
    }
}

/// A logical term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Var(Var),
    Atom(Arc<str>),
    Number(Number),
    Str(Arc<str>),
    Seq(Arc<[Term]>),
    Literal(Literal),
}

impl Term {
    /// A fresh, unbound variable.
    pub fn var() -> Self {
        Term::Var(Var::fresh())
    }

    pub fn atom(name: impl AsRef<str>) -> Self {
        Term::Atom(Arc::from(name.as_ref()))
    }

    pub fn int(value: i64) -> Self {
        Term::Number(Number::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Term::Number(Number::Float(value))
    }

    pub fn string(text: impl AsRef<str>) -> Self {
        Term::Str(Arc::from(text.as_ref()))
    }

    pub fn seq(items: impl IntoIterator<Item = Term>) -> Self {
        Term::Seq(items.into_iter().collect())
    }

    /// Build a literal without annotations.
    ///
    /// A literal with no arguments is the atom of the same name.
    pub fn literal(functor: impl AsRef<str>, args: impl IntoIterator<Item = Term>) -> Self {
        Self::annotated(functor, args, [])
    }

    /// Build a literal carrying an annotation set.
    pub fn annotated(
        functor: impl AsRef<str>,
        args: impl IntoIterator<Item = Term>,
        annots: impl IntoIterator<Item = Term>,
    ) -> Self {
        let args: Arc<[Term]> = args.into_iter().collect();
        let annots: Arc<[Term]> = annots.into_iter().collect();
        if args.is_empty() && annots.is_empty() {
            return Term::atom(functor);
        }
        Term::Literal(Literal {
            functor: Arc::from(functor.as_ref()),
            args,
            annots,
        })
    }

    /// Rebuild a literal with the same functor and annotations but new arguments.
    pub(crate) fn with_parts(
        functor: &str,
        args: Vec<Term>,
        annots: Vec<Term>,
    ) -> Self {
        Self::annotated(functor, args, annots)
    }

    pub fn as_var(&self) -> Option<Var> {
        match self {
            Term::Var(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Term::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Term]> {
        match self {
            Term::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Functor/arity key for atoms and literals.
    pub fn literal_group(&self) -> Option<LiteralGroup> {
        match self {
            Term::Atom(name) => Some(LiteralGroup::new(name.as_ref(), 0)),
            Term::Literal(lit) => Some(lit.group()),
            _ => None,
        }
    }

    /// Name of this term's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Var(_) => "variable",
            Term::Atom(_) => "atom",
            Term::Number(_) => "number",
            Term::Str(_) => "string",
            Term::Seq(_) => "sequence",
            Term::Literal(_) => "literal",
        }
    }

    /// Text of the term with strings unquoted at the top level.
    pub fn to_plain_string(&self) -> String {
        match self {
            Term::Str(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Term::Var(_) => 0,
            Term::Number(_) => 1,
            Term::Atom(_) => 2,
            Term::Str(_) => 3,
            Term::Seq(_) => 4,
            Term::Literal(_) => 5,
        }
    }
}

/// Standard order of terms: variables < numbers < atoms < strings <
/// sequences < literals. Compound terms compare by arity, then name, then
/// arguments left to right.
pub fn compare_terms(a: &Term, b: &Term) -> Ordering {
    match (a, b) {
        (Term::Var(x), Term::Var(y)) => x.cmp(y),
        (Term::Number(x), Term::Number(y)) => x.total_cmp(*y),
        (Term::Atom(x), Term::Atom(y)) => x.cmp(y),
        (Term::Str(x), Term::Str(y)) => x.cmp(y),
        (Term::Seq(x), Term::Seq(y)) => compare_slices(x, y),
        (Term::Literal(x), Term::Literal(y)) => x
            .arity()
            .cmp(&y.arity())
            .then_with(|| x.functor().cmp(y.functor()))
            .then_with(|| compare_slices(x.args(), y.args())),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn compare_slices(a: &[Term], b: &[Term]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = compare_terms(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn write_list(f: &mut std::fmt::Formatter<'_>, items: &[Term]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(v) => write!(f, "{v}"),
            Term::Atom(name) => write!(f, "{name}"),
            Term::Number(n) => write!(f, "{n}"),
            Term::Str(s) => write!(f, "{s:?}"),
            Term::Seq(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Term::Literal(lit) => {
                write!(f, "{}", lit.functor)?;
                if !lit.args.is_empty() {
                    write!(f, "(")?;
                    write_list(f, &lit.args)?;
                    write!(f, ")")?;
                }
                if !lit.annots.is_empty() {
                    write!(f, "[")?;
                    write_list(f, &lit.annots)?;
                    write!(f, "]")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::int(value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::float(value)
    }
}

impl From<Var> for Term {
    fn from(value: Var) -> Self {
        Term::Var(value)
    }
}

/// Functor name plus arity: the key literals are grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralGroup {
    pub functor: String,
    pub arity: usize,
}

impl LiteralGroup {
    pub fn new(functor: impl Into<String>, arity: usize) -> Self {
        Self {
            functor: functor.into(),
            arity,
        }
    }
}

impl std::fmt::Display for LiteralGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.functor, self.arity)
    }
}
