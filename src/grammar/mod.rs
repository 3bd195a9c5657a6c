//! Grammar tables - one DFA per nonterminal over a shared label table
//!
//! Design: a grammar is built once (from static tables or JSON) and then only
//! annotated with FIRST sets:
//! - Labels are deduplicated by (type, literal); arcs refer to them by index
//! - Nonterminal symbols start at `NONTERMINAL`; DFA `i` has symbol
//!   `NONTERMINAL + i`
//! - Each DFA carries a three-state FIRST-set marker (see `firstsets`)

pub mod firstsets;
pub mod metagrammar;
pub mod tables;

#[cfg(test)]
mod tests;

pub use firstsets::LeftRecursion;
pub use metagrammar::meta_grammar;

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::bitset::Bitset;
use crate::errors::{CoilError, Result};
use crate::tokenizer::{TokenKind, NONTERMINAL};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Token kind for terminals, symbol number for nonterminals
    pub ty: i32,
    pub literal: Option<String>,
}

impl Label {
    pub fn new(ty: i32, literal: Option<&str>) -> Self {
        Self {
            ty,
            literal: literal.map(str::to_string),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.ty < NONTERMINAL
    }

    /// Printable form: `EMPTY`, a token name, `NAME(literal)`, or a rule name
    pub fn repr(&self, grammar: &Grammar) -> String {
        if self.ty == TokenKind::EndMarker.as_type() && self.literal.is_some() {
            return "EMPTY".to_string();
        }
        if !self.is_terminal() {
            return match (&self.literal, grammar.find_dfa(self.ty)) {
                (Some(literal), _) => literal.clone(),
                (None, Some(dfa)) => dfa.name.clone(),
                (None, None) => format!("NT{}", self.ty),
            };
        }
        let name = TokenKind::from_type(self.ty).map_or("<unknown>", TokenKind::name);
        match &self.literal {
            Some(literal) => format!("{}({})", name, literal),
            None => name.to_string(),
        }
    }
}

/// Label table with (type, literal) deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelList {
    labels: Vec<Label>,
}

impl LabelList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the label, adding it if it is new
    pub fn add(&mut self, ty: i32, literal: Option<&str>) -> usize {
        if let Some(index) = self.find(ty, literal) {
            return index;
        }
        self.labels.push(Label::new(ty, literal));
        self.labels.len() - 1
    }

    pub fn find(&self, ty: i32, literal: Option<&str>) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l.ty == ty && l.literal.as_deref() == literal)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Append without deduplication; table loaders must reproduce indices exactly
    pub(crate) fn push_raw(&mut self, label: Label) {
        self.labels.push(label);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    pub label: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub arcs: Vec<Arc>,
}

/// FIRST-set progress for one rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstSet {
    #[default]
    Unset,
    InProgress,
    Done(Bitset),
}

impl FirstSet {
    pub fn done(&self) -> Option<&Bitset> {
        match self {
            Self::Done(set) => Some(set),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dfa {
    pub symbol: i32,
    pub name: String,
    pub initial: usize,
    pub states: Vec<State>,
    #[serde(default)]
    pub first: FirstSet,
}

impl Dfa {
    pub fn new(symbol: i32, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
            initial: 0,
            states: Vec::new(),
            first: FirstSet::Unset,
        }
    }

    /// Index of a new state with no arcs
    pub fn add_state(&mut self) -> usize {
        self.states.push(State::default());
        self.states.len() - 1
    }

    pub fn add_arc(&mut self, from: usize, to: usize, label: usize) {
        if let Some(state) = self.states.get_mut(from) {
            state.arcs.push(Arc { label, target: to });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub dfas: Vec<Dfa>,
    pub labels: LabelList,
    pub start: i32,
}

impl Grammar {
    /// Empty grammar; `start` is the symbol parsing begins with
    pub fn new(start: i32) -> Self {
        Self {
            dfas: Vec::new(),
            labels: LabelList::new(),
            start,
        }
    }

    /// Add a DFA for the next nonterminal symbol and return that symbol
    pub fn add_dfa(&mut self, name: impl Into<String>) -> i32 {
        let symbol = NONTERMINAL + self.dfas.len() as i32;
        self.dfas.push(Dfa::new(symbol, name));
        symbol
    }

    pub fn dfa_index(symbol: i32) -> Option<usize> {
        symbol
            .checked_sub(NONTERMINAL)
            .and_then(|offset| usize::try_from(offset).ok())
    }

    pub fn find_dfa(&self, symbol: i32) -> Option<&Dfa> {
        Self::dfa_index(symbol)
            .and_then(|i| self.dfas.get(i))
            .filter(|d| d.symbol == symbol)
    }

    pub fn find_dfa_mut(&mut self, symbol: i32) -> Option<&mut Dfa> {
        Self::dfa_index(symbol)
            .and_then(move |i| self.dfas.get_mut(i))
            .filter(|d| d.symbol == symbol)
    }

    /// Check the structural invariants table loaders rely on
    pub fn validate(&self) -> Result<()> {
        for (i, dfa) in self.dfas.iter().enumerate() {
            if Self::dfa_index(dfa.symbol) != Some(i) {
                return Err(CoilError::Grammar(format!(
                    "DFA '{}' at position {} has symbol {}",
                    dfa.name, i, dfa.symbol
                )));
            }
            if dfa.initial >= dfa.states.len() {
                return Err(CoilError::Grammar(format!(
                    "DFA '{}' has initial state {} of {}",
                    dfa.name,
                    dfa.initial,
                    dfa.states.len()
                )));
            }
            for arc in dfa.states.iter().flat_map(|s| &s.arcs) {
                let label = self.labels.get(arc.label).ok_or_else(|| {
                    CoilError::Grammar(format!("DFA '{}' uses unknown label {}", dfa.name, arc.label))
                })?;
                if arc.target >= dfa.states.len() {
                    return Err(CoilError::Grammar(format!(
                        "DFA '{}' has an arc to missing state {}",
                        dfa.name, arc.target
                    )));
                }
                if !label.is_terminal() && self.find_dfa(label.ty).is_none() {
                    return Err(CoilError::Grammar(format!(
                        "DFA '{}' refers to undefined nonterminal {}",
                        dfa.name, label.ty
                    )));
                }
            }
        }
        if self.find_dfa(self.start).is_none() && !self.dfas.is_empty() {
            return Err(CoilError::Grammar(format!("start symbol {} has no DFA", self.start)));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let grammar: Self = serde_json::from_str(json)?;
        grammar.validate()?;
        Ok(grammar)
    }

    /// `{ label label ... }` listing of a FIRST set
    pub fn describe_set(&self, set: &Bitset) -> String {
        let mut out = String::from("{");
        for index in set.iter() {
            if let Some(label) = self.labels.get(index) {
                let _ = write!(out, " {}", label.repr(self));
            }
        }
        out.push_str(" }");
        out
    }
}
