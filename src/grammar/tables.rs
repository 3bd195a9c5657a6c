//! Static grammar tables
//!
//! The layout generated grammars are shipped in: arcs as (label, target),
//! states as arc lists, DFAs with an optional packed FIRST set, and a label
//! table whose indices the arcs refer to. `Grammar::from_def` reproduces the
//! layout exactly; no deduplication or renumbering happens on load.

use super::{Arc, Dfa, FirstSet, Grammar, Label, LabelList, State};
use crate::bitset::{nbytes, Bitset};
use crate::errors::{CoilError, Result};

#[derive(Debug, Clone, Copy)]
pub struct ArcDef {
    pub label: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct StateDef {
    pub arcs: &'static [ArcDef],
}

#[derive(Debug, Clone, Copy)]
pub struct DfaDef {
    pub symbol: i32,
    pub name: &'static str,
    pub initial: usize,
    pub states: &'static [StateDef],
    /// Packed FIRST set, if the generator precomputed one
    pub first: Option<&'static [u8]>,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelDef {
    pub ty: i32,
    pub literal: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct GrammarDef {
    pub dfas: &'static [DfaDef],
    pub labels: &'static [LabelDef],
    pub start: i32,
}

/// Shorthand for table literals
pub const fn arc(label: usize, target: usize) -> ArcDef {
    ArcDef { label, target }
}

impl Grammar {
    pub fn from_def(def: &GrammarDef) -> Result<Self> {
        let mut labels = LabelList::new();
        for label in def.labels {
            labels.push_raw(Label::new(label.ty, label.literal));
        }

        let set_bytes = nbytes(def.labels.len());
        let mut dfas = Vec::with_capacity(def.dfas.len());
        for d in def.dfas {
            let first = match d.first {
                Some(bytes) if bytes.len() == set_bytes => FirstSet::Done(Bitset::from_bytes(bytes)),
                Some(bytes) => {
                    return Err(CoilError::Grammar(format!(
                        "DFA '{}' has a {}-byte FIRST set, expected {}",
                        d.name,
                        bytes.len(),
                        set_bytes
                    )))
                }
                None => FirstSet::Unset,
            };
            dfas.push(Dfa {
                symbol: d.symbol,
                name: d.name.to_string(),
                initial: d.initial,
                states: d
                    .states
                    .iter()
                    .map(|s| State {
                        arcs: s
                            .arcs
                            .iter()
                            .map(|a| Arc {
                                label: a.label,
                                target: a.target,
                            })
                            .collect(),
                    })
                    .collect(),
                first,
            });
        }

        let grammar = Grammar {
            dfas,
            labels,
            start: def.start,
        };
        grammar.validate()?;
        Ok(grammar)
    }
}
