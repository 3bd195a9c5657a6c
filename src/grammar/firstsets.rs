//! FIRST sets - terminals that can begin each nonterminal
//!
//! Design: memoized depth-first fixed point over the DFA table:
//! - `FirstSet::Done` short-circuits, so call order does not change results
//!   for grammars without left recursion
//! - Reaching a rule that is `InProgress` means left recursion; it is
//!   reported and skipped, leaving that rule's set incomplete
//! - Only the labels on each rule's initial state are consulted

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::{FirstSet, Grammar};
use crate::bitset::Bitset;
use crate::errors::{CoilError, Result};

/// A rule whose FIRST set depends on itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRecursion {
    pub symbol: i32,
    pub name: String,
    /// Rule being computed when the cycle closed
    pub below: String,
}

impl Grammar {
    /// Compute every FIRST set not yet known, in table order
    pub fn add_firsts(&mut self) -> Result<Vec<LeftRecursion>> {
        let order: Vec<usize> = (0..self.dfas.len()).collect();
        self.add_firsts_in_order(&order)
    }

    /// Compute FIRST sets starting from the given DFA indices in turn
    pub fn add_firsts_in_order(&mut self, order: &[usize]) -> Result<Vec<LeftRecursion>> {
        info!(rules = self.dfas.len(), labels = self.labels.len(), "Adding FIRST sets");
        let mut reports = Vec::new();
        for &index in order {
            if index >= self.dfas.len() {
                return Err(CoilError::Grammar(format!("no DFA at index {}", index)));
            }
            if matches!(self.dfas[index].first, FirstSet::Unset) {
                self.calc_first(index, &mut reports)?;
            }
        }
        Ok(reports)
    }

    /// Forget all FIRST sets, including precomputed ones
    pub fn clear_firsts(&mut self) {
        for dfa in &mut self.dfas {
            dfa.first = FirstSet::Unset;
        }
    }

    /// FIRST set of a rule, if it has been computed
    pub fn first_set(&self, symbol: i32) -> Option<&Bitset> {
        self.find_dfa(symbol).and_then(|d| d.first.done())
    }

    fn calc_first(&mut self, index: usize, reports: &mut Vec<LeftRecursion>) -> Result<()> {
        let nbits = self.labels.len();
        self.dfas[index].first = FirstSet::InProgress;

        let dfa = &self.dfas[index];
        let mut seen: SmallVec<[usize; 16]> = SmallVec::new();
        if let Some(state) = dfa.states.get(dfa.initial) {
            for arc in &state.arcs {
                if !seen.contains(&arc.label) {
                    seen.push(arc.label);
                }
            }
        }

        let mut result = Bitset::new(nbits);
        for label_index in seen {
            let label = self.labels.get(label_index).ok_or_else(|| {
                CoilError::Grammar(format!(
                    "DFA '{}' uses unknown label {}",
                    self.dfas[index].name, label_index
                ))
            })?;
            if label.is_terminal() {
                result.add(label_index);
                continue;
            }

            let ty = label.ty;
            let target = Self::dfa_index(ty)
                .filter(|&i| self.dfas.get(i).map_or(false, |d| d.symbol == ty))
                .ok_or_else(|| {
                    CoilError::Grammar(format!(
                        "DFA '{}' refers to undefined nonterminal {}",
                        self.dfas[index].name, ty
                    ))
                })?;

            if matches!(self.dfas[target].first, FirstSet::Unset) {
                self.calc_first(target, reports)?;
            }
            match &self.dfas[target].first {
                FirstSet::Done(set) => result.merge_from(set, nbits),
                FirstSet::InProgress => {
                    let report = LeftRecursion {
                        symbol: ty,
                        name: self.dfas[target].name.clone(),
                        below: self.dfas[index].name.clone(),
                    };
                    warn!(
                        symbol = report.symbol,
                        rule = %report.name,
                        while_computing = %report.below,
                        "Left recursion; FIRST set left incomplete"
                    );
                    reports.push(report);
                }
                FirstSet::Unset => {}
            }
        }

        debug!(
            rule = %self.dfas[index].name,
            first = %self.describe_set(&result),
            "FIRST set computed"
        );
        self.dfas[index].first = FirstSet::Done(result);
        Ok(())
    }
}
