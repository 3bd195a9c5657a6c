use coil::grammar::metagrammar::{ALT, ATOM, ITEM, MSTART, RHS, RULE};
use coil::grammar::{meta_grammar, Grammar};
use coil::tokenizer::NONTERMINAL;
use proptest::prelude::*;
use std::collections::BTreeSet;

const TERMINALS: i32 = 6;

/// Rule `i` starts with terminals and/or rules `j > i`, so there are no cycles
fn build(rules: &[(Vec<i32>, Vec<usize>)]) -> Grammar {
    let mut g = Grammar::new(NONTERMINAL);
    for i in 0..rules.len() {
        g.add_dfa(format!("r{}", i));
    }
    let empty = g.labels.add(0, Some("EMPTY"));
    for (i, (terms, refs)) in rules.iter().enumerate() {
        let mut labels = Vec::new();
        for &t in terms {
            labels.push(g.labels.add(1 + t, None));
        }
        for &r in refs {
            labels.push(g.labels.add(NONTERMINAL + r as i32, None));
        }
        let dfa = &mut g.dfas[i];
        dfa.add_state();
        dfa.add_state();
        for label in labels {
            dfa.add_arc(0, 1, label);
        }
        dfa.add_arc(1, 1, empty);
    }
    g
}

/// Expected FIRST sets as label-type sets, computed bottom-up
fn reference(rules: &[(Vec<i32>, Vec<usize>)]) -> Vec<BTreeSet<i32>> {
    let mut out = vec![BTreeSet::new(); rules.len()];
    for i in (0..rules.len()).rev() {
        let mut set: BTreeSet<i32> = rules[i].0.iter().map(|t| 1 + t).collect();
        for &r in &rules[i].1 {
            set.extend(out[r].iter().copied());
        }
        out[i] = set;
    }
    out
}

fn as_types(g: &Grammar) -> Vec<BTreeSet<i32>> {
    g.dfas
        .iter()
        .map(|d| {
            d.first
                .done()
                .map(|s| s.iter().filter_map(|i| g.labels.get(i)).map(|l| l.ty).collect())
                .unwrap_or_default()
        })
        .collect()
}

fn acyclic_rules() -> impl Strategy<Value = Vec<(Vec<i32>, Vec<usize>)>> {
    (2usize..8).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                let refs = if i + 1 < n {
                    proptest::collection::vec(i + 1..n, 0..3).boxed()
                } else {
                    Just(Vec::new()).boxed()
                };
                (proptest::collection::vec(0..TERMINALS, 0..3), refs)
            })
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn prop_first_sets_independent_of_order(
        (rules, order) in acyclic_rules().prop_flat_map(|rules| {
            let indices: Vec<usize> = (0..rules.len()).collect();
            (Just(rules), Just(indices).prop_shuffle())
        })
    ) {
        let mut forward = build(&rules);
        prop_assert!(forward.add_firsts().unwrap().is_empty());
        let mut shuffled = build(&rules);
        prop_assert!(shuffled.add_firsts_in_order(&order).unwrap().is_empty());

        prop_assert_eq!(as_types(&forward), reference(&rules));
        prop_assert_eq!(as_types(&shuffled), reference(&rules));
    }
}

#[test]
fn test_self_reference_terminates_with_report() {
    // r0 starts with itself or a terminal; r1 starts with r0
    let mut g = build(&[(vec![2], vec![]), (vec![], vec![0])]);
    let self_label = g.labels.add(NONTERMINAL, None);
    g.dfas[0].add_arc(0, 1, self_label);

    let reports = g.add_firsts().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].symbol, NONTERMINAL);
    assert_eq!(reports[0].name, "r0");
    assert_eq!(as_types(&g), vec![BTreeSet::from([3]), BTreeSet::from([3])]);
}

#[test]
fn test_meta_grammar_precomputed_sets() {
    let g = meta_grammar();
    let expect: [(i32, &[u8]); 6] = [
        (MSTART, b"\x38\x00\x00"),
        (RULE, b"\x20\x00\x00"),
        (RHS, b"\x20\x08\x03"),
        (ALT, b"\x20\x08\x03"),
        (ITEM, b"\x20\x08\x03"),
        (ATOM, b"\x20\x00\x03"),
    ];
    for (symbol, bytes) in expect {
        assert_eq!(g.first_set(symbol).unwrap().as_bytes(), bytes);
    }
}

#[test]
fn test_meta_grammar_recomputed_in_reverse_order() {
    let shipped = meta_grammar();
    let mut g = meta_grammar();
    g.clear_firsts();
    let reports = g.add_firsts_in_order(&[5, 4, 3, 2, 1, 0]).unwrap();
    assert!(reports.is_empty());
    assert_eq!(g, shipped);
}
