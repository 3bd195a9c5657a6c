use super::metagrammar::{ALT, ATOM, ITEM, MSTART, RHS, RULE};
use super::*;
use crate::tokenizer::TokenKind;

/// `S: A 'x'`, `A: NAME | B`, `B: NUMBER`
fn small_grammar() -> Grammar {
    let mut g = Grammar::new(NONTERMINAL);
    let s = g.add_dfa("S");
    let a = g.add_dfa("A");
    let b = g.add_dfa("B");
    let empty = g.labels.add(0, Some("EMPTY"));
    let la = g.labels.add(a, None);
    let lb = g.labels.add(b, None);
    let x = g.labels.add(TokenKind::Name.as_type(), Some("x"));
    let name = g.labels.add(TokenKind::Name.as_type(), None);
    let number = g.labels.add(TokenKind::Number.as_type(), None);

    let d = g.find_dfa_mut(s).unwrap();
    for _ in 0..3 {
        d.add_state();
    }
    d.add_arc(0, 1, la);
    d.add_arc(1, 2, x);
    d.add_arc(2, 2, empty);

    let d = g.find_dfa_mut(a).unwrap();
    d.add_state();
    d.add_state();
    d.add_arc(0, 1, name);
    d.add_arc(0, 1, lb);
    d.add_arc(1, 1, empty);

    let d = g.find_dfa_mut(b).unwrap();
    d.add_state();
    d.add_state();
    d.add_arc(0, 1, number);
    d.add_arc(1, 1, empty);
    g
}

fn firsts(g: &Grammar) -> Vec<Vec<usize>> {
    g.dfas
        .iter()
        .map(|d| d.first.done().map(|s| s.iter().collect()).unwrap_or_default())
        .collect()
}

#[test]
fn test_label_dedup() {
    let mut labels = LabelList::new();
    let a = labels.add(1, None);
    let b = labels.add(1, Some("if"));
    assert_ne!(a, b);
    assert_eq!(labels.add(1, None), a);
    assert_eq!(labels.add(1, Some("if")), b);
    assert_eq!(labels.find(2, None), None);
    assert_eq!(labels.len(), 2);
}

#[test]
fn test_label_repr() {
    let g = meta_grammar();
    let reprs: Vec<String> = g.labels.iter().map(|l| l.repr(&g)).collect();
    assert_eq!(reprs[0], "EMPTY");
    assert_eq!(reprs[1], "MSTART");
    assert_eq!(reprs[3], "NEWLINE");
    assert_eq!(reprs[4], "ENDMARKER");
    assert_eq!(reprs[13], "ATOM");
    assert_eq!(Label::new(1, Some("if")).repr(&g), "NAME(if)");
    assert_eq!(Label::new(300, None).repr(&g), "NT300");
}

#[test]
fn test_small_grammar_firsts() {
    let mut g = small_grammar();
    let reports = g.add_firsts().unwrap();
    assert!(reports.is_empty());
    // labels: 0 EMPTY, 1 A, 2 B, 3 'x', 4 NAME, 5 NUMBER
    assert_eq!(firsts(&g), vec![vec![4, 5], vec![4, 5], vec![5]]);
    assert_eq!(g.describe_set(g.first_set(NONTERMINAL + 2).unwrap()), "{ NUMBER }");
}

#[test]
fn test_order_independence() {
    let mut forward = small_grammar();
    forward.add_firsts_in_order(&[0, 1, 2]).unwrap();
    let mut backward = small_grammar();
    backward.add_firsts_in_order(&[2, 1, 0]).unwrap();
    let mut middle = small_grammar();
    middle.add_firsts_in_order(&[1, 0, 2]).unwrap();
    assert_eq!(firsts(&forward), firsts(&backward));
    assert_eq!(firsts(&forward), firsts(&middle));
}

#[test]
fn test_direct_left_recursion_reported() {
    // E: E '+' NAME | NAME
    let mut g = Grammar::new(NONTERMINAL);
    let e = g.add_dfa("E");
    let le = g.labels.add(e, None);
    let plus = g.labels.add(TokenKind::Plus.as_type(), None);
    let name = g.labels.add(TokenKind::Name.as_type(), None);
    let d = g.find_dfa_mut(e).unwrap();
    for _ in 0..3 {
        d.add_state();
    }
    d.add_arc(0, 1, le);
    d.add_arc(1, 0, plus);
    d.add_arc(0, 2, name);

    let reports = g.add_firsts().unwrap();
    assert_eq!(
        reports,
        vec![LeftRecursion {
            symbol: e,
            name: "E".to_string(),
            below: "E".to_string(),
        }]
    );
    // Incomplete, but finalized
    assert_eq!(firsts(&g), vec![vec![name]]);
}

#[test]
fn test_indirect_left_recursion_reported() {
    // A: B 'a', B: A 'b' | NUMBER
    let mut g = Grammar::new(NONTERMINAL);
    let a = g.add_dfa("A");
    let b = g.add_dfa("B");
    let la = g.labels.add(a, None);
    let lb = g.labels.add(b, None);
    let number = g.labels.add(TokenKind::Number.as_type(), None);
    let d = g.find_dfa_mut(a).unwrap();
    d.add_state();
    d.add_state();
    d.add_arc(0, 1, lb);
    let d = g.find_dfa_mut(b).unwrap();
    d.add_state();
    d.add_state();
    d.add_arc(0, 1, la);
    d.add_arc(0, 1, number);

    let reports = g.add_firsts().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "A");
    assert_eq!(reports[0].below, "B");
    assert_eq!(firsts(&g), vec![vec![number], vec![number]]);
}

#[test]
fn test_undefined_nonterminal_is_error() {
    let mut g = Grammar::new(NONTERMINAL);
    let s = g.add_dfa("S");
    let missing = g.labels.add(NONTERMINAL + 5, None);
    let d = g.find_dfa_mut(s).unwrap();
    d.add_state();
    d.add_arc(0, 0, missing);
    assert!(matches!(g.add_firsts(), Err(CoilError::Grammar(_))));
    assert!(g.validate().is_err());
}

#[test]
fn test_bad_order_index_is_error() {
    let mut g = small_grammar();
    assert!(g.add_firsts_in_order(&[7]).is_err());
}

#[test]
fn test_meta_grammar_layout() {
    let g = meta_grammar();
    assert_eq!(g.start, MSTART);
    assert_eq!(g.labels.len(), 19);
    let names: Vec<&str> = g.dfas.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["MSTART", "RULE", "RHS", "ALT", "ITEM", "ATOM"]);
    let states: Vec<usize> = g.dfas.iter().map(|d| d.states.len()).collect();
    assert_eq!(states, [2, 5, 2, 2, 5, 4]);
    assert!(g.dfas.iter().all(|d| d.initial == 0));
    assert!(g.dfas.iter().all(|d| d.first.done().is_some()));
}

#[test]
fn test_meta_grammar_recomputed_firsts_match_tables() {
    let shipped = meta_grammar();
    let mut g = meta_grammar();
    g.clear_firsts();
    assert!(g.first_set(RULE).is_none());
    assert!(g.add_firsts().unwrap().is_empty());
    for symbol in [MSTART, RULE, RHS, ALT, ITEM, ATOM] {
        assert_eq!(
            g.first_set(symbol).unwrap().as_bytes(),
            shipped.first_set(symbol).unwrap().as_bytes(),
            "symbol {}",
            symbol
        );
    }
    assert_eq!(g.describe_set(g.first_set(ATOM).unwrap()), "{ NAME STRING LPAR }");
}

#[test]
fn test_add_firsts_keeps_precomputed_sets() {
    let mut g = meta_grammar();
    let before = g.clone();
    assert!(g.add_firsts().unwrap().is_empty());
    assert_eq!(g, before);
}

#[test]
fn test_from_def_rejects_bad_first_length() {
    use super::tables::{arc, DfaDef, GrammarDef, LabelDef, StateDef};
    const ARCS: &[tables::ArcDef] = &[arc(0, 0)];
    const STATES: &[StateDef] = &[StateDef { arcs: ARCS }];
    const DFAS: &[DfaDef] = &[DfaDef {
        symbol: NONTERMINAL,
        name: "S",
        initial: 0,
        states: STATES,
        first: Some(b"\x00\x00"),
    }];
    const LABELS: &[LabelDef] = &[LabelDef {
        ty: 0,
        literal: Some("EMPTY"),
    }];
    let def = GrammarDef {
        dfas: DFAS,
        labels: LABELS,
        start: NONTERMINAL,
    };
    assert!(Grammar::from_def(&def).is_err());
}

#[test]
fn test_json_round_trip_keeps_firsts() {
    let g = meta_grammar();
    let json = g.to_json().unwrap();
    let back = Grammar::from_json(&json).unwrap();
    assert_eq!(back, g);
    assert!(Grammar::from_json("{\"dfas\": 3}").is_err());
}

#[test]
fn test_extreme_symbols_rejected_without_overflow() {
    assert_eq!(Grammar::dfa_index(i32::MIN), None);
    assert_eq!(Grammar::dfa_index(NONTERMINAL - 1), None);
    assert_eq!(Grammar::dfa_index(NONTERMINAL + 2), Some(2));

    let json = r#"{
        "dfas": [{"symbol": -2147483648, "name": "S", "initial": 0,
                  "states": [{"arcs": []}]}],
        "labels": [],
        "start": -2147483648
    }"#;
    assert!(matches!(Grammar::from_json(json), Err(CoilError::Grammar(_))));

    let mut g = meta_grammar();
    g.start = i32::MIN;
    assert!(g.find_dfa(g.start).is_none());
    assert!(g.validate().is_err());
}
