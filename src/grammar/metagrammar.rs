//! The grammar of grammar files
//!
//! ```text
//! MSTART: (RULE | NEWLINE)* ENDMARKER
//! RULE:   NAME ':' RHS NEWLINE
//! RHS:    ALT ('|' ALT)*
//! ALT:    ITEM+
//! ITEM:   '[' RHS ']' | ATOM ['+' | '*']
//! ATOM:   NAME | STRING | '(' RHS ')'
//! ```

use once_cell::sync::Lazy;

use super::tables::{arc, ArcDef, DfaDef, GrammarDef, LabelDef, StateDef};
use super::Grammar;

pub const MSTART: i32 = 256;
pub const RULE: i32 = 257;
pub const RHS: i32 = 258;
pub const ALT: i32 = 259;
pub const ITEM: i32 = 260;
pub const ATOM: i32 = 261;

const ARCS_0_0: &[ArcDef] = &[arc(2, 0), arc(3, 0), arc(4, 1)];
const ARCS_0_1: &[ArcDef] = &[arc(0, 1)];
const STATES_0: &[StateDef] = &[StateDef { arcs: ARCS_0_0 }, StateDef { arcs: ARCS_0_1 }];

const ARCS_1_0: &[ArcDef] = &[arc(5, 1)];
const ARCS_1_1: &[ArcDef] = &[arc(6, 2)];
const ARCS_1_2: &[ArcDef] = &[arc(7, 3)];
const ARCS_1_3: &[ArcDef] = &[arc(3, 4)];
const ARCS_1_4: &[ArcDef] = &[arc(0, 4)];
const STATES_1: &[StateDef] = &[
    StateDef { arcs: ARCS_1_0 },
    StateDef { arcs: ARCS_1_1 },
    StateDef { arcs: ARCS_1_2 },
    StateDef { arcs: ARCS_1_3 },
    StateDef { arcs: ARCS_1_4 },
];

const ARCS_2_0: &[ArcDef] = &[arc(8, 1)];
const ARCS_2_1: &[ArcDef] = &[arc(9, 0), arc(0, 1)];
const STATES_2: &[StateDef] = &[StateDef { arcs: ARCS_2_0 }, StateDef { arcs: ARCS_2_1 }];

const ARCS_3_0: &[ArcDef] = &[arc(10, 1)];
const ARCS_3_1: &[ArcDef] = &[arc(10, 1), arc(0, 1)];
const STATES_3: &[StateDef] = &[StateDef { arcs: ARCS_3_0 }, StateDef { arcs: ARCS_3_1 }];

const ARCS_4_0: &[ArcDef] = &[arc(11, 1), arc(13, 2)];
const ARCS_4_1: &[ArcDef] = &[arc(7, 3)];
const ARCS_4_2: &[ArcDef] = &[arc(14, 4), arc(15, 4), arc(0, 2)];
const ARCS_4_3: &[ArcDef] = &[arc(12, 4)];
const ARCS_4_4: &[ArcDef] = &[arc(0, 4)];
const STATES_4: &[StateDef] = &[
    StateDef { arcs: ARCS_4_0 },
    StateDef { arcs: ARCS_4_1 },
    StateDef { arcs: ARCS_4_2 },
    StateDef { arcs: ARCS_4_3 },
    StateDef { arcs: ARCS_4_4 },
];

const ARCS_5_0: &[ArcDef] = &[arc(5, 1), arc(16, 1), arc(17, 2)];
const ARCS_5_1: &[ArcDef] = &[arc(0, 1)];
const ARCS_5_2: &[ArcDef] = &[arc(7, 3)];
const ARCS_5_3: &[ArcDef] = &[arc(18, 1)];
const STATES_5: &[StateDef] = &[
    StateDef { arcs: ARCS_5_0 },
    StateDef { arcs: ARCS_5_1 },
    StateDef { arcs: ARCS_5_2 },
    StateDef { arcs: ARCS_5_3 },
];

const DFAS: &[DfaDef] = &[
    DfaDef {
        symbol: MSTART,
        name: "MSTART",
        initial: 0,
        states: STATES_0,
        first: Some(b"\x38\x00\x00"),
    },
    DfaDef {
        symbol: RULE,
        name: "RULE",
        initial: 0,
        states: STATES_1,
        first: Some(b"\x20\x00\x00"),
    },
    DfaDef {
        symbol: RHS,
        name: "RHS",
        initial: 0,
        states: STATES_2,
        first: Some(b"\x20\x08\x03"),
    },
    DfaDef {
        symbol: ALT,
        name: "ALT",
        initial: 0,
        states: STATES_3,
        first: Some(b"\x20\x08\x03"),
    },
    DfaDef {
        symbol: ITEM,
        name: "ITEM",
        initial: 0,
        states: STATES_4,
        first: Some(b"\x20\x08\x03"),
    },
    DfaDef {
        symbol: ATOM,
        name: "ATOM",
        initial: 0,
        states: STATES_5,
        first: Some(b"\x20\x00\x03"),
    },
];

const fn label(ty: i32) -> LabelDef {
    LabelDef { ty, literal: None }
}

const LABELS: &[LabelDef] = &[
    LabelDef {
        ty: 0,
        literal: Some("EMPTY"),
    },
    label(MSTART),
    label(RULE),
    label(4),
    label(0),
    label(1),
    label(11),
    label(RHS),
    label(ALT),
    label(18),
    label(ITEM),
    label(9),
    label(10),
    label(ATOM),
    label(16),
    label(14),
    label(3),
    label(7),
    label(8),
];

pub const META_GRAMMAR_DEF: GrammarDef = GrammarDef {
    dfas: DFAS,
    labels: LABELS,
    start: MSTART,
};

static META_GRAMMAR: Lazy<Grammar> = Lazy::new(|| match Grammar::from_def(&META_GRAMMAR_DEF) {
    Ok(grammar) => grammar,
    Err(err) => unreachable!("built-in meta-grammar is malformed: {}", err),
});

/// A fresh copy of the meta-grammar with its precomputed FIRST sets
pub fn meta_grammar() -> Grammar {
    META_GRAMMAR.clone()
}
