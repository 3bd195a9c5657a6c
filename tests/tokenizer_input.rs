use coil::config::{Config, CONFIG_FILE};
use coil::tokenizer::{Status, TokenKind, Tokenizer};
use std::fs;
use std::io::{BufReader, Cursor};
use tempfile::TempDir;

fn kinds(tokenizer: Tokenizer<'_>) -> Vec<TokenKind> {
    tokenizer.map(|t| t.kind).collect()
}

#[test]
fn test_nested_blocks_balance() {
    let src = "\
def f(x):
    if x:
        return 1
    return 2

f(3)
";
    let toks = kinds(Tokenizer::from_text(src));
    let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
    let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(dedents, 2);
    assert_eq!(toks.last(), Some(&TokenKind::EndMarker));
}

#[test]
fn test_file_and_text_agree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prog.txt");
    let src = "a = [1,\n     2]\nwhile a:\n\tpass\n";
    fs::write(&path, src).unwrap();

    let from_file = kinds(Tokenizer::from_reader(BufReader::new(fs::File::open(&path).unwrap())));
    assert_eq!(from_file, kinds(Tokenizer::from_text(src)));
}

#[test]
fn test_config_file_drives_tokenizer() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "[tokenizer]\ntab_size = 4\nmax_indent = 2\n",
    )
    .unwrap();
    let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
    let tok_config = config.tokenizer_config();

    // A tab is one four-column stop, the same as four spaces
    let src = "if a:\n\tb\n    c\n";
    let toks = kinds(Tokenizer::from_text(src).with_config(&tok_config));
    assert!(!toks.contains(&TokenKind::ErrorToken));

    // Two levels of indentation exceed a two-entry stack
    let deep = "a\n b\n  c\n";
    let mut tokenizer = Tokenizer::from_reader(Cursor::new(deep)).with_config(&tok_config);
    let toks: Vec<TokenKind> = tokenizer.by_ref().map(|t| t.kind).collect();
    assert!(toks.contains(&TokenKind::ErrorToken));
    assert!(matches!(tokenizer.status(), Status::Token(_)));
}

#[test]
fn test_prompts_written_for_interactive_input() {
    let mut prompts = Vec::new();
    {
        let tokenizer = Tokenizer::from_reader(Cursor::new("x\n"))
            .with_prompts(Some("> ".to_string()), Some(". ".to_string()))
            .with_prompt_output(Box::new(&mut prompts));
        let toks = kinds(tokenizer);
        assert_eq!(toks, [TokenKind::Name, TokenKind::Newline, TokenKind::EndMarker]);
    }
    assert_eq!(prompts, b"> . \n");
}
