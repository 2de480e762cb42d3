//! A parser library for Hearts of Iron IV script and history files.
//!
//! The format is the Paradox brace/assignment dialect: `key = value`,
//! `key = { ... }`, bare values inside braces, `#` line comments, and
//! comparison operators (`<`, `>`, `<=`, `>=`, `!=`) inside triggers.
//! Game files are UTF-8, frequently with a byte-order mark.

pub mod de;
pub mod error;

pub use de::{DeError, from_node};
pub use error::ParseError;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;

/// The binding operator between a key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `!=`
    Ne,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Ne => "!=",
        }
    }
}

/// Represents a token scanned from a HOI4 text file.
#[derive(Debug, Clone, PartialEq)]
pub enum TxtToken {
    /// An unquoted word (keys, tags, dates, `yes`/`no`).
    Identifier(String),
    /// A quoted string value.
    StringValue(String),
    /// A floating point number.
    FloatValue(f64),
    /// An integer number.
    IntValue(i64),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `=` or a comparison.
    Op(Operator),
}

/// Represents an item in the parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TxtAstItem {
    /// A `key <op> value` binding. Children are `[key, value]`.
    Assignment(Operator),
    /// A brace block (or the file root).
    AssignmentList,
    Identifier(String),
    StringValue(String),
    FloatValue(f64),
    IntValue(i64),
}

/// A node in the HOI4 parse tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TxtParseNode {
    pub children: Vec<TxtParseNode>,
    pub entry: TxtAstItem,
}

impl TxtParseNode {
    fn leaf(entry: TxtAstItem) -> TxtParseNode {
        TxtParseNode {
            children: Vec::new(),
            entry,
        }
    }

    fn list() -> TxtParseNode {
        TxtParseNode::leaf(TxtAstItem::AssignmentList)
    }

    /// The key of an assignment node, rendered as text.
    pub fn key(&self) -> Option<String> {
        match self.entry {
            TxtAstItem::Assignment(_) => self.children.first().and_then(|k| k.scalar_text()),
            _ => None,
        }
    }

    /// Scalar values rendered as text; `None` for lists and assignments.
    pub fn scalar_text(&self) -> Option<String> {
        match &self.entry {
            TxtAstItem::Identifier(s) | TxtAstItem::StringValue(s) => Some(s.clone()),
            TxtAstItem::IntValue(i) => Some(i.to_string()),
            TxtAstItem::FloatValue(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// The value of the first `key = value` child of this list.
    pub fn get(&self, key: &str) -> Option<&TxtParseNode> {
        self.children
            .iter()
            .filter(|c| matches!(c.entry, TxtAstItem::Assignment(Operator::Eq)))
            .find(|c| c.key().as_deref() == Some(key))
            .and_then(|c| c.children.get(1))
    }

    /// Follows a `/`-separated chain of keys, e.g. `state/history/owner`.
    pub fn get_path(&self, path: &str) -> Option<&TxtParseNode> {
        path.split('/')
            .try_fold(self, |node, key| node.get(key))
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '{' | '}' | '#' | '"' | '<' | '>')
}

fn classify_word(word: String) -> TxtToken {
    let numeric_start = word
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if numeric_start {
        if let Ok(i) = word.parse::<i64>() {
            return TxtToken::IntValue(i);
        }
        if let Ok(f) = word.parse::<f64>() {
            if f.is_finite() {
                return TxtToken::FloatValue(f);
            }
        }
    }
    // Dates (1936.1.1), tags and keywords all land here.
    TxtToken::Identifier(word)
}

pub trait Hoi4Txt {
    /// Splits script text into tokens. Comments and byte-order marks are dropped.
    fn tokenize(contents: &str) -> Vec<TxtToken> {
        let chars: Vec<char> = contents.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\u{feff}' => i += 1,
                c if c.is_whitespace() => i += 1,
                '#' => {
                    while i < chars.len() && chars[i] != '\n' && chars[i] != '\r' {
                        i += 1;
                    }
                }
                '{' => {
                    tokens.push(TxtToken::LeftBrace);
                    i += 1;
                }
                '}' => {
                    tokens.push(TxtToken::RightBrace);
                    i += 1;
                }
                '=' => {
                    tokens.push(TxtToken::Op(Operator::Eq));
                    i += 1;
                }
                '<' | '>' => {
                    let followed_by_eq = chars.get(i + 1) == Some(&'=');
                    let op = match (c, followed_by_eq) {
                        ('<', true) => Operator::Le,
                        ('<', false) => Operator::Lt,
                        (_, true) => Operator::Ge,
                        (_, false) => Operator::Gt,
                    };
                    tokens.push(TxtToken::Op(op));
                    i += if followed_by_eq { 2 } else { 1 };
                }
                '!' if chars.get(i + 1) == Some(&'=') => {
                    tokens.push(TxtToken::Op(Operator::Ne));
                    i += 2;
                }
                '"' => {
                    i += 1;
                    let mut s = String::new();
                    while i < chars.len() && chars[i] != '"' {
                        if chars[i] == '\\' && i + 1 < chars.len() {
                            i += 1;
                        }
                        s.push(chars[i]);
                        i += 1;
                    }
                    // closing quote (absent at EOF)
                    i += 1;
                    tokens.push(TxtToken::StringValue(s));
                }
                _ => {
                    let mut word = String::new();
                    while i < chars.len() && !is_delimiter(chars[i]) {
                        if chars[i] == '!' && chars.get(i + 1) == Some(&'=') {
                            break;
                        }
                        word.push(chars[i]);
                        i += 1;
                    }
                    tokens.push(classify_word(word));
                }
            }
        }
        tokens
    }

    /// Reads and tokenizes a file, decoding UTF-8 and stripping any BOM.
    fn open_txt(path: &Path) -> std::io::Result<Vec<TxtToken>> {
        let file = File::open(path)?;
        let mut buf_reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .encoding(Some(UTF_8))
                .bom_sniffing(true)
                .build(file),
        );
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;
        Ok(Self::tokenize(&contents))
    }

    fn parse_terminal(tokens: &[TxtToken], pos: usize) -> Result<TxtParseNode, ParseError> {
        let Some(tok) = tokens.get(pos) else {
            return Err(ParseError::UnclosedBlock {
                opened_at: pos.saturating_sub(1),
            });
        };
        let entry = match tok {
            TxtToken::Identifier(s) => TxtAstItem::Identifier(s.clone()),
            TxtToken::StringValue(s) => TxtAstItem::StringValue(s.clone()),
            TxtToken::IntValue(i) => TxtAstItem::IntValue(*i),
            TxtToken::FloatValue(f) => TxtAstItem::FloatValue(*f),
            _ => {
                return Err(ParseError::ExpectedValue {
                    position: pos,
                    found: tok.clone(),
                });
            }
        };
        Ok(TxtParseNode::leaf(entry))
    }

    /// Parses the contents of a brace block (or the file root when `nested`
    /// is false). Returns the list and the position after it. At the root a
    /// stray `}` ends the list, the way the game stops reading the file.
    fn parse_assignment_list(
        tokens: &[TxtToken],
        pos: usize,
        nested: bool,
    ) -> Result<(TxtParseNode, usize), ParseError> {
        let opened_at = pos.saturating_sub(1);
        let mut list = TxtParseNode::list();
        let mut pos = pos;
        loop {
            let Some(tok) = tokens.get(pos) else {
                if nested {
                    return Err(ParseError::UnclosedBlock { opened_at });
                }
                break;
            };
            match tok {
                TxtToken::RightBrace => {
                    if nested {
                        pos += 1;
                    }
                    break;
                }
                TxtToken::LeftBrace => {
                    // anonymous block inside a list: { { 1 2 } { 3 4 } }
                    let (inner, next) = Self::parse_assignment_list(tokens, pos + 1, true)?;
                    list.children.push(inner);
                    pos = next;
                }
                TxtToken::Op(op) => {
                    return Err(ParseError::OperatorWithoutKey {
                        position: pos,
                        operator: *op,
                    });
                }
                _ => {
                    let lhs = Self::parse_terminal(tokens, pos)?;
                    match tokens.get(pos + 1) {
                        Some(TxtToken::Op(op)) => {
                            let rhs_pos = pos + 2;
                            let missing = || ParseError::MissingValue {
                                position: rhs_pos,
                                key: lhs.scalar_text().unwrap_or_default(),
                            };
                            let (rhs, next) = match tokens.get(rhs_pos) {
                                None | Some(TxtToken::RightBrace) | Some(TxtToken::Op(_)) => {
                                    return Err(missing());
                                }
                                Some(TxtToken::LeftBrace) => {
                                    Self::parse_assignment_list(tokens, rhs_pos + 1, true)?
                                }
                                Some(_) => (Self::parse_terminal(tokens, rhs_pos)?, rhs_pos + 1),
                            };
                            let mut assignment = TxtParseNode::leaf(TxtAstItem::Assignment(*op));
                            assignment.children.push(lhs);
                            assignment.children.push(rhs);
                            list.children.push(assignment);
                            pos = next;
                        }
                        _ => {
                            list.children.push(lhs);
                            pos += 1;
                        }
                    }
                }
            }
        }
        Ok((list, pos))
    }

    /// Parses as much of the token stream as the game would read, returning
    /// the tree and the number of tokens consumed.
    fn parse_partial(tokens: &[TxtToken]) -> Result<(TxtParseNode, usize), ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        Self::parse_assignment_list(tokens, 0, false)
    }

    /// Parses a whole token stream; trailing tokens after a stray `}` are an error.
    fn parse(tokens: Vec<TxtToken>) -> Result<TxtParseNode, ParseError> {
        let (node, consumed) = Self::parse_partial(&tokens)?;
        if consumed == tokens.len() {
            Ok(node)
        } else {
            Err(ParseError::StrayClosingBrace {
                position: consumed,
                remaining: tokens.len() - consumed - 1,
            })
        }
    }

    /// Renders a tree back to script text.
    fn pretty_print(ast: &TxtParseNode, depth: usize, out: &mut String) -> Result<(), ParseError> {
        let indent = |out: &mut String, depth: usize| {
            for _ in 0..depth {
                out.push_str("  ");
            }
        };
        match &ast.entry {
            TxtAstItem::AssignmentList => {
                if depth > 0 {
                    out.push_str("{\n");
                }
                for child in &ast.children {
                    if !matches!(child.entry, TxtAstItem::Assignment(_)) {
                        indent(out, depth);
                    }
                    Self::pretty_print(child, depth + 1, out)?;
                }
                if depth > 0 {
                    indent(out, depth.saturating_sub(1));
                    out.push_str("}\n");
                }
            }
            TxtAstItem::Assignment(op) => {
                let key = ast.key().ok_or(ParseError::MalformedAssignment)?;
                let val = ast.children.get(1).ok_or(ParseError::MalformedAssignment)?;
                indent(out, depth.saturating_sub(1));
                out.push_str(&key);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                Self::pretty_print(val, depth, out)?;
            }
            TxtAstItem::IntValue(i) => out.push_str(&format!("{}\n", i)),
            TxtAstItem::FloatValue(f) => out.push_str(&format!("{:?}\n", f)),
            TxtAstItem::Identifier(id) => out.push_str(&format!("{}\n", id)),
            TxtAstItem::StringValue(s) => out.push_str(&format!("\"{}\"\n", s)),
        }
        Ok(())
    }
}

pub struct DefaultHoi4Txt {}
impl Hoi4Txt for DefaultHoi4Txt {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> TxtParseNode {
        DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize(src)).unwrap()
    }

    #[test]
    fn nonexistent() {
        let r = DefaultHoi4Txt::open_txt(Path::new("path/to/nowhere"));
        assert!(r.is_err());
    }

    #[test]
    fn tokenize_numbers_dates_and_strings() {
        let tokens = DefaultHoi4Txt::tokenize("a = 5 b = -0.25 1936.1.1 = { } c = \"x y\" # gone");
        assert_eq!(
            tokens,
            vec![
                TxtToken::Identifier("a".into()),
                TxtToken::Op(Operator::Eq),
                TxtToken::IntValue(5),
                TxtToken::Identifier("b".into()),
                TxtToken::Op(Operator::Eq),
                TxtToken::FloatValue(-0.25),
                TxtToken::Identifier("1936.1.1".into()),
                TxtToken::Op(Operator::Eq),
                TxtToken::LeftBrace,
                TxtToken::RightBrace,
                TxtToken::Identifier("c".into()),
                TxtToken::Op(Operator::Eq),
                TxtToken::StringValue("x y".into()),
            ]
        );
    }

    #[test]
    fn tokenize_comparisons_and_bom() {
        let tokens = DefaultHoi4Txt::tokenize("\u{feff}x>=3 y<2 z!=GER");
        assert_eq!(tokens[0], TxtToken::Identifier("x".into()));
        assert_eq!(tokens[1], TxtToken::Op(Operator::Ge));
        assert_eq!(tokens[4], TxtToken::Op(Operator::Lt));
        assert_eq!(tokens[7], TxtToken::Op(Operator::Ne));
        assert_eq!(tokens[8], TxtToken::Identifier("GER".into()));
    }

    #[test]
    fn nan_like_words_stay_identifiers() {
        let tokens = DefaultHoi4Txt::tokenize("NaN inf");
        assert_eq!(tokens[0], TxtToken::Identifier("NaN".into()));
        assert_eq!(tokens[1], TxtToken::Identifier("inf".into()));
    }

    #[test]
    fn get_path_walks_nested_blocks() {
        let ast = parse_str(
            "state = { id = 64 history = { owner = GER buildings = { infrastructure = 5 } } }",
        );
        assert_eq!(
            ast.get_path("state/history/owner").and_then(|n| n.scalar_text()),
            Some("GER".to_string())
        );
        assert_eq!(
            ast.get_path("state/history/buildings/infrastructure").map(|n| &n.entry),
            Some(&TxtAstItem::IntValue(5))
        );
        assert!(ast.get_path("state/missing/owner").is_none());
    }

    #[test]
    fn stray_closing_brace_stops_reading() {
        let tokens = DefaultHoi4Txt::tokenize("a = 1 } b = 2");
        let (node, consumed) = DefaultHoi4Txt::parse_partial(&tokens).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(node.children.len(), 1);

        let err = DefaultHoi4Txt::parse(tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::StrayClosingBrace {
                position: 3,
                remaining: 3
            }
        );
    }

    #[test]
    fn unclosed_block_reports_its_brace() {
        let err = DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize("a = { b = 1")).unwrap_err();
        assert_eq!(err, ParseError::UnclosedBlock { opened_at: 2 });

        // the innermost open block is reported
        let err = DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize("a = { b = { 1 } c = {"))
            .unwrap_err();
        assert_eq!(err, ParseError::UnclosedBlock { opened_at: 10 });
    }

    #[test]
    fn missing_value_names_the_key() {
        let err = DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize("a =")).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingValue {
                position: 2,
                key: "a".to_string()
            }
        );

        let err = DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize("x = { owner = }")).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingValue {
                position: 5,
                key: "owner".to_string()
            }
        );
    }

    #[test]
    fn operator_without_key() {
        let err = DefaultHoi4Txt::parse(DefaultHoi4Txt::tokenize("a = { >= 3 }")).unwrap_err();
        assert_eq!(
            err,
            ParseError::OperatorWithoutKey {
                position: 3,
                operator: Operator::Ge
            }
        );
    }

    #[test]
    fn pretty_print_rejects_keyless_assignment() {
        let mut root = TxtParseNode::list();
        root.children.push(TxtParseNode::leaf(TxtAstItem::Assignment(Operator::Eq)));
        let mut out = String::new();
        assert_eq!(
            DefaultHoi4Txt::pretty_print(&root, 0, &mut out),
            Err(ParseError::MalformedAssignment)
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            DefaultHoi4Txt::parse(Vec::new()).unwrap_err(),
            ParseError::EmptyInput
        );
    }

    #[test]
    fn pretty_print_round_trips_structure() {
        let ast = parse_str("a = { b = 1 c = { 1 2 } } d = \"s\"");
        let mut out = String::new();
        DefaultHoi4Txt::pretty_print(&ast, 0, &mut out).unwrap();
        let reparsed = parse_str(&out);
        assert_eq!(ast, reparsed);
    }
}
