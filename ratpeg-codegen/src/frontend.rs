//! Hand-written recursive-descent frontend for the grammar dialect
//! (spec.md §4.5), grounded in
//! `examples/original_source/src/parsival/peg_grammar.py` (the
//! dialect described in itself) and
//! `.../scripts/grammar_generator/gram_to_py.py` (the generator that
//! walks it): a hand-rolled cursor over tokens rather than one built
//! atop a parser-combinator crate.
//!
//! `INDENT`/`DEDENT`-sensitive rule continuation is deliberately not
//! implemented (SPEC_FULL.md §9 Open Question): a rule's alternatives
//! may still span multiple lines, but each continuation line must
//! begin with `|` -- there is no significant-indentation tracking.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::syntax::*;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontendError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {} col {}", self.message, self.line, self.col)
    }
}

impl std::error::Error for FrontendError {}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Regex(String),
    Colon,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Amp,
    Bang,
    Tilde,
    Dot,
    Eq,
    Star,
    Plus,
    Question,
    At,
    Dollar,
    Newline,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    col: usize,
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn err(&self, message: impl Into<String>) -> FrontendError {
        FrontendError {
            message: message.into(),
            line: self.line,
            col: self.col,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        next
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, FrontendError> {
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string literal")),
                Some((_, '\\')) => {
                    let (_, escaped) = self
                        .bump()
                        .ok_or_else(|| self.err("unterminated escape sequence"))?;
                    s.push('\\');
                    s.push(escaped);
                }
                Some((_, c)) if c == quote => break,
                Some((_, c)) => s.push(c),
            }
        }
        Ok(s)
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::new();
        s.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s
    }

    fn tokenize(mut self) -> Result<Vec<Token>, FrontendError> {
        let mut out = Vec::new();
        loop {
            while let Some(c) = self.peek_char() {
                if c == ' ' || c == '\t' || c == '\r' {
                    self.bump();
                } else if c == '#' {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                } else {
                    break;
                }
            }
            let (line, col) = (self.line, self.col);
            let Some((_, c)) = self.bump() else {
                break;
            };
            let tok = match c {
                '\n' => Tok::Newline,
                ':' => Tok::Colon,
                '|' => Tok::Pipe,
                '(' => Tok::LParen,
                ')' => Tok::RParen,
                '[' => Tok::LBracket,
                ']' => Tok::RBracket,
                '&' => Tok::Amp,
                '!' => Tok::Bang,
                '~' => Tok::Tilde,
                '.' => Tok::Dot,
                '=' => Tok::Eq,
                '*' => Tok::Star,
                '+' => Tok::Plus,
                '?' => Tok::Question,
                '@' => Tok::At,
                '$' => Tok::Dollar,
                '\'' | '"' => Tok::Str(self.read_quoted(c)?),
                c if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_ident(c);
                    if ident == "r" && matches!(self.peek_char(), Some('\'') | Some('"')) {
                        let (_, quote) = self.bump().expect("peeked");
                        Tok::Regex(self.read_quoted(quote)?)
                    } else {
                        Tok::Ident(ident)
                    }
                }
                other => return Err(self.err(format!("unexpected character {other:?}"))),
            };
            out.push(Token { tok, line, col });
        }
        Ok(out)
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn err(&self, message: impl Into<String>) -> FrontendError {
        let (line, col) = self
            .tokens
            .get(self.pos)
            .map(|t| (t.line, t.col))
            .unwrap_or((0, 0));
        FrontendError {
            message: message.into(),
            line,
            col,
        }
    }

    fn bump(&mut self) -> Tok {
        let tok = self.tokens[self.pos].tok.clone();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: &Tok) -> Result<(), FrontendError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected {want:?}, found {:?}", self.peek())))
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(Tok::Newline)) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn parse_grammar(&mut self) -> Result<GrammarFile, FrontendError> {
        self.skip_newlines();
        let mut metas = Vec::new();
        while matches!(self.peek(), Some(Tok::At)) {
            metas.push(self.parse_meta()?);
            self.skip_newlines();
        }
        let mut rules = Vec::new();
        while !self.at_end() {
            self.skip_newlines();
            if self.at_end() {
                break;
            }
            rules.push(self.parse_rule()?);
            self.skip_newlines();
        }
        if rules.is_empty() {
            return Err(self.err("grammar file declares no rules"));
        }
        Ok(GrammarFile { metas, rules })
    }

    fn parse_meta(&mut self) -> Result<Meta, FrontendError> {
        self.expect(&Tok::At)?;
        let name = self.expect_ident()?;
        let value = match self.peek() {
            Some(Tok::Ident(_)) => Some(MetaValue::Name(self.expect_ident()?)),
            Some(Tok::Str(_)) => {
                let Tok::Str(s) = self.bump() else {
                    unreachable!()
                };
                Some(MetaValue::Str(s))
            }
            _ => None,
        };
        if matches!(self.peek(), Some(Tok::Newline)) {
            self.pos += 1;
        }
        Ok(Meta { name, value })
    }

    fn expect_ident(&mut self) -> Result<String, FrontendError> {
        match self.peek().cloned() {
            Some(Tok::Ident(s)) => {
                self.pos += 1;
                Ok(s)
            }
            other => Err(self.err(format!("expected identifier, found {other:?}"))),
        }
    }

    fn parse_rule(&mut self) -> Result<RuleDecl, FrontendError> {
        let name = self.expect_ident()?;
        let type_annotation = if matches!(self.peek(), Some(Tok::LBracket)) {
            self.pos += 1;
            let type_name = self.expect_ident()?;
            let list = matches!(self.peek(), Some(Tok::Star));
            if list {
                self.pos += 1;
            }
            self.expect(&Tok::RBracket)?;
            Some(TypeAnnotation { type_name, list })
        } else {
            None
        };
        self.expect(&Tok::Colon)?;
        let mut alts = vec![self.parse_alt()?];
        while matches!(self.peek(), Some(Tok::Pipe)) {
            self.pos += 1;
            alts.push(self.parse_alt()?);
        }
        if matches!(self.peek(), Some(Tok::Newline)) {
            self.pos += 1;
        }
        // Leading-`|` continuation lines (our stand-in for the
        // original's INDENT/DEDENT-delimited continuation block).
        loop {
            let save = self.pos;
            self.skip_newlines();
            if matches!(self.peek(), Some(Tok::Pipe)) {
                self.pos += 1;
                alts.push(self.parse_alt()?);
                while matches!(self.peek(), Some(Tok::Pipe)) {
                    self.pos += 1;
                    alts.push(self.parse_alt()?);
                }
                if matches!(self.peek(), Some(Tok::Newline)) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
                break;
            }
        }
        Ok(RuleDecl {
            name,
            type_annotation,
            alts,
        })
    }

    /// Parses one `|`-delimited alternative: a run of named items up to
    /// (but not consuming) the next `|`, `)`, `]`, newline, or EOF.
    fn parse_alt(&mut self) -> Result<Alt, FrontendError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None
                | Some(Tok::Newline)
                | Some(Tok::Pipe)
                | Some(Tok::RParen)
                | Some(Tok::RBracket) => break,
                Some(Tok::Dollar) => {
                    self.pos += 1;
                    break;
                }
                _ => items.push(self.parse_named_item()?),
            }
        }
        if items.is_empty() {
            return Err(self.err("empty alternative"));
        }
        Ok(Alt { items })
    }

    fn parse_named_item(&mut self) -> Result<NamedItem, FrontendError> {
        if let (Some(Tok::Ident(name)), Some(Tok::Eq)) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.pos += 2;
            let item = self.parse_item()?;
            return Ok(NamedItem {
                name: Some(name),
                item,
            });
        }
        let item = self.parse_item()?;
        Ok(NamedItem { name: None, item })
    }

    fn parse_item(&mut self) -> Result<Item, FrontendError> {
        match self.peek() {
            Some(Tok::Tilde) => {
                self.pos += 1;
                Ok(Item::Cut)
            }
            Some(Tok::Amp) => {
                self.pos += 1;
                Ok(Item::Lookahead {
                    positive: true,
                    atom: self.parse_plain()?,
                })
            }
            Some(Tok::Bang) => {
                self.pos += 1;
                Ok(Item::Lookahead {
                    positive: false,
                    atom: self.parse_plain()?,
                })
            }
            Some(Tok::LBracket) => {
                self.pos += 1;
                let alts = self.parse_group_alts(&Tok::RBracket)?;
                self.expect(&Tok::RBracket)?;
                Ok(Item::Bracket(alts))
            }
            _ => {
                let node = self.parse_plain()?;
                if matches!(self.peek(), Some(Tok::Dot)) {
                    self.pos += 1;
                    let sep = node;
                    let node = self.parse_plain()?;
                    self.expect(&Tok::Plus)?;
                    Ok(Item::Separated { node, sep })
                } else if let Some(q) = self.peek_quantifier() {
                    self.pos += 1;
                    Ok(Item::Quantified { node, quantifier: q })
                } else {
                    Ok(Item::Plain(node))
                }
            }
        }
    }

    fn peek_quantifier(&self) -> Option<Quantifier> {
        match self.peek() {
            Some(Tok::Question) => Some(Quantifier::Optional),
            Some(Tok::Star) => Some(Quantifier::Star),
            Some(Tok::Plus) => Some(Quantifier::Plus),
            _ => None,
        }
    }

    fn parse_plain(&mut self) -> Result<Plain, FrontendError> {
        match self.peek().cloned() {
            Some(Tok::LParen) => {
                self.pos += 1;
                let alts = self.parse_group_alts(&Tok::RParen)?;
                self.expect(&Tok::RParen)?;
                Ok(Plain::Group(alts))
            }
            Some(Tok::Regex(pattern)) => {
                self.pos += 1;
                Ok(Plain::Regex(pattern))
            }
            Some(Tok::Str(s)) => {
                self.pos += 1;
                Ok(Plain::Str(s))
            }
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                Ok(Plain::Name(name))
            }
            other => Err(self.err(format!("expected an atom, found {other:?}"))),
        }
    }

    /// A `|`-separated list of alternatives inside `(...)`/`[...]`,
    /// tolerant of stray newlines (grammar files don't normally wrap
    /// inside a group, but nothing forbids it).
    fn parse_group_alts(&mut self, closer: &Tok) -> Result<Vec<Alt>, FrontendError> {
        self.skip_newlines();
        let mut alts = vec![self.parse_alt()?];
        loop {
            self.skip_newlines();
            if self.peek() == Some(closer) {
                break;
            }
            self.expect(&Tok::Pipe)?;
            alts.push(self.parse_alt()?);
        }
        Ok(alts)
    }
}

pub fn parse(src: &str) -> Result<GrammarFile, FrontendError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_grammar()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_union_rule() {
        let file = parse("Num: r\"[0-9]+\"\n").unwrap();
        assert_eq!(file.rules.len(), 1);
        assert_eq!(file.rules[0].name, "Num");
        assert_eq!(file.rules[0].alts.len(), 1);
    }

    #[test]
    fn parses_multiple_alternatives_and_continuation_lines() {
        let src = "Expr: left=Expr '+' right=Num\n     | Num\n";
        let file = parse(src).unwrap();
        assert_eq!(file.rules[0].alts.len(), 2);
        let first = &file.rules[0].alts[0];
        assert_eq!(first.items[0].name.as_deref(), Some("left"));
    }

    #[test]
    fn parses_meta_declarations() {
        let file = parse("@start Program\nProgram: NAME\n").unwrap();
        assert_eq!(file.metas.len(), 1);
        assert_eq!(file.metas[0].name, "start");
    }

    #[test]
    fn parses_separator_repetition_and_quantifiers() {
        let file = parse("Items: NAME.','+ NAME* NAME?\n").unwrap();
        let items = &file.rules[0].alts[0].items;
        assert!(matches!(items[0].item, Item::Separated { .. }));
        assert!(matches!(
            items[1].item,
            Item::Quantified { quantifier: Quantifier::Star, .. }
        ));
        assert!(matches!(
            items[2].item,
            Item::Quantified { quantifier: Quantifier::Optional, .. }
        ));
    }

    #[test]
    fn parses_lookahead_and_cut_and_bracket_group() {
        let file = parse("Paren: '(' ~ [NAME] ')'\n").unwrap();
        let items = &file.rules[0].alts[0].items;
        assert!(matches!(items[1].item, Item::Cut));
        assert!(matches!(items[2].item, Item::Bracket(_)));
    }

    #[test]
    fn rejects_empty_grammar() {
        assert!(parse("").is_err());
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(parse("Foo: 'abc\n").is_err());
    }
}
