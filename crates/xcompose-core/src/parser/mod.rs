// XCompose Rule Parser
// Parses Compose files into rules, expanding includes in place
//
// Grammar (see also XCompose(5)):
//
//   FILE          ::= { [PRODUCTION] [COMMENT] "\n" | INCLUDE }
//   INCLUDE       ::= "include" '"' INCLUDE_STRING '"'
//   PRODUCTION    ::= LHS ":" RHS [ COMMENT ]
//   COMMENT       ::= "#" {<any character except null or newline>}
//   LHS           ::= EVENT { EVENT }
//   EVENT         ::= [MODIFIER_LIST] "<" keysym ">"
//   MODIFIER_LIST ::= (["!"] {MODIFIER} ) | "None"
//   MODIFIER      ::= ["~"] MODIFIER_NAME
//   MODIFIER_NAME ::= ("Ctrl"|"Lock"|"Caps"|"Shift"|"Alt"|"Meta")
//   RHS           ::= ( STRING | keysym | STRING keysym )

mod encoding;
pub mod include;
mod scanner;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{ComposeError, ComposeResult};
use crate::keysym::{Keysym, KeysymResolver};
use crate::modifier::ModifierListBuilder;
use crate::rule::{Output, Rule, Sequence, MAX_INCLUDE_DEPTH, MAX_SEQUENCE_LEN, MAX_STRING_SIZE};

pub use include::{
    FsIncludeResolver, InMemoryIncludes, IncludeError, IncludeResolver, IncludeSource, NoIncludes,
};

use scanner::{Scanner, Token};

/// Compose file parser.
///
/// Parsing stops at the first error; a partially parsed file never yields
/// rules to the caller of [`Parser::parse`].
pub struct Parser<'a> {
    keysyms: &'a dyn KeysymResolver,
    includes: &'a dyn IncludeResolver,
}

impl<'a> Parser<'a> {
    pub fn new(keysyms: &'a dyn KeysymResolver, includes: &'a dyn IncludeResolver) -> Self {
        Self { keysyms, includes }
    }

    /// Parse a whole buffer into its rules, includes flattened in order
    pub fn parse(&self, input: &[u8], source_name: &str) -> ComposeResult<Vec<Rule>> {
        let mut rules = Vec::new();
        self.parse_with(input, source_name, &mut |rule| rules.push(rule))?;
        Ok(rules)
    }

    /// Parse a buffer, handing each rule to `sink` as soon as it is read
    pub fn parse_with(
        &self,
        input: &[u8],
        source_name: &str,
        sink: &mut dyn FnMut(Rule),
    ) -> ComposeResult<()> {
        self.parse_buffer(input, Arc::from(source_name), 0, sink)
    }

    fn parse_buffer(
        &self,
        input: &[u8],
        source: Arc<str>,
        depth: usize,
        sink: &mut dyn FnMut(Rule),
    ) -> ComposeResult<()> {
        let text = encoding::check_encoding(input, &source)?;
        let mut scanner = Scanner::new(text, source);

        loop {
            match scanner.lex()? {
                Token::EndOfLine => continue,
                Token::EndOfFile => return Ok(()),
                Token::Include => self.include(&mut scanner, depth, sink)?,
                first => {
                    let rule = self.rule(&mut scanner, first)?;
                    sink(rule);
                }
            }
        }
    }

    fn include(
        &self,
        scanner: &mut Scanner<'_>,
        depth: usize,
        sink: &mut dyn FnMut(Rule),
    ) -> ComposeResult<()> {
        let path = scanner.lex_include_path()?;
        let location = scanner.location();

        match scanner.lex()? {
            Token::EndOfLine | Token::EndOfFile => {}
            other => {
                return Err(scanner.error(format!(
                    "unexpected {} after include path",
                    other.describe()
                )))
            }
        }

        if depth >= MAX_INCLUDE_DEPTH {
            return Err(ComposeError::IncludeDepthExceeded {
                location,
                max: MAX_INCLUDE_DEPTH,
            });
        }

        let included = self
            .includes
            .resolve(path)
            .map_err(|err| ComposeError::Include {
                location: location.clone(),
                path: path.to_string(),
                reason: err.to_string(),
            })?;

        log::debug!("{}: including \"{}\"", location, included.name);
        self.parse_buffer(
            &included.contents,
            Arc::from(included.name.as_str()),
            depth + 1,
            sink,
        )
    }

    fn resolve_keysym(&self, name: &str) -> Option<Keysym> {
        self.keysyms
            .keysym_from_name(name)
            .filter(|keysym| !keysym.is_none())
    }

    fn rule<'s>(&self, scanner: &mut Scanner<'s>, first: Token<'s>) -> ComposeResult<Rule> {
        let location = scanner.location();
        let mut sequence = Sequence::new();
        let mut modifiers = SmallVec::new();
        let mut list = ModifierListBuilder::new();

        let mut tok = first;
        loop {
            match tok {
                Token::Colon => break,
                Token::Keysym(name) => {
                    let keysym = self.resolve_keysym(name).ok_or_else(|| {
                        scanner.error(format!("unrecognized keysym \"{}\" on left-hand side", name))
                    })?;
                    if sequence.len() == MAX_SEQUENCE_LEN {
                        return Err(scanner.error(format!(
                            "too many keysyms ({}) on left-hand side",
                            MAX_SEQUENCE_LEN + 1
                        )));
                    }
                    sequence.push(keysym);
                    modifiers.push(list.finish());
                }
                Token::Bang => list.bang().map_err(|e| scanner.error(e.to_string()))?,
                Token::Tilde => match scanner.lex()? {
                    Token::Ident(name) => list
                        .add(name, true)
                        .map_err(|e| scanner.error(e.to_string()))?,
                    other => {
                        return Err(scanner.error(format!(
                            "expected a modifier name after \"~\", found {}",
                            other.describe()
                        )))
                    }
                },
                Token::Ident("None") => list.none().map_err(|e| scanner.error(e.to_string()))?,
                Token::Ident(name) => list
                    .add(name, false)
                    .map_err(|e| scanner.error(e.to_string()))?,
                Token::EndOfLine | Token::EndOfFile => {
                    return Err(scanner.error("expected \":\" after the left-hand side"))
                }
                other => {
                    return Err(scanner.error(format!(
                        "unexpected {} on left-hand side",
                        other.describe()
                    )))
                }
            }
            tok = scanner.lex()?;
        }

        if !list.is_empty() {
            return Err(scanner.error("modifier list must be followed by a keysym"));
        }
        if sequence.is_empty() {
            return Err(scanner.error("expected at least one keysym on left-hand side"));
        }

        let output = self.right_hand_side(scanner)?;
        Ok(Rule {
            sequence,
            modifiers,
            output,
            location: Some(location),
        })
    }

    fn right_hand_side(&self, scanner: &mut Scanner<'_>) -> ComposeResult<Output> {
        let mut text: Option<String> = None;
        let mut keysym: Option<Keysym> = None;

        loop {
            match scanner.lex()? {
                Token::String(string) => {
                    if keysym.is_some() {
                        return Err(scanner.error("right-hand side string must come before the keysym"));
                    }
                    if text.is_some() {
                        return Err(scanner.error("right-hand side can have at most one string"));
                    }
                    if string.is_empty() {
                        return Err(scanner.error("right-hand side string must not be empty"));
                    }
                    if string.len() >= MAX_STRING_SIZE {
                        return Err(scanner.error("right-hand side string is too long"));
                    }
                    text = Some(string);
                }
                Token::Ident(name) => {
                    if keysym.is_some() {
                        return Err(scanner.error("right-hand side can have at most one keysym"));
                    }
                    let resolved = self.resolve_keysym(name).ok_or_else(|| {
                        scanner.error(format!("unrecognized keysym \"{}\" on right-hand side", name))
                    })?;
                    keysym = Some(resolved);
                }
                Token::EndOfLine | Token::EndOfFile => break,
                other => {
                    return Err(scanner.error(format!(
                        "unexpected {} on right-hand side",
                        other.describe()
                    )))
                }
            }
        }

        if text.is_none() && keysym.is_none() {
            return Err(scanner.error(
                "right-hand side must have at least one of string or keysym",
            ));
        }

        Ok(Output {
            text: text.unwrap_or_default(),
            keysym,
        })
    }
}
