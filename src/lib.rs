//! A weighted Earley chart parser for probabilistic context-free grammars.
//!
//! Rules carry `-log2` probabilities as additive weights; the chart keeps
//! only the best-known derivation per dotted-rule key, and backpointers let
//! the single minimum-weight tree be rebuilt after parsing.

#[macro_use]
extern crate lazy_static;

pub mod derivation;
pub mod earley;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod syntree;

pub use crate::derivation::ParseResult;
pub use crate::earley::{Chart, Parser};
pub use crate::grammar::{Grammar, GrammarError};

/// Boxed static error type
pub type Err = Box<dyn std::error::Error + 'static>;

impl Grammar {
  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    Parser::new(self).parse_chart(input)
  }

  /// Parses a token sequence and reconstructs its minimum-weight
  /// derivation, if any.
  pub fn parse(&self, input: &[&str]) -> ParseResult {
    Parser::new(self).parse(input)
  }
}

#[test]
fn test_parse_is_deterministic() {
  let g: Grammar = r#"
    1.0 ROOT S
    0.5 S S S
    0.5 S x
  "#
  .parse()
  .unwrap();

  let input = "x x x".split(' ').collect::<Vec<_>>();
  let first = g.parse(&input);
  assert!(first.is_parse());
  for _ in 0..3 {
    assert_eq!(g.parse(&input), first);
  }
}

#[test]
fn test_empty_input() {
  let g: Grammar = "1.0 ROOT x\n".parse().unwrap();
  assert_eq!(g.parse(&[]), ParseResult::NoParse);
}
