use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::rules::{Rule, Symbol};
use crate::Err;

/// The designated start symbol: a sentence is derivable iff some rule with
/// this lhs spans the whole input.
pub const START_SYMBOL: &str = "ROOT";

/// Stable index into [`Grammar::rules`]. Chart entries refer to rules by id
/// so they stay `Copy`.
pub type RuleId = usize;

#[derive(Debug, Error)]
pub enum GrammarError {
  #[error("empty ruleset")]
  Empty,

  #[error("line {line}: expected `<prob> <lhs> <rhs>*`, found {found} field(s)")]
  MissingFields { line: usize, found: usize },

  #[error("line {line}: bad probability `{text}`")]
  InvalidProbability { line: usize, text: String },

  #[error("rule `{rule}`: probability {prob} outside (0, 1]")]
  ProbabilityOutOfRange { rule: String, prob: f64 },
}

/// An immutable weighted grammar. Owns the rule list; rule ids are positions
/// in that list and never change once the grammar is built.
#[derive(Debug)]
pub struct Grammar {
  start: String,
  rules: Vec<Rule>,
  by_lhs: HashMap<String, Vec<RuleId>>,
}

impl Grammar {
  /// Builds a grammar over the default `ROOT` start symbol, validating that
  /// every probability lies in (0, 1].
  pub fn new(rules: Vec<Rule>) -> Result<Self, GrammarError> {
    for rule in rules.iter() {
      if !(rule.prob > 0.0 && rule.prob <= 1.0) {
        return Err(GrammarError::ProbabilityOutOfRange {
          rule: rule.to_string(),
          prob: rule.prob,
        });
      }
    }

    let mut by_lhs: HashMap<String, Vec<RuleId>> = HashMap::new();
    for (id, rule) in rules.iter().enumerate() {
      by_lhs.entry(rule.lhs.name.clone()).or_default().push(id);
    }

    Ok(Self {
      start: START_SYMBOL.to_string(),
      rules,
      by_lhs,
    })
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, Err> {
    Ok(fs::read_to_string(path)?.parse()?)
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn rule(&self, id: RuleId) -> &Rule {
    &self.rules[id]
  }

  pub fn weight(&self, id: RuleId) -> f64 {
    self.rules[id].weight
  }

  pub fn lhs(&self, id: RuleId) -> &Symbol {
    &self.rules[id].lhs
  }

  pub fn rhs(&self, id: RuleId) -> &[Symbol] {
    &self.rules[id].rhs
  }

  /// All rule ids whose lhs is `symbol`, in file order. Empty for symbols
  /// that never appear on a left-hand side (i.e. terminals).
  pub fn rules_with_lhs(&self, symbol: &str) -> &[RuleId] {
    self.by_lhs.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "//** start: {}", self.start)?;
    for rule in self.rules.iter() {
      writeln!(f, "{}", rule)?;
    }
    Ok(())
  }
}

#[test]
fn test_rules_with_lhs_preserves_order() {
  let g = Grammar::new(vec![
    Rule::new(0.5, Symbol::new("ROOT"), vec![Symbol::new("X")]),
    Rule::new(1.0, Symbol::new("X"), vec![Symbol::new("a")]),
    Rule::new(0.5, Symbol::new("ROOT"), vec![Symbol::new("Y")]),
  ])
  .unwrap();

  assert_eq!(g.rules_with_lhs("ROOT"), &[0, 2]);
  assert_eq!(g.rules_with_lhs("X"), &[1]);
  assert_eq!(g.rules_with_lhs("a"), &[] as &[RuleId]);
}

#[test]
fn test_rejects_out_of_range_probability() {
  for bad in [0.0, -0.5, 1.5, f64::NAN] {
    let r = Rule::new(bad, Symbol::new("A"), vec![Symbol::new("a")]);
    assert!(matches!(
      Grammar::new(vec![r]),
      Err(GrammarError::ProbabilityOutOfRange { .. })
    ));
  }
}

#[test]
fn test_probability_one_is_allowed() {
  let r = Rule::new(1.0, Symbol::new("A"), vec![Symbol::new("a")]);
  let g = Grammar::new(vec![r]).unwrap();
  assert_eq!(g.weight(0), 0.0);
}
