//! Line-oriented grammar format: one rule per non-blank line,
//! `<prob> <lhs> <rhs-symbol>*`, whitespace-delimited. `//` starts a comment
//! that runs to the end of the line.

use regex::Regex;
use std::str::FromStr;

use crate::grammar::{Grammar, GrammarError};
use crate::rules::{Rule, Symbol};

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

fn strip_comment(line: &str) -> &str {
  regex_static!(COMMENT, r"//.*$");
  match COMMENT.find(line) {
    Some(m) => &line[..m.start()],
    None => line,
  }
}

/// Parses rule lines, skipping blanks and comments. Line numbers in errors
/// are 1-based.
pub fn parse_rules(s: &str) -> Result<Vec<Rule>, GrammarError> {
  let mut rules = Vec::new();

  for (idx, raw) in s.lines().enumerate() {
    let line = idx + 1;
    let fields = strip_comment(raw).split_whitespace().collect::<Vec<_>>();
    if fields.is_empty() {
      continue;
    }
    if fields.len() < 2 {
      return Err(GrammarError::MissingFields {
        line,
        found: fields.len(),
      });
    }

    let prob = fields[0]
      .parse::<f64>()
      .map_err(|_| GrammarError::InvalidProbability {
        line,
        text: fields[0].to_string(),
      })?;
    let lhs = Symbol::new(fields[1]);
    let rhs = fields[2..].iter().copied().map(Symbol::new).collect();

    rules.push(Rule::new(prob, lhs, rhs));
  }

  Ok(rules)
}

impl FromStr for Grammar {
  type Err = GrammarError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rules = parse_rules(s)?;
    if rules.is_empty() {
      return Err(GrammarError::Empty);
    }
    Grammar::new(rules)
  }
}

#[test]
fn test_parse_rules() {
  let g: Grammar = r#"
    // toy grammar
    1.0 ROOT S
    0.5 S NP VP  // trailing comment
    0.5 NP papa
  "#
  .parse()
  .unwrap();

  assert_eq!(g.rules().len(), 3);
  assert_eq!(g.rule(0).lhs.name, "ROOT");
  assert_eq!(
    g.rule(1).rhs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
    vec!["NP", "VP"]
  );
  assert_eq!(g.rule(2).weight, 1.0);
}

#[test]
fn test_epsilon_rule_is_accepted() {
  let g: Grammar = "1.0 ROOT A\n0.5 A\n".parse().unwrap();
  assert!(g.rule(1).is_empty());
}

#[test]
fn test_empty_ruleset_errors() {
  assert!(matches!(
    "// nothing here\n\n".parse::<Grammar>(),
    Err(GrammarError::Empty)
  ));
}

#[test]
fn test_short_line_errors() {
  assert!(matches!(
    "1.0 ROOT S\n0.5\n".parse::<Grammar>(),
    Err(GrammarError::MissingFields { line: 2, found: 1 })
  ));
}

#[test]
fn test_unparsable_probability_errors() {
  assert!(matches!(
    "half NP papa\n".parse::<Grammar>(),
    Err(GrammarError::InvalidProbability { line: 1, .. })
  ));
}

#[test]
fn test_out_of_range_probability_errors() {
  assert!(matches!(
    "1.5 ROOT S\n".parse::<Grammar>(),
    Err(GrammarError::ProbabilityOutOfRange { .. })
  ));
}
