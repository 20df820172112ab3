//! Reconstruction of the minimum-weight derivation from a finished chart.
//!
//! The chart never stores trees; it stores backpointers. An entry's
//! horizontal chain orders the per-symbol steps of its own rule, and each
//! step's vertical pointer (when present) names the completed sub-derivation
//! consumed at that position. Walking both recovers one tree without ever
//! having materialized the alternatives.

use std::fmt;

use crate::earley::{Chart, EntryId};
use crate::grammar::Grammar;
use crate::syntree::{Constituent, SynTree, Word};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
  Parsed {
    tree: SynTree<String, String>,
    weight: f64,
  },
  /// The sentence is not derivable from the start symbol. A normal outcome,
  /// not an error.
  NoParse,
}

impl ParseResult {
  pub fn is_parse(&self) -> bool {
    matches!(self, Self::Parsed { .. })
  }
}

impl fmt::Display for ParseResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Parsed { tree, weight } => write!(f, "{}\n{}", tree, weight),
      Self::NoParse => write!(f, "NONE"),
    }
  }
}

/// Selects the best completed start-symbol entry spanning the whole input
/// and rebuilds its derivation.
pub fn best_derivation(grammar: &Grammar, chart: &Chart) -> ParseResult {
  match best_root(grammar, chart) {
    Some(id) => ParseResult::Parsed {
      tree: subtree(grammar, chart, id),
      weight: chart.entry(id).weight,
    },
    None => ParseResult::NoParse,
  }
}

/// Minimum-weight live entry in the last column that is a completed start
/// rule with origin 0. Strict `<` keeps the earliest-inserted entry on a
/// tie, which the dominance policy only permits for the very first insert.
fn best_root(grammar: &Grammar, chart: &Chart) -> Option<EntryId> {
  let last = chart.len() - 1;
  let mut best: Option<(EntryId, f64)> = None;

  for (row, entry) in chart.column(last).iter().enumerate() {
    if entry.superseded
      || entry.origin != 0
      || entry.dot != grammar.rhs(entry.rule).len()
      || grammar.lhs(entry.rule).name != grammar.start()
    {
      continue;
    }
    if best.is_none_or(|(_, w)| entry.weight < w) {
      best = Some((EntryId { col: last, row }, entry.weight));
    }
  }

  best.map(|(id, _)| id)
}

fn subtree(grammar: &Grammar, chart: &Chart, id: EntryId) -> SynTree<String, String> {
  let entry = chart.entry(id);
  let rule = grammar.rule(entry.rule);
  let cons = Constituent {
    value: rule.lhs.name.clone(),
    span: (entry.origin, id.col),
  };

  // follow the horizontal chain back to the start of the rule; reversed, it
  // holds one entry per consumed rhs symbol, in rhs order
  let mut chain = Vec::with_capacity(rule.len());
  let mut cursor = Some(id);
  while let Some(link) = cursor {
    chain.push(link);
    cursor = chart.entry(link).horiz;
  }
  chain.reverse();

  let mut children = Vec::with_capacity(rule.len());
  if !rule.is_empty() {
    for (pos, &link) in chain.iter().enumerate() {
      match chart.entry(link).vert {
        Some(sub) => children.push(subtree(grammar, chart, sub)),
        // no sub-derivation: the symbol was a scanned terminal, consumed in
        // the column just before the link's
        None => children.push(SynTree::Leaf(Word {
          value: rule.rhs[pos].name.clone(),
          span: (link.col - 1, link.col),
        })),
      }
    }
  }

  SynTree::Branch(cons, children)
}

#[cfg(test)]
fn run(grammar: &str, sentence: &str) -> ParseResult {
  let g: Grammar = grammar.parse().unwrap();
  let tokens = sentence.split_whitespace().collect::<Vec<_>>();
  g.parse(&tokens)
}

#[cfg(test)]
const PAPA_GRAMMAR: &str = r#"
  1.0 ROOT S
  1.0 S NP VP
  0.5 NP papa
  0.5 NP Det N
  1.0 Det the
  1.0 N caviar
  1.0 VP V NP
  1.0 V ate
"#;

#[test]
fn test_single_rule_sentence() {
  // Scenario A
  match run("1.0 ROOT a b\n", "a b") {
    ParseResult::Parsed { tree, weight } => {
      assert_eq!(tree.to_string(), "(ROOT a b)");
      assert_eq!(weight, 0.0);
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_root_tie_broken_by_rule_order() {
  // Scenario B: X and Y parses both weigh 1; the first-inserted wins
  match run(
    "0.5 ROOT X\n0.5 ROOT Y\n1.0 X a\n1.0 Y a\n",
    "a",
  ) {
    ParseResult::Parsed { tree, weight } => {
      assert_eq!(weight, 1.0);
      assert_eq!(tree.to_string(), "(ROOT (X a))");
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_unknown_token_yields_no_parse() {
  // Scenario C
  assert_eq!(run(PAPA_GRAMMAR, "zzz"), ParseResult::NoParse);
  assert_eq!(run(PAPA_GRAMMAR, "papa ate zzz"), ParseResult::NoParse);
}

#[test]
fn test_cyclic_grammar_yields_no_parse() {
  // Scenario D: unit cycle with no terminals must terminate, not hang
  assert_eq!(run("1.0 A B\n1.0 B A\n", "anything"), ParseResult::NoParse);
  assert_eq!(
    run("1.0 ROOT A\n1.0 A B\n1.0 B A\n", "a"),
    ParseResult::NoParse
  );
}

#[test]
fn test_nested_reconstruction_and_weight_sum() {
  match run(PAPA_GRAMMAR, "papa ate the caviar") {
    ParseResult::Parsed { tree, weight } => {
      assert_eq!(
        tree.to_string(),
        "(ROOT (S (NP papa) (VP (V ate) (NP (Det the) (N caviar)))))"
      );
      // two 0.5 rules fire (NP papa, NP Det N); everything else is certain
      assert_eq!(weight, 2.0);
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_leaves_recover_input() {
  let tokens = ["papa", "ate", "the", "caviar"];
  match run(PAPA_GRAMMAR, &tokens.join(" ")) {
    ParseResult::Parsed { tree, .. } => {
      let leaves = tree
        .leaves()
        .iter()
        .map(|w| w.value.as_str())
        .collect::<Vec<_>>();
      assert_eq!(leaves, tokens);
      // spans line up with token positions
      for (pos, w) in tree.leaves().iter().enumerate() {
        assert_eq!(w.span, (pos, pos + 1));
      }
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_dominance_picks_cheaper_ambiguous_reading() {
  // "a" derives S either directly through A (weight 1) or through the unit
  // chain A B (weight 3); only the cheap reading survives
  match run(
    "1.0 ROOT S\n1.0 S A\n0.5 A a\n0.25 A B\n0.5 B a\n",
    "a",
  ) {
    ParseResult::Parsed { tree, weight } => {
      assert_eq!(weight, 1.0);
      assert_eq!(tree.to_string(), "(ROOT (S (A a)))");
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_epsilon_rule_reconstructs_as_childless_branch() {
  // A derives the empty string; it completes at dot 0 in its own column and
  // attaches in place, leaving a branch with no children
  match run("0.5 ROOT A B\n1.0 A\n1.0 B b\n", "b") {
    ParseResult::Parsed { tree, weight } => {
      assert_eq!(tree.to_string(), "(ROOT (A) (B b))");
      assert_eq!(weight, 1.0);
    }
    ParseResult::NoParse => panic!("expected a parse"),
  }
}

#[test]
fn test_no_parse_renders_as_none() {
  assert_eq!(run(PAPA_GRAMMAR, "zzz").to_string(), "NONE");
}
