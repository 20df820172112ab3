use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// A weighted production. `weight` is `-log2(prob)`, precomputed at
/// construction so the engine only ever adds weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub prob: f64,
  pub weight: f64,
  pub lhs: Symbol,
  pub rhs: Vec<Symbol>,
}

impl Rule {
  pub fn new(prob: f64, lhs: Symbol, rhs: Vec<Symbol>) -> Self {
    Self {
      prob,
      weight: -prob.log2(),
      lhs,
      rhs,
    }
  }

  pub fn len(&self) -> usize {
    self.rhs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Display adapter for this rule with a dot at `dot`.
  pub fn dotted(&self, dot: usize) -> DottedRule<'_> {
    DottedRule { rule: self, dot }
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} →", self.prob, self.lhs)?;
    for s in self.rhs.iter() {
      write!(f, " {}", s)?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DottedRule<'a> {
  rule: &'a Rule,
  dot: usize,
}

impl fmt::Display for DottedRule<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.rule.lhs)?;
    for idx in 0..self.rule.len() {
      if idx == self.dot {
        write!(f, " ・")?;
      }
      write!(f, " {}", self.rule.rhs[idx])?;
    }
    if self.dot == self.rule.len() {
      write!(f, " ・")?;
    }
    Ok(())
  }
}

#[test]
fn test_dotted_display() {
  let r = Rule::new(
    0.5,
    Symbol::new("NP"),
    vec![Symbol::new("Det"), Symbol::new("N")],
  );
  assert_eq!(format!("{}", r.dotted(0)), "NP → ・ Det N");
  assert_eq!(format!("{}", r.dotted(1)), "NP → Det ・ N");
  assert_eq!(format!("{}", r.dotted(2)), "NP → Det N ・");
}

#[test]
fn test_weight_is_neg_log2_prob() {
  assert_eq!(Rule::new(1.0, Symbol::new("A"), vec![]).weight, 0.0);
  assert_eq!(Rule::new(0.5, Symbol::new("A"), vec![]).weight, 1.0);
  assert_eq!(Rule::new(0.25, Symbol::new("A"), vec![]).weight, 2.0);
}
