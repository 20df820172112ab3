use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// In-order terminal leaves; concatenating their values recovers the
  /// input span this tree covers.
  pub fn leaves(&self) -> Vec<&Word<U>> {
    match self {
      Self::Leaf(w) => vec![w],
      Self::Branch(_, children) => children.iter().flat_map(|c| c.leaves()).collect(),
    }
  }
}

/// Single-line bracketed rendering: `(LHS child1 child2 ...)`.
impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{}", w.value),
      Self::Branch(c, children) => {
        write!(f, "({}", c.value)?;
        for child in children.iter() {
          write!(f, " {}", child)?;
        }
        write!(f, ")")
      }
    }
  }
}

#[test]
fn test_bracketed_display() {
  let tree: SynTree<&str, &str> = SynTree::Branch(
    Constituent {
      value: "S",
      span: (0, 2),
    },
    vec![
      SynTree::Branch(
        Constituent {
          value: "NP",
          span: (0, 1),
        },
        vec![SynTree::Leaf(Word {
          value: "papa",
          span: (0, 1),
        })],
      ),
      SynTree::Leaf(Word {
        value: "ate",
        span: (1, 2),
      }),
    ],
  );

  assert_eq!(tree.to_string(), "(S (NP papa) ate)");
  assert_eq!(
    tree.leaves().iter().map(|w| w.value).collect::<Vec<_>>(),
    vec!["papa", "ate"]
  );
}
