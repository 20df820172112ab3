use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::derivation::{best_derivation, ParseResult};
use crate::grammar::{Grammar, RuleId};

/// Identifies an entry by its chart coordinates. Backpointers are stored as
/// ids into the chart arena rather than references, so columns can keep
/// growing while older entries stay addressable. An id always points at an
/// entry created strictly earlier in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
  pub col: usize,
  pub row: usize,
}

/// A dotted rule instantiated at a chart position: rhs symbols before `dot`
/// have been matched, the rest are pending. `weight` is the accumulated
/// -log2 probability of the rule itself plus every sub-derivation consumed
/// so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
  pub rule: RuleId,
  pub origin: usize,
  pub dot: usize,
  pub weight: f64,
  /// Same rule instance one dot-position earlier. Absent when dot <= 1:
  /// a chain link is only kept once there is a matched prefix to recover.
  pub horiz: Option<EntryId>,
  /// The completed entry for the nonterminal just left of the dot. Absent
  /// for terminal matches and at dot 0.
  pub vert: Option<EntryId>,
  /// Set when a lower-weight duplicate replaced this entry. Superseded
  /// entries stay in the column (rows must not shift) but are ignored at
  /// reconstruction.
  pub superseded: bool,
}

impl Entry {
  pub fn new(rule: RuleId, origin: usize, dot: usize, weight: f64) -> Self {
    Self {
      rule,
      origin,
      dot,
      weight,
      horiz: None,
      vert: None,
      superseded: false,
    }
  }
}

/// Dedup key: the chart keeps at most one live entry per
/// (rule, origin, dot) within a column.
type Key = (RuleId, usize, usize);

#[derive(Debug, Default)]
struct Column {
  entries: Vec<Entry>,
  live: HashMap<Key, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  /// No live entry had this key; the candidate was appended.
  Inserted(EntryId),
  /// A live entry with weight <= the candidate's already exists; the
  /// candidate was discarded without being appended.
  Dominated,
  /// The candidate's weight beat the live entry, which is now superseded.
  Replaced { new: EntryId, old: EntryId },
}

/// The parse table: one column per token boundary, each an append-only
/// entry vector plus the live-key index driving the dominance policy.
#[derive(Debug)]
pub struct Chart(Vec<Column>);

impl Chart {
  pub fn new(length: usize) -> Self {
    Self((0..length).map(|_| Column::default()).collect())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.0[k].entries.len()
  }

  /// All entries in column `k`, live and superseded, in insertion order.
  pub fn column(&self, k: usize) -> &[Entry] {
    &self.0[k].entries
  }

  pub fn entry(&self, id: EntryId) -> &Entry {
    &self.0[id.col].entries[id.row]
  }

  /// Get an owned entry so that passing around &mut chart is more ergonomic.
  /// Entries are small Copy data, so this costs nothing.
  fn get_entry(&self, k: usize, row: usize) -> Entry {
    self.0[k].entries[row]
  }

  /// Applies the dedup/dominance policy for column `k`:
  /// no live entry with the candidate's key → append; live entry at least
  /// as light → drop the candidate; live entry strictly heavier → mark it
  /// superseded and append the candidate in its place. The policy is the
  /// same no matter which operator produced the candidate.
  pub fn try_insert(&mut self, k: usize, entry: Entry) -> InsertOutcome {
    let key = (entry.rule, entry.origin, entry.dot);
    let col = &mut self.0[k];

    let old = match col.live.get(&key) {
      Some(&row) if entry.weight >= col.entries[row].weight => {
        return InsertOutcome::Dominated;
      }
      Some(&row) => {
        col.entries[row].superseded = true;
        Some(EntryId { col: k, row })
      }
      None => None,
    };

    let new = EntryId {
      col: k,
      row: col.entries.len(),
    };
    col.entries.push(entry);
    col.live.insert(key, new.row);

    match old {
      Some(old) => InsertOutcome::Replaced { new, old },
      None => InsertOutcome::Inserted(new),
    }
  }

  /// Display adapter; entries only hold rule ids, so rendering needs the
  /// grammar.
  pub fn display<'a>(&'a self, grammar: &'a Grammar) -> ChartDisplay<'a> {
    ChartDisplay {
      chart: self,
      grammar,
    }
  }
}

pub struct ChartDisplay<'a> {
  chart: &'a Chart,
  grammar: &'a Grammar,
}

impl fmt::Display for ChartDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for k in 0..self.chart.len() {
      writeln!(f, "Column {}:", k)?;
      for entry in self.chart.column(k).iter() {
        write!(
          f,
          "  {}..{}: {} ({})",
          entry.origin,
          k,
          self.grammar.rule(entry.rule).dotted(entry.dot),
          entry.weight
        )?;
        if entry.superseded {
          write!(f, " superseded")?;
        }
        writeln!(f)?;
      }
    }
    Ok(())
  }
}

/// Runs predictor/scanner/attach over a token sequence to a per-column
/// fixpoint, left to right. One parser may be reused across sentences; each
/// call builds a fresh chart.
pub struct Parser<'g> {
  grammar: &'g Grammar,
  debug: bool,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      debug: false,
    }
  }

  /// When set, every enqueue outcome is emitted as a `tracing` debug event.
  pub fn with_debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  /// Builds the full chart and reconstructs the minimum-weight derivation.
  pub fn parse(&self, input: &[&str]) -> ParseResult {
    let chart = self.parse_chart(input);
    best_derivation(self.grammar, &chart)
  }

  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    let mut chart = Chart::new(input.len() + 1);

    for &rule in self.grammar.rules_with_lhs(self.grammar.start()) {
      let seed = Entry::new(rule, 0, 0, self.grammar.weight(rule));
      self.enqueue(&mut chart, 0, seed, "seed");
    }

    for k in 0..chart.len() {
      // need to use a cursor because the column keeps growing during the
      // loop; the fixpoint is reached when it catches up with the length
      let mut row = 0;
      while row < chart.len_at(k) {
        let id = EntryId { col: k, row };
        let entry = chart.get_entry(k, row);
        row += 1;

        let rhs = self.grammar.rhs(entry.rule);
        assert!(
          entry.dot <= rhs.len(),
          "dot ran past the end of {}",
          self.grammar.rule(entry.rule)
        );

        if entry.dot == rhs.len() {
          self.attach(&mut chart, k, id, &entry);
        } else if k < input.len() && rhs[entry.dot].name == input[k] {
          self.scan(&mut chart, k, id, &entry);
        } else {
          self.predict(&mut chart, k, &entry);
        }
      }
    }

    chart
  }

  /// The entry is waiting on a nonterminal: hypothesize every rule that can
  /// build it, starting in this column with zero progress.
  fn predict(&self, chart: &mut Chart, k: usize, entry: &Entry) {
    let pending = &self.grammar.rhs(entry.rule)[entry.dot];
    for &rule in self.grammar.rules_with_lhs(&pending.name) {
      let predicted = Entry::new(rule, k, 0, self.grammar.weight(rule));
      self.enqueue(chart, k, predicted, "predict");
    }
  }

  /// The pending symbol matched the token at `k`: advance the dot into the
  /// next column. Scanning contributes no weight of its own.
  fn scan(&self, chart: &mut Chart, k: usize, id: EntryId, entry: &Entry) {
    let mut advanced = Entry::new(entry.rule, entry.origin, entry.dot + 1, entry.weight);
    if entry.dot > 0 {
      advanced.horiz = Some(id);
    }
    self.enqueue(chart, k + 1, advanced, "scan");
  }

  /// The entry is complete: advance every customer in its origin column
  /// that is waiting on its lhs. Entries appended while this scan runs are
  /// picked up by the outer cursor, not here; the scan length is frozen at
  /// call time.
  fn attach(&self, chart: &mut Chart, k: usize, id: EntryId, done: &Entry) {
    let lhs = self.grammar.lhs(done.rule);

    for row in 0..chart.len_at(done.origin) {
      let cid = EntryId {
        col: done.origin,
        row,
      };
      let customer = chart.get_entry(done.origin, row);

      let rhs = self.grammar.rhs(customer.rule);
      if customer.dot < rhs.len() && rhs[customer.dot] == *lhs {
        let mut advanced = Entry::new(
          customer.rule,
          customer.origin,
          customer.dot + 1,
          customer.weight + done.weight,
        );
        advanced.vert = Some(id);
        if customer.dot > 0 {
          advanced.horiz = Some(cid);
        }
        self.enqueue(chart, k, advanced, "attach");
      }
    }
  }

  fn enqueue(&self, chart: &mut Chart, k: usize, entry: Entry, op: &'static str) {
    let outcome = chart.try_insert(k, entry);
    if self.debug {
      debug!(
        op,
        col = k,
        origin = entry.origin,
        weight = entry.weight,
        rule = %self.grammar.rule(entry.rule).dotted(entry.dot),
        outcome = ?outcome,
        "enqueue"
      );
    }
  }
}

#[cfg(test)]
fn chart_for(grammar: &str, sentence: &str) -> (Grammar, Chart) {
  let g: Grammar = grammar.parse().unwrap();
  let tokens = sentence.split_whitespace().collect::<Vec<_>>();
  let chart = Parser::new(&g).parse_chart(&tokens);
  (g, chart)
}

#[test]
fn test_try_insert_outcomes() {
  let mut chart = Chart::new(2);

  let first = Entry::new(0, 0, 1, 2.0);
  let id = match chart.try_insert(1, first) {
    InsertOutcome::Inserted(id) => id,
    other => panic!("expected Inserted, got {:?}", other),
  };
  assert_eq!(id, EntryId { col: 1, row: 0 });

  // equal weight is dominated by the earlier entry
  assert_eq!(
    chart.try_insert(1, Entry::new(0, 0, 1, 2.0)),
    InsertOutcome::Dominated
  );
  assert_eq!(
    chart.try_insert(1, Entry::new(0, 0, 1, 3.0)),
    InsertOutcome::Dominated
  );
  assert_eq!(chart.len_at(1), 1);

  // strictly lower weight supersedes
  match chart.try_insert(1, Entry::new(0, 0, 1, 1.0)) {
    InsertOutcome::Replaced { new, old } => {
      assert_eq!(old, id);
      assert_eq!(new, EntryId { col: 1, row: 1 });
      assert!(chart.entry(old).superseded);
      assert!(!chart.entry(new).superseded);
    }
    other => panic!("expected Replaced, got {:?}", other),
  }
  assert_eq!(chart.len_at(1), 2);

  // a different key is independent
  assert!(matches!(
    chart.try_insert(1, Entry::new(0, 1, 1, 9.0)),
    InsertOutcome::Inserted(_)
  ));
}

#[test]
fn test_fixpoint_reaches_completed_root() {
  let (g, chart) = chart_for("1.0 ROOT a b\n", "a b");

  let done = chart
    .column(2)
    .iter()
    .find(|e| e.origin == 0 && e.dot == 2 && !e.superseded)
    .expect("no completed root entry");
  assert_eq!(g.lhs(done.rule).name, "ROOT");
  assert_eq!(done.weight, 0.0);
}

#[test]
fn test_dominance_keeps_single_live_entry_per_key() {
  // two Y rules complete over the same span; both attach to X → ・Y, so the
  // (X-rule, 0, 1) key in column 1 sees weights 1 then 2
  let (g, chart) = chart_for(
    "1.0 ROOT X\n1.0 X Y\n0.5 Y a\n0.25 Y a\n",
    "a",
  );

  let x_rule = g.rules_with_lhs("X")[0];
  let live = chart
    .column(1)
    .iter()
    .filter(|e| e.rule == x_rule && e.dot == 1 && !e.superseded)
    .collect::<Vec<_>>();
  assert_eq!(live.len(), 1);
  assert_eq!(live[0].weight, 1.0);
}

#[test]
fn test_replacement_supersedes_heavier_entry() {
  // same as above with the heavy Y rule first, so the heavier attach lands
  // first and must be replaced rather than dominated
  let (g, chart) = chart_for(
    "1.0 ROOT X\n1.0 X Y\n0.25 Y a\n0.5 Y a\n",
    "a",
  );

  let x_rule = g.rules_with_lhs("X")[0];
  let advanced = chart
    .column(1)
    .iter()
    .filter(|e| e.rule == x_rule && e.dot == 1)
    .collect::<Vec<_>>();
  assert_eq!(advanced.len(), 2);
  assert!(advanced[0].superseded);
  assert_eq!(advanced[0].weight, 2.0);
  assert!(!advanced[1].superseded);
  assert_eq!(advanced[1].weight, 1.0);
}

#[test]
fn test_unit_cycle_terminates() {
  // A and B derive each other with no terminals; dedup must close the loop
  let (_, chart) = chart_for("1.0 ROOT A\n1.0 A B\n1.0 B A\n", "x y");
  assert_eq!(chart.len(), 3);
  // nothing can scan, so later columns stay empty
  assert_eq!(chart.len_at(1), 0);
}

#[test]
fn test_chart_size_is_bounded_by_keyspace() {
  let (g, chart) = chart_for("1.0 ROOT S\n0.5 S S S\n0.5 S x\n", "x x x x");

  let r = g.rules().len();
  let l = 4;
  for k in 0..chart.len() {
    // per column: at most one live entry per (rule, origin, dot); superseded
    // rows don't count against the bound
    let live = chart.column(k).iter().filter(|e| !e.superseded).count();
    assert!(live <= r * (l + 1) * (l + 1));
  }
}
