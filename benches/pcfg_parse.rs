use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pearley::Grammar;

const GRAMMAR_SRC: &str = r#"
  1.0  ROOT S
  0.8  S NP VP
  0.2  S S Conj S
  0.4  NP papa
  0.4  NP Det N
  0.2  NP NP PP
  0.5  VP V NP
  0.5  VP VP PP
  1.0  PP P NP
  0.5  Det the
  0.5  Det a
  0.4  N caviar
  0.4  N spoon
  0.2  N fork
  1.0  V ate
  1.0  P with
  1.0  Conj and
"#;

fn parse(g: &Grammar, input: &[&str]) -> bool {
  g.parse(input).is_parse()
}

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = GRAMMAR_SRC.parse::<Grammar>().unwrap();
  let simple_input = "papa ate the caviar".split(' ').collect::<Vec<_>>();
  let ambiguous_input = "papa ate the caviar with a spoon and papa ate a fork"
    .split(' ')
    .collect::<Vec<_>>();

  c.bench_function("parse simple", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&simple_input)))
  });

  c.bench_function("parse ambiguous attachment", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&ambiguous_input)))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
