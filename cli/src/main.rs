use std::env;
use std::fs;
use std::process;

use tracing_subscriber::EnvFilter;

use pearley::{Err, Grammar, Parser};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} GRAMMAR SENTENCES [options]

Parses each sentence in SENTENCES against the weighted grammar in GRAMMAR
and prints the minimum-weight derivation with its -log2 weight, or NONE.

Options:
  -h, --help    Print this message
  -c, --chart   Print the parse chart for each sentence
  -d, --debug   Log every chart enqueue (also honors RUST_LOG)",
    prog_name
  )
}

struct Args {
  grammar: String,
  sentences: String,
  print_chart: bool,
  debug: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "pearley"));
    }

    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap();

    let mut positional: Vec<String> = Vec::new();
    let mut print_chart = false;
    let mut debug = false;

    for o in iter {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-d" || o == "--debug" {
        debug = true;
      } else if positional.len() < 2 {
        positional.push(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if positional.len() < 2 {
      return Err(Self::make_error_message("not enough arguments", prog_name));
    }

    let mut positional = positional.into_iter();
    Ok(Self {
      grammar: positional.next().unwrap(),
      sentences: positional.next().unwrap(),
      print_chart,
      debug,
    })
  }
}

fn main() -> Result<(), Err> {
  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  tracing_subscriber::fmt()
    .with_env_filter(if opts.debug {
      EnvFilter::new("debug")
    } else {
      EnvFilter::from_default_env()
    })
    .with_writer(std::io::stderr)
    .init();

  let grammar = Grammar::read_from_file(&opts.grammar)?;
  let parser = Parser::new(&grammar).with_debug(opts.debug);

  for sentence in fs::read_to_string(&opts.sentences)?.lines() {
    let tokens = sentence.split_whitespace().collect::<Vec<_>>();
    if tokens.is_empty() {
      continue;
    }

    if opts.print_chart {
      let chart = parser.parse_chart(&tokens);
      println!("{}", chart.display(&grammar));
    }

    println!("{}", parser.parse(&tokens));
  }

  Ok(())
}
