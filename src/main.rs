use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;
use log::debug;
use snafu::{ResultExt, Snafu};

/// Compile a tiny expression language to x86-64 assembly.
#[derive(Debug, Parser)]
#[command(name = "stackcc", version, about, long_about = None)]
struct Cli {
  /// Program text, e.g. "a=3; a+2;"
  #[arg(required_unless_present = "file", conflicts_with = "file")]
  program: Option<String>,

  /// Read the program from a file instead
  #[arg(short, long, value_name = "PATH")]
  file: Option<PathBuf>,

  /// Write assembly here instead of stdout
  #[arg(short, long, value_name = "PATH")]
  output: Option<PathBuf>,

  /// Log each compilation stage
  #[arg(short, long)]
  verbose: bool,
}

#[derive(Debug, Snafu)]
enum CliError {
  #[snafu(display("{source}"))]
  Compile { source: stackcc::CompileError },

  #[snafu(display("failed to read {}: {source}", path.display()))]
  ReadInput { path: PathBuf, source: io::Error },

  #[snafu(display("failed to write {}: {source}", path.display()))]
  WriteOutput { path: PathBuf, source: io::Error },
}

fn run(cli: Cli) -> Result<(), CliError> {
  let source = match (cli.program, &cli.file) {
    (Some(program), _) => program,
    (None, Some(path)) => fs::read_to_string(path).context(ReadInputSnafu { path })?,
    (None, None) => String::new(),
  };

  let asm = stackcc::generate_assembly(&source).context(CompileSnafu)?;

  match cli.output {
    Some(path) => fs::write(&path, asm).context(WriteOutputSnafu { path })?,
    None => io::stdout()
      .write_all(asm.as_bytes())
      .context(WriteOutputSnafu { path: "<stdout>" })?,
  }

  Ok(())
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
  debug!("{cli:?}");

  if let Err(err) = run(cli) {
    debug!("{err:?}");
    eprintln!("{err}");
    process::exit(1);
  }
}
