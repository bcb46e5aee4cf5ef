use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lox::Lox;

/// Lox: a tree-walking interpreter for the *Crafting Interpreters*
/// scripting language (`spec.md` §6.4). The core pipeline lives in the
/// library; this binary is just the external collaborator that wires a
/// file or a REPL line into it.
#[derive(ClapParser)]
#[command(name = "lox", about = "A tree-walking interpreter for Lox", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Shorthand for `lox run <script>`, so `lox script.lox` also works.
    script: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Lox script to completion.
    Run { path: PathBuf },
    /// Start an interactive read-eval-print loop.
    Repl,
    /// Inspect intermediate pipeline stages without evaluating.
    Debug {
        #[command(subcommand)]
        stage: DebugStage,
    },
}

#[derive(Subcommand)]
enum DebugStage {
    /// Print the token stream the scanner produces for `path`.
    Lex { path: PathBuf },
    /// Print the parenthesized AST the parser produces for `path`.
    Parse { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| match cli.script {
        Some(path) => Command::Run { path },
        None => Command::Repl,
    });

    let exit_code = match command {
        Command::Run { path } => run_file(&path),
        Command::Repl => {
            run_repl();
            0
        }
        Command::Debug { stage } => {
            match stage {
                DebugStage::Lex { path } => debug_lex(&path),
                DebugStage::Parse { path } => debug_parse(&path),
            }
            0
        }
    };

    process::exit(exit_code);
}

fn read_source(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("Could not read '{}': {err}", path.display());
        process::exit(lox::EXIT_USAGE);
    })
}

fn run_file(path: &PathBuf) -> i32 {
    let source = read_source(path);
    let mut lox = Lox::new();
    let mut stdout = io::stdout();
    lox.run_file(&source, &mut stdout)
}

fn debug_lex(path: &PathBuf) {
    let source = read_source(path);
    let lox = Lox::new();
    for token in lox.scan(&source) {
        println!("{token}");
    }
}

fn debug_parse(path: &PathBuf) {
    let source = read_source(path);
    let lox = Lox::new();
    let statements = lox.parse(&source);
    println!("{}", lox::ast::AstPrinter.print_statements(&statements));
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".lox_history"))
}

/// Reads lines from the terminal, running each one through the full
/// pipeline and resetting the error flags between lines so one bad line
/// doesn't end the session (`spec.md` §4.7, §6.3: REPL sessions never
/// exit with a pipeline's exit code over a single input).
fn run_repl() {
    let mut editor = DefaultEditor::new().expect("terminal supports line editing");
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    let mut lox = Lox::new();
    let mut stdout = io::stdout();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                lox.run_line(&line, &mut stdout);
                let _ = stdout.flush();
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
}
