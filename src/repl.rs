//! Interactive shell around the executor.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, EditMode, Editor, Helper};
use tracing::{debug, error};

use primitive_db::config::{Config, OutputFormat};
use primitive_db::error::DbError;
use primitive_db::executor::cache::SelectCache;
use primitive_db::executor::{Executor, QueryResult};
use primitive_db::formatter;
use primitive_db::guard;
use primitive_db::query::{self, Stmt};
use primitive_db::storage::JsonStore;

const PROMPT: &str = "db> ";

const COMMANDS: [&str; 14] = [
    "create_table",
    "drop_table",
    "list_tables",
    "insert",
    "select",
    "update",
    "delete",
    "where",
    "set",
    "help",
    "exit",
    "int",
    "str",
    "bool",
];

/// What the shell does after one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Done,
    Failed,
    Exit,
}

struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == ':' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = line[start..pos].to_lowercase();
        let matches = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(&word))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

pub struct Repl {
    executor: Executor<JsonStore>,
    editor: Editor<ReplHelper, DefaultHistory>,
    format: OutputFormat,
    timing: bool,
    auto_confirm: bool,
    history_file: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: &Config, auto_confirm: bool) -> Result<Self> {
        let rl_config = EditorConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .max_history_size(config.history_size)?
            .build();
        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(ReplHelper));

        let history_file = config.history_path();
        if let Some(ref path) = history_file
            && path.exists()
        {
            let _ = editor.load_history(path);
        }

        let store = JsonStore::with_catalog_file(&config.data_dir, &config.catalog_file);
        let executor = Executor::with_cache(store, SelectCache::new(config.cache_entries));

        Ok(Self {
            executor,
            editor,
            format: config.output_format,
            timing: config.timing,
            auto_confirm,
            history_file,
        })
    }

    pub fn print_banner(&self) {
        println!("primitive_db v{}", env!("CARGO_PKG_VERSION"));
        println!("Type 'help' for the list of commands, 'exit' to quit.\n");
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);
                    if self.process_line(line) == LineOutcome::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    error!("readline error: {e}");
                    break;
                }
            }
        }
        self.save_history();
        println!("Bye!");
        Ok(())
    }

    /// Executes one command line and prints the outcome.
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let stmt = match query::parse(line) {
            Ok(stmt) => stmt,
            Err(e) => {
                eprintln!("Error: {e}");
                return LineOutcome::Failed;
            }
        };
        if stmt == Stmt::Exit {
            return LineOutcome::Exit;
        }
        match self.execute(stmt) {
            Ok(result) => {
                println!("{}", formatter::format_result(&result, self.format));
                LineOutcome::Done
            }
            Err(DbError::Cancelled(_)) => {
                println!("Operation cancelled.");
                LineOutcome::Done
            }
            Err(e) => {
                eprintln!("Error: {e}");
                LineOutcome::Failed
            }
        }
    }

    fn execute(&mut self, stmt: Stmt) -> Result<QueryResult, DbError> {
        let name = stmt.verb();
        let show = self.timing;
        let executor = &mut self.executor;
        let op = guard::with_error_log(|s: Stmt| executor.execute(s));
        let mut op = guard::with_timing(
            name,
            move |name: &str, elapsed: Duration| {
                if show {
                    println!("{name} took {:.3} s", elapsed.as_secs_f64());
                }
            },
            op,
        );

        if stmt.is_destructive() && !self.auto_confirm {
            let editor = &mut self.editor;
            let mut ask = |prompt: &str| {
                editor
                    .readline(prompt)
                    .map(|answer| guard::is_affirmative(&answer))
                    .unwrap_or(false)
            };
            guard::with_confirmation(name, &mut ask, op)(stmt)
        } else {
            op(stmt)
        }
    }

    fn save_history(&mut self) {
        if let Some(ref path) = self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = self.editor.save_history(path) {
                debug!("failed to save history: {e}");
            }
        }
    }
}
