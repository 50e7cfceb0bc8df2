//! Shell completion generation for vitalsup

use clap::{Command, CommandFactory};
use clap_complete::{Generator, Shell, generate};
use std::io::Write;

use crate::ui::cli::Cli;

/// Generate shell completions for the given shell
pub fn print_completions<G: Generator>(generator: G, app: &mut Command) {
    write_completions(generator, app, &mut std::io::stdout());
}

/// Write completions for `app` into any writer
pub fn write_completions<G: Generator>(generator: G, app: &mut Command, out: &mut dyn Write) {
    let name = app.get_name().to_string();
    generate(generator, app, name, out);
}

/// Completion script for the `vitalsup` command line
pub fn completion_script(shell: Shell) -> String {
    let mut cmd = Cli::command().name("vitalsup");
    let mut buf = Vec::new();
    write_completions(shell, &mut cmd, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
