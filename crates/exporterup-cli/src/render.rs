use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};

use exporterup_core::{SetupError, Summary};

use crate::lifecycle::StepObserver;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

/// Terminal output for one run: status lines, a phase spinner on rich
/// terminals, and the closing summary.
pub struct TerminalRenderer {
    style: OutputStyle,
    spinner: Option<ProgressBar>,
}

impl TerminalRenderer {
    pub fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub fn from_style(style: OutputStyle) -> Self {
        Self {
            style,
            spinner: None,
        }
    }

    pub fn print_status(&self, status: &str, message: &str) {
        match self.style {
            OutputStyle::Plain => println!("{status}: {message}"),
            OutputStyle::Rich => {
                println!("{} {message}", colorize(status_style(), status));
            }
        }
    }

    pub fn print_summary(&mut self, summary: &Summary) {
        self.clear_spinner();

        let outcome = if summary.dry_run {
            "dry run complete, nothing changed"
        } else if summary.mutated {
            "done"
        } else {
            "nothing to do"
        };
        self.print_status(outcome, &format!("{} {}", summary.action.as_str(), summary.installed_version));

        if let Some(backup) = &summary.backup {
            self.print_status(
                "backup",
                &format!("previous files kept with timestamp {}", backup.timestamp),
            );
        }
    }

    pub fn print_error(&mut self, error: &SetupError) {
        self.clear_spinner();
        match self.style {
            OutputStyle::Plain => eprintln!("error: {error}"),
            OutputStyle::Rich => {
                eprintln!("{} {error}", colorize(error_style(), "error:"));
            }
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl StepObserver for TerminalRenderer {
    fn step(&mut self, label: &str) {
        if self.style == OutputStyle::Plain {
            println!("-> {label}");
            return;
        }

        let spinner = self.spinner.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
                spinner.set_style(style);
            }
            spinner.enable_steady_tick(Duration::from_millis(80));
            spinner
        });
        spinner.set_message(label.to_string());
    }
}

fn status_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightGreen.into()))
        .effects(Effects::BOLD)
}

fn error_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
