use std::cell::RefCell;

use anyhow::{anyhow, Result};

use crate::exec::{CommandOutput, CommandRunner, CommandSpec};

type Handler = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput>>;

struct Rule {
    program: String,
    args_contain: Vec<String>,
    handler: Handler,
}

/// Scripted process-execution double for tests.
///
/// Rules are matched in registration order: a rule applies when the program
/// matches and every `args_contain` token appears in the argument list.
/// Unscripted commands are an error, so a test fails loudly when code runs
/// something it should not (the dry-run purity checks rely on this).
/// Every invocation is recorded, matched or not.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, program: &str, args_contain: &[&str], output: CommandOutput) -> Self {
        self.on_with(program, args_contain, move |_| Ok(output.clone()))
    }

    pub fn on_with(
        mut self,
        program: &str,
        args_contain: &[&str],
        handler: impl Fn(&CommandSpec) -> Result<CommandOutput> + 'static,
    ) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            args_contain: args_contain.iter().map(ToString::to_string).collect(),
            handler: Box::new(handler),
        });
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, program: &str) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| spec.program == program)
            .cloned()
            .collect()
    }

    /// Index of the first recorded call matching program + tokens, for
    /// ordering assertions.
    pub fn first_call_index(&self, program: &str, args_contain: &[&str]) -> Option<usize> {
        self.calls.borrow().iter().position(|spec| {
            spec.program == program
                && args_contain
                    .iter()
                    .all(|token| spec.args.iter().any(|arg| arg.contains(token)))
        })
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());

        for rule in &self.rules {
            if rule.program != spec.program {
                continue;
            }
            let matches = rule
                .args_contain
                .iter()
                .all(|token| spec.args.iter().any(|arg| arg.contains(token.as_str())));
            if matches {
                return (rule.handler)(spec);
            }
        }

        Err(anyhow!("unscripted command in test: {spec}"))
    }
}
