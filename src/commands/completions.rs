use clap::{Args, CommandFactory};
use clap_complete::Shell;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum, help = "Shell to generate the completion script for")]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) {
        self.write_to(&mut io::stdout());
    }

    fn write_to(&self, out: &mut dyn Write) {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin_name, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(shell: Shell) -> String {
        let mut buffer = Vec::new();
        CompletionsCommand { shell }.write_to(&mut buffer);
        String::from_utf8(buffer).expect("completion script is UTF-8")
    }

    #[test]
    fn test_shell_specific_markers() {
        let cases: [(Shell, &[&str]); 5] = [
            (Shell::Bash, &["_credsweep()", "complete -F _credsweep"]),
            (Shell::Zsh, &["#compdef credsweep", "_arguments"]),
            (Shell::Fish, &["complete -c credsweep"]),
            (Shell::PowerShell, &["-CommandName 'credsweep'"]),
            (Shell::Elvish, &["arg-completer[credsweep]"]),
        ];

        for (shell, markers) in cases {
            let script = script_for(shell);
            for marker in markers {
                assert!(script.contains(marker), "{marker} missing from {shell} script");
            }
        }
    }

    #[test]
    fn test_subcommands_are_completed() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let script = script_for(shell);
            for subcommand in ["collect", "configure", "completions"] {
                assert!(
                    script.contains(subcommand),
                    "{subcommand} missing from {shell} script"
                );
            }
        }
    }

    #[test]
    fn test_collect_flags_are_completed() {
        let script = script_for(Shell::Bash);
        for flag in ["--profile", "--accounts", "--format", "--password-status"] {
            assert!(script.contains(flag), "{flag} missing from bash script");
        }
    }
}
