//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation.

use std::io::IsTerminal;

use dialoguer::Confirm;

use crate::error::{CliError, Result};

/// Ask whether `count` upstream changes should be written.
///
/// Fails instead of blocking when stdin is not a terminal.
pub fn confirm_apply(count: usize) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::user(
            "confirmation needs a terminal; pass --yes to apply without asking",
        ));
    }

    let answer = Confirm::new()
        .with_prompt(format!("Apply {count} upstream change(s) to the working tree?"))
        .default(false)
        .interact()?;
    Ok(answer)
}
