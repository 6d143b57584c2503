//! Process execution for assembled launch plans
//!
//! One synchronous launch with inherited stdio; the launcher exits when
//! the training process exits. No retries, no output inspection: any
//! downstream failure surfaces only as the propagated exit code.

use crate::plan::LaunchPlan;
use anyhow::{Context, Result};
use std::process::ExitStatus;

/// Spawn the plan's command and wait for it to finish
///
/// # Arguments
/// * `plan` - Assembled invocation to execute
///
/// # Returns
/// The child's exit code, or an error if the launcher binary could not
/// be spawned
pub fn run(plan: &LaunchPlan) -> Result<i32> {
    let mut child = plan
        .to_command()
        .spawn()
        .with_context(|| format!("Failed to spawn launcher: {}", plan.program))?;
    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for launcher: {}", plan.program))?;
    Ok(exit_code(&status))
}

/// Map an exit status to the code a shell would report
///
/// `code()` when the child exited normally; on Unix `128 + signal` when
/// it died to a signal; 1 otherwise.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
