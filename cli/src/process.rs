use eyre::Context;
use std::ffi::OsStr;
use std::process::{Command, ExitStatus, Stdio};

/// The program can be started from PATH
pub fn is_installed(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Run a program attached to the terminal and wait for it to exit
pub fn passthru<I, S>(program: &str, args: I) -> eyre::Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    log::debug!("Running {program}");

    Command::new(program)
        .args(args)
        .status()
        .wrap_err_with(|| format!("Failed to run {program}"))
}
