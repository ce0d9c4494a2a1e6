use std::{os::unix::process::ExitStatusExt, process::ExitStatus};

use dtrain_model::{CommandLine, ExitCode};
use tokio::process::Command;

pub fn cmd_program(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd
}

pub fn command(line: &CommandLine) -> Option<Command> {
    line.program().map(|p| cmd_program(p, line.args()))
}

/// Shell convention: a signal `n` becomes `128 + n`.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(sig)) => 128 + sig,
        (None, None) => 1,
    }
}

/// Deliver SIGTERM without reaping.
pub fn terminate(pid: u32) -> std::io::Result<()> {
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}
