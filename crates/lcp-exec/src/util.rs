use std::{process::ExitStatus, time::Duration};

use lcp_core::SolverCommand;
use tokio::process::{Child, Command};

use crate::error::ExecError;

pub fn cmd_program(command: &SolverCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(command.args.iter().map(|s| s.as_str()));
    cmd
}

/// Map an exit status onto the code it carries.
pub fn exit_code(status: ExitStatus) -> Result<i32, ExecError> {
    match status.code() {
        Some(0) => Ok(0),
        Some(code) => Err(ExecError::NonZeroExit { code }),
        None => Err(ExecError::KilledBySignal),
    }
}

/// SIGTERM, then SIGKILL if the child is still alive after `grace`.
#[cfg(target_family = "unix")]
pub async fn kill_graceful(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    use nix::{
        sys::signal::{Signal, kill},
        unistd::Pid,
    };

    if let Some(id) = child.id() {
        // ESRCH means it exited between id() and kill(); wait() reaps it below.
        let _ = kill(Pid::from_raw(id as i32), Signal::SIGTERM);
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            return Ok(());
        }
    }
    child.kill().await
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child, _grace: Duration) -> std::io::Result<()> {
    child.kill().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_program_keeps_args_verbatim() {
        let command = SolverCommand {
            program: "solver".into(),
            args: vec!["-t".into(), "3".into(), "--ts=10".into()],
        };
        let cmd = cmd_program(&command);
        let std = cmd.as_std();
        assert_eq!(std.get_program(), "solver");
        let args: Vec<_> = std.get_args().collect();
        assert_eq!(args, ["-t", "3", "--ts=10"]);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_classifies_status() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)).unwrap(), 0);
        assert!(matches!(
            exit_code(ExitStatus::from_raw(3 << 8)),
            Err(ExecError::NonZeroExit { code: 3 })
        ));
        assert!(matches!(
            exit_code(ExitStatus::from_raw(nix::sys::signal::Signal::SIGKILL as i32)),
            Err(ExecError::KilledBySignal)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_graceful_stops_a_sleeping_child() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        kill_graceful(&mut child, Duration::from_secs(5)).await.unwrap();
        let status = child.try_wait().unwrap().expect("child reaped");
        assert_eq!(status.signal(), Some(nix::sys::signal::Signal::SIGTERM as i32));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_graceful_escalates_when_sigterm_is_ignored() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .unwrap();
        // Let the shell install the trap before signalling.
        tokio::time::sleep(Duration::from_millis(200)).await;
        kill_graceful(&mut child, Duration::from_millis(200)).await.unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(status.signal(), Some(nix::sys::signal::Signal::SIGKILL as i32));
    }
}
