//! Child Process Helpers
//!
//! Media tools run as child processes. Every spawn goes through
//! [`media_command`] so that the process never opens a console window on
//! Windows and is killed when the pipeline drops its future.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;

/// Builds a command with null stdin, piped stdout/stderr and kill-on-drop.
pub fn media_command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    hide_console_window(&mut cmd);
    cmd
}

#[cfg(target_os = "windows")]
fn hide_console_window(cmd: &mut Command) {
    const CREATE_NO_WINDOW: u32 = 0x08000000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(target_os = "windows"))]
fn hide_console_window(cmd: &mut Command) {
    let _ = cmd;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "windows"))]
    #[tokio::test]
    async fn test_media_command_captures_stdout() {
        let output = media_command("echo")
            .arg("reelcut")
            .output()
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "reelcut");
    }

    #[cfg(not(target_os = "windows"))]
    #[tokio::test]
    async fn test_media_command_missing_program() {
        let result = media_command("reelcut-definitely-not-installed").output().await;
        assert!(result.is_err());
    }
}
