//! Child process lifecycle
//!
//! Each package-manager or git command runs as the leader of its own process
//! group and is listed in [`RunningCommands`] until it exits. On Ctrl+C,
//! SIGTERM or SIGHUP the interrupt thread stops every listed group, names the
//! commands that were cut short and exits, so an interrupted `pkg upgrade`
//! does not keep running in the background.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Time a group gets between SIGTERM and SIGKILL
pub const INTERRUPT_GRACE: Duration = Duration::from_secs(3);

const POLL: Duration = Duration::from_millis(50);

static RUNNING: OnceLock<Mutex<RunningCommands>> = OnceLock::new();

/// Commands currently executing, keyed by process group id
#[derive(Debug, Default)]
pub struct RunningCommands {
    groups: BTreeMap<u32, String>,
    stopping: bool,
}

impl RunningCommands {
    /// Lock the process-wide table. A poisoned lock is recovered: the table
    /// only holds PIDs and stays consistent.
    pub fn lock() -> MutexGuard<'static, RunningCommands> {
        RUNNING
            .get_or_init(Mutex::default)
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Track `pgid` while `description` runs. Refused once shutdown began so
    /// the caller can stop the child itself.
    pub fn track(&mut self, pgid: u32, description: &str) -> bool {
        if self.stopping {
            return false;
        }
        debug!(pgid, %description, "tracking command");
        self.groups.insert(pgid, description.to_string());
        true
    }

    pub fn release(&mut self, pgid: u32) {
        if self.groups.remove(&pgid).is_some() {
            debug!(pgid, "command finished");
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Stop every tracked group: SIGTERM, up to `grace` for them to go, then
    /// SIGKILL. Returns the descriptions of the commands that were running.
    /// Only the first call does anything.
    pub fn stop_all(&mut self, grace: Duration) -> Vec<String> {
        if std::mem::replace(&mut self.stopping, true) {
            return Vec::new();
        }

        let groups = std::mem::take(&mut self.groups);
        if groups.is_empty() {
            return Vec::new();
        }
        info!(count = groups.len(), "stopping running commands");

        for &pgid in groups.keys() {
            send(pgid, Signal::SIGTERM);
        }

        let deadline = Instant::now() + grace;
        let mut alive: Vec<u32> = groups.keys().copied().collect();
        loop {
            alive.retain(|&pgid| is_running(pgid));
            if alive.is_empty() || Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(POLL);
        }

        for pgid in alive {
            warn!(pgid, command = %groups[&pgid], "still running after SIGTERM, killing");
            send(pgid, Signal::SIGKILL);
        }

        groups.into_values().collect()
    }
}

/// Signal the whole group so `dpkg` under `apt` under `pkg` goes too. Falls
/// back to the leader alone when the group is already gone.
fn send(pgid: u32, signal: Signal) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match kill(Pid::from_raw(-raw), signal) {
        Ok(()) => {}
        Err(Errno::ESRCH) => {
            let _ = kill(Pid::from_raw(raw), signal);
        }
        Err(e) => warn!(pgid, %signal, error = %e, "could not signal process group"),
    }
}

/// True while `pid` exists and is not a zombie
fn is_running(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if kill(Pid::from_raw(raw), None).is_err() {
        return false;
    }
    // /proc/<pid>/stat: "pid (comm) S ...", comm may contain spaces
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            let after_comm = stat.rsplit_once(')')?.1;
            after_comm.split_whitespace().next().map(|s| !matches!(s, "Z" | "X"))
        })
        .unwrap_or(true)
}

/// Spawn the interrupt thread. On the first SIGINT, SIGTERM or SIGHUP it
/// stops running commands, prints `message` and exits with 128 + signal.
pub fn init_signal_handlers(message: &'static str) -> std::io::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::Builder::new()
        .name("interrupt".into())
        .spawn(move || {
            let Some(sig) = signals.forever().next() else {
                return;
            };
            info!(signal = sig, "interrupted");

            let cut_short = RunningCommands::lock().stop_all(INTERRUPT_GRACE);
            for description in &cut_short {
                warn!(%description, "command interrupted");
            }

            eprintln!("\n\n{message}");
            if !cut_short.is_empty() {
                eprintln!("Interrupted: {}", cut_short.join(", "));
            }
            std::process::exit(128 + sig);
        })?;

    Ok(())
}

/// Spawning a command as its own process group
pub trait ProcessGroupExt {
    /// Make the child a group leader and have the kernel send it SIGTERM if
    /// this process dies first
    fn own_process_group(&mut self) -> &mut Self;
}

impl ProcessGroupExt for std::process::Command {
    fn own_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;

        self.process_group(0);

        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            // SAFETY: prctl is async-signal-safe and PR_SET_PDEATHSIG takes
            // no pointers
            unsafe {
                self.pre_exec(|| {
                    use nix::libc;
                    if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_track_and_release() {
        let mut running = RunningCommands::default();

        assert!(running.track(4100, "Installing curl"));
        assert!(running.track(4200, "Cloning sqlmap"));
        assert_eq!(running.len(), 2);

        running.release(4100);
        running.release(4100);
        assert_eq!(running.len(), 1);

        running.release(4200);
        assert!(running.is_empty());
    }

    #[test]
    fn test_stop_all_kills_child_group() {
        // The shell forks sleep, so the grandchild must die with the group
        let mut child = Command::new("sh")
            .args(["-c", "sleep 30; true"])
            .own_process_group()
            .spawn()
            .unwrap();

        let mut running = RunningCommands::default();
        running.track(child.id(), "Upgrading packages");

        let cut_short = running.stop_all(Duration::from_secs(2));

        assert_eq!(cut_short, vec!["Upgrading packages"]);
        assert!(!child.wait().unwrap().success());
        assert!(running.is_empty());
    }

    #[test]
    fn test_stop_all_only_once() {
        let mut running = RunningCommands::default();
        running.track(999_991, "gone already");

        assert_eq!(running.stop_all(Duration::ZERO), vec!["gone already"]);
        assert!(!running.track(999_992, "too late"));
        assert!(running.stop_all(Duration::ZERO).is_empty());
    }

    #[test]
    fn test_is_running() {
        assert!(is_running(std::process::id()));
        assert!(!is_running(999_993));
    }

    #[test]
    fn test_own_process_group_runs_normally() {
        let status = Command::new("true").own_process_group().status().unwrap();
        assert!(status.success());
    }
}
