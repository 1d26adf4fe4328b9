//! Lifecycle management for the launcher's child processes
//!
//! The dependency install and the crawler can run for a long time. If the
//! launcher is interrupted or killed while one of them is running, the child
//! must not be left behind.
//!
//! - Children are spawned in their own process group with a parent-death signal
//! - Running children are tracked in a global registry
//! - On SIGINT/SIGTERM/SIGHUP every tracked group gets SIGTERM, then SIGKILL
//!   after a grace period

use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Grace period between SIGTERM and SIGKILL when a signal arrives
pub const SIGNAL_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Registry tracking running child processes
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    /// Set once cleanup has started so it never runs twice
    cleanup_initiated: bool,
}

impl ChildRegistry {
    /// Get or create the global child registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        tracing::debug!(pid, "registered child process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        tracing::debug!(pid, "unregistered child process");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// Terminate all tracked children: SIGTERM to each process group, wait up
    /// to `grace_period`, then SIGKILL whatever is left.
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.cleanup_initiated {
            tracing::debug!("cleanup already initiated, skipping");
            return;
        }
        self.cleanup_initiated = true;

        let count = self.count();
        if count == 0 {
            return;
        }

        tracing::info!(count, "terminating child processes");

        let pids: Vec<u32> = self.pids.iter().copied().collect();
        for &pid in &pids {
            signal_group_or_process(pid, Signal::SIGTERM);
        }

        let start = Instant::now();
        while start.elapsed() < grace_period {
            if pids.iter().all(|&pid| !is_process_alive(pid)) {
                tracing::info!("all child processes terminated");
                self.pids.clear();
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        for &pid in &pids {
            if is_process_alive(pid) {
                tracing::warn!(pid, "child did not terminate, sending SIGKILL");
                signal_group_or_process(pid, Signal::SIGKILL);
            }
        }

        self.pids.clear();
    }
}

/// Signal the process group led by `pid`, falling back to the process itself.
fn signal_group_or_process(pid: u32, sig: Signal) {
    if let Err(e) = signal::kill(Pid::from_raw(-(pid as i32)), sig) {
        tracing::warn!(pid, error = %e, "failed to signal process group {}", sig);
        if let Err(e) = signal::kill(Pid::from_raw(pid as i32), sig) {
            tracing::warn!(pid, error = %e, "failed to signal process {}", sig);
        }
    }
}

/// True if the process exists and is neither a zombie nor dead
fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // Field 3 of /proc/<pid>/stat is the state
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        if let Some(state) = stat.split_whitespace().nth(2) {
            return !matches!(state, "Z" | "X");
        }
    }

    true
}

/// RAII guard that terminates every registered child on drop.
/// Held by `main` for the whole launch.
pub struct ProcessGuard {
    registry: Arc<Mutex<ChildRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ChildRegistry::global(),
        }
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.terminate_all(Duration::from_secs(5));
        }
    }
}

/// Install SIGINT/SIGTERM/SIGHUP handlers that clean up children and exit
/// with `128 + signal`. Call once at program start.
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            tracing::info!(signal = sig, "received termination signal, cleaning up");

            let registry = ChildRegistry::global();
            let mut registry = registry.lock().unwrap_or_else(|p| p.into_inner());
            registry.terminate_all(SIGNAL_GRACE_PERIOD);

            // The pause prompt may have left the terminal in raw mode
            let _ = crossterm::terminal::disable_raw_mode();

            // The registry stays locked until exit, so the main thread cannot
            // report the killed child and exit with its own code first.
            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Extension trait for `std::process::Command` to set up process groups
pub trait CommandProcessGroup {
    /// Run the command in its own process group and have it receive SIGTERM
    /// if the launcher dies.
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        unsafe {
            self.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(std::io::Error::from)?;

                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }

                Ok(())
            });
        }
        self
    }
}
