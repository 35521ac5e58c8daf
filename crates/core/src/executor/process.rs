//! Process groups for install children

use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Start the child as the leader of a new process group.
///
/// Terminal signals then reach only hostfit, and cancellation can reach every
/// process the install starts (sudo and the package manager under it).
pub(crate) fn isolate(cmd: &mut Command) {
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(not(unix))]
    let _ = cmd;
}

/// SIGTERM the child's group, SIGKILL it once `grace` has passed, and reap the child.
///
/// `group` is the child's pid captured at spawn; the group outlives a reaped leader.
#[cfg(unix)]
pub(crate) async fn terminate(child: &mut Child, group: Option<u32>, grace: Duration) {
    signal_group(group, libc::SIGTERM);
    let exited = tokio::time::timeout(grace, child.wait()).await.is_ok();
    if !exited {
        debug!("Install did not stop within {:?}; killing it", grace);
    }
    signal_group(group, libc::SIGKILL);
    if exited {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to kill install process: {}", e);
    }
}

#[cfg(not(unix))]
pub(crate) async fn terminate(child: &mut Child, _group: Option<u32>, _grace: Duration) {
    if let Err(e) = child.kill().await {
        warn!("Failed to kill install process: {}", e);
    }
}

#[cfg(unix)]
fn signal_group(group: Option<u32>, signal: libc::c_int) {
    let Some(pgid) = group.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg only delivers a signal; an empty group fails with ESRCH.
    if unsafe { libc::killpg(pgid, signal) } != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!("Failed to signal install process group {}: {}", pgid, err);
        }
    }
}
