/*
 * process.rs
 *
 * Process spawning and group signalling using posix_spawn and kill(2).
 *
 * The command goes to the shell as a single script argument, so quoting,
 * globs and pipelines behave exactly as they would at a prompt. The child
 * inherits stdin/stdout/stderr untouched.
 *
 * POSIX_SPAWN_SETPGROUP with pgroup 0 makes the shell the leader of a new
 * group whose id equals its pid. Signalling -pgid then reaches the shell
 * and everything it started, and never reaches us.
 *
 * posix_spawnattr_t is a pointer on darwin and a plain struct on glibc/musl.
 * Zero-init covers both; the init call overwrites it before first use.
 */

use core::ffi::c_char;
use core::fmt;
use core::ptr;
use std::ffi::CString;
use std::path::Path;

use crate::signal::{Signal, raw_signal_name};

unsafe extern "C" {
    /* environ is a global variable pointing to the environment */
    static environ: *const *const c_char;
}

/*
 * RAII wrapper for posix_spawnattr_t.
 *
 * The init function may allocate internal storage, and destroy frees it.
 * This wrapper ensures cleanup even on early return.
 */
struct SpawnAttr {
    inner: libc::posix_spawnattr_t,
}

impl SpawnAttr {
    /* create and initialize spawn attributes */
    fn new() -> Result<Self, i32> {
        // SAFETY: posix_spawnattr_t is plain data (pointer or C struct); all-zero
        // is a valid bit pattern and posix_spawnattr_init overwrites it below.
        let mut attr: libc::posix_spawnattr_t = unsafe { core::mem::zeroed() };
        // SAFETY: attr is a valid, writable location for init to populate
        let ret = unsafe { libc::posix_spawnattr_init(&mut attr) };
        if ret != 0 {
            return Err(ret);
        }
        Ok(Self { inner: attr })
    }

    /* set flags on the spawn attributes */
    fn set_flags(&mut self, flags: libc::c_short) -> Result<(), i32> {
        // SAFETY: self.inner was initialized in new()
        let ret = unsafe { libc::posix_spawnattr_setflags(&mut self.inner, flags) };
        if ret != 0 {
            return Err(ret);
        }
        Ok(())
    }

    /* set process group (0 = own group) */
    fn set_pgroup(&mut self, pgroup: libc::pid_t) -> Result<(), i32> {
        // SAFETY: self.inner was initialized in new()
        let ret = unsafe { libc::posix_spawnattr_setpgroup(&mut self.inner, pgroup) };
        if ret != 0 {
            return Err(ret);
        }
        Ok(())
    }

    /* signals reset to SIG_DFL in the child (needs POSIX_SPAWN_SETSIGDEF) */
    fn set_sigdefault(&mut self, signals: &[i32]) -> Result<(), i32> {
        // SAFETY: sigset_t is plain data, sigemptyset initializes it below
        let mut set: libc::sigset_t = unsafe { core::mem::zeroed() };
        // SAFETY: set is a valid sigset_t location
        unsafe { libc::sigemptyset(&mut set) };
        for &sig in signals {
            // SAFETY: set was initialized by sigemptyset, sig is a valid signal number
            unsafe { libc::sigaddset(&mut set, sig) };
        }
        // SAFETY: self.inner was initialized in new(), set is a valid sigset_t
        let ret = unsafe { libc::posix_spawnattr_setsigdefault(&mut self.inner, &set) };
        if ret != 0 {
            return Err(ret);
        }
        Ok(())
    }

    /* get raw pointer for FFI calls */
    fn as_ptr(&self) -> *const libc::posix_spawnattr_t {
        &self.inner
    }
}

impl Drop for SpawnAttr {
    fn drop(&mut self) {
        // SAFETY: self.inner was initialized in new() and hasn't been destroyed yet
        unsafe {
            libc::posix_spawnattr_destroy(&mut self.inner);
        }
    }
}

/// Raw child process handle. The child leads its own process group, so
/// [`RawChild::id`] is also the group id.
#[derive(Debug)]
pub struct RawChild {
    pid: libc::pid_t,
    exited: bool,
}

/// Exit status from a process, as reported by waitpid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawExitStatus {
    status: i32,
}

impl RawExitStatus {
    /// Wrap a raw waitpid status word.
    #[must_use]
    pub const fn from_raw(status: i32) -> Self {
        Self { status }
    }

    /// Returns the exit code if the process exited normally
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        if libc::WIFEXITED(self.status) {
            Some(libc::WEXITSTATUS(self.status))
        } else {
            None
        }
    }

    /// Returns the signal number if the process was killed by a signal
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Option<i32> {
        if libc::WIFSIGNALED(self.status) {
            Some(libc::WTERMSIG(self.status))
        } else {
            None
        }
    }

    /// Exited normally with code 0.
    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.code() == Some(0)
    }
}

impl fmt::Display for RawExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code() {
            write!(f, "exit status {code}")
        } else if let Some(sig) = self.signal() {
            match raw_signal_name(sig) {
                Some(name) => write!(f, "signal: {sig} ({name})"),
                None => write!(f, "signal: {sig}"),
            }
        } else {
            write!(f, "wait status {:#x}", self.status)
        }
    }
}

/// Error from process operations
#[derive(Debug)]
pub enum SpawnError {
    /// Shell binary doesn't exist
    NotFound(String),
    /// Shell exists but isn't executable
    PermissionDenied(String),
    /// Other spawn error with errno
    Spawn(i32),
    /// Wait error
    Wait(i32),
    /// Invalid argument (null byte in string)
    InvalidArg,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(s) => write!(f, "not found: {s}"),
            Self::PermissionDenied(s) => write!(f, "permission denied: {s}"),
            Self::Spawn(e) => write!(f, "spawn error: errno {e}"),
            Self::Wait(e) => write!(f, "wait error: errno {e}"),
            Self::InvalidArg => write!(f, "invalid argument"),
        }
    }
}

impl RawChild {
    /// Get the process ID (and, since the child leads its group, the group ID)
    #[inline]
    #[must_use]
    pub fn id(&self) -> libc::pid_t {
        self.pid
    }

    /// Wait for the process to exit, blocking. Retries on EINTR.
    pub fn wait(&mut self) -> Result<RawExitStatus, SpawnError> {
        if self.exited {
            return Err(SpawnError::Wait(libc::ECHILD));
        }

        let mut status: i32 = 0;
        loop {
            // SAFETY: pid is valid from spawn, status is a valid pointer
            let ret = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if ret >= 0 {
                break;
            }
            let e = errno();
            if e != libc::EINTR {
                return Err(SpawnError::Wait(e));
            }
        }

        self.exited = true;
        Ok(RawExitStatus { status })
    }
}

/// Run `command` as `<shell> -c <command>` in a fresh process group.
///
/// The child inherits our stdio and environment. SIGPIPE and SIGCHLD are
/// reset to their default dispositions in the child: the Rust runtime
/// ignores SIGPIPE in the parent, and SIGCHLD may have been inherited as
/// ignored from whoever started us. posix_spawn would pass both along.
pub fn spawn_shell(shell: &Path, command: &str) -> Result<RawChild, SpawnError> {
    let shell_str = shell.to_string_lossy();
    let shell_cstr = CString::new(shell_str.as_bytes()).map_err(|_| SpawnError::InvalidArg)?;
    let flag_cstr = CString::new("-c").map_err(|_| SpawnError::InvalidArg)?;
    let cmd_cstr = CString::new(command).map_err(|_| SpawnError::InvalidArg)?;

    /* argv: [shell, "-c", command, NULL] */
    let argv: [*const c_char; 4] = [
        shell_cstr.as_ptr(),
        flag_cstr.as_ptr(),
        cmd_cstr.as_ptr(),
        ptr::null(),
    ];

    let mut attr = SpawnAttr::new().map_err(SpawnError::Spawn)?;

    #[allow(clippy::cast_possible_truncation)]
    attr.set_flags((libc::POSIX_SPAWN_SETPGROUP | libc::POSIX_SPAWN_SETSIGDEF) as libc::c_short)
        .map_err(SpawnError::Spawn)?;
    attr.set_pgroup(0).map_err(SpawnError::Spawn)?; /* own group */
    attr.set_sigdefault(&[libc::SIGPIPE, libc::SIGCHLD])
        .map_err(SpawnError::Spawn)?;

    // SAFETY: environ is set up by libc before main and only read here
    let envp = unsafe { environ };

    let mut pid: libc::pid_t = 0;
    // SAFETY: all pointers are valid for the duration of the call, argv is
    // NULL-terminated, envp is the process environment, attr is initialized.
    // A NULL file_actions pointer means "inherit all fds".
    let ret = unsafe {
        libc::posix_spawn(
            &mut pid,
            shell_cstr.as_ptr(),
            ptr::null(),
            attr.as_ptr(),
            argv.as_ptr().cast::<*mut c_char>(),
            envp.cast::<*mut c_char>(),
        )
    };

    if ret != 0 {
        return Err(match ret {
            libc::ENOENT | libc::ENOTDIR => SpawnError::NotFound(shell_str.into_owned()),
            libc::EACCES | libc::EPERM => SpawnError::PermissionDenied(shell_str.into_owned()),
            _ => SpawnError::Spawn(ret),
        });
    }

    Ok(RawChild { pid, exited: false })
}

/// Put SIGCHLD back to SIG_DFL in this process.
///
/// An ignored SIGCHLD survives exec. With it in place the kernel reaps our
/// children on its own and waitpid fails with ECHILD, so this has to run
/// before the first spawn.
pub fn reset_sigchld() {
    // SAFETY: installing SIG_DFL runs no handler code; the previous
    // disposition is not needed
    unsafe {
        libc::signal(libc::SIGCHLD, libc::SIG_DFL);
    }
}

/// What happened when we tried to signal a process group.
///
/// Delivery is best-effort: the supervisor never reacts to this. It exists
/// so tests and trace logs can see what the kernel said.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// kill(2) accepted the signal
    Delivered,
    /// no process in the group anymore (ESRCH)
    Gone,
    /// refused for some other reason (errno)
    Failed(i32),
}

/// Send `signal` to every process in group `pgid` via kill(-pgid, sig).
///
/// Refuses pgid <= 1: kill(-1) would hit every process we may signal and
/// kill(0) our own group.
pub fn signal_group(pgid: libc::pid_t, signal: Signal) -> Delivery {
    if pgid <= 1 {
        return Delivery::Failed(libc::EINVAL);
    }

    // SAFETY: kill() is safe with any pid/signal combo, returns -1 on error
    let ret = unsafe { libc::kill(-pgid, signal.as_raw()) };
    if ret == 0 {
        return Delivery::Delivered;
    }

    match errno() {
        libc::ESRCH => Delivery::Gone,
        e => Delivery::Failed(e),
    }
}

#[inline]
fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const SH: &str = "/bin/sh";

    #[test]
    fn test_spawn_true() {
        let mut child = spawn_shell(Path::new(SH), "true").unwrap();
        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(0));
        assert!(status.success());
    }

    #[test]
    fn test_spawn_exit_code() {
        let mut child = spawn_shell(Path::new(SH), "exit 3").unwrap();
        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(3));
        assert_eq!(status.to_string(), "exit status 3");
    }

    #[test]
    fn test_shell_expansion() {
        let mut child = spawn_shell(Path::new(SH), "x=4; test $((x + 1)) -eq 5").unwrap();
        assert!(child.wait().unwrap().success());
    }

    #[test]
    fn test_spawn_shell_not_found() {
        let result = spawn_shell(Path::new("/nonexistent/shell_12345"), "true");
        assert!(matches!(result, Err(SpawnError::NotFound(_))));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let result = spawn_shell(Path::new(SH), "echo a\0b");
        assert!(matches!(result, Err(SpawnError::InvalidArg)));
    }

    #[test]
    fn test_child_leads_own_group() {
        let mut child = spawn_shell(Path::new(SH), "sleep 0.2").unwrap();
        // SAFETY: getpgid is safe with any pid
        let pgid = unsafe { libc::getpgid(child.id()) };
        // SAFETY: getpgrp has no preconditions
        let ours = unsafe { libc::getpgrp() };
        assert_eq!(pgid, child.id());
        assert_ne!(pgid, ours);
        let _ = child.wait();
    }

    #[test]
    fn test_signal_group_kills_child() {
        let start = Instant::now();
        let mut child = spawn_shell(Path::new(SH), "sleep 30").unwrap();
        assert_eq!(signal_group(child.id(), Signal::SIGKILL), Delivery::Delivered);
        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGKILL));
        assert!(status.to_string().contains("SIGKILL"));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_reset_sigchld_leaves_default() {
        reset_sigchld();
        // SAFETY: zeroed sigaction is valid output storage, act is NULL
        let mut old: libc::sigaction = unsafe { core::mem::zeroed() };
        // SAFETY: querying only, act is NULL and old is writable
        let ret = unsafe { libc::sigaction(libc::SIGCHLD, ptr::null(), &mut old) };
        assert_eq!(ret, 0);
        assert_eq!(old.sa_sigaction, libc::SIG_DFL);

        let mut child = spawn_shell(Path::new(SH), "true").unwrap();
        assert!(child.wait().unwrap().success());
    }

    #[test]
    fn test_signal_group_gone() {
        let mut child = spawn_shell(Path::new(SH), "true").unwrap();
        let pid = child.id();
        let _ = child.wait();
        assert_eq!(signal_group(pid, Signal::SIGTERM), Delivery::Gone);
        assert_eq!(signal_group(pid, Signal::SIGKILL), Delivery::Gone);
    }

    #[test]
    fn test_signal_group_refuses_special_ids() {
        assert_eq!(signal_group(0, Signal::SIGTERM), Delivery::Failed(libc::EINVAL));
        assert_eq!(signal_group(1, Signal::SIGKILL), Delivery::Failed(libc::EINVAL));
        assert_eq!(signal_group(-5, Signal::SIGKILL), Delivery::Failed(libc::EINVAL));
    }

    #[test]
    fn test_wait_twice_errors() {
        let mut child = spawn_shell(Path::new(SH), "true").unwrap();
        let _ = child.wait().unwrap();
        assert!(matches!(child.wait(), Err(SpawnError::Wait(_))));
    }
}
