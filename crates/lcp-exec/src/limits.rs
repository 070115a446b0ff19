//! POSIX rlimits applied to solver processes.
//!
//! On Unix the limits are installed in a `pre_exec` hook, so the solver never
//! runs unrestricted. Elsewhere a non-empty config is ignored with a warning.

use tokio::process::Command;

/// Per-process resource limits. `None` keeps the inherited limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlimitConfig {
    /// `RLIMIT_NOFILE`.
    pub max_open_files: Option<u64>,
    /// `RLIMIT_FSIZE`; the solver gets `SIGXFSZ` when a vector file grows past it.
    pub max_file_size_bytes: Option<u64>,
    /// `RLIMIT_AS`, bytes of address space.
    pub max_address_space_bytes: Option<u64>,
    /// Set `RLIMIT_CORE` to zero.
    pub disable_core_dumps: bool,
}

impl RlimitConfig {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_open_files.is_none()
            && self.max_file_size_bytes.is_none()
            && self.max_address_space_bytes.is_none()
            && !self.disable_core_dumps
    }
}

pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
    if config.is_empty() {
        return;
    }

    #[cfg(unix)]
    unix_impl::attach_rlimits(cmd, config);

    #[cfg(not(unix))]
    {
        let _ = cmd;
        tracing::warn!(?config, "rlimits are not supported on this platform; ignoring");
    }
}

#[cfg(unix)]
mod unix_impl {
    use std::io;

    use tokio::process::Command;

    use super::RlimitConfig;

    pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
        let config = config.clone();

        // SAFETY: the hook only calls setrlimit(2), which is async-signal-safe.
        unsafe {
            cmd.pre_exec(move || {
                if let Some(n) = config.max_open_files {
                    check(libc::setrlimit(libc::RLIMIT_NOFILE, &rlimit(n)))?;
                }
                if let Some(n) = config.max_file_size_bytes {
                    check(libc::setrlimit(libc::RLIMIT_FSIZE, &rlimit(n)))?;
                }
                if let Some(n) = config.max_address_space_bytes {
                    check(libc::setrlimit(libc::RLIMIT_AS, &rlimit(n)))?;
                }
                if config.disable_core_dumps {
                    check(libc::setrlimit(libc::RLIMIT_CORE, &rlimit(0)))?;
                }
                Ok(())
            });
        }
    }

    fn rlimit(value: u64) -> libc::rlimit {
        libc::rlimit {
            rlim_cur: value as libc::rlim_t,
            rlim_max: value as libc::rlim_t,
        }
    }

    fn check(rc: libc::c_int) -> io::Result<()> {
        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}
