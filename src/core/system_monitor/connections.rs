//! TCP connection enumeration.
//!
//! On Linux the connection table comes from `/proc/net/tcp` and
//! `/proc/net/tcp6`; owning processes are found by matching socket inodes
//! against each process's open file descriptors. Processes and sockets can
//! vanish while this runs; such entries are skipped.

use std::net::SocketAddr;

use super::metrics::{ConnectionInfo, ConnectionStatus};

/// Keep at most `limit` established connections, in table order
pub fn select_established(connections: Vec<ConnectionInfo>, limit: usize) -> Vec<ConnectionInfo> {
    connections
        .into_iter()
        .filter(|c| c.status == ConnectionStatus::Established)
        .take(limit)
        .collect()
}

/// `None` for the all-zero peer address the kernel reports on unconnected sockets
pub(crate) fn peer_address(addr: SocketAddr) -> Option<SocketAddr> {
    if addr.ip().is_unspecified() && addr.port() == 0 {
        None
    } else {
        Some(addr)
    }
}

#[cfg(target_os = "linux")]
pub fn collect_connections() -> Vec<ConnectionInfo> {
    linux::collect()
}

#[cfg(not(target_os = "linux"))]
pub fn collect_connections() -> Vec<ConnectionInfo> {
    log::debug!("Connection listing is only supported on Linux");
    Vec::new()
}

#[cfg(target_os = "linux")]
mod linux {
    use std::collections::HashMap;

    use procfs::net::{TcpNetEntry, TcpState};
    use procfs::process::FDTarget;

    use super::{peer_address, ConnectionInfo, ConnectionStatus};

    pub(super) fn collect() -> Vec<ConnectionInfo> {
        let mut entries: Vec<TcpNetEntry> = Vec::new();

        match procfs::net::tcp() {
            Ok(tcp) => entries.extend(tcp),
            Err(e) => log::debug!("Failed to read /proc/net/tcp: {}", e),
        }
        match procfs::net::tcp6() {
            Ok(tcp6) => entries.extend(tcp6),
            Err(e) => log::debug!("Failed to read /proc/net/tcp6: {}", e),
        }

        let owners = socket_owners();

        entries
            .into_iter()
            .map(|entry| ConnectionInfo {
                local_address: entry.local_address,
                remote_address: peer_address(entry.remote_address),
                status: map_state(&entry.state),
                pid: owners.get(&entry.inode).copied(),
            })
            .collect()
    }

    /// Socket inode -> pid, for every process whose fd table is readable
    fn socket_owners() -> HashMap<u64, u32> {
        let mut owners = HashMap::new();

        let processes = match procfs::process::all_processes() {
            Ok(processes) => processes,
            Err(e) => {
                log::debug!("Failed to enumerate processes: {}", e);
                return owners;
            }
        };

        for process in processes.flatten() {
            let Ok(fds) = process.fd() else {
                continue;
            };
            let pid = process.pid() as u32;
            for fd in fds.flatten() {
                if let FDTarget::Socket(inode) = fd.target {
                    owners.insert(inode, pid);
                }
            }
        }

        owners
    }

    fn map_state(state: &TcpState) -> ConnectionStatus {
        match state {
            TcpState::Established => ConnectionStatus::Established,
            TcpState::SynSent => ConnectionStatus::SynSent,
            TcpState::SynRecv | TcpState::NewSynRecv => ConnectionStatus::SynRecv,
            TcpState::FinWait1 => ConnectionStatus::FinWait1,
            TcpState::FinWait2 => ConnectionStatus::FinWait2,
            TcpState::TimeWait => ConnectionStatus::TimeWait,
            TcpState::Close => ConnectionStatus::Close,
            TcpState::CloseWait => ConnectionStatus::CloseWait,
            TcpState::LastAck => ConnectionStatus::LastAck,
            TcpState::Listen => ConnectionStatus::Listen,
            TcpState::Closing => ConnectionStatus::Closing,
            #[allow(unreachable_patterns)]
            _ => ConnectionStatus::Unknown,
        }
    }
}
