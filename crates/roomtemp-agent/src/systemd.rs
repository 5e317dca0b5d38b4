/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::env;
use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};
use std::time::Duration;

use eyre::WrapErr;
use tokio::net::UnixDatagram as TokioUnixDatagram;

/// Sends sd_notify(3) state updates to systemd.
///
/// Every call is a no-op when we were not started by systemd
/// (no `NOTIFY_SOCKET`), and watchdog pings are skipped unless the unit
/// sets `WatchdogSec=`.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    socket: Option<String>,
    watchdog: Option<Duration>,
}

impl Notifier {
    pub fn from_env() -> Self {
        let socket = env::var("NOTIFY_SOCKET").ok().filter(|s| !s.is_empty());
        let watchdog = env::var("WATCHDOG_USEC")
            .ok()
            .and_then(|usec| usec.parse().ok())
            .map(Duration::from_micros);
        Self::new(socket, watchdog)
    }

    pub fn new(socket: Option<String>, watchdog: Option<Duration>) -> Self {
        Self { socket, watchdog }
    }

    pub fn is_enabled(&self) -> bool {
        self.socket.is_some()
    }

    /// How often to send `WATCHDOG=1`: half of `WatchdogSec`, as
    /// sd_watchdog_enabled(3) recommends. `None` when no pings are due.
    pub fn watchdog_interval(&self) -> Option<Duration> {
        if !self.is_enabled() {
            return None;
        }
        self.watchdog
            .map(|watchdog| watchdog / 2)
            .filter(|every| !every.is_zero())
    }

    /// Tell systemd we have started
    pub async fn notify_start(&self) -> eyre::Result<()> {
        self.sd_notify("READY=1\n").await
    }

    /// Tell systemd we are still alive.
    /// We must do this at least every WatchdogSec or else systemd will SIGABRT and restart us.
    pub async fn notify_watchdog(&self) -> eyre::Result<()> {
        if self.watchdog.is_none() {
            tracing::trace!("systemd watchdog disabled");
            return Ok(());
        }
        self.sd_notify("WATCHDOG=1\n").await
    }

    /// Free-form status line shown by `systemctl status`
    pub async fn notify_status(&self, status: &str) -> eyre::Result<()> {
        let line = status.replace('\n', " ");
        self.sd_notify(&format!("STATUS={line}\n")).await
    }

    /// Tell systemd we are stopping
    pub async fn notify_stop(&self) -> eyre::Result<()> {
        self.sd_notify("STOPPING=1\n").await
    }

    async fn sd_notify(&self, msg: &str) -> eyre::Result<()> {
        let Some(sock_path) = self.socket.as_deref() else {
            tracing::trace!("Not started by systemd, skip sd_notify");
            return Ok(());
        };

        let addr = match sock_path.strip_prefix('@') {
            Some(name) => SocketAddr::from_abstract_name(name.as_bytes())
                .wrap_err_with(|| format!("invalid abstract socket name {sock_path}"))?,
            None => SocketAddr::from_pathname(sock_path)
                .wrap_err_with(|| format!("invalid socket name {sock_path}"))?,
        };
        let sock = UnixDatagram::unbound()?;
        sock.set_nonblocking(true)?;
        sock.connect_addr(&addr)
            .wrap_err_with(|| format!("connect to {sock_path}"))?;

        let sock = TokioUnixDatagram::from_std(sock)?;
        let sent = sock
            .send(msg.as_bytes())
            .await
            .wrap_err("socket send error")?;
        if sent != msg.len() {
            eyre::bail!("Short send {sent} / {}", msg.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listening_notifier(watchdog: Option<Duration>) -> (tempfile::TempDir, UnixDatagram, Notifier) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.sock");
        let listener = UnixDatagram::bind(&path).unwrap();
        listener.set_nonblocking(true).unwrap();
        let notifier = Notifier::new(Some(path.display().to_string()), watchdog);
        (dir, listener, notifier)
    }

    fn recv(listener: &UnixDatagram) -> Option<String> {
        let mut buf = [0u8; 256];
        listener
            .recv(&mut buf)
            .ok()
            .map(|n| String::from_utf8_lossy(&buf[..n]).into_owned())
    }

    #[tokio::test]
    async fn test_disabled_notifier_is_a_noop() {
        let notifier = Notifier::default();
        assert!(!notifier.is_enabled());
        notifier.notify_start().await.unwrap();
        notifier.notify_watchdog().await.unwrap();
        notifier.notify_stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_lifecycle_messages() {
        let (_dir, listener, notifier) = listening_notifier(Some(Duration::from_secs(30)));

        notifier.notify_start().await.unwrap();
        assert_eq!(recv(&listener).as_deref(), Some("READY=1\n"));

        notifier.notify_watchdog().await.unwrap();
        assert_eq!(recv(&listener).as_deref(), Some("WATCHDOG=1\n"));

        notifier.notify_status("Published 8\u{b0}C\nat noon").await.unwrap();
        assert_eq!(recv(&listener).as_deref(), Some("STATUS=Published 8\u{b0}C at noon\n"));

        notifier.notify_stop().await.unwrap();
        assert_eq!(recv(&listener).as_deref(), Some("STOPPING=1\n"));
    }

    #[tokio::test]
    async fn test_watchdog_skipped_without_watchdog_usec() {
        let (_dir, listener, notifier) = listening_notifier(None);

        notifier.notify_watchdog().await.unwrap();
        assert_eq!(recv(&listener), None);
    }

    #[test]
    fn test_watchdog_interval() {
        let (_dir, _listener, notifier) = listening_notifier(Some(Duration::from_secs(30)));
        assert_eq!(notifier.watchdog_interval(), Some(Duration::from_secs(15)));

        let (_dir, _listener, notifier) = listening_notifier(None);
        assert_eq!(notifier.watchdog_interval(), None);

        let (_dir, _listener, notifier) = listening_notifier(Some(Duration::ZERO));
        assert_eq!(notifier.watchdog_interval(), None);

        let not_under_systemd = Notifier::new(None, Some(Duration::from_secs(30)));
        assert_eq!(not_under_systemd.watchdog_interval(), None);
    }

    #[tokio::test]
    async fn test_missing_socket_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.sock");
        let notifier = Notifier::new(Some(path.display().to_string()), None);

        assert!(notifier.notify_start().await.is_err());
    }
}
