// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-oriented transports.
//!
//! The connector never talks to the operating system directly; it drives
//! one of these. All operations block the calling thread. Timeouts and
//! cancellation, where needed, are the transport's business; the
//! connector sees them as ordinary I/O errors.

#[cfg(feature = "tcp")]
mod tcp;

#[cfg(feature = "tcp")]
pub use self::tcp::TcpTransport;

use std::io;

/// A blocking byte socket with exact-transfer semantics.
///
/// `send` and `receive` transfer the complete buffer or fail; partial
/// transfers and interrupted system calls are retried inside the
/// implementation. The connector relies on this and never re-issues a
/// partial operation itself.
pub trait Transport {
    /// Establishes a connection to `host:port`.
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()>;

    /// Binds to `port` and accepts a single inbound connection.
    fn listen(&mut self, port: u16) -> io::Result<()>;

    /// Sends all of `bytes`.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Fills all of `bytes` with received data.
    fn receive(&mut self, bytes: &mut [u8]) -> io::Result<()>;

    /// Shuts the connection down. A no-op when not connected.
    fn disconnect(&mut self) -> io::Result<()>;
}
