// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TCP transport on `std::net`.

use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpListener, TcpStream},
};

use super::Transport;

/// Blocking TCP transport.
///
/// Dataloggers usually listen on port 8899. `write_all`/`read_exact`
/// provide the exact-transfer semantics the [`Transport`] contract
/// requires, including retries on interrupted system calls.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport not connected"))
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        let stream = TcpStream::connect((host, port))?;
        log::debug!("Connected to {host}:{port}");
        self.stream = Some(stream);
        Ok(())
    }

    fn listen(&mut self, port: u16) -> io::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        let (stream, peer) = listener.accept()?;
        log::debug!("Accepted connection from {peer}");
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream()?.write_all(bytes)
    }

    fn receive(&mut self, bytes: &mut [u8]) -> io::Result<()> {
        self.stream()?.read_exact(bytes)
    }

    fn disconnect(&mut self) -> io::Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.shutdown(Shutdown::Both)?;
        }
        Ok(())
    }
}
