// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory transport and reply fixtures shared by the integration
//! tests.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, io, rc::Rc};

use deye_modbus::{codec, frame, transport::Transport, SerialNumber, Word};

#[derive(Debug, Default)]
struct Shared {
    sent_frames: Vec<Vec<u8>>,
    pending: VecDeque<u8>,
    send_calls: usize,
    receive_calls: usize,
    fail_sends: bool,
}

/// Mock transport that records every sent frame and serves pre-queued
/// reply bytes. Clones share state, so a test can keep a handle while
/// the connector owns the transport.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    shared: Rc<RefCell<Shared>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply frame to be served by subsequent `receive` calls.
    pub fn push_reply(&self, frame: &[u8]) {
        self.shared.borrow_mut().pending.extend(frame);
    }

    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.shared.borrow().sent_frames.clone()
    }

    pub fn send_calls(&self) -> usize {
        self.shared.borrow().send_calls
    }

    pub fn receive_calls(&self) -> usize {
        self.shared.borrow().receive_calls
    }

    pub fn pending_bytes(&self) -> usize {
        self.shared.borrow().pending.len()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.shared.borrow_mut().fail_sends = fail;
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _host: &str, _port: u16) -> io::Result<()> {
        Ok(())
    }

    fn listen(&mut self, _port: u16) -> io::Result<()> {
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut shared = self.shared.borrow_mut();
        shared.send_calls += 1;
        if shared.fail_sends {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated"));
        }
        shared.sent_frames.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, bytes: &mut [u8]) -> io::Result<()> {
        let mut shared = self.shared.borrow_mut();
        shared.receive_calls += 1;
        if shared.pending.len() < bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no reply queued",
            ));
        }
        for byte in bytes {
            *byte = shared.pending.pop_front().unwrap();
        }
        Ok(())
    }

    fn disconnect(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps `pdu` in a datalogger reply envelope: header, 14-byte data
/// field, checksum, end byte.
pub fn envelope(serial_number: SerialNumber, pdu: &[u8]) -> Vec<u8> {
    let payload_size = (14 + pdu.len()) as u16;
    let mut reply = vec![frame::FRAME_START];
    reply.extend_from_slice(&payload_size.to_le_bytes());
    reply.extend_from_slice(&0x1510u16.to_le_bytes());
    reply.extend_from_slice(&frame::INVERTER_SERIAL_PREFIX.to_le_bytes());
    reply.extend_from_slice(&serial_number.to_le_bytes());
    reply.push(frame::DATA_FIELD_LEAD);
    reply.push(0x01); // delivery status
    reply.extend_from_slice(&[0; 12]);
    reply.extend_from_slice(pdu);
    reply.push(codec::checksum(&reply[1..]));
    reply.push(frame::FRAME_END);
    reply
}

/// A successful 0x03 reply carrying `registers`.
pub fn read_reply(serial_number: SerialNumber, registers: &[Word]) -> Vec<u8> {
    let mut pdu = vec![0x01, 0x03, (registers.len() * 2) as u8];
    for register in registers {
        pdu.extend_from_slice(&register.to_be_bytes());
    }
    let crc = codec::crc(&pdu);
    pdu.extend_from_slice(&crc.to_le_bytes());
    envelope(serial_number, &pdu)
}

/// A successful 0x10 reply echoing `address` and `count`.
pub fn write_reply(serial_number: SerialNumber, address: u16, count: u16) -> Vec<u8> {
    let mut pdu = vec![0x01, 0x10];
    pdu.extend_from_slice(&address.to_be_bytes());
    pdu.extend_from_slice(&count.to_be_bytes());
    let crc = codec::crc(&pdu);
    pdu.extend_from_slice(&crc.to_le_bytes());
    envelope(serial_number, &pdu)
}

/// The device's standard 18-byte-body error reply.
pub fn error_reply(serial_number: SerialNumber, code: u16) -> Vec<u8> {
    envelope(serial_number, &code.to_le_bytes())
}

/// The big-endian address and count fields of a sent request frame.
pub fn request_address_and_count(frame: &[u8]) -> (u16, u16) {
    (
        u16::from_be_bytes([frame[28], frame[29]]),
        u16::from_be_bytes([frame[30], frame[31]]),
    )
}
