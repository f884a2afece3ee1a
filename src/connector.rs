// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stateful datalogger connection.

use std::fmt;

use byteorder::{BigEndian, LittleEndian};

use crate::{
    catalog::SensorId,
    codec, frame,
    sensor::Value,
    transport::Transport,
    Address, Error, Quantity, Result, SerialNumber, Word,
};

#[cfg(feature = "tcp")]
use crate::transport::TcpTransport;

/// Size of the connector's scratch buffer.
///
/// Every frame is staged here, so no request or reply may exceed this
/// size. Oversized frames are a hard error, not a reallocation.
pub const SCRATCH_BUFFER_LEN: usize = 2048;

/// All requests address the inverter behind the datalogger as unit 1.
const UNIT_ID: u8 = 0x01;

const FN_READ_HOLDING_REGISTERS: u8 = 0x03;
const FN_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// A connection to one datalogger.
///
/// The connector owns its transport and a fixed scratch buffer that is
/// reused for every exchange; a single instance must be driven
/// sequentially from one thread. Separate instances are independent.
///
/// Constructing a connector does not open the transport, only
/// [`connect`](Self::connect) does. Dropping the connector disconnects
/// the transport unconditionally.
pub struct Connector<T: Transport> {
    transport: T,
    serial_number: SerialNumber,
    verify_checksums: bool,
    buffer: [u8; SCRATCH_BUFFER_LEN],
}

#[cfg(feature = "tcp")]
impl Connector<TcpTransport> {
    /// Creates a connector for the datalogger with the given serial
    /// number, talking TCP.
    #[must_use]
    pub fn new(serial_number: SerialNumber) -> Self {
        Self::with_transport(serial_number, TcpTransport::new())
    }
}

impl<T: Transport> Connector<T> {
    /// Creates a connector on a caller-supplied transport.
    #[must_use]
    pub fn with_transport(serial_number: SerialNumber, transport: T) -> Self {
        Self {
            transport,
            serial_number,
            verify_checksums: false,
            buffer: [0; SCRATCH_BUFFER_LEN],
        }
    }

    /// The serial number stamped into every outbound frame.
    #[must_use]
    pub fn serial_number(&self) -> SerialNumber {
        self.serial_number
    }

    pub fn set_serial_number(&mut self, serial_number: SerialNumber) {
        self.serial_number = serial_number;
    }

    /// Enables verification of the redundant integrity fields (envelope
    /// checksum and inner _Modbus_ CRC) in replies.
    ///
    /// Disabled by default: both are redundant on top of TCP.
    pub fn set_verify_checksums(&mut self, enabled: bool) {
        self.verify_checksums = enabled;
    }

    /// Establishes the transport connection. Dataloggers usually listen
    /// on port 8899.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        Ok(self.transport.connect(host, port)?)
    }

    /// Waits for the datalogger to connect to us instead.
    pub fn listen(&mut self, port: u16) -> Result<()> {
        Ok(self.transport.listen(port)?)
    }

    /// Shuts the transport connection down.
    pub fn disconnect(&mut self) -> Result<()> {
        Ok(self.transport.disconnect()?)
    }

    /// Reads `register_count` holding registers starting at
    /// `begin_address` (function code 0x03).
    ///
    /// The registers arrive big-endian on the wire and are returned as
    /// host-endian words.
    pub fn read_registers(
        &mut self,
        begin_address: Address,
        register_count: Quantity,
    ) -> Result<Vec<Word>> {
        const REQUEST_SIZE: usize = 6;

        let verify_crc = self.verify_checksums;
        self.modbus_request(
            REQUEST_SIZE,
            |pdu| {
                if pdu.len() != REQUEST_SIZE {
                    return Err(Error::InternalError);
                }
                let mut offset = 0;
                codec::write::<u8, BigEndian>(UNIT_ID, pdu, &mut offset)?;
                codec::write::<u8, BigEndian>(FN_READ_HOLDING_REGISTERS, pdu, &mut offset)?;
                codec::write::<u16, BigEndian>(begin_address, pdu, &mut offset)?;
                codec::write::<u16, BigEndian>(register_count, pdu, &mut offset)?;
                Ok(())
            },
            |pdu| {
                // [unit, func, byte count, data, CRC]
                if pdu.len() < 3 + 2 {
                    return Err(Error::ResultOutOfRange);
                }
                let (data, crc) = pdu.split_at(pdu.len() - 2);
                if verify_crc {
                    let mut offset = 0;
                    let actual = codec::read::<u16, LittleEndian>(crc, &mut offset)?;
                    if actual != codec::crc(data) {
                        return Err(Error::ResponseWrongCrc);
                    }
                }

                let mut offset = 2;
                let byte_count = codec::read::<u8, BigEndian>(data, &mut offset)?;
                if usize::from(byte_count) / 2 != usize::from(register_count) {
                    return Err(Error::ResponseWrongRegisterCount);
                }
                if data.len() < 3 + usize::from(byte_count) {
                    return Err(Error::ResultOutOfRange);
                }

                let mut registers = Vec::with_capacity(register_count.into());
                for _ in 0..register_count {
                    registers.push(codec::read::<u16, BigEndian>(data, &mut offset)?);
                }
                Ok(registers)
            },
        )
    }

    /// Writes `values` to consecutive holding registers starting at
    /// `begin_address` (function code 0x10).
    pub fn write_registers(&mut self, begin_address: Address, values: &[Word]) -> Result<()> {
        let byte_count = values.len() * 2;
        if byte_count > usize::from(u8::MAX) {
            return Err(Error::TooManyRegisterValues);
        }
        let request_size = 7 + byte_count;
        let register_count = values.len() as Quantity;

        let verify_crc = self.verify_checksums;
        self.modbus_request(
            request_size,
            |pdu| {
                if pdu.len() != request_size {
                    return Err(Error::InternalError);
                }
                let mut offset = 0;
                codec::write::<u8, BigEndian>(UNIT_ID, pdu, &mut offset)?;
                codec::write::<u8, BigEndian>(FN_WRITE_MULTIPLE_REGISTERS, pdu, &mut offset)?;
                codec::write::<u16, BigEndian>(begin_address, pdu, &mut offset)?;
                codec::write::<u16, BigEndian>(register_count, pdu, &mut offset)?;
                codec::write::<u8, BigEndian>(byte_count as u8, pdu, &mut offset)?;
                codec::write_all::<u16, BigEndian>(values, pdu, &mut offset)?;
                Ok(())
            },
            |pdu| {
                // [unit, func, echoed address, echoed count, CRC]
                if pdu.len() < 6 + 2 {
                    return Err(Error::ResultOutOfRange);
                }
                let (data, crc) = pdu.split_at(pdu.len() - 2);
                if verify_crc {
                    let mut offset = 0;
                    let actual = codec::read::<u16, LittleEndian>(crc, &mut offset)?;
                    if actual != codec::crc(data) {
                        return Err(Error::ResponseWrongCrc);
                    }
                }

                let mut offset = 2;
                let returned_address = codec::read::<u16, BigEndian>(data, &mut offset)?;
                let returned_count = codec::read::<u16, BigEndian>(data, &mut offset)?;
                if returned_address != begin_address {
                    return Err(Error::ResponseWrongAddress);
                }
                if returned_count != register_count {
                    return Err(Error::ResponseWrongRegisterCount);
                }
                Ok(())
            },
        )
    }

    /// Reads and decodes a single sensor.
    pub fn read_sensor(&mut self, id: SensorId) -> Result<Value> {
        let meta = id.meta();
        let registers = self.read_registers(meta.begin_address, meta.register_count)?;
        meta.interpret(&registers)
    }

    /// Reads and decodes a batch of sensors with a single register-read
    /// request.
    ///
    /// The request covers the span from the lowest to the highest
    /// register any of the sensors touches, gaps included. Inverters
    /// tolerate reads of unused addresses, and one round-trip beats many
    /// on a high-latency Wi-Fi link. Values are stored in input order;
    /// duplicate ids are decoded independently.
    pub fn read_sensors(&mut self, ids: &[SensorId], values: &mut [Value]) -> Result<()> {
        if ids.len() != values.len() {
            return Err(Error::NumSensorsValuesMismatch);
        }
        if ids.is_empty() {
            return Ok(());
        }

        let mut begin_address = u32::from(Address::MAX);
        let mut end_address = 0;
        for id in ids {
            let meta = id.meta();
            begin_address = begin_address.min(u32::from(meta.begin_address));
            end_address = end_address.max(meta.end_address());
        }

        let registers = self.read_registers(
            begin_address as Address,
            (end_address - begin_address) as Quantity,
        )?;

        for (id, slot) in ids.iter().zip(values.iter_mut()) {
            let meta = id.meta();
            let first = (u32::from(meta.begin_address) - begin_address) as usize;
            *slot = meta.interpret(&registers[first..first + usize::from(meta.register_count)])?;
        }
        Ok(())
    }

    fn modbus_request<F, G, R>(&mut self, data_size: usize, write_pdu: F, read_pdu: G) -> Result<R>
    where
        F: FnOnce(&mut [u8]) -> Result<()>,
        G: FnOnce(&[u8]) -> Result<R>,
    {
        self.send_modbus_frame(data_size, write_pdu)?;
        self.receive_modbus_frame(read_pdu)
    }

    fn send_modbus_frame<F>(&mut self, data_size: usize, write_pdu: F) -> Result<()>
    where
        F: FnOnce(&mut [u8]) -> Result<()>,
    {
        let frame_len =
            frame::encode_request(&mut self.buffer, self.serial_number, data_size, write_pdu)?;
        log::debug!("Sending {frame_len} byte request frame");
        self.transport.send(&self.buffer[..frame_len])?;
        Ok(())
    }

    fn receive_modbus_frame<G, R>(&mut self, read_pdu: G) -> Result<R>
    where
        G: FnOnce(&[u8]) -> Result<R>,
    {
        self.transport.receive(&mut self.buffer[..frame::HEADER_LEN])?;
        let body_len = frame::decode_header(&self.buffer[..frame::HEADER_LEN], self.serial_number)?;

        let frame_len = frame::HEADER_LEN + body_len;
        if frame_len > self.buffer.len() {
            return Err(Error::ActionExceedsLocalBufferSize);
        }
        self.transport
            .receive(&mut self.buffer[frame::HEADER_LEN..frame_len])?;
        log::debug!("Received {frame_len} byte reply frame");

        let pdu = frame::decode_body(&self.buffer[..frame_len], self.verify_checksums)?;
        read_pdu(pdu)
    }
}

impl<T: Transport> Drop for Connector<T> {
    fn drop(&mut self) {
        let _ = self.transport.disconnect();
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Connector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("transport", &self.transport)
            .field("serial_number", &self.serial_number)
            .field("verify_checksums", &self.verify_checksums)
            .finish_non_exhaustive()
    }
}
