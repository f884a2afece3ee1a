// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use thiserror::Error;

use crate::SerialNumber;

/// Result type of all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for datalogger and _Modbus_ operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying transport failed. The original error is passed
    /// through unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A frame would overrun the connector's fixed scratch buffer.
    #[error("frame exceeds the local buffer size")]
    ActionExceedsLocalBufferSize,

    /// More register values than a single write request can carry.
    #[error("too many register values for a single write request")]
    TooManyRegisterValues,

    /// The response frame does not begin with the start sentinel.
    #[error("response frame has an invalid start byte")]
    ResponseInvalidStart,

    /// The response frame does not end with the end sentinel.
    #[error("response frame has an invalid end byte")]
    ResponseInvalidEnd,

    /// The envelope checksum of the response does not match.
    #[error("response frame checksum mismatch")]
    ResponseWrongChecksum,

    /// The _Modbus_ CRC of the inner response PDU does not match.
    #[error("response PDU CRC mismatch")]
    ResponseWrongCrc,

    /// A write reply echoed a different start address than requested.
    #[error("returned address does not match the sent value")]
    ResponseWrongAddress,

    /// The reply carries a different register count than requested.
    #[error("returned register count does not match the sent value")]
    ResponseWrongRegisterCount,

    /// The datalogger replied with error code 0x0005.
    #[error("device address does not match")]
    DeviceAddressMismatch,

    /// The datalogger replied with error code 0x0006.
    #[error("serial number does not match")]
    SerialNumberMismatch,

    /// The reply header carries a serial number other than the one this
    /// connector is bound to. The returned number is preserved for
    /// diagnostics.
    #[error("reply from unexpected datalogger serial number {0}")]
    UnexpectedSerialNumber(SerialNumber),

    /// The datalogger replied with an unrecognized error code.
    #[error("unknown response error code {0:#06X}")]
    UnknownResponseCode(u16),

    /// `read_sensors` was called with differently sized id and value slices.
    #[error("number of sensor ids does not match number of value slots")]
    NumSensorsValuesMismatch,

    /// No sensor is assigned to the given id.
    #[error("unknown sensor id {0}")]
    UnknownSensor(u8),

    /// No physical unit is assigned to the given id.
    #[error("unknown physical unit id {0}")]
    UnknownUnit(u8),

    /// No enumeration is assigned to the given id.
    #[error("unknown enumeration id {0}")]
    UnknownEnumeration(u8),

    /// An internal invariant was broken, e.g. a PDU writer produced a
    /// request of unexpected size.
    #[error("internal error")]
    InternalError,

    /// An offset or length exceeded the bounds of its buffer.
    #[error("result out of range")]
    ResultOutOfRange,
}
