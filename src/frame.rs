// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The proprietary datalogger envelope around _Modbus RTU_ PDUs.
//!
//! Outer fields are little-endian, the embedded PDU is big-endian _Modbus_.
//! Requests and replies share the sentinels and the trailing additive
//! checksum, but the "data field" between the header and the PDU is 15
//! bytes on requests and 14 bytes on replies.

use byteorder::LittleEndian;

use crate::{codec, Error, Result, SerialNumber};

/// First byte of every frame.
pub const FRAME_START: u8 = 0xA5;

/// Last byte of every frame.
pub const FRAME_END: u8 = 0x15;

/// Control code of outbound requests. Replies carry whatever code the
/// device chooses; it is not validated.
pub const REQUEST_CONTROL_CODE: u16 = 0x4510;

/// Placeholder preceding the datalogger serial number in the header.
pub const INVERTER_SERIAL_PREFIX: u16 = 0x0000;

/// Leading byte of the request data field, followed by 14 zero bytes.
pub const DATA_FIELD_LEAD: u8 = 0x02;

/// Fixed frame header: start byte, payload size, control code, serial
/// prefix, serial number.
pub(crate) const HEADER_LEN: usize = 11;

const REQUEST_DATA_FIELD_LEN: usize = 15;
const RESPONSE_DATA_FIELD_LEN: usize = 14;

/// Body length of the device's standard error reply.
const ERROR_REPLY_BODY_LEN: usize = 18;

/// Total length of a request frame embedding a `data_size`-byte PDU.
pub(crate) const fn request_frame_len(data_size: usize) -> usize {
    // header + data field + PDU + CRC + checksum + end byte
    HEADER_LEN + REQUEST_DATA_FIELD_LEN + data_size + 2 + 1 + 1
}

/// Encodes a request frame for `serial_number` into `buf`.
///
/// The `data_size`-byte PDU region is handed to `write_pdu`, which must
/// fill it completely. Returns the total frame length.
pub(crate) fn encode_request<F>(
    buf: &mut [u8],
    serial_number: SerialNumber,
    data_size: usize,
    write_pdu: F,
) -> Result<usize>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let frame_len = request_frame_len(data_size);
    if frame_len > buf.len() {
        return Err(Error::ActionExceedsLocalBufferSize);
    }
    let payload_size = (REQUEST_DATA_FIELD_LEN + data_size + 2) as u16;

    let mut offset = 0;
    codec::write::<u8, LittleEndian>(FRAME_START, buf, &mut offset)?;
    codec::write::<u16, LittleEndian>(payload_size, buf, &mut offset)?;
    codec::write::<u16, LittleEndian>(REQUEST_CONTROL_CODE, buf, &mut offset)?;
    codec::write::<u16, LittleEndian>(INVERTER_SERIAL_PREFIX, buf, &mut offset)?;
    codec::write::<u32, LittleEndian>(serial_number, buf, &mut offset)?;
    codec::write::<u8, LittleEndian>(DATA_FIELD_LEAD, buf, &mut offset)?;
    codec::write_all::<u8, LittleEndian>(&[0; REQUEST_DATA_FIELD_LEN - 1], buf, &mut offset)?;

    let pdu_start = offset;
    let pdu_end = pdu_start + data_size;
    write_pdu(&mut buf[pdu_start..pdu_end])?;
    offset = pdu_end;

    let crc = codec::crc(&buf[pdu_start..pdu_end]);
    codec::write::<u16, LittleEndian>(crc, buf, &mut offset)?;

    let checksum = codec::checksum(&buf[1..offset]);
    codec::write::<u8, LittleEndian>(checksum, buf, &mut offset)?;
    codec::write::<u8, LittleEndian>(FRAME_END, buf, &mut offset)?;

    debug_assert_eq!(offset, frame_len);
    Ok(frame_len)
}

/// Validates the fixed reply header and returns the length of the frame
/// body that is still to be received (payload plus checksum and end byte).
///
/// A reply from a different datalogger is reported with the returned
/// serial number attached, so that it can be told apart from the device's
/// own error-code replies.
pub(crate) fn decode_header(header: &[u8], serial_number: SerialNumber) -> Result<usize> {
    debug_assert_eq!(header.len(), HEADER_LEN);

    if header[0] != FRAME_START {
        return Err(Error::ResponseInvalidStart);
    }

    let mut offset = 7;
    let returned_serial_number = codec::read::<u32, LittleEndian>(header, &mut offset)?;
    if returned_serial_number != serial_number {
        return Err(Error::UnexpectedSerialNumber(returned_serial_number));
    }

    let mut offset = 1;
    let data_size = codec::read::<u16, LittleEndian>(header, &mut offset)?;

    // checksum + end byte follow the payload
    Ok(usize::from(data_size) + 2)
}

/// Validates a fully received reply frame (header and body) and returns
/// the inner PDU including its trailing _Modbus_ CRC.
///
/// The additive envelope checksum is redundant on top of TCP and only
/// verified when `verify_checksum` is set.
pub(crate) fn decode_body(frame: &[u8], verify_checksum: bool) -> Result<&[u8]> {
    let body = &frame[HEADER_LEN..];

    if body.len() == ERROR_REPLY_BODY_LEN {
        let mut offset = RESPONSE_DATA_FIELD_LEN;
        let code = codec::read::<u16, LittleEndian>(body, &mut offset)?;
        return Err(match code {
            0x0005 => Error::DeviceAddressMismatch,
            0x0006 => Error::SerialNumberMismatch,
            _ => Error::UnknownResponseCode(code),
        });
    }

    if body.len() < RESPONSE_DATA_FIELD_LEN + 2 {
        return Err(Error::ResultOutOfRange);
    }

    if frame[frame.len() - 1] != FRAME_END {
        return Err(Error::ResponseInvalidEnd);
    }

    if verify_checksum {
        let expected = frame[frame.len() - 2];
        let actual = codec::checksum(&frame[1..frame.len() - 2]);
        if expected != actual {
            log::warn!("Envelope checksum mismatch: expected {expected:#04X}, actual {actual:#04X}");
            return Err(Error::ResponseWrongChecksum);
        }
    }

    Ok(&frame[HEADER_LEN + RESPONSE_DATA_FIELD_LEN..frame.len() - 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a reply frame the way the datalogger does: 14-byte data
    // field, PDU, additive checksum, end byte.
    fn make_reply(serial_number: SerialNumber, pdu: &[u8]) -> Vec<u8> {
        let payload_size = (RESPONSE_DATA_FIELD_LEN + pdu.len()) as u16;
        let mut frame = vec![FRAME_START];
        frame.extend_from_slice(&payload_size.to_le_bytes());
        frame.extend_from_slice(&0x1510u16.to_le_bytes());
        frame.extend_from_slice(&INVERTER_SERIAL_PREFIX.to_le_bytes());
        frame.extend_from_slice(&serial_number.to_le_bytes());
        frame.push(DATA_FIELD_LEAD);
        frame.push(0x01); // delivery status
        frame.extend_from_slice(&[0; RESPONSE_DATA_FIELD_LEN - 2]);
        frame.extend_from_slice(pdu);
        frame.push(codec::checksum(&frame[1..]));
        frame.push(FRAME_END);
        frame
    }

    #[test]
    fn encode_read_request() {
        let mut buf = [0u8; 64];
        let len = encode_request(&mut buf, 123_456, 6, |pdu| {
            pdu.copy_from_slice(&[0x01, 0x03, 0x00, 0x3C, 0x00, 0x01]);
            Ok(())
        })
        .unwrap();

        #[rustfmt::skip]
        let expected = [
            0xA5,       // start byte
            0x17, 0x00, // payload size
            0x10, 0x45, // control code
            0x00, 0x00, // inverter serial prefix
            0x40, 0xE2, 0x01, 0x00, // serial number 123456
            0x02, // data field
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x03, 0x00, 0x3C, 0x00, 0x01, // read 1 register at 60
            0x41, 0x08, // CRC
            0x1B, // checksum
            0x15, // end byte
        ];
        assert_eq!(&buf[..len], expected);
    }

    #[test]
    fn encode_refuses_undersized_buffer() {
        let mut buf = [0u8; 35];
        let result = encode_request(&mut buf, 123_456, 6, |_| Ok(()));
        assert!(matches!(result, Err(Error::ActionExceedsLocalBufferSize)));
    }

    #[test]
    fn encode_propagates_pdu_writer_errors() {
        let mut buf = [0u8; 64];
        let result = encode_request(&mut buf, 123_456, 6, |_| Err(Error::InternalError));
        assert!(matches!(result, Err(Error::InternalError)));
    }

    #[test]
    fn request_round_trip() {
        let pdu = [0x01, 0x03, 0x00, 0x3C, 0x00, 0x01];
        let mut buf = [0u8; 64];
        let len = encode_request(&mut buf, 123_456, pdu.len(), |out| {
            out.copy_from_slice(&pdu);
            Ok(())
        })
        .unwrap();
        let frame = &buf[..len];

        let body_len = decode_header(&frame[..HEADER_LEN], 123_456).unwrap();
        assert_eq!(HEADER_LEN + body_len, len);

        // The decoder skips the 14-byte reply data field, so on a request
        // frame the PDU sits one byte into the returned slice, followed by
        // its CRC.
        let decoded = decode_body(frame, true).unwrap();
        assert_eq!(&decoded[1..=pdu.len()], pdu);
    }

    #[test]
    fn decode_header_rejects_invalid_start() {
        let mut frame = make_reply(123_456, &[0x01, 0x03, 0x00, 0x00, 0x00]);
        frame[0] = 0xA6;
        let result = decode_header(&frame[..HEADER_LEN], 123_456);
        assert!(matches!(result, Err(Error::ResponseInvalidStart)));
    }

    #[test]
    fn decode_header_reports_the_returned_serial_number() {
        let frame = make_reply(0x0001_0000, &[0x01, 0x03, 0x00, 0x00, 0x00]);
        let result = decode_header(&frame[..HEADER_LEN], 0x0001_E240);
        assert!(matches!(
            result,
            Err(Error::UnexpectedSerialNumber(0x0001_0000))
        ));
        // Not to be confused with the device's own 0x0006 reply.
        assert!(!matches!(result, Err(Error::SerialNumberMismatch)));
    }

    #[test]
    fn decode_body_recognizes_error_replies() {
        for (code, expected) in [
            (0x0005u16, Error::DeviceAddressMismatch),
            (0x0006, Error::SerialNumberMismatch),
            (0x0099, Error::UnknownResponseCode(0x0099)),
        ] {
            let frame = make_reply(123_456, &code.to_le_bytes());
            assert_eq!(frame.len(), HEADER_LEN + ERROR_REPLY_BODY_LEN);
            let result = decode_body(&frame, false);
            assert_eq!(
                std::mem::discriminant(&result.unwrap_err()),
                std::mem::discriminant(&expected)
            );
        }
    }

    #[test]
    fn decode_body_error_reply_carries_the_code() {
        let frame = make_reply(123_456, &0x0099u16.to_le_bytes());
        match decode_body(&frame, false) {
            Err(Error::UnknownResponseCode(code)) => assert_eq!(code, 0x0099),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_body_rejects_invalid_end() {
        let mut frame = make_reply(123_456, &[0x01, 0x03, 0x02, 0x00, 0xE6, 0x00, 0x00]);
        let end = frame.len() - 1;
        frame[end] = 0x16;
        let result = decode_body(&frame, false);
        assert!(matches!(result, Err(Error::ResponseInvalidEnd)));
    }

    #[test]
    fn decode_body_checksum_is_only_verified_on_demand() {
        let mut frame = make_reply(123_456, &[0x01, 0x03, 0x02, 0x00, 0xE6, 0x00, 0x00]);
        let pos = frame.len() - 2;
        frame[pos] ^= 0xFF;

        let result = decode_body(&frame, true);
        assert!(matches!(result, Err(Error::ResponseWrongChecksum)));

        // Disabled by default: TCP already guarantees integrity.
        assert!(decode_body(&frame, false).is_ok());
    }

    #[test]
    fn decode_body_returns_the_pdu_with_its_crc() {
        let pdu = [0x01, 0x03, 0x02, 0x00, 0xE6, 0x38, 0x7A];
        let frame = make_reply(123_456, &pdu);
        assert_eq!(decode_body(&frame, true).unwrap(), pdu);
    }
}
