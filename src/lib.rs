// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A pure [Rust](https://www.rust-lang.org) client library for
//! [Deye](https://deye.com)-family solar inverters behind their Wi-Fi
//! dataloggers.
//!
//! The datalogger exposes a TCP endpoint (typically port 8899) and relays
//! [Modbus](https://en.wikipedia.org/wiki/Modbus) RTU to the inverter,
//! wrapped in a proprietary envelope that is keyed by the datalogger's
//! serial number. This crate implements the envelope, the two _Modbus_
//! functions the device understands (0x03 read holding registers, 0x10
//! write multiple registers) and a sensor catalog that decodes raw
//! registers into tagged values.
//!
//! ## Features
//!
//! - pure Rust library
//! - synchronous (blocking), no runtime required
//! - allocation-free framing on a fixed scratch buffer
//! - batched sensor reads coalesced into a single request
//! - pluggable transport, TCP on `std::net` built in
//!
//! # Example
//!
//! ```rust,no_run
//! use deye_modbus::{catalog::SensorId, Connector, Value};
//!
//! fn main() -> deye_modbus::Result<()> {
//!     let mut connector = Connector::new(1_234_567_890);
//!     connector.connect("192.168.1.100", 8899)?;
//!
//!     let sensors = [SensorId::DailyProduction, SensorId::BatterySoc];
//!     let mut values = vec![Value::Empty; sensors.len()];
//!     connector.read_sensors(&sensors, &mut values)?;
//!
//!     for (sensor, value) in sensors.iter().zip(&values) {
//!         let meta = sensor.meta();
//!         match meta.unit() {
//!             Some(unit) => println!("{} ({}): {}", meta.name, unit.name, value),
//!             None => println!("{}: {}", meta.name, value),
//!         }
//!     }
//!     connector.disconnect()
//! }
//! ```

pub mod catalog;
pub mod codec;
pub mod frame;
pub mod prelude;
pub mod transport;

mod connector;
mod error;
mod sensor;

pub use self::{
    connector::{Connector, SCRATCH_BUFFER_LEN},
    error::{Error, Result},
    sensor::{SensorMeta, Value, ValueRep, MAX_RAW_REGISTERS},
};

/// A register address. 16 bit, 0-based.
pub type Address = u16;

/// Number of registers to process.
pub type Quantity = u16;

/// _Modbus_ uses 16 bit for its data items, transmitted big-endian.
pub type Word = u16;

/// The serial number of a datalogger. Printed on the device's label and
/// embedded in every frame.
pub type SerialNumber = u32;
