// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sensor values and their interpretation.
//!
//! A sensor is a named view over a contiguous register range plus a rule
//! for turning the raw words into a value. Both sides of that rule are
//! plain tagged unions.

use std::fmt;

use smallvec::SmallVec;

use crate::{
    catalog::{EnumerationId, PhysicalUnit, PhysicalUnitId},
    Address, Error, Quantity, Result, Word,
};

/// Maximum number of registers a raw [`Value::Registers`] can carry.
pub const MAX_RAW_REGISTERS: usize = 8;

/// Maximum number of registers staged into a scalar value.
pub(crate) const MAX_SCALAR_REGISTERS: usize = 4;

/// How a sensor's register range is decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRep {
    /// The registers are passed through unmodified.
    Registers,

    /// `signed(raw) * scale + offset`
    Integer { scale: i32, offset: i32 },

    /// `f64(raw) * scale + offset`, tagged with a physical unit.
    Physical {
        scale: f64,
        offset: f64,
        unit: PhysicalUnitId,
    },

    /// The raw value indexes into an enumeration's display names.
    Enumeration { enumeration: EnumerationId },
}

/// A decoded sensor reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No reading yet. This is what value slots hold before
    /// [`read_sensors`](crate::Connector::read_sensors) fills them.
    #[default]
    Empty,

    /// Raw register words.
    Registers(SmallVec<[Word; MAX_RAW_REGISTERS]>),

    /// A scaled signed integer.
    Integer(i64),

    /// A scaled physical quantity.
    Physical { value: f64, unit: PhysicalUnitId },

    /// An index into an enumeration. The index is not range-checked here;
    /// display code treats an out-of-range index as a data error.
    Enumeration {
        index: usize,
        enumeration: EnumerationId,
    },
}

impl ValueRep {
    /// Decodes `registers` according to this representation.
    ///
    /// Scalar representations stage the registers into one word in
    /// _Modbus_ order, the first register ending up most significant.
    /// The staged word is narrowed through `i32` before scaling, which
    /// is the full staged width for every catalog entry.
    pub fn interpret(&self, registers: &[Word]) -> Result<Value> {
        if let Self::Registers = self {
            if registers.len() > MAX_RAW_REGISTERS {
                return Err(Error::ResultOutOfRange);
            }
            return Ok(Value::Registers(SmallVec::from_slice(registers)));
        }

        if registers.len() > MAX_SCALAR_REGISTERS {
            return Err(Error::ResultOutOfRange);
        }
        let mut stage: u64 = 0;
        for register in registers {
            stage = stage << 16 | u64::from(*register);
        }

        Ok(match *self {
            Self::Registers => unreachable!(),
            Self::Integer { scale, offset } => {
                Value::Integer(i64::from(stage as i32) * i64::from(scale) + i64::from(offset))
            }
            Self::Physical {
                scale,
                offset,
                unit,
            } => Value::Physical {
                value: f64::from(stage as i32) * scale + offset,
                unit,
            },
            Self::Enumeration { enumeration } => Value::Enumeration {
                index: stage as usize,
                enumeration,
            },
        })
    }
}

/// Metadata of one catalog sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMeta {
    pub name: &'static str,
    pub begin_address: Address,
    pub register_count: Quantity,
    pub rep: ValueRep,
}

impl SensorMeta {
    /// One past the last register address covered by this sensor.
    #[must_use]
    pub fn end_address(&self) -> u32 {
        u32::from(self.begin_address) + u32::from(self.register_count)
    }

    /// The physical unit this sensor's readings are expressed in, for
    /// sensors with a physical representation.
    #[must_use]
    pub fn unit(&self) -> Option<&'static PhysicalUnit> {
        match self.rep {
            ValueRep::Physical { unit, .. } => Some(unit.unit()),
            _ => None,
        }
    }

    /// Decodes a raw register slice read from this sensor's range.
    pub fn interpret(&self, registers: &[Word]) -> Result<Value> {
        self.rep.interpret(registers)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("-"),
            Self::Registers(registers) => {
                f.write_str("[")?;
                for (i, register) in registers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{register:#06X}")?;
                }
                f.write_str("]")
            }
            Self::Integer(value) => write!(f, "{value}"),
            Self::Physical { value, unit } => write!(f, "{} {}", value, unit.unit().symbol),
            Self::Enumeration { index, enumeration } => {
                match enumeration.enumeration().name(*index) {
                    Some(name) => f.write_str(name),
                    None => write!(f, "unknown ({index})"),
                }
            }
        }
    }
}
