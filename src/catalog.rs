// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static sensor catalog.
//!
//! Tables for the Deye hybrid-inverter register layout: physical units,
//! enumeration display names and the sensors themselves. All tables are
//! immutable, program-lifetime data; callers reference entries through
//! the id enums and never by raw index.

use crate::{
    sensor::{SensorMeta, ValueRep},
    Error,
};

/// A physical unit a sensor reading can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalUnit {
    /// The quantity this unit measures, e.g. `"temperature"`.
    pub measures: &'static str,
    /// The spelled-out unit name, e.g. `"Degrees Celsius"`.
    pub name: &'static str,
    /// The unit symbol, e.g. `"°C"`.
    pub symbol: &'static str,
}

/// An ordered list of display names, indexed by a raw register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    pub names: &'static [&'static str],
}

impl Enumeration {
    /// The display name for `index`, or `None` for an out-of-range index.
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }
}

/// Identifies a [`PhysicalUnit`] in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhysicalUnitId {
    Volts = 0,
    Ampere = 1,
    Watts = 2,
    WattHours = 3,
    Hertz = 4,
    DegreesCelsius = 5,
    Hours = 6,
    Percentage = 7,
}

impl PhysicalUnitId {
    /// Looks the unit up in the catalog.
    #[must_use]
    pub fn unit(self) -> &'static PhysicalUnit {
        &PHYSICAL_UNITS[self as usize]
    }
}

impl TryFrom<u8> for PhysicalUnitId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        use PhysicalUnitId::*;
        Ok(match value {
            0 => Volts,
            1 => Ampere,
            2 => Watts,
            3 => WattHours,
            4 => Hertz,
            5 => DegreesCelsius,
            6 => Hours,
            7 => Percentage,
            _ => return Err(Error::UnknownUnit(value)),
        })
    }
}

/// Identifies an [`Enumeration`] in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnumerationId {
    RunningStatus = 0,
    GenConnectedStatus = 1,
    GridStatus = 2,
    BatteryStatus = 3,
    GridConnectedStatus = 4,
    SmartloadEnableStatus = 5,
    WorkMode = 6,
    TimeOfUse = 7,
}

impl EnumerationId {
    /// Looks the enumeration up in the catalog.
    #[must_use]
    pub fn enumeration(self) -> &'static Enumeration {
        &ENUMERATIONS[self as usize]
    }
}

impl TryFrom<u8> for EnumerationId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        use EnumerationId::*;
        Ok(match value {
            0 => RunningStatus,
            1 => GenConnectedStatus,
            2 => GridStatus,
            3 => BatteryStatus,
            4 => GridConnectedStatus,
            5 => SmartloadEnableStatus,
            6 => WorkMode,
            7 => TimeOfUse,
            _ => return Err(Error::UnknownEnumeration(value)),
        })
    }
}

/// Identifies a sensor in the catalog.
///
/// The numeric assignment is an internal detail; callers reference
/// sensors by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorId {
    InverterId = 0,
    ControlBoardVersion = 1,
    CommunicationBoardVersion = 2,
    RunningStatus = 3,
    TotalGridProduction = 4,
    DailyEnergyBought = 5,
    DailyEnergySold = 6,
    TotalEnergyBought = 7,
    TotalEnergySold = 8,
    DailyLoadConsumption = 9,
    TotalLoadConsumption = 10,
    DcTemperature = 11,
    AcTemperature = 12,
    TotalProduction = 13,
    Alert = 14,
    DailyProduction = 15,
    Pv1Voltage = 16,
    Pv1Current = 17,
    Pv2Voltage = 18,
    Pv2Current = 19,
    GridVoltageL1 = 20,
    GridVoltageL2 = 21,
    LoadVoltage = 22,
    CurrentL1 = 23,
    CurrentL2 = 24,
    MicroInverterPower = 25,
    GenConnectedStatus = 26,
    GenPower = 27,
    InternalCtL1Power = 28,
    InternalCtL2Power = 29,
    GridStatus = 30,
    TotalGridPower = 31,
    ExternalCtL1Power = 32,
    ExternalCtL2Power = 33,
    InverterL1Power = 34,
    InverterL2Power = 35,
    TotalPower = 36,
    LoadL1Power = 37,
    LoadL2Power = 38,
    TotalLoadPower = 39,
    BatteryTemperature = 40,
    BatteryVoltage = 41,
    BatterySoc = 42,
    Pv1Power = 43,
    Pv2Power = 44,
    BatteryStatus = 45,
    BatteryPower = 46,
    BatteryCurrent = 47,
    GridConnectedStatus = 48,
    SmartloadEnableStatus = 49,
    WorkMode = 50,
    TimeOfUse = 51,
}

impl SensorId {
    /// Every catalog sensor, in id order.
    pub const ALL: [Self; 52] = [
        Self::InverterId,
        Self::ControlBoardVersion,
        Self::CommunicationBoardVersion,
        Self::RunningStatus,
        Self::TotalGridProduction,
        Self::DailyEnergyBought,
        Self::DailyEnergySold,
        Self::TotalEnergyBought,
        Self::TotalEnergySold,
        Self::DailyLoadConsumption,
        Self::TotalLoadConsumption,
        Self::DcTemperature,
        Self::AcTemperature,
        Self::TotalProduction,
        Self::Alert,
        Self::DailyProduction,
        Self::Pv1Voltage,
        Self::Pv1Current,
        Self::Pv2Voltage,
        Self::Pv2Current,
        Self::GridVoltageL1,
        Self::GridVoltageL2,
        Self::LoadVoltage,
        Self::CurrentL1,
        Self::CurrentL2,
        Self::MicroInverterPower,
        Self::GenConnectedStatus,
        Self::GenPower,
        Self::InternalCtL1Power,
        Self::InternalCtL2Power,
        Self::GridStatus,
        Self::TotalGridPower,
        Self::ExternalCtL1Power,
        Self::ExternalCtL2Power,
        Self::InverterL1Power,
        Self::InverterL2Power,
        Self::TotalPower,
        Self::LoadL1Power,
        Self::LoadL2Power,
        Self::TotalLoadPower,
        Self::BatteryTemperature,
        Self::BatteryVoltage,
        Self::BatterySoc,
        Self::Pv1Power,
        Self::Pv2Power,
        Self::BatteryStatus,
        Self::BatteryPower,
        Self::BatteryCurrent,
        Self::GridConnectedStatus,
        Self::SmartloadEnableStatus,
        Self::WorkMode,
        Self::TimeOfUse,
    ];

    /// Looks the sensor's metadata up in the catalog.
    #[must_use]
    pub fn meta(self) -> &'static SensorMeta {
        &SENSORS[self as usize]
    }
}

impl TryFrom<u8> for SensorId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(Error::UnknownSensor(value))
    }
}

static PHYSICAL_UNITS: [PhysicalUnit; 8] = [
    PhysicalUnit { measures: "electric potential", name: "volts", symbol: "V" },
    PhysicalUnit { measures: "current", name: "ampere", symbol: "A" },
    PhysicalUnit { measures: "power", name: "watts", symbol: "W" },
    PhysicalUnit { measures: "energy", name: "watt hours", symbol: "Wh" },
    PhysicalUnit { measures: "frequency", name: "hertz", symbol: "Hz" },
    PhysicalUnit { measures: "temperature", name: "Degrees Celsius", symbol: "°C" },
    PhysicalUnit { measures: "time", name: "hours", symbol: "h" },
    PhysicalUnit { measures: "fraction", name: "percentage", symbol: "%" },
];

static ENUMERATIONS: [Enumeration; 8] = [
    Enumeration { names: &["Stand-by", "Self-checking", "Normal", "FAULT"] },
    Enumeration { names: &["OFF", "ON"] },
    Enumeration { names: &["SELL", "BUY", "Stand-by"] },
    Enumeration { names: &["Charge", "Stand-by", "Discharge"] },
    Enumeration { names: &["Off-Grid", "On-Grid"] },
    Enumeration { names: &["OFF", "ON"] },
    Enumeration {
        names: &[
            "Selling First",
            "Zero-Export to Load&Solar Sell",
            "Zero-Export to Home&Solar Sell",
            "Zero-Export to Load",
            "Zero-Export to Home",
        ],
    },
    Enumeration { names: &["Disable", "Enable"] },
];

const fn integer(scale: i32, offset: i32) -> ValueRep {
    ValueRep::Integer { scale, offset }
}

const fn physical(scale: f64, unit: PhysicalUnitId) -> ValueRep {
    ValueRep::Physical { scale, offset: 0.0, unit }
}

const fn enumeration(enumeration: EnumerationId) -> ValueRep {
    ValueRep::Enumeration { enumeration }
}

const fn sensor(
    name: &'static str,
    begin_address: u16,
    register_count: u16,
    rep: ValueRep,
) -> SensorMeta {
    SensorMeta { name, begin_address, register_count, rep }
}

#[rustfmt::skip]
static SENSORS: [SensorMeta; 52] = [
    sensor("Inverter ID",                     3, 5, ValueRep::Registers),
    sensor("Control Board Version No.",      13, 1, integer(1, 0)),
    sensor("Communication Board Version No.",14, 1, integer(1, 0)),
    sensor("Running Status",                 59, 1, enumeration(EnumerationId::RunningStatus)),
    sensor("Total Grid Production",          63, 2, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Daily Energy Bought",            76, 1, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Daily Energy Sold",              77, 1, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Total Energy Bought",            78, 2, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Total Energy Sold",              81, 2, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Daily Load Consumption",         84, 1, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Total Load Consumption",         85, 2, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("DC Temperature",                 90, 1, physical(0.1, PhysicalUnitId::DegreesCelsius)),
    sensor("AC Temperature",                 91, 1, physical(0.1, PhysicalUnitId::DegreesCelsius)),
    sensor("Total Production",               96, 2, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("Alert",                         101, 6, ValueRep::Registers),
    sensor("Daily Production",              108, 1, physical(100.0, PhysicalUnitId::WattHours)),
    sensor("PV1 Voltage",                   109, 1, physical(0.1, PhysicalUnitId::Volts)),
    sensor("PV1 Current",                   110, 1, physical(0.1, PhysicalUnitId::Ampere)),
    sensor("PV2 Voltage",                   111, 1, physical(0.1, PhysicalUnitId::Volts)),
    sensor("PV2 Current",                   112, 1, physical(0.1, PhysicalUnitId::Ampere)),
    sensor("Grid Voltage L1",               150, 1, physical(0.1, PhysicalUnitId::Volts)),
    sensor("Grid Voltage L2",               151, 1, physical(0.1, PhysicalUnitId::Volts)),
    sensor("Load Voltage",                  157, 1, physical(0.1, PhysicalUnitId::Volts)),
    sensor("Current L1",                    164, 1, physical(0.01, PhysicalUnitId::Ampere)),
    sensor("Current L2",                    165, 1, physical(0.01, PhysicalUnitId::Ampere)),
    sensor("Micro-inverter Power",          166, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Gen-connected Status",          166, 1, enumeration(EnumerationId::GenConnectedStatus)),
    sensor("Gen Power",                     166, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Internal CT L1 Power",          167, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Internal CT L2 Power",          168, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Grid Status",                   169, 1, enumeration(EnumerationId::GridStatus)),
    sensor("Total Grid Power",              169, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("External CT L1 Power",          170, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("External CT L2 Power",          171, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Inverter L1 Power",             173, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Inverter L2 Power",             174, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Total Power",                   175, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Load L1 Power",                 176, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Load L2 Power",                 177, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Total Load Power",              178, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Battery Temperature",           182, 1, physical(0.1, PhysicalUnitId::DegreesCelsius)),
    sensor("Battery Voltage",               183, 1, physical(0.01, PhysicalUnitId::Volts)),
    sensor("Battery SOC",                   184, 1, physical(1.0, PhysicalUnitId::Percentage)),
    sensor("PV1 Power",                     186, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("PV2 Power",                     187, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Battery Status",                190, 1, enumeration(EnumerationId::BatteryStatus)),
    sensor("Battery Power",                 190, 1, physical(1.0, PhysicalUnitId::Watts)),
    sensor("Battery Current",               191, 1, physical(0.01, PhysicalUnitId::Ampere)),
    sensor("Grid-connected Status",         194, 1, enumeration(EnumerationId::GridConnectedStatus)),
    sensor("SmartLoad Enable Status",       195, 1, enumeration(EnumerationId::SmartloadEnableStatus)),
    sensor("Work Mode",                     244, 2, enumeration(EnumerationId::WorkMode)),
    sensor("Time of use",                   248, 1, enumeration(EnumerationId::TimeOfUse)),
];
