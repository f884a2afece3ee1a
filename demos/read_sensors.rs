// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads a handful of sensors from a Deye inverter in one batch.
//!
//! ```sh
//! cargo run --example read-sensors -- <host> <serial-number>
//! ```

use anyhow::Context;

use deye_modbus::{catalog::SensorId, Connector, Value};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let host = args
        .next()
        .context("usage: read-sensors <host> <serial-number>")?;
    let serial_number = args
        .next()
        .context("missing datalogger serial number")?
        .parse()
        .context("invalid datalogger serial number")?;

    let sensors = [
        SensorId::RunningStatus,
        SensorId::DailyProduction,
        SensorId::Pv1Voltage,
        SensorId::Pv1Current,
        SensorId::DcTemperature,
        SensorId::BatterySoc,
    ];
    let mut values = vec![Value::Empty; sensors.len()];

    let mut connector = Connector::new(serial_number);
    connector.connect(&host, 8899)?;
    connector.read_sensors(&sensors, &mut values)?;
    connector.disconnect()?;

    for (sensor, value) in sensors.iter().zip(&values) {
        let meta = sensor.meta();
        match meta.unit() {
            Some(unit) => {
                println!("{} ({}, {}): {}", meta.name, unit.measures, unit.name, value);
            }
            None => println!("{}: {}", meta.name, value),
        }
    }
    Ok(())
}
