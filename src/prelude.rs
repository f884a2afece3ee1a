// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types and traits.

pub use crate::{
    catalog::{EnumerationId, PhysicalUnitId, SensorId},
    transport::Transport,
    Connector, Error, Result, SensorMeta, SerialNumber, Value, ValueRep,
};

#[cfg(feature = "tcp")]
pub use crate::transport::TcpTransport;
