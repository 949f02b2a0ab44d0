//! InfluxDB Adapter
//!
//! Implementation of the PointWriter port on top of the `influxdb` client.
//! Points are written one at a time with second precision.

mod writer;

pub use writer::{InfluxWriter, ensure_acknowledged, point_query};
