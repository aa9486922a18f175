//! Key/value `.cfg` dialect: `key = value; // [type: T; default: D] Description`.
//!
//! Every physical line becomes a [`CfgLine`]. Config lines are split into
//! `prefix + value + suffix` so the value can be replaced without touching a
//! single byte around it; every other line is kept as raw passthrough.

pub mod line;
pub mod parser;

pub use line::{CfgFile, CfgLine, ConfigEntry, LineKind, Metadata};
pub use parser::parse_cfg;
