//! # Path Module
//!
//! Resource path construction.
//!
//! A [`PathSegment`] chain mirrors the traversal: entering a data node links
//! a new segment to the current one, leaving it drops back to the parent.
//! List keys become path parameters when the segment is created, so every
//! printer sees the same, already de-duplicated, parameter names.
//!
//! Printers render a chain in one of three dialects:
//!
//! | dialect   | member path        | trailing slash | data root |
//! |-----------|--------------------|----------------|-----------|
//! | `rfc8040` | `b={x},{y}`        | no             | `data`    |
//! | `odl`     | `b/{x}/{y}`        | yes            | `config`  |
//! | `segment` | `b/{x}/{y}`        | no             | `data`    |

mod printer;
mod segment;

pub use printer::{OdlPrinter, PathPrinter, Rfc8040Printer, SegmentPrinter};
pub use segment::{PathParam, PathSegment};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root of RPC paths in every dialect.
pub const OPERATIONS_ROOT: &str = "operations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathDialect {
    #[default]
    Rfc8040,
    Odl,
    Segment,
}

impl PathDialect {
    /// First path segment of data resources.
    pub fn data_root(&self) -> &'static str {
        match self {
            PathDialect::Rfc8040 | PathDialect::Segment => "data",
            PathDialect::Odl => "config",
        }
    }

    pub fn printer(&self, use_module_name: bool) -> Box<dyn PathPrinter> {
        match self {
            PathDialect::Rfc8040 => Box::new(Rfc8040Printer { use_module_name }),
            PathDialect::Odl => Box::new(OdlPrinter { use_module_name }),
            PathDialect::Segment => Box::new(SegmentPrinter { use_module_name }),
        }
    }
}

impl FromStr for PathDialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rfc8040" | "restconf" => Ok(PathDialect::Rfc8040),
            "odl" => Ok(PathDialect::Odl),
            "segment" => Ok(PathDialect::Segment),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for PathDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDialect::Rfc8040 => write!(f, "rfc8040"),
            PathDialect::Odl => write!(f, "odl"),
            PathDialect::Segment => write!(f, "segment"),
        }
    }
}
