//! Mapping document shape and identity keys.
//!
//! The document is a loosely-typed JSON mapping. Fields the service does not
//! know about pass through a merge untouched.

use std::fmt;

use serde_json::{Map, Value};

/// A full or partial mapping document (top-level JSON object).
pub type Document = Map<String, Value>;

/// Top-level key holding the device sequence.
pub const DEVICES_KEY: &str = "devices";
/// Identity field of a device.
pub const DEVICE_PATH_KEY: &str = "path";
/// Device key holding the axis sequence.
pub const AXES_KEY: &str = "axes";
/// Identity field of an axis within a device.
pub const AXIS_CODE_KEY: &str = "code";
/// Device key holding the button mapping (keyed by button code).
pub const BUTTONS_KEY: &str = "buttons";

/// Where in the patch a skipped entry was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLocation {
    /// The top-level `devices` value itself.
    Devices,
    /// An element of the patch `devices` sequence.
    Device { index: usize },
    /// A device's `axes` value itself.
    Axes { device: String },
    /// An element of a device's `axes` sequence.
    Axis { device: String, index: usize },
    /// A device's `buttons` value itself.
    Buttons { device: String },
    /// One entry of a device's `buttons` mapping.
    Button { device: String, key: String },
}

impl fmt::Display for EntryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryLocation::Devices => write!(f, "devices"),
            EntryLocation::Device { index } => write!(f, "devices[{}]", index),
            EntryLocation::Axes { device } => write!(f, "devices[path={}].axes", device),
            EntryLocation::Axis { device, index } => {
                write!(f, "devices[path={}].axes[{}]", device, index)
            }
            EntryLocation::Buttons { device } => write!(f, "devices[path={}].buttons", device),
            EntryLocation::Button { device, key } => {
                write!(f, "devices[path={}].buttons.{}", device, key)
            }
        }
    }
}

/// Why a patch entry could not take part in identity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry is not a JSON object.
    NotAnObject,
    /// The collection has the wrong JSON shape (e.g. `devices` is not an array).
    WrongShape,
    /// A device has no `path`, or its `path` is not a string.
    MissingPath,
    /// An axis has no `code`.
    MissingCode,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NotAnObject => "entry is not an object",
            SkipReason::WrongShape => "collection has the wrong shape",
            SkipReason::MissingPath => "device has no string `path`",
            SkipReason::MissingCode => "axis has no `code`",
        };
        f.write_str(text)
    }
}

/// A patch entry the merge ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub location: EntryLocation,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.reason)
    }
}

/// Device identity: the string `path` field.
pub fn device_path(device: &Map<String, Value>) -> Option<&str> {
    device.get(DEVICE_PATH_KEY).and_then(Value::as_str)
}

/// Axis identity: the non-null `code` field, whatever its JSON type.
pub fn axis_code(axis: &Map<String, Value>) -> Option<&Value> {
    axis.get(AXIS_CODE_KEY).filter(|code| !code.is_null())
}

/// Whether two axis codes name the same axis.
///
/// Numbers compare by value, so `1` and `1.0` match; other values must be
/// equal JSON, so `1` and `"1"` do not.
pub fn same_code(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        _ => a == b,
    }
}
