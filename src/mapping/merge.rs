//! Identity-aware merge of a patch document onto a mapping document.
//!
//! Three levels, deepest rule wins:
//! - `merge_maps`: generic recursive object merge, everything that is not
//!   object-on-object is a full overwrite.
//! - `merge_device`: shallow overwrite of device fields, axes matched by
//!   `code`, buttons matched by key.
//! - `merge_mapping`: generic merge for every top-level key except `devices`,
//!   devices matched by `path`.
//!
//! Merging never removes anything that the patch does not mention. A `null`
//! in the patch is treated as an absent key. A collection the original does
//! not have (or holds with the wrong shape) is adopted from the patch as is,
//! and unmatched devices, axes and buttons are appended verbatim. Entries
//! without an identity are only skipped while matching against an existing
//! collection.

use serde_json::{Map, Value};

use crate::mapping::document::{
    axis_code, device_path, same_code, Document, EntryLocation, SkipReason, SkippedEntry,
    AXES_KEY, BUTTONS_KEY, DEVICES_KEY,
};

/// Result of a merge: the merged document plus the patch entries that were
/// ignored because they had no usable identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub document: Document,
    pub skipped: Vec<SkippedEntry>,
}

/// Merge `patch` onto `original`, dropping the skip report.
pub fn merge(original: Document, patch: Document) -> Document {
    merge_mapping(original, patch).document
}

/// Top-level merge. Consumes `original` and returns the merged document.
pub fn merge_mapping(original: Document, patch: Document) -> MergeOutcome {
    let mut document = original;
    let mut skipped = Vec::new();

    let mut patch_devices = None;
    let mut rest = Map::new();
    for (key, value) in patch {
        if key == DEVICES_KEY {
            patch_devices = Some(value);
        } else {
            rest.insert(key, value);
        }
    }

    merge_maps(&mut document, rest);

    if let Some(devices) = patch_devices {
        merge_devices(&mut document, devices, &mut skipped);
    }

    MergeOutcome { document, skipped }
}

/// Generic recursive merge: objects merge key by key, anything else replaces
/// the existing value.
pub fn merge_maps(original: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, patch_value) in patch {
        match patch_value {
            Value::Null => {}
            Value::Object(patch_map) => {
                if let Some(Value::Object(existing)) = original.get_mut(&key) {
                    merge_maps(existing, patch_map);
                    continue;
                }
                original.insert(key, Value::Object(patch_map));
            }
            value => {
                original.insert(key, value);
            }
        }
    }
}

/// Merge one patch device onto the matching original device.
pub fn merge_device(
    original: &mut Map<String, Value>,
    patch: Map<String, Value>,
    skipped: &mut Vec<SkippedEntry>,
) {
    let mut patch_axes = None;
    let mut patch_buttons = None;

    for (key, value) in patch {
        match key.as_str() {
            AXES_KEY => patch_axes = Some(value),
            BUTTONS_KEY => patch_buttons = Some(value),
            _ if value.is_null() => {}
            _ => {
                original.insert(key, value);
            }
        }
    }

    let path = device_path(original).unwrap_or_default().to_string();

    if let Some(axes) = patch_axes.filter(|v| !v.is_null()) {
        merge_axes(original, axes, &path, skipped);
    }
    if let Some(buttons) = patch_buttons.filter(|v| !v.is_null()) {
        merge_buttons(original, buttons, &path, skipped);
    }
}

fn merge_devices(document: &mut Document, patch_devices: Value, skipped: &mut Vec<SkippedEntry>) {
    let patch_devices = match patch_devices {
        Value::Null => return,
        Value::Array(devices) => devices,
        _ => {
            skipped.push(SkippedEntry {
                location: EntryLocation::Devices,
                reason: SkipReason::WrongShape,
            });
            return;
        }
    };

    let Some(Value::Array(devices)) = document.get_mut(DEVICES_KEY) else {
        document.insert(DEVICES_KEY.to_string(), Value::Array(patch_devices));
        return;
    };

    for (index, entry) in patch_devices.into_iter().enumerate() {
        let Value::Object(device_patch) = entry else {
            skipped.push(SkippedEntry {
                location: EntryLocation::Device { index },
                reason: SkipReason::NotAnObject,
            });
            continue;
        };
        let Some(path) = device_path(&device_patch).map(str::to_string) else {
            skipped.push(SkippedEntry {
                location: EntryLocation::Device { index },
                reason: SkipReason::MissingPath,
            });
            continue;
        };

        let existing = devices.iter_mut().find_map(|device| match device {
            Value::Object(device) if device_path(device) == Some(path.as_str()) => Some(device),
            _ => None,
        });
        match existing {
            Some(device) => merge_device(device, device_patch, skipped),
            None => devices.push(Value::Object(device_patch)),
        }
    }
}

fn merge_axes(
    device: &mut Map<String, Value>,
    patch_axes: Value,
    path: &str,
    skipped: &mut Vec<SkippedEntry>,
) {
    let Value::Array(patch_axes) = patch_axes else {
        skipped.push(SkippedEntry {
            location: EntryLocation::Axes { device: path.to_string() },
            reason: SkipReason::WrongShape,
        });
        return;
    };

    let Some(Value::Array(axes)) = device.get_mut(AXES_KEY) else {
        device.insert(AXES_KEY.to_string(), Value::Array(patch_axes));
        return;
    };

    for (index, entry) in patch_axes.into_iter().enumerate() {
        let Value::Object(axis_patch) = entry else {
            skipped.push(SkippedEntry {
                location: EntryLocation::Axis { device: path.to_string(), index },
                reason: SkipReason::NotAnObject,
            });
            continue;
        };
        let Some(code) = axis_code(&axis_patch).cloned() else {
            skipped.push(SkippedEntry {
                location: EntryLocation::Axis { device: path.to_string(), index },
                reason: SkipReason::MissingCode,
            });
            continue;
        };

        let existing = axes.iter_mut().find_map(|axis| match axis {
            Value::Object(axis) if axis_code(axis).is_some_and(|c| same_code(c, &code)) => {
                Some(axis)
            }
            _ => None,
        });
        match existing {
            Some(axis) => merge_maps(axis, axis_patch),
            None => axes.push(Value::Object(axis_patch)),
        }
    }
}

fn merge_buttons(
    device: &mut Map<String, Value>,
    patch_buttons: Value,
    path: &str,
    skipped: &mut Vec<SkippedEntry>,
) {
    let Value::Object(patch_buttons) = patch_buttons else {
        skipped.push(SkippedEntry {
            location: EntryLocation::Buttons { device: path.to_string() },
            reason: SkipReason::WrongShape,
        });
        return;
    };

    let Some(Value::Object(buttons)) = device.get_mut(BUTTONS_KEY) else {
        device.insert(BUTTONS_KEY.to_string(), Value::Object(patch_buttons));
        return;
    };

    for (key, entry) in patch_buttons {
        let button_patch = match entry {
            Value::Null => continue,
            Value::Object(button_patch) => button_patch,
            _ => {
                skipped.push(SkippedEntry {
                    location: EntryLocation::Button { device: path.to_string(), key },
                    reason: SkipReason::NotAnObject,
                });
                continue;
            }
        };
        match buttons.get_mut(&key) {
            Some(Value::Object(button)) => merge_maps(button, button_patch),
            _ => {
                buttons.insert(key, Value::Object(button_patch));
            }
        }
    }
}
