//! Parsing of hypervisor CLI query output.
//!
//! Each query fetches a single field as line-oriented text. Coercion into
//! the record is tolerant: values an older or newer hypervisor formats
//! differently leave the field at its zero value instead of failing the
//! whole query.

use firefleet_core::NodeRecord;

/// Trim one captured scalar value.
fn scalar(raw: &str) -> &str {
    raw.trim()
}

/// The node fields fetched per query, each tied to its external field path
/// and a typed setter on [`NodeRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeField {
    Cpus,
    Memory,
    DiskSize,
    Running,
}

impl NodeField {
    pub const ALL: [NodeField; 4] = [
        NodeField::Cpus,
        NodeField::Memory,
        NodeField::DiskSize,
        NodeField::Running,
    ];

    /// The `-t` field path the hypervisor CLI understands for this field.
    pub fn selector(self) -> &'static str {
        match self {
            NodeField::Cpus => "{{.Spec.CPUs}}",
            NodeField::Memory => "{{.Spec.Memory}}",
            NodeField::DiskSize => "{{.Spec.DiskSize}}",
            NodeField::Running => "{{.Status.Running}}",
        }
    }

    /// Coerce `raw` into the destination field. Parse failures for numeric
    /// and boolean fields are swallowed and the zero value kept.
    pub fn apply(self, record: &mut NodeRecord, raw: &str) {
        let value = scalar(raw);
        match self {
            NodeField::Cpus => {
                if let Ok(cpus) = value.parse::<i64>() {
                    record.cpus = cpus;
                }
            }
            NodeField::Memory => record.memory = value.to_string(),
            NodeField::DiskSize => record.disk_size = value.to_string(),
            NodeField::Running => {
                if let Ok(running) = value.parse::<bool>() {
                    record.status.running = running;
                }
            }
        }
    }
}

/// Split name-listing output into node-name tokens. Empty output yields an
/// empty vec, not an error.
pub fn node_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
