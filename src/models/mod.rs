//! Core data models for the component catalog.
//!
//! This module contains the entity schema shared across the crate: the
//! component record itself, its electrical specification, pricing and the
//! compatibility metadata used by the analyzer. Raw catalog records are
//! validated and normalized into these types by the [`record`] submodule.

pub mod record;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub use record::{CatalogDocument, RawComponent, RecordError};

/// Reserved compatibility-metadata key holding the interfaces a component requires.
pub const INTERFACE_REQUIREMENTS_KEY: &str = "interface_requirements";

/// Inclusive supply voltage range in volts.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct VoltageRange {
    /// Lower bound (volts)
    pub min: f64,

    /// Upper bound (volts)
    pub max: f64,
}

impl VoltageRange {
    /// Create a new voltage range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether the range is non-empty (`min <= max`).
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Intersect two ranges.
    ///
    /// The result may be inverted (`min > max`) when the inputs do not
    /// overlap; callers decide what that means.
    pub fn intersect(&self, other: &VoltageRange) -> VoltageRange {
        VoltageRange {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }
}

impl fmt::Display for VoltageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V - {}V", self.min, self.max)
    }
}

/// Known optional attributes of a component specification.
///
/// Attributes are stored sparsely: a record carries only the ones its
/// datasheet defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecAttribute {
    FlashMemoryMb,
    RamMb,
    TemperatureRange,
    HumidityRange,
    PressureRange,
    CapacitanceNf,
    CapacitanceUf,
    ResistanceOhm,
    TolerancePercent,
    PowerWatts,
    FrequencyMhz,
    GainDbi,
    RangeCm,
    Resolution,
    AccelRange,
    GyroRange,
    CapacityMb,
    CapacityKb,
}

/// Shape of the value an attribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A single number
    Number,
    /// A `[low, high]` pair of numbers
    Range,
    /// Free text (e.g. "16-bit", "±2/4/8/16g")
    Text,
}

impl SpecAttribute {
    /// Every known attribute, in declaration order.
    pub const ALL: [SpecAttribute; 18] = [
        SpecAttribute::FlashMemoryMb,
        SpecAttribute::RamMb,
        SpecAttribute::TemperatureRange,
        SpecAttribute::HumidityRange,
        SpecAttribute::PressureRange,
        SpecAttribute::CapacitanceNf,
        SpecAttribute::CapacitanceUf,
        SpecAttribute::ResistanceOhm,
        SpecAttribute::TolerancePercent,
        SpecAttribute::PowerWatts,
        SpecAttribute::FrequencyMhz,
        SpecAttribute::GainDbi,
        SpecAttribute::RangeCm,
        SpecAttribute::Resolution,
        SpecAttribute::AccelRange,
        SpecAttribute::GyroRange,
        SpecAttribute::CapacityMb,
        SpecAttribute::CapacityKb,
    ];

    /// The key used for this attribute in catalog documents.
    pub fn key(self) -> &'static str {
        match self {
            SpecAttribute::FlashMemoryMb => "flash_memory_mb",
            SpecAttribute::RamMb => "ram_mb",
            SpecAttribute::TemperatureRange => "temperature_range",
            SpecAttribute::HumidityRange => "humidity_range",
            SpecAttribute::PressureRange => "pressure_range",
            SpecAttribute::CapacitanceNf => "capacitance_nf",
            SpecAttribute::CapacitanceUf => "capacitance_uf",
            SpecAttribute::ResistanceOhm => "resistance_ohm",
            SpecAttribute::TolerancePercent => "tolerance_percent",
            SpecAttribute::PowerWatts => "power_watts",
            SpecAttribute::FrequencyMhz => "frequency_mhz",
            SpecAttribute::GainDbi => "gain_dbi",
            SpecAttribute::RangeCm => "range_cm",
            SpecAttribute::Resolution => "resolution",
            SpecAttribute::AccelRange => "accel_range",
            SpecAttribute::GyroRange => "gyro_range",
            SpecAttribute::CapacityMb => "capacity_mb",
            SpecAttribute::CapacityKb => "capacity_kb",
        }
    }

    /// Look up an attribute by its document key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|attr| attr.key() == key)
    }

    /// The value shape this attribute expects.
    pub fn kind(self) -> AttributeKind {
        match self {
            SpecAttribute::TemperatureRange
            | SpecAttribute::HumidityRange
            | SpecAttribute::PressureRange
            | SpecAttribute::RangeCm => AttributeKind::Range,
            SpecAttribute::Resolution | SpecAttribute::AccelRange | SpecAttribute::GyroRange => {
                AttributeKind::Text
            }
            _ => AttributeKind::Number,
        }
    }
}

impl fmt::Display for SpecAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed value of a [`SpecAttribute`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Range([f64; 2]),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Range([lo, hi]) => write!(f, "{} to {}", lo, hi),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

/// Physical and electrical characteristics of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    /// Minimum supply voltage (volts)
    pub voltage_min: Option<f64>,

    /// Maximum supply voltage (volts)
    pub voltage_max: Option<f64>,

    /// Regulated output voltage, for regulators and supplies
    pub voltage_out: Option<f64>,

    /// Maximum current draw or output (amps)
    pub current_max: Option<f64>,

    /// Package type (e.g. "QFN-48", "SOT-23-5")
    pub package: String,

    /// Supported interfaces in datasheet order, without duplicates
    pub interfaces: Vec<String>,

    /// Number of pins
    pub pin_count: u32,

    /// Sparse domain-specific attributes
    pub attributes: BTreeMap<SpecAttribute, AttributeValue>,
}

impl ComponentSpec {
    /// The declared supply range, if both bounds are present.
    pub fn voltage_range(&self) -> Option<VoltageRange> {
        match (self.voltage_min, self.voltage_max) {
            (Some(min), Some(max)) => Some(VoltageRange::new(min, max)),
            _ => None,
        }
    }

    /// Get an attribute value, if the record defines it.
    pub fn attribute(&self, attribute: SpecAttribute) -> Option<&AttributeValue> {
        self.attributes.get(&attribute)
    }
}

/// Availability of a component at the distributor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
    Discontinued,
    Obsolete,
    /// A status the catalog uses that we have no variant for
    Other(String),
}

impl StockStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Discontinued => "discontinued",
            StockStatus::Obsolete => "obsolete",
            StockStatus::Other(s) => s,
        }
    }
}

impl From<String> for StockStatus {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "in_stock" => StockStatus::InStock,
            "low_stock" => StockStatus::LowStock,
            "out_of_stock" => StockStatus::OutOfStock,
            "discontinued" => StockStatus::Discontinued,
            "obsolete" => StockStatus::Obsolete,
            _ => StockStatus::Other(value),
        }
    }
}

impl From<StockStatus> for String {
    fn from(value: StockStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A currency-tagged price.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

/// Pricing and availability.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    pub price: Price,
    pub stock_status: StockStatus,
}

/// Compatibility metadata attached to a component.
///
/// The analyzer only understands `interface_requirements`; every other key
/// from the catalog is kept verbatim in `extra` so it can be shown to callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityMeta {
    /// Interfaces this component needs some other part of the design to provide
    pub interface_requirements: Vec<String>,

    /// Unrecognized metadata keys
    pub extra: BTreeMap<String, Value>,
}

impl CompatibilityMeta {
    pub fn is_empty(&self) -> bool {
        self.interface_requirements.is_empty() && self.extra.is_empty()
    }
}

/// A single catalog entry.
///
/// Components are built once by the catalog loader and never mutated; the
/// MPN is the identity key and compares case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Manufacturer part number
    pub mpn: String,

    /// Manufacturer name
    pub manufacturer: String,

    /// Category (e.g. "Microcontroller", "Sensor")
    pub category: String,

    /// Free-text description
    pub description: String,

    /// Electrical and physical specification
    pub spec: ComponentSpec,

    /// Price and stock status
    pub pricing: Pricing,

    /// Datasheet URI (empty when unknown)
    pub datasheet_url: String,

    /// Compatibility metadata
    pub compatibility: CompatibilityMeta,

    /// MPNs of declared substitutes; entries may not exist in the catalog
    pub alternatives: Vec<String>,
}

impl Component {
    /// Normalized identity key for MPN lookups.
    pub fn mpn_key(mpn: &str) -> String {
        mpn.to_uppercase()
    }
}
