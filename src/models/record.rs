//! Raw catalog records and their validation.
//!
//! Catalog documents are deserialized into the loosely-typed `Raw*` structs
//! first. Serde enforces the required fields; the `TryFrom` conversion then
//! applies the invariants serde cannot express and normalizes text.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::{
    AttributeKind, AttributeValue, CompatibilityMeta, Component, ComponentSpec, Price, Pricing,
    SpecAttribute, StockStatus, INTERFACE_REQUIREMENTS_KEY,
};

/// Currency assumed when a record does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Validation failures for a single record.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// A required text field is present but blank
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// voltage_min is greater than voltage_max
    #[error("voltage_min ({min}) is greater than voltage_max ({max})")]
    InvertedVoltage { min: f64, max: f64 },

    /// A known spec attribute carries a value of the wrong shape
    #[error("attribute '{attribute}' {reason}")]
    InvalidAttribute {
        attribute: SpecAttribute,
        reason: String,
    },

    /// The reserved interface requirements key is not a list of strings
    #[error("compatibility.interface_requirements must be a list of strings, got {0}")]
    MalformedInterfaceRequirements(String),
}

/// Top-level catalog document.
#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    /// Component records, kept untyped so each one can be reported by index
    #[serde(default)]
    pub components: Vec<Value>,
}

/// A component record as it appears in the catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComponent {
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub specs: RawSpec,
    pub pricing: RawPricing,
    pub datasheet_url: Option<String>,
    pub compatibility: Option<BTreeMap<String, Value>>,
    pub alternatives: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSpec {
    pub voltage_min: Option<f64>,
    pub voltage_max: Option<f64>,
    pub voltage_out: Option<f64>,
    pub current_max: Option<f64>,
    pub package: String,
    pub interfaces: Vec<String>,
    pub pin_count: u32,

    /// Everything else; known attribute keys are picked out, the rest ignored
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPricing {
    pub price_usd: f64,
    pub currency: Option<String>,
    pub stock_status: Option<String>,
}

impl TryFrom<RawComponent> for Component {
    type Error = RecordError;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        let mpn = raw.mpn.trim().to_string();
        if mpn.is_empty() {
            return Err(RecordError::EmptyField("mpn"));
        }

        Ok(Component {
            mpn,
            manufacturer: raw.manufacturer.trim().to_string(),
            category: raw.category.trim().to_string(),
            description: raw.description.trim().to_string(),
            spec: ComponentSpec::try_from(raw.specs)?,
            pricing: Pricing::from(raw.pricing),
            datasheet_url: raw.datasheet_url.unwrap_or_default().trim().to_string(),
            compatibility: parse_compatibility(raw.compatibility.unwrap_or_default())?,
            alternatives: clean_names(raw.alternatives.unwrap_or_default()),
        })
    }
}

impl TryFrom<RawSpec> for ComponentSpec {
    type Error = RecordError;

    fn try_from(raw: RawSpec) -> Result<Self, Self::Error> {
        if let (Some(min), Some(max)) = (raw.voltage_min, raw.voltage_max) {
            if min > max {
                return Err(RecordError::InvertedVoltage { min, max });
            }
        }

        let mut attributes = BTreeMap::new();
        for (key, value) in raw.extra {
            let Some(attribute) = SpecAttribute::from_key(&key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            attributes.insert(attribute, parse_attribute(attribute, &value)?);
        }

        Ok(ComponentSpec {
            voltage_min: raw.voltage_min,
            voltage_max: raw.voltage_max,
            voltage_out: raw.voltage_out,
            current_max: raw.current_max,
            package: raw.package.trim().to_string(),
            interfaces: clean_names(raw.interfaces),
            pin_count: raw.pin_count,
            attributes,
        })
    }
}

impl From<RawPricing> for Pricing {
    fn from(raw: RawPricing) -> Self {
        let currency = raw
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Pricing {
            price: Price {
                amount: raw.price_usd,
                currency,
            },
            stock_status: raw.stock_status.map(StockStatus::from).unwrap_or_default(),
        }
    }
}

fn parse_attribute(attribute: SpecAttribute, value: &Value) -> Result<AttributeValue, RecordError> {
    let invalid = |reason: &str| RecordError::InvalidAttribute {
        attribute,
        reason: reason.to_string(),
    };

    match attribute.kind() {
        AttributeKind::Number => value
            .as_f64()
            .map(AttributeValue::Number)
            .ok_or_else(|| invalid("must be a number")),
        AttributeKind::Range => {
            let bounds: Vec<f64> = value
                .as_array()
                .ok_or_else(|| invalid("must be a [low, high] list"))?
                .iter()
                .map(Value::as_f64)
                .collect::<Option<_>>()
                .ok_or_else(|| invalid("must contain only numbers"))?;
            match bounds.as_slice() {
                [lo, hi] => Ok(AttributeValue::Range([*lo, *hi])),
                _ => Err(invalid("must have exactly two bounds")),
            }
        }
        AttributeKind::Text => match value {
            Value::String(s) => Ok(AttributeValue::Text(s.trim().to_string())),
            Value::Number(n) => Ok(AttributeValue::Text(n.to_string())),
            _ => Err(invalid("must be text")),
        },
    }
}

fn parse_compatibility(mut map: BTreeMap<String, Value>) -> Result<CompatibilityMeta, RecordError> {
    let interface_requirements = match map.remove(INTERFACE_REQUIREMENTS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => names.push(s),
                    other => {
                        return Err(RecordError::MalformedInterfaceRequirements(other.to_string()))
                    }
                }
            }
            clean_names(names)
        }
        Some(other) => return Err(RecordError::MalformedInterfaceRequirements(other.to_string())),
    };

    Ok(CompatibilityMeta {
        interface_requirements,
        extra: map,
    })
}

/// Trim names, drop blanks and repeated entries, keep first-seen order.
fn clean_names(names: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !cleaned.iter().any(|seen| seen == name) {
            cleaned.push(name.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawComponent {
        serde_json::from_value(value).unwrap()
    }

    fn minimal() -> Value {
        json!({
            "mpn": " BME280 ",
            "manufacturer": "Bosch Sensortec",
            "category": "Sensor",
            "description": "Humidity, pressure and temperature sensor",
            "specs": {
                "voltage_min": 1.71,
                "voltage_max": 3.6,
                "current_max": 0.000714,
                "package": "LGA-8",
                "interfaces": ["I2C", "SPI", "I2C"],
                "pin_count": 8,
                "temperature_range": [-40, 85],
                "pressure_range": [300, 1100],
                "resolution": "20-bit",
                "unknown_key": "ignored"
            },
            "pricing": {"price_usd": 3.2, "stock_status": "in_stock"},
            "datasheet_url": "https://example.com/bme280.pdf",
            "compatibility": {"interface_requirements": ["I2C"], "pullups": "4.7k"},
            "alternatives": ["BMP280", "", "SHT31-DIS-B"]
        })
    }

    #[test]
    fn test_valid_record_is_normalized() {
        let component = Component::try_from(raw(minimal())).unwrap();

        assert_eq!(component.mpn, "BME280");
        assert_eq!(component.spec.interfaces, vec!["I2C", "SPI"]);
        assert_eq!(
            component.spec.attribute(SpecAttribute::TemperatureRange),
            Some(&AttributeValue::Range([-40.0, 85.0]))
        );
        assert_eq!(
            component.spec.attribute(SpecAttribute::Resolution),
            Some(&AttributeValue::Text("20-bit".to_string()))
        );
        assert_eq!(component.spec.attributes.len(), 3);
        assert_eq!(component.pricing.price.currency, "USD");
        assert_eq!(component.compatibility.interface_requirements, vec!["I2C"]);
        assert_eq!(component.compatibility.extra.get("pullups"), Some(&json!("4.7k")));
        assert_eq!(component.alternatives, vec!["BMP280", "SHT31-DIS-B"]);
    }

    #[test]
    fn test_missing_required_field_fails_deserialization() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("mpn");
        assert!(serde_json::from_value::<RawComponent>(value).is_err());

        let mut value = minimal();
        value["specs"].as_object_mut().unwrap().remove("package");
        assert!(serde_json::from_value::<RawComponent>(value).is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let value = json!({
            "mpn": "X1",
            "manufacturer": "Acme",
            "category": "Passive",
            "description": "",
            "specs": {"package": "0402", "interfaces": [], "pin_count": 2},
            "pricing": {"price_usd": 0.01}
        });
        let component = Component::try_from(raw(value)).unwrap();

        assert!(component.spec.voltage_range().is_none());
        assert_eq!(component.pricing.stock_status, StockStatus::InStock);
        assert!(component.compatibility.is_empty());
        assert!(component.alternatives.is_empty());
        assert_eq!(component.datasheet_url, "");
    }

    #[test]
    fn test_blank_mpn_rejected() {
        let mut value = minimal();
        value["mpn"] = json!("   ");
        assert_eq!(
            Component::try_from(raw(value)).unwrap_err(),
            RecordError::EmptyField("mpn")
        );
    }

    #[test]
    fn test_inverted_voltage_rejected() {
        let mut value = minimal();
        value["specs"]["voltage_min"] = json!(5.0);
        value["specs"]["voltage_max"] = json!(3.3);
        assert!(matches!(
            Component::try_from(raw(value)),
            Err(RecordError::InvertedVoltage { .. })
        ));
    }

    #[test]
    fn test_malformed_interface_requirements_rejected() {
        let mut value = minimal();
        value["compatibility"]["interface_requirements"] = json!("I2C");
        assert!(matches!(
            Component::try_from(raw(value)),
            Err(RecordError::MalformedInterfaceRequirements(_))
        ));

        let mut value = minimal();
        value["compatibility"]["interface_requirements"] = json!(["I2C", 3]);
        assert!(matches!(
            Component::try_from(raw(value)),
            Err(RecordError::MalformedInterfaceRequirements(_))
        ));
    }

    #[test]
    fn test_wrongly_typed_attribute_rejected() {
        let mut value = minimal();
        value["specs"]["temperature_range"] = json!([-40]);
        assert!(matches!(
            Component::try_from(raw(value)),
            Err(RecordError::InvalidAttribute {
                attribute: SpecAttribute::TemperatureRange,
                ..
            })
        ));

        let mut value = minimal();
        value["specs"]["flash_memory_mb"] = json!("eight");
        assert!(Component::try_from(raw(value)).is_err());
    }

    #[test]
    fn test_null_attribute_is_absent() {
        let mut value = minimal();
        value["specs"]["ram_mb"] = Value::Null;
        let component = Component::try_from(raw(value)).unwrap();
        assert!(component.spec.attribute(SpecAttribute::RamMb).is_none());
    }
}
