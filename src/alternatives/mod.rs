//! Resolution of declared substitute parts.

use tracing::debug;

use crate::models::Component;
use crate::storage::CatalogStore;

/// Resolves a component's `alternatives` list into catalog records.
#[derive(Debug, Clone, Copy)]
pub struct AlternativesResolver<'a> {
    store: &'a CatalogStore,
}

impl<'a> AlternativesResolver<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// Declared alternatives of `mpn` that exist in the catalog, in declared order.
    ///
    /// An unknown `mpn` yields an empty list; use [`CatalogStore::contains`]
    /// to tell "not found" apart from "no alternatives". Alternatives that
    /// do not resolve are skipped.
    pub fn alternatives_for(&self, mpn: &str) -> Vec<&'a Component> {
        let Some(source) = self.store.by_mpn(mpn) else {
            return Vec::new();
        };

        source
            .alternatives
            .iter()
            .filter_map(|alt| {
                let resolved = self.store.by_mpn(alt);
                if resolved.is_none() {
                    debug!("Alternative {} of {} is not in the catalog", alt, source.mpn);
                }
                resolved
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::{record, store_from};
    use serde_json::{json, Value};

    fn with_alternatives(mut value: Value, alternatives: &[&str]) -> Value {
        value["alternatives"] = json!(alternatives);
        value
    }

    fn sample_store() -> CatalogStore {
        store_from(vec![
            with_alternatives(
                record("ESP32-S3-WROOM-1", "Microcontroller", "", &[], None),
                &["ESP32-C3-MINI-1", "DANGLING-123", "esp32-wroom-32e"],
            ),
            record("ESP32-C3-MINI-1", "Microcontroller", "", &[], None),
            record("ESP32-WROOM-32E", "Microcontroller", "", &[], None),
            with_alternatives(
                record("BME280", "Sensor", "", &[], None),
                &["BMP280", "SHT31"],
            ),
            with_alternatives(
                record("LONELY", "Sensor", "", &[], None),
                &["DANGLING-1", "ESP32-C3-MINI-1"],
            ),
        ])
    }

    fn mpns(components: &[&Component]) -> Vec<String> {
        components.iter().map(|c| c.mpn.clone()).collect()
    }

    #[test]
    fn test_resolves_in_declared_order_skipping_dangling() {
        let store = sample_store();
        let resolver = AlternativesResolver::new(&store);

        assert_eq!(
            mpns(&resolver.alternatives_for("esp32-s3-wroom-1")),
            vec!["ESP32-C3-MINI-1", "ESP32-WROOM-32E"]
        );
    }

    #[test]
    fn test_one_resolvable_one_dangling() {
        let store = sample_store();
        let resolver = AlternativesResolver::new(&store);

        assert_eq!(mpns(&resolver.alternatives_for("LONELY")), vec!["ESP32-C3-MINI-1"]);
    }

    #[test]
    fn test_all_dangling_or_none_declared() {
        let store = sample_store();
        let resolver = AlternativesResolver::new(&store);

        assert!(resolver.alternatives_for("BME280").is_empty());
        assert!(resolver.alternatives_for("ESP32-C3-MINI-1").is_empty());
    }

    #[test]
    fn test_unknown_source_is_empty() {
        let store = sample_store();
        let resolver = AlternativesResolver::new(&store);

        assert!(resolver.alternatives_for("NOPE-123").is_empty());
    }

    #[test]
    fn test_relationship_is_directed() {
        let store = sample_store();
        let resolver = AlternativesResolver::new(&store);

        // ESP32-C3 is an alternative of ESP32-S3, not the other way around
        assert!(resolver.alternatives_for("ESP32-C3-MINI-1").is_empty());
        assert!(!resolver.alternatives_for("ESP32-S3-WROOM-1").is_empty());
    }
}
