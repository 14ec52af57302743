//! # Property-Based Tests
//!
//! Invariants of the configuration normalizer and the webservice URL factory.

use a11y_dashboard_core::{Config, WebserviceLocation};
use proptest::option;
use proptest::prelude::*;

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Missing flags default to noindex=true, readonly=false; given ones survive.
    #[test]
    fn normalize_defaults_or_preserves(
        noindex in option::of(any::<bool>()),
        readonly in option::of(any::<bool>()),
    ) {
        let config = Config { noindex, readonly, ..Config::default() }.normalize();

        prop_assert_eq!(config.noindex, Some(noindex.unwrap_or(true)));
        prop_assert_eq!(config.readonly, Some(readonly.unwrap_or(false)));
    }

    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(
        noindex in option::of(any::<bool>()),
        readonly in option::of(any::<bool>()),
        port in option::of(any::<u16>()),
        site_message in option::of("[a-z ]{0,20}"),
    ) {
        let config = Config { noindex, readonly, port, site_message, ..Config::default() };

        let once = config.clone().normalize();
        let twice = once.clone().normalize();

        prop_assert_eq!(once, twice);
    }

    /// Normalization never touches fields other than the two flags.
    #[test]
    fn normalize_leaves_other_fields_alone(
        port in option::of(any::<u16>()),
        host in "[a-z0-9.]{1,20}",
    ) {
        let config = Config { port, host: host.clone(), ..Config::default() };
        let normalized = config.normalize();

        prop_assert_eq!(normalized.port, port);
        prop_assert_eq!(normalized.host, host);
        prop_assert!(normalized.webservice.is_none());
    }

    /// A host/port pair always becomes `http://{host}:{port}/`.
    #[test]
    fn address_location_url_shape(host in "[a-z][a-z0-9.-]{0,30}", port in any::<u16>()) {
        let location = WebserviceLocation::Address { host: host.clone(), port };
        prop_assert_eq!(location.base_url(), format!("http://{}:{}/", host, port));
    }
}
