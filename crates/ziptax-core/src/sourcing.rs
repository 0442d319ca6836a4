//! Origin/destination sourcing for cart calculations.
//!
//! Interstate carts always use the destination address. Intrastate carts
//! follow the destination lookup's sourcing indicator, defaulting to
//! destination-based when it is absent or unrecognised.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ZipTaxError};
use crate::models::{SourcingRule, V60Response};

static STATE_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s+([A-Z]{2})\s+\d{5}").expect("state code pattern is valid"));

/// The address chosen to govern one cart calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcingDecision {
    /// Caller-supplied address string that won.
    pub address: String,
    pub rule: SourcingRule,
    pub origin_state: String,
    pub destination_state: String,
}

impl SourcingDecision {
    pub fn is_interstate(&self) -> bool {
        self.origin_state != self.destination_state
    }
}

/// Two-letter state code from a normalized address such as
/// `"200 Spectrum Center Dr, Irvine, CA 92618-5003, United States"`.
pub fn extract_state_code(normalized_address: &str) -> Option<&str> {
    STATE_CODE_PATTERN
        .captures(normalized_address)
        .and_then(|captures| captures.get(1))
        .map(|state| state.as_str())
}

fn state_code_for<'a>(address: &str, lookup: &'a V60Response) -> Result<&'a str> {
    let normalized = lookup.address_detail.normalized_address.as_str();
    extract_state_code(normalized).ok_or_else(|| {
        ZipTaxError::api(format!(
            "Could not determine state for address '{address}' \
             from normalized address '{normalized}'"
        ))
    })
}

/// Picks the governing address from the two completed lookups.
pub fn resolve(
    origin: &str,
    destination: &str,
    origin_lookup: &V60Response,
    destination_lookup: &V60Response,
) -> Result<SourcingDecision> {
    let destination_state = state_code_for(destination, destination_lookup)?;
    let origin_state = state_code_for(origin, origin_lookup)?;

    let rule = if origin_state == destination_state {
        destination_lookup.sourcing_rule()
    } else {
        SourcingRule::Destination
    };

    let address = match rule {
        SourcingRule::Origin => origin,
        SourcingRule::Destination => destination,
    };

    tracing::debug!(
        origin_state,
        destination_state,
        rule = ?rule,
        "resolved cart sourcing"
    );

    Ok(SourcingDecision {
        address: address.to_owned(),
        rule,
        origin_state: origin_state.to_owned(),
        destination_state: destination_state.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    const ORIGIN: &str = "100 Main St, Minneapolis, MN 55401";
    const DESTINATION: &str = "200 Spectrum Center Dr, Irvine, CA 92618";

    fn lookup(normalized_address: &str, sourcing: Option<&str>) -> V60Response {
        let mut body = json!({
            "metadata": {
                "version": "v60",
                "response": {"code": 100, "name": "RESPONSE_CODE_SUCCESS", "message": "Successful API Request.", "definition": ""}
            },
            "service": {"adjustmentType": "SERVICE_TAXABLE", "taxable": "N", "description": "Services non-taxable"},
            "shipping": {"adjustmentType": "FREIGHT_TAXABLE", "taxable": "N", "description": "Freight non-taxable"},
            "addressDetail": {
                "normalizedAddress": normalized_address,
                "incorporated": "true",
                "geoLat": 33.65,
                "geoLng": -117.74
            }
        });
        if let Some(value) = sourcing {
            body["sourcingRules"] = json!({
                "adjustmentType": "ORIGIN_DESTINATION",
                "description": "sourcing",
                "value": value
            });
        }
        serde_json::from_value(body).expect("fixture should decode")
    }

    #[test]
    fn extracts_state_from_normalized_address() {
        assert_eq!(
            extract_state_code("200 Spectrum Center Dr, Irvine, CA 92618-5003, United States"),
            Some("CA")
        );
        assert_eq!(extract_state_code("Irvine CA 92618"), None);
        assert_eq!(extract_state_code("Irvine, Ca 92618"), None);
    }

    #[test]
    fn interstate_always_uses_destination() {
        let decision = resolve(
            ORIGIN,
            DESTINATION,
            &lookup("100 Main St, Minneapolis, MN 55401, United States", Some("O")),
            &lookup("200 Spectrum Center Dr, Irvine, CA 92618, United States", Some("O")),
        )
        .expect("should resolve");

        assert_eq!(decision.address, DESTINATION);
        assert_eq!(decision.rule, SourcingRule::Destination);
        assert!(decision.is_interstate());
    }

    #[test]
    fn intrastate_origin_rule_uses_origin() {
        let origin = "1 Congress Ave, Austin, TX 78701";
        let destination = "2 Main St, Houston, TX 77002";
        let decision = resolve(
            origin,
            destination,
            &lookup("1 Congress Ave, Austin, TX 78701, United States", None),
            &lookup("2 Main St, Houston, TX 77002, United States", Some("O")),
        )
        .expect("should resolve");

        assert_eq!(decision.address, origin);
        assert_eq!(decision.rule, SourcingRule::Origin);
        assert!(!decision.is_interstate());
    }

    #[test]
    fn intrastate_destination_or_missing_rule_uses_destination() {
        for sourcing in [Some("D"), None, Some("X")] {
            let decision = resolve(
                "1 A St, Fresno, CA 93721",
                DESTINATION,
                &lookup("1 A St, Fresno, CA 93721, United States", None),
                &lookup("200 Spectrum Center Dr, Irvine, CA 92618, United States", sourcing),
            )
            .expect("should resolve");

            assert_eq!(decision.address, DESTINATION, "sourcing={sourcing:?}");
        }
    }

    #[test]
    fn unparsable_normalized_address_names_the_input() {
        let error = resolve(
            ORIGIN,
            DESTINATION,
            &lookup("100 Main St, Minneapolis, MN 55401, United States", None),
            &lookup("somewhere", None),
        )
        .expect_err("must fail");

        assert_eq!(error.kind(), ErrorKind::Api);
        assert!(error.message().contains(DESTINATION));
    }
}
