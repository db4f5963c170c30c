//! Best-effort municipality to county lookup.

/// Known municipality/county pairs, keyed by uppercase municipality name.
///
/// Partial on purpose: municipalities outside this list simply get no county.
pub const MUNICIPALITY_REGIONS: &[(&str, &str)] = &[
    ("OSLO", "Oslo"),
    ("BERGEN", "Vestland"),
    ("TRONDHEIM", "Trøndelag"),
    ("STAVANGER", "Rogaland"),
    ("KRISTIANSAND", "Agder"),
    ("FREDRIKSTAD", "Viken"),
    ("TROMSØ", "Troms og Finnmark"),
    ("DRAMMEN", "Viken"),
    ("SANDNES", "Rogaland"),
    ("LILLEHAMMER", "Innlandet"),
    ("ÅLESUND", "Møre og Romsdal"),
    ("MOLDE", "Møre og Romsdal"),
    ("HAUGESUND", "Rogaland"),
    ("SANDEFJORD", "Vestfold og Telemark"),
    ("BODØ", "Nordland"),
    ("TØNSBERG", "Vestfold og Telemark"),
    ("SARPSBORG", "Viken"),
    ("ARENDAL", "Agder"),
    ("SKIEN", "Vestfold og Telemark"),
    ("HALDEN", "Viken"),
];

/// Looks up the county for a municipality name, ignoring case.
pub fn region_for_municipality(municipality: Option<&str>) -> Option<&'static str> {
    let key = municipality?.to_uppercase();
    MUNICIPALITY_REGIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, region)| *region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_regardless_of_case() {
        assert_eq!(region_for_municipality(Some("OSLO")), Some("Oslo"));
        assert_eq!(region_for_municipality(Some("oslo")), Some("Oslo"));
        assert_eq!(region_for_municipality(Some("tromsø")), Some("Troms og Finnmark"));
        assert_eq!(region_for_municipality(Some("Ålesund")), Some("Møre og Romsdal"));
    }

    #[test]
    fn unknown_or_missing_yields_none() {
        assert_eq!(region_for_municipality(Some("Nowhereville")), None);
        assert_eq!(region_for_municipality(Some("")), None);
        assert_eq!(region_for_municipality(None), None);
    }

    #[test]
    fn exact_match_only() {
        assert_eq!(region_for_municipality(Some(" OSLO ")), None);
        assert_eq!(region_for_municipality(Some("OSLOFJORD")), None);
    }

    #[test]
    fn table_keys_are_uppercase() {
        for (name, _) in MUNICIPALITY_REGIONS {
            assert_eq!(name.to_uppercase(), *name);
        }
    }
}
