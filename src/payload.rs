//! Flat payload stored next to each vector so query results render without a second lookup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::organization::{or_empty, present, OrganizationRecord};
use crate::region::region_for_municipality;

/// Display and filter fields attached to a stored point.
///
/// Every value is a string; absent source fields become `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationPayload {
    /// Registry identifier.
    pub id: String,
    /// Organization name.
    pub navn: String,
    /// Municipality, as exported (usually uppercase).
    pub kommune: String,
    /// County derived from the municipality, empty when unknown.
    pub fylke: String,
    /// Display description: activity, falling back to purpose.
    pub beskrivelse: String,
    /// Activity description.
    pub aktivitet: String,
    /// Statutory purpose.
    pub vedtektsfestet_formaal: String,
    /// Postal town.
    pub poststed: String,
    /// Postal code.
    pub postnummer: String,
    /// Website.
    pub hjemmeside: String,
    /// Phone number.
    pub telefon: String,
    /// Email address.
    pub epost: String,
    /// Legal form.
    pub organisasjonsform: String,
    /// Primary industry code description.
    pub naeringskode: String,
}

impl OrganizationPayload {
    /// Maps a record into its payload, deriving the county from the municipality.
    pub fn from_record(record: &OrganizationRecord) -> Self {
        let region = region_for_municipality(record.forretningsadresse_kommune.as_deref());
        Self::with_region(record, region)
    }

    /// Maps a record into its payload using an already-derived county.
    pub fn with_region(record: &OrganizationRecord, region: Option<&str>) -> Self {
        let beskrivelse = present(&record.aktivitet)
            .or_else(|| present(&record.vedtektsfestet_formaal))
            .unwrap_or_default();

        Self {
            id: or_empty(&record.id).to_string(),
            navn: or_empty(&record.navn).to_string(),
            kommune: or_empty(&record.forretningsadresse_kommune).to_string(),
            fylke: region.unwrap_or_default().to_string(),
            beskrivelse: beskrivelse.to_string(),
            aktivitet: or_empty(&record.aktivitet).to_string(),
            vedtektsfestet_formaal: or_empty(&record.vedtektsfestet_formaal).to_string(),
            poststed: or_empty(&record.forretningsadresse_poststed).to_string(),
            postnummer: or_empty(&record.forretningsadresse_postnummer).to_string(),
            hjemmeside: or_empty(&record.hjemmeside).to_string(),
            telefon: or_empty(&record.telefon).to_string(),
            epost: or_empty(&record.epost).to_string(),
            organisasjonsform: or_empty(&record.organisasjonsform_beskrivelse).to_string(),
            naeringskode: or_empty(&record.naeringskode1_beskrivelse).to_string(),
        }
    }

    /// Rebuilds a payload from the loosely-typed map returned by the store.
    ///
    /// Missing keys and non-string values read back as `""`, numbers as their text.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let field = |key: &str| match map.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        };
        Self {
            id: field("id"),
            navn: field("navn"),
            kommune: field("kommune"),
            fylke: field("fylke"),
            beskrivelse: field("beskrivelse"),
            aktivitet: field("aktivitet"),
            vedtektsfestet_formaal: field("vedtektsfestet_formaal"),
            poststed: field("poststed"),
            postnummer: field("postnummer"),
            hjemmeside: field("hjemmeside"),
            telefon: field("telefon"),
            epost: field("epost"),
            organisasjonsform: field("organisasjonsform"),
            naeringskode: field("naeringskode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn description_prefers_activity() {
        let record = OrganizationRecord {
            aktivitet: Some("Bakeri".into()),
            vedtektsfestet_formaal: Some("Drive bakeri".into()),
            ..OrganizationRecord::default()
        };
        assert_eq!(OrganizationPayload::from_record(&record).beskrivelse, "Bakeri");
    }

    #[test]
    fn description_falls_back_to_purpose() {
        let record = OrganizationRecord {
            aktivitet: Some("".into()),
            vedtektsfestet_formaal: Some("Drive bakeri".into()),
            ..OrganizationRecord::default()
        };
        let payload = OrganizationPayload::from_record(&record);
        assert_eq!(payload.beskrivelse, "Drive bakeri");
        assert_eq!(payload.aktivitet, "");
    }

    #[test]
    fn whitespace_activity_is_kept_as_description() {
        let record = OrganizationRecord {
            aktivitet: Some(" ".into()),
            vedtektsfestet_formaal: Some("Drive bakeri".into()),
            ..OrganizationRecord::default()
        };
        assert_eq!(OrganizationPayload::from_record(&record).beskrivelse, " ");
    }

    #[test]
    fn absent_fields_become_empty_strings() {
        let record: OrganizationRecord = serde_json::from_value(json!({
            "id": "42",
            "forretningsadresse_postnummer": null,
            "forretningsadresse_kommune": "BERGEN"
        }))
        .expect("record");

        let payload = OrganizationPayload::from_record(&record);
        assert_eq!(payload.id, "42");
        assert_eq!(payload.postnummer, "");
        assert_eq!(payload.kommune, "BERGEN");
        assert_eq!(payload.fylke, "Vestland");
        assert_eq!(payload.beskrivelse, "");

        let value = serde_json::to_value(&payload).expect("serialize");
        let map = value.as_object().expect("object");
        assert_eq!(map.len(), 14);
        assert!(map.values().all(Value::is_string));
    }

    #[test]
    fn numeric_postal_code_is_stringified() {
        let record: OrganizationRecord =
            serde_json::from_value(json!({ "forretningsadresse_postnummer": 5003 }))
                .expect("record");
        assert_eq!(OrganizationPayload::from_record(&record).postnummer, "5003");
    }

    #[test]
    fn explicit_region_overrides_lookup() {
        let record = OrganizationRecord {
            forretningsadresse_kommune: Some("OSLO".into()),
            ..OrganizationRecord::default()
        };
        assert_eq!(OrganizationPayload::with_region(&record, None).fylke, "");
        assert_eq!(
            OrganizationPayload::with_region(&record, Some("Oslo")).fylke,
            "Oslo"
        );
    }

    #[test]
    fn reads_back_partial_store_payload() {
        let map = json!({ "id": "7", "navn": "Korpset", "postnummer": 150, "fylke": null });
        let payload = OrganizationPayload::from_json_map(map.as_object().expect("object"));
        assert_eq!(payload.id, "7");
        assert_eq!(payload.navn, "Korpset");
        assert_eq!(payload.postnummer, "150");
        assert_eq!(payload.fylke, "");
        assert_eq!(payload.epost, "");
    }
}
