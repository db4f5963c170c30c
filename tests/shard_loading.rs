use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use frivillig_ingest::loader::{discover_shards, DEFAULT_SHARD_PATTERN};
use frivillig_ingest::{load_shards, LoadError, OrganizationPayload, ShardPattern};

fn write(dir: &TempDir, name: &str, body: &str) {
    fs::write(dir.path().join(name), body).expect("write shard");
}

#[test]
fn shards_concatenate_in_file_name_order() {
    let dir = TempDir::new().expect("tempdir");
    write(
        &dir,
        "organizations_part_002.json",
        r#"[{"id": "3", "navn": "Tredje"}]"#,
    );
    write(
        &dir,
        "organizations_part_001.json",
        r#"[{"id": "1", "navn": "Første"}, {"id": "2", "navn": "Andre"}]"#,
    );
    write(&dir, "notes.json", r#"[{"id": "x"}]"#);
    fs::create_dir(dir.path().join("organizations_part_999.json")).expect("decoy dir");

    let pattern = ShardPattern::new(DEFAULT_SHARD_PATTERN).expect("pattern");
    let shards = discover_shards(dir.path(), &pattern).expect("discover");
    let names: Vec<String> = shards
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["organizations_part_001.json", "organizations_part_002.json"]
    );

    let records = load_shards(dir.path(), &pattern).expect("load");
    let ids: Vec<&str> = records.iter().filter_map(|record| record.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn glob_patterns_select_shards_by_file_name() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, "organizations_part_2024_b.json", r#"[{"id": "2"}]"#);
    write(&dir, "organizations_part_2024_a.json", r#"[{"id": "1"}]"#);
    write(&dir, "organizations_part_1.json", r#"[{"id": "x"}]"#);

    let pattern = ShardPattern::new("organizations_part_*_?.json").expect("pattern");
    let records = load_shards(dir.path(), &pattern).expect("load");
    let ids: Vec<&str> = records.iter().filter_map(|record| record.id()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn loosely_typed_records_map_to_string_payloads() {
    let dir = TempDir::new().expect("tempdir");
    write(
        &dir,
        "organizations_part_001.json",
        r#"[{
            "id": 998877665,
            "navn": "Tromsø Turlag",
            "aktivitet": "",
            "vedtektsfestet_formaal": "Fremme friluftsliv",
            "forretningsadresse_kommune": "TROMSØ",
            "forretningsadresse_postnummer": 9008,
            "hjemmeside": null,
            "naeringskode1_beskrivelse": "Aktiviteter i andre interesseorganisasjoner",
            "stiftelsesdato": "1890-01-01"
        }]"#,
    );

    let records = load_shards(dir.path(), &ShardPattern::default()).expect("load");
    let payload = OrganizationPayload::from_record(&records[0]);

    assert_eq!(
        payload,
        OrganizationPayload {
            id: "998877665".into(),
            navn: "Tromsø Turlag".into(),
            kommune: "TROMSØ".into(),
            fylke: "Troms og Finnmark".into(),
            beskrivelse: "Fremme friluftsliv".into(),
            aktivitet: "".into(),
            vedtektsfestet_formaal: "Fremme friluftsliv".into(),
            poststed: "".into(),
            postnummer: "9008".into(),
            hjemmeside: "".into(),
            telefon: "".into(),
            epost: "".into(),
            organisasjonsform: "".into(),
            naeringskode: "Aktiviteter i andre interesseorganisasjoner".into(),
        }
    );
}

#[test]
fn empty_directory_has_no_shards() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, "readme.txt", "nothing here");

    let err = load_shards(dir.path(), &ShardPattern::default()).expect_err("no shards");
    assert!(matches!(err, LoadError::NoShards(_)));
}

#[test]
fn non_array_shard_reports_its_path() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, "organizations_part_001.json", r#"{"id": "1"}"#);

    let err = load_shards(dir.path(), &ShardPattern::default()).expect_err("parse error");
    assert!(matches!(err, LoadError::Parse(_, _)));
    assert!(err.to_string().contains("organizations_part_001.json"));
}
