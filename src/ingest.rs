//! Sequential ingestion: filter records, embed them batch by batch, and upsert the points.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::compose::{compose_embedding_text, is_valid_for_embedding};
use crate::config::IngestSettings;
use crate::embedder::{EmbeddingProvider, TextEmbedder};
use crate::organization::OrganizationRecord;
use crate::payload::OrganizationPayload;
use crate::vector_store::{recreate_collection, VectorPoint, VectorStore};

/// A record that passed the validity check, with its composed embedding text.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    /// Source record.
    pub record: OrganizationRecord,
    /// Text submitted to the embedding provider.
    pub text: String,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records read from the shards.
    pub loaded: usize,
    /// Records with an id and a non-empty embedding text.
    pub valid: usize,
    /// Upsert requests sent.
    pub batches: usize,
    /// Points written.
    pub points: usize,
}

/// Composes embedding text for every record and keeps the ones fit for embedding, in order.
pub fn prepare_valid_records(records: Vec<OrganizationRecord>) -> Vec<PreparedRecord> {
    records
        .into_iter()
        .filter_map(|record| {
            let text = compose_embedding_text(&record);
            is_valid_for_embedding(&record, &text).then_some(PreparedRecord { record, text })
        })
        .collect()
}

/// Builds the point for `prepared` with the given sequential id.
pub fn build_point(id: u64, prepared: &PreparedRecord, vector: Vec<f32>) -> VectorPoint {
    VectorPoint {
        id,
        vector,
        payload: OrganizationPayload::from_record(&prepared.record),
    }
}

/// Writes prepared records to the store in fixed-size batches.
///
/// Point ids come from a single counter that starts at zero and runs across batches, so
/// they follow the order of the prepared records exactly.
pub struct BatchUpserter<'a, P, S: ?Sized> {
    embedder: &'a TextEmbedder<P>,
    store: &'a S,
    settings: &'a IngestSettings,
}

impl<'a, P, S> BatchUpserter<'a, P, S>
where
    P: EmbeddingProvider,
    S: VectorStore + ?Sized,
{
    /// Creates an upserter targeting `settings.collection()`.
    pub fn new(embedder: &'a TextEmbedder<P>, store: &'a S, settings: &'a IngestSettings) -> Self {
        Self {
            embedder,
            store,
            settings,
        }
    }

    /// Embeds and upserts every record, one batch at a time. Returns `(batches, points)`.
    ///
    /// The first failing embedding or write aborts the whole run.
    pub fn upsert_all(&self, records: &[PreparedRecord]) -> Result<(usize, usize)> {
        let batch_size = self.settings.batch_size();
        let total_batches = records.len().div_ceil(batch_size);
        let mut next_id: u64 = 0;
        let mut written = 0usize;

        for (batch_index, batch) in records.chunks(batch_size).enumerate() {
            let batch_no = batch_index + 1;
            info!(batch = batch_no, total_batches, size = batch.len(), "embedding batch");

            let texts: Vec<&str> = batch.iter().map(|prepared| prepared.text.as_str()).collect();
            let vectors = self
                .embedder
                .embed_all(&texts)
                .with_context(|| format!("failed to embed batch {batch_no}"))?;
            anyhow::ensure!(
                vectors.len() == batch.len(),
                "embedding count {} mismatched batch size {}",
                vectors.len(),
                batch.len()
            );

            let mut points = Vec::with_capacity(batch.len());
            for (prepared, vector) in batch.iter().zip(vectors) {
                points.push(build_point(next_id, prepared, vector));
                next_id += 1;
            }

            self.store
                .upsert_points(self.settings.collection(), &points)
                .with_context(|| format!("failed to upsert batch {batch_no}"))?;
            written += points.len();
            info!(
                batch = batch_no,
                written,
                total = records.len(),
                "batch upserted"
            );
        }

        Ok((total_batches, written))
    }
}

/// Runs one ingestion over already-loaded records: filter, recreate the collection, upsert.
pub fn run_ingest<P, S>(
    records: Vec<OrganizationRecord>,
    embedder: &TextEmbedder<P>,
    store: &S,
    settings: &IngestSettings,
) -> Result<IngestSummary>
where
    P: EmbeddingProvider,
    S: VectorStore + ?Sized,
{
    anyhow::ensure!(
        embedder.dimension() == settings.dimension(),
        "embedder produces {} dimensions but the collection expects {}",
        embedder.dimension(),
        settings.dimension()
    );
    let loaded = records.len();
    let prepared = prepare_valid_records(records);
    info!(loaded, valid = prepared.len(), "organizations ready for embedding");

    recreate_collection(
        store,
        settings.collection(),
        settings.dimension(),
        settings.distance(),
    )?;

    if prepared.is_empty() {
        warn!("no organizations qualified for embedding; collection left empty");
    }
    let (batches, points) = BatchUpserter::new(embedder, store, settings).upsert_all(&prepared)?;

    Ok(IngestSummary {
        loaded,
        valid: prepared.len(),
        batches,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: Option<&str>, navn: Option<&str>) -> OrganizationRecord {
        OrganizationRecord {
            id: id.map(str::to_string),
            navn: navn.map(str::to_string),
            ..OrganizationRecord::default()
        }
    }

    #[test]
    fn keeps_only_records_with_id_and_text_in_order() {
        let prepared = prepare_valid_records(vec![
            org(Some("1"), Some("Første")),
            org(None, Some("Uten id")),
            org(Some("3"), None),
            org(Some("4"), Some("Fjerde")),
        ]);

        let ids: Vec<&str> = prepared
            .iter()
            .filter_map(|prepared| prepared.record.id())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(prepared[1].text, "Organisasjon: Fjerde");
    }

    #[test]
    fn whitespace_only_name_keeps_the_record_in_sequence() {
        let prepared = prepare_valid_records(vec![
            org(Some("1"), Some(" ")),
            org(Some(""), Some("Tom id")),
            org(Some("3"), Some("Tredje")),
        ]);

        let ids: Vec<&str> = prepared
            .iter()
            .filter_map(|prepared| prepared.record.id())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(prepared[0].text, "Organisasjon:  ");
    }

    #[test]
    fn point_payload_comes_from_record() {
        let prepared = PreparedRecord {
            record: OrganizationRecord {
                forretningsadresse_kommune: Some("Bodø".into()),
                ..org(Some("9"), Some("Nordlys"))
            },
            text: "Organisasjon: Nordlys".into(),
        };
        let point = build_point(12, &prepared, vec![0.0, 1.0]);
        assert_eq!(point.id, 12);
        assert_eq!(point.payload.id, "9");
        assert_eq!(point.payload.fylke, "Nordland");
    }
}
