use anyhow::Result;
use clap::Parser;
use frivillig_ingest::config::{init_logging, GeminiArgs, QdrantArgs};
use frivillig_ingest::embedder::gemini::TaskType;
use frivillig_ingest::search::{
    build_query_text, municipality_filter, search_organizations, SearchHit, DEFAULT_SEARCH_LIMIT,
};

#[derive(Parser, Debug)]
#[command(
    name = "frivillig-search",
    about = "Semantic search over the ingested volunteer organizations"
)]
struct SearchCli {
    /// Free-text query
    query: String,

    /// Extra interests appended to the query (first three are used)
    #[arg(long = "interest")]
    interests: Vec<String>,

    /// Only return organizations registered in this municipality
    #[arg(long)]
    kommune: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,

    /// Print results as a JSON array
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    qdrant: QdrantArgs,

    #[command(flatten)]
    gemini: GeminiArgs,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = SearchCli::parse();

    let collection = cli.qdrant.collection_name()?;
    let embedder = cli.gemini.build_embedder(TaskType::RetrievalQuery)?;
    let store = cli.qdrant.connect(cli.gemini.timeout())?;

    let query = build_query_text(&cli.query, &cli.interests);
    let filter = municipality_filter(cli.kommune.as_deref());
    let hits = search_organizations(
        &embedder,
        &store,
        &collection,
        &query,
        cli.limit,
        filter.as_ref(),
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        render_hits(&hits);
    }
    Ok(())
}

fn render_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No matching organizations.");
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        let org = &hit.payload;
        let place = [org.kommune.as_str(), org.fylke.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:>2}. {} [{:.3}]", rank + 1, org.navn, hit.score);
        if !place.is_empty() {
            println!("    {}", place);
        }
        if !org.beskrivelse.is_empty() {
            println!("    {}", org.beskrivelse);
        }
        if !org.hjemmeside.is_empty() {
            println!("    {}", org.hjemmeside);
        }
    }
}
