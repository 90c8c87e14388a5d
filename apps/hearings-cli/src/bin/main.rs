use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use hearings_core::config::SearchConfig;
use hearings_core::types::{ContextRequest, RequesterClaims, SearchMode, SearchRequest};
use hearings_index_mem::{load_corpus, HashEmbedder, MemoryIndex};
use hearings_search::SearchService;

const USAGE: &str = "Usage:
  hearings-cli search \"<query>\" [--corpus FILE] [--role ROLE] [--party NAME] [--mode hybrid|vector|keyword] [--top N] [--proceeding ID]
  hearings-cli context <document_id> <chunk_id> [--corpus FILE] [--role ROLE] [--party NAME] [--window N]

Roles: Hearing_Panel, AER_Staff, Intervener (with --party), or none for public access.";

struct Opts {
    corpus: PathBuf,
    role: Option<String>,
    party: Option<String>,
    mode: SearchMode,
    top: Option<usize>,
    proceeding: Option<String>,
    window: u32,
    positional: Vec<String>,
}

fn parse_opts(args: Vec<String>) -> anyhow::Result<Opts> {
    let mut opts = Opts {
        corpus: PathBuf::from("demos/sample_corpus.json"),
        role: None,
        party: None,
        mode: SearchMode::Hybrid,
        top: None,
        proceeding: None,
        window: 2,
        positional: Vec::new(),
    };
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |name: &str| {
            it.next()
                .ok_or_else(|| anyhow::anyhow!("{name} requires a value"))
        };
        match arg.as_str() {
            "--corpus" => opts.corpus = PathBuf::from(value("--corpus")?),
            "--role" => opts.role = Some(value("--role")?),
            "--party" => opts.party = Some(value("--party")?),
            "--top" => opts.top = Some(value("--top")?.parse()?),
            "--proceeding" => opts.proceeding = Some(value("--proceeding")?),
            "--window" => opts.window = value("--window")?.parse()?,
            "--mode" => {
                opts.mode = match value("--mode")?.as_str() {
                    "hybrid" => SearchMode::Hybrid,
                    "vector" => SearchMode::Vector,
                    "keyword" => SearchMode::Keyword,
                    other => anyhow::bail!("unknown mode: {other}"),
                }
            }
            _ => opts.positional.push(arg),
        }
    }
    Ok(opts)
}

fn claims_from(opts: &Opts) -> RequesterClaims {
    RequesterClaims {
        roles: opts.role.iter().cloned().collect(),
        party_affiliation: opts.party.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    let opts = parse_opts(args)?;

    let config = SearchConfig::load()?;
    let corpus = load_corpus(&opts.corpus)?;
    println!("Loaded {} chunks from {}", corpus.len(), opts.corpus.display());

    let embedder = Arc::new(HashEmbedder::default());
    let index = Arc::new(MemoryIndex::build(corpus, embedder.as_ref()).await?);
    let service = SearchService::new(index, embedder, config);
    let claims = claims_from(&opts);

    match cmd.as_str() {
        "search" => {
            let query = opts.positional.first().cloned().unwrap_or_default();
            let request = SearchRequest {
                query,
                proceeding_id: opts.proceeding.clone(),
                filters: None,
                top: opts.top,
                search_mode: opts.mode,
            };
            let response = service.search(&request, &claims).await?;

            println!();
            println!(
                "{} of {} matching chunks:",
                response.results.len(),
                response.total_count
            );
            for (rank, result) in response.results.iter().enumerate() {
                println!();
                println!(
                    "{}. [{:.3}] {}",
                    rank + 1,
                    result.relevance_score,
                    result.title
                );
                println!("   {}", result.citation_ref);
                println!("   {}", result.snippet);
            }
            println!();
            println!("Facets:");
            for (dimension, values) in &response.facets {
                let line: Vec<String> = values
                    .iter()
                    .map(|f| format!("{} ({})", f.value, f.count))
                    .collect();
                println!("  {dimension}: {}", line.join(", "));
            }
        }
        "context" => {
            let document_id = opts
                .positional
                .first()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("context requires <document_id> <chunk_id>"))?;
            let chunk_id: u32 = opts
                .positional
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("context requires <document_id> <chunk_id>"))?
                .parse()?;
            let request = ContextRequest {
                document_id,
                chunk_id,
                context_window: opts.window,
            };
            let response = service.expand_context(&request, &claims).await?;

            println!();
            println!("{} ({})", response.title, response.citation_ref);
            println!("Pages {}", response.page_range);
            for chunk in &response.chunks {
                let marker = if chunk.is_target { ">>" } else { "  " };
                println!("{marker} [{}] {}", chunk.chunk_id, chunk.content);
            }
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
