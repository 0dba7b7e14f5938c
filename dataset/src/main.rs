use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[derive(Debug, Parser)]
#[command(about = "Fetch, inspect and aggregate pre-parsed demo archives from the ESTA dataset")]
struct Args {
    /// Demo id in the ESTA dataset
    demo_id: String,
    /// Render this round (1-based) as an animated gif
    #[arg(long)]
    round: Option<usize>,
    /// Re-download the archive and re-render gifs even if already present
    #[arg(long)]
    replace: bool,
    /// Write the aggregated per-team rows as JSON to this path
    #[arg(long)]
    out: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("dataset") || meta.target().contains("analysis")
        }));
    tracing::subscriber::set_global_default(registry).unwrap();

    let args = Args::parse();

    let fetcher = dataset::fetch::Fetcher::new();
    let path = match fetcher.download(&args.demo_id, args.replace).await {
        Ok(dataset::fetch::FetchOutcome::AlreadyPresent(path)) => {
            tracing::info!("Using existing archive {:?}", path);
            path
        }
        Ok(dataset::fetch::FetchOutcome::Fetched(path)) => {
            tracing::info!("Downloaded archive to {:?}", path);
            path
        }
        Ok(dataset::fetch::FetchOutcome::Failed(status)) => {
            tracing::error!("Demo '{}' not available, last status {}", args.demo_id, status);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Downloading demo '{}': {}", args.demo_id, e);
            std::process::exit(1);
        }
    };

    let demo = match dataset::demo::read_parsed_demo(&path) {
        Ok(demo) => demo,
        Err(e) => {
            tracing::error!("Loading {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    dataset::demo::print_demo_info(&demo);

    let records = dataset::demo::tick_records(&demo);
    let rows = analysis::aggregate(&records);
    tracing::info!(
        "Aggregated {} tick records over {} rounds",
        rows.len(),
        demo.game_rounds.len()
    );

    if let Some(out) = &args.out {
        let columns: Vec<_> = rows.iter().map(|row| row.to_columns()).collect();
        let encoded = serde_json::to_vec_pretty(&columns).unwrap();
        if let Err(e) = tokio::fs::write(out, encoded).await {
            tracing::error!("Writing aggregated rows to {:?}: {}", out, e);
            std::process::exit(1);
        }
        tracing::info!("Wrote {} aggregated rows to {:?}", rows.len(), out);
    }

    if let Some(round) = args.round {
        match dataset::render::render_round(&demo, &args.demo_id, round, args.replace) {
            Ok(rendered) if rendered.reused => {
                tracing::info!("Round {} already rendered at {:?}", round, rendered.path)
            }
            Ok(rendered) => tracing::info!("Rendered round {} to {:?}", round, rendered.path),
            Err(e) => {
                tracing::error!("Rendering round {}: {}", round, e);
                std::process::exit(1);
            }
        }
    }
}
