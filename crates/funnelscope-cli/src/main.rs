use std::collections::BTreeMap;

use clap::{Parser, Subcommand};

use funnelscope_adlib::{AdLibraryClient, AdTarget};
use funnelscope_core::{ProviderKind, WeightedRules};
use funnelscope_intel::aggregate_ads;
use funnelscope_scoring::QualificationAnswers;
use funnelscope_synth::{ProviderChoice, Synthesizer};

#[derive(Debug, Parser)]
#[command(name = "funnelscope-cli")]
#[command(about = "Funnelscope command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a competitor URL and synthesize an offer.
    Analyze {
        url: String,
        #[arg(long)]
        industry: Option<String>,
        /// auto (default), openai, or anthropic.
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        proxy: bool,
    },
    /// Score qualification answers given as question=option pairs.
    Score {
        #[arg(required = true)]
        answers: Vec<String>,
    },
    /// Search the ad library for a business or an industry.
    Ads {
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        page_id: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long, default_value_t = 25)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = funnelscope_core::load_app_config()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            url,
            industry,
            provider,
            proxy,
        } => {
            let choice = match provider.as_deref() {
                None | Some("auto") => ProviderChoice::Auto,
                Some(name) => ProviderKind::parse(name)
                    .map(ProviderChoice::Pinned)
                    .ok_or_else(|| {
                        anyhow::anyhow!("unknown provider '{name}'; expected openai or anthropic")
                    })?,
            };

            let synth = Synthesizer::from_app_config(&config);
            let outcome = synth
                .analyze(&url, industry.as_deref(), choice, proxy)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Score { answers } => {
            let mut map = BTreeMap::new();
            for pair in &answers {
                let (question, option) = pair.split_once('=').ok_or_else(|| {
                    anyhow::anyhow!("answer '{pair}' is not a question=option pair")
                })?;
                map.insert(question.to_string(), option.to_string());
            }

            let rules = WeightedRules::load_or_default(&config.rules_path)?;
            let result =
                funnelscope_scoring::score(&QualificationAnswers { answers: map }, &rules)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Ads {
            term,
            page_id,
            industry,
            limit,
        } => {
            let token = config.adlib_access_token.as_deref().ok_or_else(|| {
                anyhow::anyhow!("FUNNELSCOPE_ADLIB_ACCESS_TOKEN is required for ad search")
            })?;
            let client =
                AdLibraryClient::new(&config.adlib_base_url, token, config.fetch_timeout_secs)?;

            if let Some(industry) = industry.as_deref() {
                let intel = funnelscope_intel::search_industry(&client, industry, limit).await;
                println!("{}", serde_json::to_string_pretty(&intel)?);
                return Ok(());
            }

            let (target, business_id) = match (page_id.as_deref(), term.as_deref()) {
                (Some(id), name) => {
                    (AdTarget::by_page_id(id, name.unwrap_or(id)), id.to_string())
                }
                (None, Some(name)) => (AdTarget::by_name(name), name.to_string()),
                (None, None) => {
                    anyhow::bail!("provide one of: --term, --page-id, --industry")
                }
            };

            let ads = client.search(&target, limit).await?;
            let intel = aggregate_ads(&business_id, &ads);
            println!("{}", serde_json::to_string_pretty(&intel)?);
        }
    }

    Ok(())
}
