use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use g3dr::{
    Config, FileSource, G3dReader,
    config::Command,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing; stdout carries command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let source = FileSource::from_location(config.source()).await?;
    let reader = config.reader_builder(source).build()?;

    match &config.command {
        Command::Meta { source } => {
            let Some(header) = reader.metadata().await? else {
                anyhow::bail!("no header found in {}", source);
            };
            println!("{}", serde_json::to_string_pretty(&header)?);
        }
        Command::Info { source } => print_info(&reader, source).await?,
        Command::Query {
            chrom,
            start,
            end,
            resolution,
            ..
        } => {
            tracing::info!("Querying {}:{}-{} at resolution {}", chrom, start, end, resolution);
            match reader.read_data(chrom, *start, *end, *resolution).await? {
                Some(records) => {
                    for record in records {
                        println!("{}", record.join("\t"));
                    }
                }
                None => tracing::warn!("no data for {} at resolution {}", chrom, resolution),
            }
        }
    }

    Ok(())
}

async fn print_info(reader: &G3dReader, source: &str) -> anyhow::Result<()> {
    let Some(header) = reader.metadata().await? else {
        anyhow::bail!("no header found in {}", source);
    };
    println!("name\t{}", header.name);
    println!("genome\t{}", header.genome);
    println!("version\t{}", header.version);

    if reader.index().await?.is_none() {
        println!("index\tabsent");
        return Ok(());
    }
    for resolution in reader.resolutions().await? {
        let chroms = reader.chromosomes(resolution).await?.unwrap_or_default();
        println!("{}\t{}", resolution, chroms.join(","));
    }
    Ok(())
}
