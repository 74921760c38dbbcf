mod cli;

use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;

use nexus_core::config::VectorBackend;
use nexus_core::{AppBuilder, Services};
use nexus_gateway::GatewayServer;
use nexus_memory::document::{Document, DocumentKind, DocumentStatus, TextLoader};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let builder = AppBuilder::from_path(&cli.config)?;
    let provider = builder.build_provider();
    let services = builder.build_services(provider).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&builder, services).await,
        Commands::Ingest {
            path,
            id,
            name,
            kind,
        } => {
            if builder.config().memory.vector_store == VectorBackend::Memory {
                tracing::warn!("in-memory vector store: ingested chunks are lost on exit");
            }
            ingest(&services, &path, id, name, kind).await
        }
        Commands::Ask { message } => ask(&services, &message).await,
    }
}

async fn serve(builder: &AppBuilder, services: Services) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = AppBuilder::build_shutdown();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let gateway = &builder.config().gateway;
    GatewayServer::new(&gateway.bind, gateway.port, services, shutdown_rx)
        .with_max_body_size(gateway.max_body_size)
        .serve()
        .await
        .context("gateway failed")?;
    Ok(())
}

async fn ingest(
    services: &Services,
    path: &Path,
    id: Option<String>,
    name: Option<String>,
    kind: DocumentKind,
) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("path has no file name")?;
    let id = id.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| file_name.clone(), |s| s.to_string_lossy().into_owned())
    });
    let document = Document::new(id, name.unwrap_or(file_name), kind);

    let processed = services
        .pipeline
        .load_and_process(&TextLoader::default(), path, document)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;

    if processed.status != DocumentStatus::Processed {
        bail!("failed to process {}", processed.name);
    }
    println!(
        "{}: {} chunks indexed into {}",
        processed.name,
        processed.chunks,
        services.collection.name()
    );
    Ok(())
}

async fn ask(services: &Services, message: &str) -> anyhow::Result<()> {
    let reply = services
        .responder
        .respond(message)
        .await
        .context("failed to generate response")?;
    println!("{}", reply.content);
    if let Some(sources) = reply.sources.filter(|s| !s.is_empty()) {
        println!("\nSources: {}", sources.join(", "));
    }
    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
