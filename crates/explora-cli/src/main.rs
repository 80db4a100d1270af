mod fragments;

use anyhow::Result;
use clap::{Parser, Subcommand};
use explora::{
    configuration::Settings,
    explore::{ExploreTurn, Explorer},
    providers::scripted::{Script, ScriptedProvider},
    transcript::{self, FileTranscriptStore, TranscriptStore},
};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::fragments::{load_fragments, DEFAULT_CHUNK_SIZE};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded provider output and print the SSE frames a client would receive
    Replay {
        /// JSON array of fragments, or raw provider text
        file: PathBuf,

        /// Session to read history from and save the turn to
        #[arg(short, long)]
        session: Option<String>,

        /// Learner prompt recorded in the transcript
        #[arg(short, long, default_value = "replay")]
        prompt: String,

        /// Characters per fragment when FILE holds raw text
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Keep transcripts as JSONL files in this directory
        #[arg(long)]
        store_dir: Option<PathBuf>,
    },
    /// Print a session's history
    History {
        session: String,

        #[arg(long)]
        store_dir: Option<PathBuf>,
    },
}

fn build_store(settings: &Settings, store_dir: Option<PathBuf>) -> Arc<dyn TranscriptStore> {
    match store_dir {
        Some(dir) => Arc::new(FileTranscriptStore::new(dir)),
        None => settings.store.build(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new()?;

    match cli.command {
        Command::Replay {
            file,
            session,
            prompt,
            chunk_size,
            store_dir,
        } => {
            let fragments = load_fragments(&file, chunk_size)?;
            let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            info!(
                session_id = %session_id,
                fragments = fragments.len(),
                "replaying recorded output"
            );

            let provider = Arc::new(ScriptedProvider::new(vec![Script::Fragments(fragments)]));
            let store = build_store(&settings, store_dir);
            let explorer = Explorer::new(provider, store, settings.provider.clone());

            let turn = ExploreTurn::new(session_id, prompt.as_str(), "", prompt.as_str());
            let mut body = explorer.explore_sse(turn);
            let mut stdout = tokio::io::stdout();
            while let Some(frame) = body.next().await {
                match frame {
                    Ok(bytes) => stdout.write_all(&bytes).await?,
                    Err(never) => match never {},
                }
                stdout.flush().await?;
            }
        }
        Command::History { session, store_dir } => {
            let store = build_store(&settings, store_dir);
            let history = transcript::history(store.as_ref(), &session).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }

    Ok(())
}
