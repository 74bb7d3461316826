//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aspectra")]
#[command(about = "Aspect-based sentiment analysis for reviews")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub models: ModelArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the models live and how much parallelism to give them.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Directory holding the sentiment classifier (`model.onnx`, `tokenizer.json`)
    #[arg(long, env = "ASPECTRA_SENTIMENT_MODEL", default_value = "models/sentiment")]
    pub sentiment_model: PathBuf,

    /// Directory holding the POS tagger (`model.onnx`, `tokenizer.json`, `config.json`)
    #[arg(long, env = "ASPECTRA_TAGGER_MODEL", default_value = "models/pos-tagger")]
    pub tagger_model: PathBuf,

    /// Worker threads for clause annotation
    #[arg(long, env = "ASPECTRA_WORKERS", default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "ASPECTRA_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// JSON Lines file that feedback is appended to
        #[arg(long, env = "ASPECTRA_FEEDBACK_LOG", default_value = "feedback.jsonl")]
        feedback_log: PathBuf,
    },
    /// Analyze one review and print the result as JSON
    Analyze {
        /// Review text
        text: String,
    },
}
