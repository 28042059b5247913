use anyhow::Result;
use clap::Parser;
use image_describer::models::Config;
use image_describer::ImageDescriber;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-describer")]
#[command(about = "Describe an image with a Gemini multimodal model")]
struct CliArgs {
    /// Path to the image file.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Model ID, overriding GEMINI_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Prompt sent with the image, overriding DESCRIBE_PROMPT.
    #[arg(long)]
    prompt: Option<String>,

    /// MIME type to send instead of detecting it from the file.
    #[arg(long, value_name = "TYPE", value_parser = parse_mime_arg)]
    mime_type: Option<String>,
}

fn parse_mime_arg(input: &str) -> std::result::Result<String, String> {
    match input.split_once('/') {
        Some(("image", subtype)) if !subtype.is_empty() => Ok(input.to_string()),
        _ => Err(format!(
            "Invalid MIME type '{}'. Expected image/<subtype>",
            input
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_describer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(prompt) = args.prompt {
        config.prompt = Some(prompt);
    }

    let mut describer = ImageDescriber::from_config(&config);
    if let Some(mime_type) = args.mime_type {
        describer = describer.with_mime_type(mime_type);
    }

    match describer.describe(&args.image).await {
        Ok(text) => {
            println!("Image Analysis:\n{}", text);
            info!("Description completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Description failed: {}", e);
            std::process::exit(1);
        }
    }
}
