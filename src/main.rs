use anyhow::{anyhow, Context, Result};
use bat::PrettyPrinter;
use clap::{Parser, Subcommand};
use cliclack::spinner;
use console::style;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dialx::config::Settings;
use dialx::errors::DialError;
use dialx::materialize::Materializer;
use dialx::providers::base::CustomFields;
use dialx::providers::bucket::DialBucketClient;
use dialx::providers::dial::DialModelClient;
use dialx::providers::image_options::{
    parse_field, ImageOptions, ImageQuality, ImageSize, ImageStyle,
};
use dialx::workflow::{
    describe_attachment, generate_images, save_generated, stage_image,
    DEFAULT_GENERATION_PROMPT, DEFAULT_VISION_PROMPT,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// DIAL API key (can also be set via DIAL_API_KEY environment variable)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// DIAL base url (can also be set via DIAL_URL environment variable)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a local image and ask a vision model what it shows
    Describe {
        /// Image to upload
        #[arg(short, long)]
        image: PathBuf,

        /// MIME type of the image, guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,

        #[arg(short, long, default_value = DEFAULT_VISION_PROMPT)]
        prompt: String,

        #[arg(short, long, default_value = "gpt-4o")]
        deployment: String,
    },
    /// Ask image generation models for pictures and save them locally
    Generate {
        #[arg(short, long, default_value = DEFAULT_GENERATION_PROMPT)]
        prompt: String,

        /// Deployments to try in order (repeatable)
        #[arg(short, long = "deployment", default_values_t = vec!["dall-e-3".to_string()])]
        deployments: Vec<String>,

        #[arg(long, value_enum)]
        size: Option<ImageSize>,

        #[arg(long, value_enum)]
        quality: Option<ImageQuality>,

        #[arg(long, value_enum)]
        style: Option<ImageStyle>,

        /// Extra custom field as key=value, value parsed as JSON when possible (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,

        /// Send the custom fields to every deployment, not only the first
        #[arg(long)]
        fields_for_all: bool,

        /// Directory for the saved images
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings =
        Settings::load(cli.api_key, cli.url).context("Failed to load DIAL settings")?;

    match cli.command {
        Command::Describe {
            image,
            mime,
            prompt,
            deployment,
        } => describe(&settings, &image, mime.as_deref(), &prompt, &deployment).await,
        Command::Generate {
            prompt,
            deployments,
            size,
            quality,
            style,
            fields,
            fields_for_all,
            out_dir,
        } => {
            let mut options = ImageOptions::new();
            if let Some(size) = size {
                options = options.with_size(size);
            }
            if let Some(quality) = quality {
                options = options.with_quality(quality);
            }
            if let Some(style) = style {
                options = options.with_style(style);
            }
            for (key, value) in fields {
                options = options.with_field(key, value);
            }
            let custom_fields = (!options.is_empty()).then(|| options.into_custom_fields());

            generate(
                &settings,
                &prompt,
                &deployments,
                custom_fields.as_ref(),
                fields_for_all,
                &Materializer::new(out_dir),
            )
            .await
        }
    }
}

async fn describe(
    settings: &Settings,
    image: &Path,
    mime: Option<&str>,
    prompt: &str,
    deployment: &str,
) -> Result<()> {
    let client = DialModelClient::new(settings.completion_config(deployment))?;
    let mut bucket = DialBucketClient::open(settings.bucket_config())
        .await
        .context("Could not open a DIAL bucket session")?;

    let attachment = stage_image(&mut bucket, image, mime)
        .await
        .with_context(|| format!("Failed to upload {}", image.display()))?;
    println!("Uploaded attachment: {:?}", attachment);
    println!(
        "Attachment URL: {}\n",
        style(attachment.url().unwrap_or_default()).dim()
    );

    let spin = spinner();
    spin.start("awaiting reply");
    let result = describe_attachment(&client, attachment, prompt).await;
    bucket.close();
    spin.stop("");

    let (reply, _usage) = result.context("Completion request failed")?;
    render(reply.text())?;
    println!();
    Ok(())
}

async fn generate(
    settings: &Settings,
    prompt: &str,
    deployments: &[String],
    custom_fields: Option<&CustomFields>,
    fields_for_all: bool,
    materializer: &Materializer,
) -> Result<()> {
    for (position, deployment) in deployments.iter().enumerate() {
        println!(
            "{}",
            style(format!("=== Generating image with {} ===", deployment)).bold()
        );

        let fields = if position == 0 || fields_for_all {
            custom_fields
        } else {
            None
        };
        let client = DialModelClient::new(settings.completion_config(deployment))?;

        let spin = spinner();
        spin.start("awaiting images");
        let result = generate_images(&client, prompt, fields).await;
        spin.stop("");
        let reply = result.with_context(|| format!("Generation with {} failed", deployment))?;

        if reply.attachments().is_empty() {
            println!("No images were generated in the response\n");
            continue;
        }
        println!("Generated {} image(s)", reply.attachments().len());

        let mut bucket = DialBucketClient::open(settings.bucket_config())
            .await
            .context("Could not open a DIAL bucket session")?;
        let saved = save_generated(&mut bucket, &reply, materializer).await;
        bucket.close();

        match saved {
            Ok(paths) => report_saved(&paths),
            Err(DialError::Materialization { written, failures }) => {
                report_saved(&written);
                for failure in &failures {
                    eprintln!("{} {}", style("failed:").red(), failure);
                }
                return Err(anyhow!(
                    "{} of {} image(s) from {} could not be saved",
                    failures.len(),
                    failures.len() + written.len(),
                    deployment
                ));
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Saving images to {} failed", materializer.destination().display())
                })
            }
        }
        println!();
    }
    Ok(())
}

fn report_saved(paths: &[PathBuf]) {
    for path in paths {
        println!("Image saved locally: {}", style(path.display()).green());
    }
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("Failed to render response: {}", e))?;
    Ok(())
}
