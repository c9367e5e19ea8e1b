use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use manga_uploader::client::http::DEFAULT_SERVER;
use manga_uploader::client::{MangaForm, UploadClient};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload manga pages to the manga uploader", long_about = None)]
struct Args {
    /// Base URL of the upload server
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert the given images and upload each one
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// JSON array or comma separated list
        #[arg(long)]
        tags: String,
        /// Chapter number
        #[arg(long = "chapter", alias = "cap-number")]
        cap_number: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the images stored for a chapter
    List {
        #[arg(long, default_value = "Undead Unluck")]
        title: String,
        #[arg(long, default_value = "1")]
        chapter: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manga_client=info,manga_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = UploadClient::new(&args.server)?;

    match args.command {
        Command::Upload {
            title,
            author,
            tags,
            cap_number,
            files,
        } => {
            let mut form = MangaForm::new(title, author, tags, cap_number);
            let converted = form.on_files_selected(files).await?;
            info!("🖼️  {} images ready", converted);

            let acks = form.on_submit(&client).await?;
            for ack in &acks {
                println!("{}", serde_json::to_string_pretty(ack)?);
            }
            info!("✅ Uploaded {} images", acks.len());
        }
        Command::List { title, chapter } => {
            let urls = client.fetch_listing(&title, &chapter).await?;
            for url in urls {
                println!("{}", url);
            }
        }
    }

    Ok(())
}
