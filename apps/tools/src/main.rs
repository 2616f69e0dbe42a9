use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use control_api::ApiContext;
use shared::protocol::DisplayView;
use storage::{normalize_database_url, Storage, DEFAULT_DATABASE_URL};

/// Offline maintenance for the display controller database.
#[derive(Parser, Debug)]
struct Cli {
    /// SQLite URL or plain file path.
    #[arg(long, default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn database_url(&self) -> String {
        normalize_database_url(&self.database_url)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the roster with the contents of a CSV file.
    Import { file: PathBuf },
    /// Write the roster as CSV to a file, or to stdout when no file is given.
    Export { file: Option<PathBuf> },
    /// Restore the default styling and titles.
    ResetSettings,
    /// Print the display pointer and what it resolves to.
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url()).await?;
    let ctx = ApiContext {
        storage: storage.clone(),
    };

    match cli.command {
        Command::Import { file } => {
            let csv = fs::read_to_string(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let summary = control_api::import_roster_csv(&ctx, &csv).await?;
            println!(
                "imported {} performers in {} categories",
                summary.performers, summary.categories
            );
        }
        Command::Export { file } => {
            let csv = control_api::export_roster_csv(&ctx).await?;
            match file {
                Some(path) => {
                    fs::write(&path, csv)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    println!("exported roster to {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
        Command::ResetSettings => {
            control_api::reset_settings(&ctx).await?;
            println!("settings reset to defaults");
        }
        Command::Show => {
            let pointer = storage.display_pointer().await?;
            println!(
                "mode={} category={} performer={}",
                pointer.mode.as_str(),
                pointer.category_id,
                pointer.performer_id
            );
            match control_api::current_view(&ctx).await {
                Ok(DisplayView::Performer {
                    performer,
                    category,
                    ..
                }) => println!(
                    "showing #{} {} ({}) in {}",
                    performer.order, performer.name, performer.club, category.name
                ),
                Ok(DisplayView::Title {
                    title, subtitle, ..
                }) => println!("showing title: {title} / {subtitle}"),
                Err(e) => println!("display cannot render: {}", e.message),
            }
        }
    }

    storage.close().await;
    Ok(())
}
