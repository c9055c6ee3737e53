use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mangaplex::app::AppContext;
use mangaplex::cli::{commands, Cli, Commands, LibraryAction, ModeAction, ProgressAction};
use mangaplex::config::Config;
use mangaplex::store::ReadingProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Search {
            query,
            source,
            limit,
            offset,
        } => {
            commands::search(&ctx, &query, source, limit, offset).await?;
        }
        Commands::Popular {
            sort,
            limit,
            offset,
        } => {
            commands::popular(&ctx, sort, limit, offset).await?;
        }
        Commands::Manga { id } => {
            commands::manga(&ctx, &id).await?;
        }
        Commands::Pages {
            id,
            proxied,
            data_saver,
        } => {
            commands::pages(&ctx, &id, proxied, data_saver).await?;
        }
        Commands::Image { path, out } => {
            commands::download_image(&ctx, &path, &out).await?;
        }
        Commands::Library { action } => match action {
            LibraryAction::List => commands::list_library(&ctx)?,
            LibraryAction::Add { id, title } => {
                commands::add_to_library(&ctx, &id, title).await?;
            }
            LibraryAction::Remove { id } => commands::remove_from_library(&ctx, &id)?,
        },
        Commands::Progress { action } => match action {
            ProgressAction::List => commands::list_progress(&ctx)?,
            ProgressAction::Show { manga_id } => commands::show_progress(&ctx, &manga_id)?,
            ProgressAction::Save {
                manga_id,
                chapter_id,
                page,
                total_pages,
                chapter,
                title,
                cover,
            } => commands::save_progress(
                &ctx,
                ReadingProgress {
                    manga_id,
                    chapter_id,
                    chapter_number: chapter,
                    page,
                    total_pages,
                    timestamp: 0,
                    manga_title: title,
                    cover_url: cover,
                },
            )?,
        },
        Commands::Mode { action } => match action {
            ModeAction::Get { manga_id } => commands::get_mode(&ctx, manga_id.as_deref())?,
            ModeAction::Set { mode, manga_id } => {
                commands::set_mode(&ctx, mode, manga_id.as_deref())?
            }
        },
    }

    Ok(())
}
