use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use accelerator::config::{ServerConfig, StoreConfig};
use accelerator::{api, db, tree_render};

#[derive(Parser)]
#[command(name = "accelerator")]
#[command(about = "Folder-organized library of prompts, sequence diagrams and SQL queries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServerConfig),
    /// Print the folder tree
    Tree {
        /// Print only the tree below this folder
        #[arg(long)]
        folder: Option<Uuid>,

        #[command(flatten)]
        store: StoreConfig,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "accelerator=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(store: &StoreConfig) -> anyhow::Result<db::Database> {
    let path = store.database_path()?;
    tracing::debug!("Opening database at {}", path.display());
    let db = db::Database::open(&path, store.busy_timeout())?;
    db.migrate()?;
    Ok(db)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config.store)?;
    let app = api::create_router_with_cors(db, config.cors_origins.as_deref());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Accelerator listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(config)) => serve(config).await?,
        Some(Commands::Tree { folder, store }) => {
            let db = open_database(&store)?;
            let tree = match folder {
                Some(id) => vec![db.get_folder_subtree(id)?],
                None => db.get_folder_tree()?,
            };
            if tree.is_empty() {
                println!("(no folders)");
            } else {
                print!("{}", tree_render::render_tree(&tree));
            }
        }
        None => serve(ServerConfig::from_env()).await?,
    }

    Ok(())
}
