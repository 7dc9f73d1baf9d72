mod config;
mod project_cmds;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use stride_db::pool;

use config::StrideConfig;

#[derive(Parser)]
#[command(name = "stride", about = "MVP build planner: generate a plan, ship it task by task")]
struct Cli {
    /// Database URL (overrides STRIDE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a stride config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/stride")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the stride database (requires config file or env vars)
    DbInit,
    /// Generate a build plan for a new project idea
    New {
        /// Short name of the idea
        idea: String,
        /// What the idea does and who it is for
        #[arg(long)]
        description: String,
        /// Project title (defaults to the idea)
        #[arg(long)]
        title: Option<String>,
    },
    /// Show a project's plan and progress (defaults to the latest project)
    Show {
        /// Project ID to show (omit to show the most recent project)
        project_id: Option<Uuid>,
        /// List all projects instead
        #[arg(long, conflicts_with = "project_id")]
        all: bool,
    },
    /// Mark a task done (or not done with --undone)
    Toggle {
        /// Project ID the task belongs to
        project_id: Uuid,
        /// Day number of the task
        day: u32,
        /// Mark the task as not done instead
        #[arg(long)]
        undone: bool,
    },
    /// Delete a project and its plan
    Delete {
        /// Project ID to delete
        project_id: Uuid,
    },
}

/// Execute the `stride init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let user_id = Uuid::new_v4();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        model: config::ModelSection::default(),
        user: config::UserSection { id: user_id },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  model.name   = {}", cfg.model.name);
    println!("  user.id      = {user_id}");
    println!();
    println!("Next: run `stride db-init` to create and migrate the database,");
    println!("then set OPENROUTER_API_KEY and run `stride new`.");

    Ok(())
}

/// Execute the `stride db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = StrideConfig::resolve(cli_db_url)?;

    println!("Initializing stride database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success.
    let count = stride_db::queries::projects::count_projects(&db_pool).await?;
    println!("Database ready ({count} projects).");

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("stride db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::New {
            idea,
            description,
            title,
        } => {
            let resolved = StrideConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result =
                project_cmds::cmd_new(&db_pool, &resolved, &idea, &description, title.as_deref())
                    .await;
            db_pool.close().await;
            result?;
        }
        Commands::Show { project_id, all } => {
            let resolved = StrideConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = if all {
                project_cmds::cmd_show_all(&db_pool, resolved.user_id).await
            } else {
                match project_id {
                    Some(id) => project_cmds::cmd_show_one(&db_pool, id).await,
                    None => project_cmds::cmd_show_latest(&db_pool, resolved.user_id).await,
                }
            };
            db_pool.close().await;
            result?;
        }
        Commands::Toggle {
            project_id,
            day,
            undone,
        } => {
            let resolved = StrideConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = project_cmds::cmd_toggle(&db_pool, project_id, day, !undone).await;
            db_pool.close().await;
            result?;
        }
        Commands::Delete { project_id } => {
            let resolved = StrideConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = project_cmds::cmd_delete(&db_pool, project_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
