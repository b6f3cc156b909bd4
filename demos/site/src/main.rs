//! # fbv demo site
//!
//! Serves the render decorators and built-in views:
//!
//! - `/` and `/test-decorator` - HTML through templates
//! - `/test-view` - `html_view` configured by bound kwargs
//! - `/robots.txt`, `/favicon-file.ico`, `/favicon-emoji.ico` - cached static views
//! - `/test-redirect-301`, `/test-redirect-302` - `redirect_view`
//! - `/api/articles`, `/api/articles/<id>`, `/api/titles` - JSON views
//!
//! ## Running
//!
//! ```bash
//! cargo run --package fbv-site -- --settings demos/site/site.toml serve
//! ```

mod models;
mod urls;
mod views;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use fbv::core::logging::setup_logging;
use fbv::core::settings_loader;
use fbv::prelude::*;

use models::ArticleStore;

#[derive(Debug, Parser)]
#[command(name = "fbv-site", about = "fbv demo site")]
struct Cli {
    /// TOML settings file. Defaults plus `FBV_*` variables when omitted.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the site.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: String,
    },
    /// List the URL patterns.
    Routes,
    /// Check that the settings and templates load.
    Check,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(settings_loader::from_env()),
    }
}

fn build_app(settings: Settings) -> anyhow::Result<App> {
    let engine = Engine::from_settings(&settings).context("loading templates")?;
    let app = App::new(settings)
        .middleware(RequestMethodMiddleware)
        .engine(engine);

    let renderer = app.renderer().context("no template engine")?;
    let store = Arc::new(ArticleStore::with_sample_data());
    let urls = urls::urlpatterns(app.settings(), &renderer, &store).context("building URLs")?;
    Ok(app.urls(urls))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;
    setup_logging(&settings);

    match cli.command {
        Command::Serve { addr } => {
            let app = build_app(settings)?;
            tracing::info!(?app, "starting");
            app.run(&addr).await?;
        }
        Command::Routes => {
            let store = Arc::new(ArticleStore::with_sample_data());
            let renderer: Arc<dyn TemplateRenderer> = Arc::new(Engine::new());
            for pattern in urls::urlpatterns(&settings, &renderer, &store)?.patterns() {
                println!("/{:<28} {}", pattern.route(), pattern.name().unwrap_or("-"));
            }
        }
        Command::Check => {
            let engine = Engine::from_settings(&settings).context("loading templates")?;
            println!("{} templates loaded", engine.template_names().len());
            for name in engine.template_names() {
                println!("  {name}");
            }
        }
    }
    Ok(())
}
