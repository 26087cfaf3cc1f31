use anyhow::Result;
use clap::Parser;
use cli::shell::Shell;
use fruit_core::app::{self, Providers};
use fruit_core::config;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "fruit-quality")]
#[command(about = "Fruit quality prediction client", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Override the classification endpoint
    #[arg(long)]
    service_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(url) = cli.service_url {
        cfg.service.url = url;
    }

    let registry = app::build_registry(&cfg);
    let providers = Providers::resolve(&registry);

    println!("Fruit Quality Detection. Type `help` for commands.");
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    Shell::new(providers).run(input, &mut stdout).await
}
