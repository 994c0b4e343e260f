//! Point d'entrée CLI pour dp-pack

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

use dp_pack::cli::{cmd_generate, GenerateArgs};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Générer le dossier de Déclaration Préalable (PDF) d'une adresse
#[derive(Parser)]
#[command(name = "dp-pack")]
#[command(author, version)]
#[command(about = "Générer le dossier de Déclaration Préalable (PDF) à partir d'une adresse")]
#[command(long_about = "Géocode l'adresse, recherche la parcelle cadastrale, récupère les plans et orthophotos IGN \
ainsi que les vues de rue, puis assemble les onze pages du dossier DP dans un PDF.\n\n\
Les images indisponibles sont remplacées et signalées dans le rapport.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[tokio::main]
async fn main() {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = cmd_generate(&cli.generate).await {
        error!("{:#}", e);
        eprintln!("Generation failed: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
