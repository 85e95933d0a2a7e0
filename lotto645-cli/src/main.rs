mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::display::{
    display_check, display_draws, display_gap_weights, display_generation, display_import_summary,
    display_ranks, format_numbers,
};
use lotto645_db::db::{count_draws, db_path, fetch_last_draws};
use lotto645_db::error::HistoryError;
use lotto645_db::models::{Draw, PICK_COUNT};
use lotto645_db::store::{DrawStore, SqliteStore, open_store};
use lotto645_engine::config::{EngineConfig, Strategy, load_config};
use lotto645_engine::filter::{Candidate, FilterPreset, FilterSet};
use lotto645_engine::models::SignalModel;
use lotto645_engine::sampler::make_rng;
use lotto645_engine::{GenerationRequest, LottoEngine};

#[derive(Parser)]
#[command(name = "lotto645", about = "Générateur de grilles Lotto 6/45 guidé par l'historique")]
struct Cli {
    /// Stockage de l'historique (.csv pour un fichier CSV, base SQLite sinon)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Configuration du moteur (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosité des journaux (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages d'un fichier CSV dans la base SQLite
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long, default_value = "assets/number.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin du stockage
    StorePath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Afficher le signal calculé sur l'historique
    Signal {
        #[arg(long, value_enum, default_value = "gap")]
        strategy: Strategy,

        /// Nombre de lignes à afficher
        #[arg(short, long, default_value = "15")]
        top: usize,
    },

    /// Générer des grilles
    Generate {
        #[arg(long, value_enum, default_value = "gap")]
        strategy: Strategy,

        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Numéros toujours inclus (5 au maximum, séparés par des virgules)
        #[arg(short, long, value_delimiter = ',')]
        fixed: Vec<u8>,

        /// Numéros jamais inclus (séparés par des virgules)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<u8>,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Passer une grille au crible des filtres
    Check {
        /// 6 numéros
        numbers: Vec<u8>,

        #[arg(long, value_enum, default_value = "base")]
        filters: FilterPreset,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.store.clone().unwrap_or_else(db_path);
    debug!(store = %path.display(), "stockage sélectionné");
    let config = match &cli.config {
        Some(p) => load_config(p).with_context(|| format!("Impossible de charger {:?}", p))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Import { file } => cmd_import(&path, &file),
        Command::StorePath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&path, last),
        Command::Add => cmd_add(&path),
        Command::Signal { strategy, top } => cmd_signal(&path, strategy, config, top),
        Command::Generate {
            strategy,
            count,
            fixed,
            exclude,
            seed,
        } => cmd_generate(&path, strategy, config, count, fixed, exclude, seed),
        Command::Check { numbers, filters } => cmd_check(&numbers, filters, &config),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open(path: &Path) -> Result<Box<dyn DrawStore>> {
    open_store(path).with_context(|| format!("Impossible d'ouvrir le stockage {:?}", path))
}

fn cmd_import(path: &Path, file: &Path) -> Result<()> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
        bail!("L'import alimente une base SQLite ; le stockage {:?} est déjà un CSV", path);
    }
    let store = SqliteStore::open(path)?;
    let result = import::import_csv(store.connection(), file)?;
    info!(file = %file.display(), inserted = result.inserted, skipped = result.skipped, "import terminé");
    display_import_summary(&result);
    println!("  Total en base     : {}", count_draws(store.connection())?);

    let last = fetch_last_draws(store.connection(), 5)?;
    if !last.is_empty() {
        println!("\nDerniers tirages :");
        display_draws(&last);
    }
    Ok(())
}

fn cmd_list(path: &Path, last: usize) -> Result<()> {
    let store = open(path)?;
    let history = store.load()?;
    if history.is_empty() {
        println!("Historique vide. Lancez d'abord : lotto645 import");
        return Ok(());
    }
    let mut draws = history.recent(last).to_vec();
    draws.reverse();
    display_draws(&draws);
    Ok(())
}

fn cmd_signal(path: &Path, strategy: Strategy, config: EngineConfig, top: usize) -> Result<()> {
    let engine = LottoEngine::new(open(path)?, strategy, config)?;
    let snapshot = engine.snapshot();
    if snapshot.draw_count == 0 {
        println!("Historique vide : le signal est uniforme.");
    }
    match &snapshot.model {
        SignalModel::GapWeight(weights) => display_gap_weights(weights, snapshot.draw_count, top),
        SignalModel::ExposureRank(ranks) => display_ranks(ranks, snapshot.draw_count, top),
    }
    Ok(())
}

fn cmd_generate(
    path: &Path,
    strategy: Strategy,
    config: EngineConfig,
    count: usize,
    fixed: Vec<u8>,
    exclude: Vec<u8>,
    seed: Option<u64>,
) -> Result<()> {
    let engine = LottoEngine::new(open(path)?, strategy, config)?;
    if engine.snapshot().draw_count == 0 {
        println!("(Historique vide : le signal est uniforme)");
    }

    debug!(source = %engine.store().describe(), config = ?engine.config(), "moteur prêt");

    let request = GenerationRequest { count, fixed, exclude };
    let mut rng = make_rng(seed);
    let result = engine.generate(&request, &mut rng)?;
    display_generation(&result);
    Ok(())
}

fn cmd_check(numbers: &[u8], preset: FilterPreset, config: &EngineConfig) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!("Attendu {} numéros. Reçu : {}", PICK_COUNT, numbers.len());
    }
    let Some(candidate) = Candidate::from_slice(numbers) else {
        bail!("Grille invalide : 6 numéros distincts entre 1 et 45");
    };
    let filters = FilterSet::from_preset(preset, config.filter_limits());
    display_check(&candidate, &filters.evaluate(&candidate));
    Ok(())
}

fn cmd_add(path: &Path) -> Result<()> {
    let store = open(path)?;
    println!("Ajout d'un tirage manuellement ({})\n", store.describe());

    let round: u32 = prompt("Numéro du tour (ex: 1101) : ")?
        .replace(',', "")
        .parse()
        .context("Numéro de tour invalide")?;
    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    let draw = Draw::new(round, numbers, bonus)?;

    println!("\nTirage à insérer :");
    display_draws(&[draw]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        match store.append(&draw) {
            Ok(()) => println!("Tirage inséré avec succès."),
            Err(HistoryError::DuplicateRound(r)) => println!("Le tour {} existe déjà (doublon ignoré).", r),
            Err(e) => return Err(e.into()),
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn parse_numbers(input: &str) -> Option<[u8; PICK_COUNT]> {
    let nums: Vec<u8> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    let arr: [u8; PICK_COUNT] = nums.try_into().ok()?;
    Candidate::new(arr).map(|c| *c.numbers())
}

fn prompt_numbers() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt("6 numéros gagnants (séparés par des espaces, 1-45) : ")?;
        match parse_numbers(&input) {
            Some(arr) => return Ok(arr),
            None => println!("Entrez exactement 6 numéros distincts entre 1 et 45. Réessayez."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; PICK_COUNT]) -> Result<u8> {
    loop {
        let input = prompt("Numéro bonus (1-45) : ")?;
        match input.parse::<u8>() {
            Ok(b) if (1..=45).contains(&b) && !numbers.contains(&b) => return Ok(b),
            _ => println!(
                "Bonus invalide (1-45, hors {}). Réessayez.",
                format_numbers(numbers)
            ),
        }
    }
}
