mod display;
mod import;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pension_analysis::config::{load_config, save_config, GeneratorConfig};
use pension_analysis::digit_sum::analyze_digit_sums;
use pension_analysis::duplicates::analyze_duplicates;
use pension_analysis::generator::generate_predictions;
use pension_analysis::positional::analyze_position_frequency;
use pension_analysis::report::describe_prediction;
use pension_analysis::snapshot::{AnalysisSnapshot, SnapshotOptions};
use pension_analysis::stats::analyze_numbers;
use pension_analysis::summary::summarize;
use pension_analysis::transition::{analyze_position_transitions, compare_rounds};
use pension_analysis::trend::trend_series;
use pension_db::error::StoreError;
use pension_db::models::{by_range, extract_numbers, frequency_set, recent, DrawRecord};
use pension_db::store::{data_path, parse_row_fields, FileStore};

use crate::display::{
    display_comparison, display_digit_sums, display_duplicates, display_import_summary,
    display_positions, display_predictions, display_records, display_stats, display_transitions,
    display_trend,
};

#[derive(Parser)]
#[command(name = "pension", about = "Analyseur de tirages de loterie à 6 chiffres")]
struct Cli {
    /// Fichier de données (par défaut : data/pension_lottery.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Compter aussi les chiffres bonus dans les analyses de fréquence
    #[arg(long, global = true)]
    bonus: bool,

    /// Limiter aux N tirages les plus récents
    #[arg(long, global = true)]
    last: Option<usize>,

    /// Premier tirage de la plage
    #[arg(long, global = true)]
    from: Option<u32>,

    /// Dernier tirage de la plage
    #[arg(long, global = true)]
    to: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les tirages
    List,

    /// Ajouter un tirage : tirage groupe c1..c6 b1..b6
    Add {
        #[arg(num_args = 14, required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Importer des tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Statistiques des valeurs combinées
    Stats {
        /// Seed pour la valeur suivante estimée (série vide)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Fréquences des chiffres par position
    Positions,

    /// Classes de doublons et motifs de position
    Duplicates,

    /// Distribution de la somme des chiffres
    Sums,

    /// Comparaison tirage à tirage et transitions par position
    Transitions {
        /// Position à détailler (1-6)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=6))]
        position: Option<u8>,
    },

    /// Série des variations de valeur
    Trend {
        /// Nombre de points affichés
        #[arg(short, long, default_value = "20")]
        points: usize,
    },

    /// Générer des tirages
    Predict {
        /// Nombre de tirages à générer
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Configuration du générateur (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Exporter toutes les analyses en JSON
    Snapshot {
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Écrire la configuration par défaut du générateur
    Config {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Afficher le chemin du fichier de données
    DataPath,
}

/// Filtres communs appliqués aux tirages chargés.
struct Selection {
    bonus: bool,
    last: Option<usize>,
    from: Option<u32>,
    to: Option<u32>,
}

impl Selection {
    fn apply(&self, records: Vec<DrawRecord>) -> Vec<DrawRecord> {
        let records = match (self.from, self.to) {
            (None, None) => records,
            (from, to) => by_range(&records, from.unwrap_or(0), to.unwrap_or(u32::MAX)),
        };
        match self.last {
            Some(n) => recent(&records, n),
            None => records,
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = cli.data.clone().unwrap_or_else(data_path);
    let store = FileStore::open(&path);
    let selection = Selection {
        bonus: cli.bonus,
        last: cli.last,
        from: cli.from,
        to: cli.to,
    };

    match cli.command {
        Command::DataPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Config { output } => cmd_config(&output),
        Command::Add { values } => cmd_add(&store, &values),
        Command::Import { file } => cmd_import(&store, &file),
        Command::Predict {
            count,
            seed,
            config,
        } => cmd_predict(&store, &selection, count, seed, config),
        command => {
            let records = load_selection(&store, &selection)?;
            if records.is_empty() {
                println!("Aucun tirage. Lancez d'abord : pension import --file <csv>");
                return Ok(());
            }
            run_analysis(command, &records, &selection)
        }
    }
}

fn load_selection(store: &FileStore, selection: &Selection) -> Result<Vec<DrawRecord>> {
    let records = store
        .load_records()
        .with_context(|| format!("Chargement impossible depuis {:?}", store.path()))?;
    let selected = selection.apply(records);
    log::debug!("{} tirages sélectionnés", selected.len());
    Ok(selected)
}

fn run_analysis(command: Command, records: &[DrawRecord], selection: &Selection) -> Result<()> {
    let frequency = frequency_set(records, selection.bonus);

    match command {
        Command::List => {
            let shown = if selection.last.is_some() {
                records.to_vec()
            } else {
                recent(records, 10)
            };
            display_records(&shown);
        }
        Command::Stats { seed } => {
            let mut numbers = extract_numbers(records, selection.bonus);
            numbers.reverse();
            let analysis = analyze_numbers(&numbers, &mut make_rng(seed));
            display_stats(&analysis, &summarize(records));
        }
        Command::Positions => display_positions(&analyze_position_frequency(&frequency)),
        Command::Duplicates => display_duplicates(&analyze_duplicates(&frequency)),
        Command::Sums => display_digit_sums(&analyze_digit_sums(&frequency)),
        Command::Transitions { position } => {
            display_comparison(&compare_rounds(records));
            display_transitions(
                &analyze_position_transitions(records),
                position.map(usize::from),
            );
        }
        Command::Trend { points } => display_trend(&trend_series(records), points),
        Command::Snapshot { output, seed } => {
            let options = SnapshotOptions {
                include_bonus: selection.bonus,
                ..SnapshotOptions::default()
            };
            let snapshot = AnalysisSnapshot::compute(records, options, &mut make_rng(seed));
            snapshot.save(&output)?;
            println!("Instantané écrit dans {}", output.display());
        }
        Command::DataPath
        | Command::Config { .. }
        | Command::Add { .. }
        | Command::Import { .. }
        | Command::Predict { .. } => bail!("Commande sans analyse"),
    }
    Ok(())
}

fn cmd_add(store: &FileStore, values: &[String]) -> Result<()> {
    let row = parse_row_fields(values)?;
    match store.append_row(row) {
        Ok(rows) => {
            let records = store.load_records()?;
            if let Some(record) = records.iter().find(|r| r.round_id as i64 == row[0]) {
                display_records(std::slice::from_ref(record));
            }
            println!("Tirage {} ajouté ({} tirages).", row[0], rows.len());
            Ok(())
        }
        Err(StoreError::DuplicateRound { round_id }) => {
            bail!("Le tirage {} existe déjà, rien n'a été modifié", round_id)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_import(store: &FileStore, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(store, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_config(output: &PathBuf) -> Result<()> {
    save_config(&GeneratorConfig::default(), output)?;
    println!("Configuration écrite dans {}", output.display());
    Ok(())
}

fn cmd_predict(
    store: &FileStore,
    selection: &Selection,
    count: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => load_config(&path)?,
        None => GeneratorConfig::default(),
    };
    // Le générateur ne voit jamais les chiffres bonus
    let records = load_selection(store, selection)?;
    if records.is_empty() {
        println!("Aucun historique : tirages uniformes.");
    }

    let mut rng = make_rng(seed);
    let predictions: Vec<_> = generate_predictions(&records, &config, count, &mut rng)
        .into_iter()
        .map(|generated| {
            let report = describe_prediction(&generated.digits, &records);
            (generated, report)
        })
        .collect();
    display_predictions(&predictions);
    Ok(())
}
