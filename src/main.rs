//! # Medigate — patient intake backend
//!
//! Registers patients over HTTP, matches their reported symptoms against a
//! localized condition knowledge base, and stores the resulting
//! recommendation alongside the patient record.
//!
//! Usage:
//!   medigate                         # Start the gateway server
//!   medigate --port 8080             # Custom port
//!   medigate seed                    # Insert sample patients + analyses
//!   medigate generate --count 100    # Write bulk random patients JSON
//!   medigate import --file FILE      # Import patients JSON and analyze each

use anyhow::Result;
use clap::{Parser, Subcommand};
use medigate_core::config::MedigateConfig;
use medigate_core::types::NewPatient;
use medigate_engine::{MatchingEngine, Recommendation};
use medigate_gateway::PatientDb;
use medigate_knowledge::KnowledgeStore;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medigate", version, about = "Medigate — patient intake backend")]
struct Cli {
    /// Config file path (default: ~/.medigate/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Knowledge base JSON path (overrides config)
    #[arg(long)]
    kb: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Insert sample patients and their recommendations
    Seed,
    /// Generate bulk random patient data as JSON
    Generate {
        /// Number of patients to generate
        #[arg(long, default_value = "100")]
        count: usize,
        /// Output file
        #[arg(long, default_value = "data/patients.json")]
        out: String,
    },
    /// Import a patients JSON file, analyzing each record on the way in
    Import {
        /// Patients JSON file (an array of patient payloads)
        #[arg(long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "medigate=debug,tower_http=debug"
    } else {
        "medigate=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load config, then apply CLI overrides
    let mut config = match &cli.config {
        Some(path) => MedigateConfig::load_from(Path::new(path))?,
        None => MedigateConfig::load()?,
    };
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(kb) = cli.kb {
        config.knowledge.path = kb;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Some(Command::Seed) => seed(&config),
        Some(Command::Generate { count, out }) => generate(count, &out),
        Some(Command::Import { file }) => import(&config, &file),
        None => medigate_gateway::server::start(config).await,
    }
}

fn open_db(config: &MedigateConfig) -> Result<PatientDb> {
    let db_path = shellexpand::tilde(&config.database.path).to_string();
    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    PatientDb::open(Path::new(&db_path)).map_err(|e| anyhow::anyhow!("Patient DB: {e}"))
}

/// Insert the two canonical sample patients and their recommendations.
fn seed(config: &MedigateConfig) -> Result<()> {
    let db = open_db(config)?;

    let samples = vec![
        (
            NewPatient {
                name: "Siddharth Sharma".into(),
                age: 45,
                gender: "Male".into(),
                symptoms: vec!["headache".into(), "high bp".into(), "nosebleed".into()],
                history: vec!["hypertension".into()],
                bp: "160/100".into(),
                temperature: "98.4°F".into(),
                heart_rate: "88 bpm".into(),
            },
            Recommendation {
                possible_condition: "Hypertension".into(),
                suggested_tests: vec!["ECG".into(), "Blood Pressure Monitoring".into()],
                dosage_recommendation: "Amlodipine 5mg (consult doctor)".into(),
                precautionary_measures: vec![
                    "Reduce salt".into(),
                    "Relax".into(),
                    "Avoid caffeine".into(),
                ],
                ai_analysis_summary:
                    "Patient exhibits severe hypertensive symptoms. Immediate BP control required."
                        .into(),
            },
        ),
        (
            NewPatient {
                name: "Priya Singh".into(),
                age: 30,
                gender: "Female".into(),
                symptoms: vec!["fever".into(), "cough".into(), "fatigue".into()],
                history: vec!["none".into()],
                bp: "110/70".into(),
                temperature: "101.2°F".into(),
                heart_rate: "92 bpm".into(),
            },
            Recommendation {
                possible_condition: "Viral Fever".into(),
                suggested_tests: vec!["CBC".into(), "Widal Test".into()],
                dosage_recommendation: "Paracetamol 500mg (consult doctor)".into(),
                precautionary_measures: vec![
                    "Rest".into(),
                    "Hydration".into(),
                    "Monitor temperature".into(),
                ],
                ai_analysis_summary:
                    "Classic signs of community-acquired viral infection.".into(),
            },
        ),
    ];

    for (new_patient, recommendation) in &samples {
        let patient = db
            .insert_patient(new_patient)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        db.insert_history(&patient.id, &patient.name, recommendation)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    tracing::info!("Seeded {} sample patient(s)", samples.len());
    Ok(())
}

/// Write `count` random patient payloads to `out` as a JSON array.
fn generate(count: usize, out: &str) -> Result<()> {
    let names = [
        "Rahul Sharma",
        "Sneha Gupta",
        "Amit Patel",
        "Priya Singh",
        "Vikram Rao",
        "Anjali Verma",
        "Siddharth Malhotra",
        "Kavita Reddy",
        "Rohan Joshi",
        "Meera Nair",
    ];
    let symptom_sets: [&[&str]; 5] = [
        &["fever", "cough", "fatigue"],
        &["headache", "blurred vision", "high bp"],
        &["excessive thirst", "frequent urination", "blurred vision"],
        &["wheezing", "shortness of breath", "chest tightness"],
        &["throbbing headache", "nausea", "sensitivity to light"],
    ];

    let mut rng = rand::thread_rng();
    let mut patients = Vec::with_capacity(count);
    for i in 0..count {
        let symptoms = symptom_sets[rng.gen_range(0..symptom_sets.len())];
        patients.push(NewPatient {
            name: format!("{} {}", names[rng.gen_range(0..names.len())], i),
            age: rng.gen_range(18..=75),
            gender: if rng.gen_bool(0.5) { "Male".into() } else { "Female".into() },
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            history: vec!["none".into()],
            bp: format!("{}/{}", rng.gen_range(110..=150), rng.gen_range(70..=95)),
            temperature: format!("{:.1}°F", rng.gen_range(98.0..102.0)),
            heart_rate: format!("{} bpm", rng.gen_range(65..=95)),
        });
    }

    let path = PathBuf::from(out);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&patients)?)?;
    tracing::info!("Generated {count} patient(s) → {}", path.display());
    Ok(())
}

/// Import patients from a JSON file, running the matching engine for each.
fn import(config: &MedigateConfig, file: &str) -> Result<()> {
    let db = open_db(config)?;
    let kb_path = PathBuf::from(shellexpand::tilde(&config.knowledge.path).to_string());
    let store = KnowledgeStore::load(&kb_path);
    let engine = MatchingEngine::new(config.engine.clone());

    let content = std::fs::read_to_string(file)?;
    let patients: Vec<NewPatient> = serde_json::from_str(&content)?;

    let mut imported = 0usize;
    for new_patient in &patients {
        let patient = db
            .insert_patient(new_patient)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let recommendation = engine.analyze(&patient.symptoms, store.entries());
        db.insert_history(&patient.id, &patient.name, &recommendation)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        imported += 1;
    }
    tracing::info!("Imported {imported} patient(s) from {file}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medigate_gateway::db::ListQuery;

    #[test]
    fn test_generate_then_import_analyzes_each_record() {
        let dir = std::env::temp_dir().join("medigate-cli-test-import");
        std::fs::create_dir_all(&dir).ok();
        let out = dir.join("patients.json");

        generate(5, &out.to_string_lossy()).unwrap();
        let parsed: Vec<NewPatient> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed.len(), 5);

        let mut config = MedigateConfig::default();
        config.database.path = dir.join("test.db").to_string_lossy().into_owned();
        config.knowledge.path = dir.join("kb.json").to_string_lossy().into_owned();
        std::fs::write(
            &config.knowledge.path,
            r#"[{"condition": "Common Cold",
                 "symptoms": ["fever", "cough", "fatigue"],
                 "tests": ["CBC"],
                 "dosage": "Paracetamol 500mg (consult doctor)",
                 "precautions": ["Rest"]}]"#,
        )
        .unwrap();
        import(&config, &out.to_string_lossy()).unwrap();

        // Every imported patient got a stored recommendation on the way in.
        let db = open_db(&config).unwrap();
        let (patients, total) = db
            .list_patients(&ListQuery { page: 1, limit: 10, ..Default::default() })
            .unwrap();
        assert_eq!(total, 5);
        for patient in &patients {
            assert!(db.history_for(&patient.id).unwrap().is_some());
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
