//! CLI for lernpfad.
//!
//! Provides commands for recommending content from a catalog file, applying
//! observation feeds to a learner profile, and simulating closed-loop
//! sessions. It serves as the operational interface for the recommendation
//! engine; catalogs, profiles, and configuration all live in flat JSON
//! files owned by the caller.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lernpfad_core::{ContentItem, Observation, StudentState, Topic};
use lernpfad_engine::{eligible, EngineConfig, ExplorationTracker, Recommender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the next content item for a learner
    Recommend {
        /// Catalog file (JSON array of content items)
        #[arg(long)]
        catalog: PathBuf,

        /// Learner profile file (JSON)
        #[arg(long)]
        student: PathBuf,

        /// Topic map file (JSON object); enables eligibility filtering
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Engine configuration file (JSON); defaults are used when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the session state file
        #[arg(long, default_value = "data/lernpfad.session.state.json")]
        state_file: PathBuf,
    },
    /// Apply a JSONL observation feed to a learner profile
    Observe {
        /// Learner profile file (JSON); updated in place
        #[arg(long)]
        student: PathBuf,

        /// Catalog file (JSON array of content items)
        #[arg(long)]
        catalog: PathBuf,

        /// Observation feed (one JSON object per line)
        #[arg(long)]
        observations: PathBuf,

        /// Engine configuration file (JSON); defaults are used when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the stats file
        #[arg(long, default_value = "data/lernpfad.stats.json")]
        stats_file: PathBuf,
    },
    /// Run a closed recommend/respond loop against a catalog
    Simulate {
        /// Catalog file (JSON array of content items)
        #[arg(long)]
        catalog: PathBuf,

        /// Learner profile file (JSON); not modified on disk
        #[arg(long)]
        student: PathBuf,

        /// Topic map file (JSON object); enables eligibility filtering
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Engine configuration file (JSON); defaults are used when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of interaction steps
        #[arg(long, default_value = "10")]
        steps: u64,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Persisted session state: the interaction clock plus the exploration
/// counters, so a restarted process continues where it left off.
#[derive(Serialize, Deserialize, Debug)]
struct SessionState {
    time_step: u64,
    exploration: ExplorationTracker,
    #[serde(with = "time::serde::iso8601::option")]
    last_ok: Option<OffsetDateTime>,
}

impl SessionState {
    fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let state: SessionState = serde_json::from_reader(file)?;
        Ok(Some(state))
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct SessionStats {
    total_processed: u64,
    by_kind: HashMap<String, u64>,
    by_topic: HashMap<String, u64>,
    #[serde(with = "time::serde::iso8601")]
    last_updated: OffsetDateTime,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            total_processed: 0,
            by_kind: HashMap::new(),
            by_topic: HashMap::new(),
            last_updated: OffsetDateTime::now_utc(),
        }
    }
}

impl SessionStats {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        let stats = serde_json::from_reader(file)?;
        Ok(stats)
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    fn update(&mut self, observation: &Observation, content: &ContentItem) {
        self.total_processed += 1;
        *self.by_kind.entry(content.kind.clone()).or_insert(0) += 1;
        *self.by_topic.entry(observation.topic.clone()).or_insert(0) += 1;
        self.last_updated = OffsetDateTime::now_utc();
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {what} file {path:?}"))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse {what} file {path:?}"))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_json(path, "config"),
        None => Ok(EngineConfig::default()),
    }
}

fn load_topics(path: Option<&Path>) -> Result<BTreeMap<String, Topic>> {
    match path {
        Some(path) => load_json(path, "topics"),
        None => Ok(BTreeMap::new()),
    }
}

fn save_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {what} file {path:?}"))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Candidate set for one selection: the eligibility filter applies only
/// when a topic map was provided, otherwise the raw catalog is used.
fn candidates_for(
    catalog: &[ContentItem],
    student: &StudentState,
    topics: &BTreeMap<String, Topic>,
    config: &EngineConfig,
) -> Vec<ContentItem> {
    if topics.is_empty() {
        catalog.to_vec()
    } else {
        eligible(catalog, student, topics, config)
    }
}

/// Probability of a correct response under the generative observation
/// model: mastered learners slip, unmastered learners guess.
fn response_probability(mastery: f64, p_slip: f64, p_guess: f64) -> f64 {
    (mastery * (1.0 - p_slip) + (1.0 - mastery) * p_guess).clamp(0.0, 1.0)
}

fn run_recommend(
    catalog: &Path,
    student: &Path,
    topics: Option<&Path>,
    config: Option<&Path>,
    state_file: &Path,
) -> Result<()> {
    let catalog: Vec<ContentItem> = load_json(catalog, "catalog")?;
    let student: StudentState = load_json(student, "student")?;
    let topics = load_topics(topics)?;
    let config = load_config(config)?;

    let mut recommender = Recommender::new(config).context("Engine configuration rejected")?;

    let mut time_step = 0;
    if let Some(state) = SessionState::load(state_file)? {
        time_step = state.time_step;
        recommender.set_exploration(state.exploration);
        eprintln!("Resuming session at interaction {}", time_step);
    }

    let candidates = candidates_for(&catalog, &student, &topics, recommender.config());
    let recommendation = recommender
        .select(&student, &candidates, time_step)
        .context("Selection failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&recommendation).context("Failed to render recommendation")?
    );

    // The CLI treats printing as showing, so the counters advance here.
    recommender.record_selection(&recommendation.kind);
    SessionState {
        time_step: time_step + 1,
        exploration: recommender.exploration().clone(),
        last_ok: Some(OffsetDateTime::now_utc()),
    }
    .save(state_file)
    .context("Failed to save session state")?;

    Ok(())
}

fn run_observe(
    student_path: &Path,
    catalog: &Path,
    observations: &Path,
    config: Option<&Path>,
    stats_file: &Path,
) -> Result<()> {
    let catalog: Vec<ContentItem> = load_json(catalog, "catalog")?;
    let mut student: StudentState = load_json(student_path, "student")?;
    let config = load_config(config)?;
    let recommender = Recommender::new(config).context("Engine configuration rejected")?;

    let mut stats = SessionStats::load(stats_file).unwrap_or_else(|e| {
        eprintln!(
            "Warning: failed to read stats from {:?}; starting fresh: {}",
            stats_file, e
        );
        SessionStats::default()
    });

    let file = File::open(observations)
        .with_context(|| format!("Failed to open observations file {observations:?}"))?;
    let reader = BufReader::new(file);

    let mut applied = 0u64;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let observation: Observation =
            serde_json::from_str(&line).context("Failed to parse observation line")?;

        let Some(content) = catalog.iter().find(|c| c.id == observation.content_id) else {
            eprintln!(
                "Warning: observation references unknown content '{}'; skipped",
                observation.content_id
            );
            continue;
        };

        let mastery = recommender
            .apply_observation(&mut student, &observation, content)
            .context("Observation update failed")?;
        stats.update(&observation, content);
        applied += 1;

        println!(
            "{}\t{}\t{:.3}",
            observation.topic,
            if observation.correct { "correct" } else { "incorrect" },
            mastery
        );
    }

    save_json(&student, student_path, "student")?;
    stats.last_updated = OffsetDateTime::now_utc();
    stats.save(stats_file).context("Failed to save stats")?;

    eprintln!(
        "Applied {} observations. (Stats updated at {})",
        applied, stats.last_updated
    );

    Ok(())
}

fn run_simulate(
    catalog: &Path,
    student: &Path,
    topics: Option<&Path>,
    config: Option<&Path>,
    steps: u64,
    seed: Option<u64>,
) -> Result<()> {
    let catalog: Vec<ContentItem> = load_json(catalog, "catalog")?;
    let mut student: StudentState = load_json(student, "student")?;
    let topics = load_topics(topics)?;
    let config = load_config(config)?;

    let mut recommender = Recommender::new(config).context("Engine configuration rejected")?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for t in 0..steps {
        let candidates = candidates_for(&catalog, &student, &topics, recommender.config());
        let recommendation = recommender
            .select(&student, &candidates, t)
            .context("Selection failed")?;
        recommender.record_selection(&recommendation.kind);

        let content = catalog
            .iter()
            .find(|c| c.id == recommendation.content_id)
            .context("Selected content missing from catalog")?;
        let topic = content
            .topic
            .clone()
            .unwrap_or_else(|| "general".to_string());

        let bkt = recommender.config().bkt_for(&topic);
        let mastery_before = student.topic_mastery(&topic).unwrap_or(0.0);
        let p_correct = response_probability(mastery_before, bkt.p_slip, bkt.p_guess);
        let correct = rng.gen::<f64>() < p_correct;
        let engagement = rng.gen_range(0.3..1.0);

        let observation = Observation {
            content_id: recommendation.content_id.clone(),
            topic: topic.clone(),
            correct,
            time_spent_secs: rng.gen_range(30..300),
            engagement,
        };
        let mastery = recommender
            .apply_observation(&mut student, &observation, content)
            .context("Observation update failed")?;

        println!(
            "step {:>3}  {:<24} {:<9} mastery[{}] {:.3} -> {:.3}",
            t,
            recommendation.content_id,
            if correct { "correct" } else { "incorrect" },
            topic,
            mastery_before,
            mastery
        );
    }

    println!(
        "\nfinal mastery: {}",
        serde_json::to_string_pretty(&student.mastery_by_topic)?
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            catalog,
            student,
            topics,
            config,
            state_file,
        } => run_recommend(
            &catalog,
            &student,
            topics.as_deref(),
            config.as_deref(),
            &state_file,
        ),
        Commands::Observe {
            student,
            catalog,
            observations,
            config,
            stats_file,
        } => run_observe(
            &student,
            &catalog,
            &observations,
            config.as_deref(),
            &stats_file,
        ),
        Commands::Simulate {
            catalog,
            student,
            topics,
            config,
            steps,
            seed,
        } => run_simulate(
            &catalog,
            &student,
            topics.as_deref(),
            config.as_deref(),
            steps,
            seed,
        ),
    }
}
