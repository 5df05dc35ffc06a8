use crate::vote::*;

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use nomination_ballot::tally::seed_from_label;
use nomination_ballot::{default_deadline, TallyMode, TallyRules};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_PATH: &str = "votes.json";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallySettings {
    pub mode: Option<String>,
    pub seed: Option<String>,
    #[serde(rename = "minVotes")]
    pub min_votes: Option<u64>,
    #[serde(rename = "maxVotes")]
    pub max_votes: Option<u64>,
}

/// The content of the settings file. Every field is optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteSettings {
    pub deadline: Option<String>,
    #[serde(rename = "lockAfterDeadline")]
    pub lock_after_deadline: Option<bool>,
    #[serde(rename = "storagePath")]
    pub storage_path: Option<String>,
    #[serde(rename = "catalogPath")]
    pub catalog_path: Option<String>,
    pub tally: Option<TallySettings>,
    #[serde(rename = "tickMillis")]
    pub tick_millis: Option<u64>,
}

/// Settings after applying the defaults and the command-line overrides.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolvedSettings {
    pub deadline: NaiveDateTime,
    pub lock_after_deadline: bool,
    pub storage_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub tally_rules: TallyRules,
    pub seed: Option<u64>,
    pub tick: Duration,
}

pub fn read_settings(path: &str) -> VoteResult<VoteSettings> {
    let contents = fs::read_to_string(path).context(OpeningSettingsSnafu { path })?;
    debug!("read settings: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingSettingsSnafu { path })
}

fn tally_mode(mode: &Option<String>) -> VoteResult<TallyMode> {
    match mode.as_deref() {
        None | Some("stable") => Ok(TallyMode::Stable),
        Some("jitter") => Ok(TallyMode::Jitter),
        Some(x) => whatever!("unknown tally mode {:?} (expected stable or jitter)", x),
    }
}

pub fn validate_settings(settings: &VoteSettings, args: &Args) -> VoteResult<ResolvedSettings> {
    let deadline = match settings.deadline.as_deref() {
        Some(s) => s
            .parse::<NaiveDateTime>()
            .context(ParsingDeadlineSnafu { value: s })?,
        None => default_deadline(),
    };

    let tally = settings.tally.clone().unwrap_or_default();
    let defaults = TallyRules::DEFAULT_RULES;
    let tally_rules = TallyRules::new(
        tally_mode(&tally.mode)?,
        tally.min_votes.unwrap_or(defaults.min_votes),
        tally.max_votes.unwrap_or(defaults.max_votes),
    )
    .context(InvalidTallySnafu {})?;

    let seed_label = args.seed.clone().or(tally.seed);

    let tick = match settings.tick_millis {
        Some(0) => whatever!("tickMillis must be positive"),
        Some(ms) => Duration::from_millis(ms),
        None => Duration::from_secs(1),
    };

    Ok(ResolvedSettings {
        deadline,
        lock_after_deadline: settings.lock_after_deadline.unwrap_or(false),
        storage_path: PathBuf::from(
            args.storage
                .clone()
                .or_else(|| settings.storage_path.clone())
                .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
        ),
        catalog_path: args
            .catalog
            .clone()
            .or_else(|| settings.catalog_path.clone())
            .map(PathBuf::from),
        tally_rules,
        seed: seed_label.map(|s| seed_from_label(&s)),
        tick,
    })
}

/// Reads the settings file given with `--config`, if any, and applies the
/// command-line overrides.
pub fn load_settings(args: &Args) -> VoteResult<ResolvedSettings> {
    let settings = match &args.config {
        Some(path) => {
            info!("Reading settings from {:?}", path);
            read_settings(path)?
        }
        None => VoteSettings::default(),
    };
    validate_settings(&settings, args)
}
