use log::{debug, info, warn};

use nomination_ballot::countdown::{remaining, CountdownTicker, SystemClock, CLOSED_LABEL};
use nomination_ballot::store::{FileStore, KeyValueStore, Notifier, VoteStore};
use nomination_ballot::tally::ResultSynthesizer;
use nomination_ballot::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;

use crate::args::{Args, Command};

pub mod render;
pub mod settings;

use crate::vote::render::*;
use crate::vote::settings::*;

/// Key of the in-progress ballot between two invocations.
pub const DRAFT_KEY: &str = "userVotesDraft";

#[derive(Debug, Snafu)]
pub enum VoteError {
    #[snafu(display("Error opening settings file {path}"))]
    OpeningSettings {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing settings file {path}: {source}"))]
    ParsingSettings {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening catalog file {path}"))]
    OpeningCatalog {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid catalog file {path}: {source}"))]
    InvalidCatalog { source: CatalogError, path: String },
    #[snafu(display("Invalid deadline {value:?}: {source}"))]
    ParsingDeadline {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("Invalid tally settings: {source}"))]
    InvalidTally { source: TallyError },
    #[snafu(display("Storage error: {source}"))]
    Storage { source: StorageError },
    #[snafu(display("Vote rejected: {source}"))]
    Rejected { source: BallotError },
    #[snafu(display("Error writing the output"))]
    Output { source: std::io::Error },
    #[snafu(display("Error running the countdown"))]
    Runtime { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type VoteResult<T> = Result<T, VoteError>;

enum LoadedCatalog {
    Builtin(&'static Catalog),
    Owned(Catalog),
}

impl LoadedCatalog {
    fn get(&self) -> &Catalog {
        match self {
            LoadedCatalog::Builtin(c) => c,
            LoadedCatalog::Owned(c) => c,
        }
    }
}

fn load_catalog(settings: &ResolvedSettings) -> VoteResult<LoadedCatalog> {
    match &settings.catalog_path {
        None => Ok(LoadedCatalog::Builtin(Catalog::builtin())),
        Some(p) => {
            let path = p.display().to_string();
            info!("Reading catalog from {:?}", path);
            let contents = fs::read_to_string(p).context(OpeningCatalogSnafu { path: &path })?;
            let catalog = Catalog::from_json(&contents).context(InvalidCatalogSnafu { path })?;
            Ok(LoadedCatalog::Owned(catalog))
        }
    }
}

/// Everything one invocation of the program works with.
pub struct Session<N: Notifier> {
    settings: ResolvedSettings,
    catalog: LoadedCatalog,
    store: VoteStore<FileStore, N>,
}

impl<N: Notifier> Session<N> {
    pub fn open(settings: ResolvedSettings, notifier: N) -> VoteResult<Session<N>> {
        let catalog = load_catalog(&settings)?;
        let mut store = VoteStore::new(FileStore::new(&settings.storage_path), notifier);
        if settings.lock_after_deadline {
            store = store.with_deadline_lock(settings.deadline, Box::new(SystemClock));
        }
        Ok(Session {
            settings,
            catalog,
            store,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.get()
    }

    /// The submitted ballot if there is one, otherwise the draft left by a
    /// previous invocation.
    pub fn load_state(&self) -> BallotState {
        let catalog = self.catalog.get();
        let state = self.store.restore(catalog);
        if state.submitted {
            return state;
        }
        let draft: BTreeMap<String, String> = match self.store.storage().get(DRAFT_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Ignoring malformed draft {:?}: {}", raw, e);
                    return state;
                }
            },
            Ok(None) => return state,
            Err(e) => {
                warn!("Could not read the draft: {}", e);
                return state;
            }
        };
        let mut state = state;
        for (nomination_id, option) in draft.iter() {
            match ballot::select_option(&state, catalog, nomination_id, option) {
                Ok(next) => state = next,
                Err(e) => warn!("Dropping draft entry {:?}: {}", nomination_id, e),
            }
        }
        debug!("Draft restored: {:?}", state.selections);
        state
    }

    fn save_draft(&mut self, state: &BallotState) -> VoteResult<()> {
        let js = serde_json::to_string(&state.selections)
            .map_err(|e| StorageError::Unavailable(e.to_string()))
            .context(StorageSnafu {})?;
        self.store
            .storage_mut()
            .set(DRAFT_KEY, &js)
            .context(StorageSnafu {})
    }

    /// Accepts the option label or its 1-based position in the nomination.
    fn resolve_option(&self, nomination_id: &str, option: &str) -> String {
        if let Some(nom) = self.catalog.get().get(nomination_id) {
            if nom.has_option(option) {
                return option.to_string();
            }
            if let Ok(idx) = option.parse::<usize>() {
                if idx >= 1 && idx <= nom.options.len() {
                    return nom.options[idx - 1].clone();
                }
            }
        }
        option.to_string()
    }

    pub fn select(&mut self, nomination_id: &str, option: &str) -> VoteResult<BallotState> {
        let option = self.resolve_option(nomination_id, option);
        let state = self.load_state();
        let next = self
            .store
            .select_option(&state, self.catalog.get(), nomination_id, &option)
            .context(RejectedSnafu {})?;
        self.save_draft(&next)?;
        Ok(next)
    }

    pub fn submit(&mut self) -> VoteResult<BallotState> {
        let state = self.load_state();
        let submitted = self
            .store
            .submit(&state, self.catalog.get())
            .context(RejectedSnafu {})?;
        if let Err(e) = self.store.storage_mut().remove(DRAFT_KEY) {
            warn!("Could not remove the draft: {}", e);
        }
        Ok(submitted)
    }

    pub fn synthesizer(&self) -> ResultSynthesizer {
        match self.settings.seed {
            Some(seed) => ResultSynthesizer::with_seed(self.settings.tally_rules, seed),
            None => ResultSynthesizer::new(self.settings.tally_rules),
        }
    }

    pub fn countdown(&self) -> String {
        remaining(chrono::Local::now().naive_local(), self.settings.deadline)
    }
}

fn watch_countdown(settings: &ResolvedSettings, out: &mut dyn Write) -> VoteResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context(RuntimeSnafu {})?;
    runtime.block_on(async {
        let (ticker, mut rx) =
            CountdownTicker::start(settings.deadline, settings.tick, SystemClock);
        loop {
            let text = rx.borrow_and_update().clone();
            write!(out, "\r{} Осталось: {}   ", "[Clock]", text).context(OutputSnafu {})?;
            out.flush().context(OutputSnafu {})?;
            if text == CLOSED_LABEL {
                break;
            }
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    debug!("watch_countdown: interrupted");
                    break;
                }
            }
        }
        ticker.stop();
        writeln!(out).context(OutputSnafu {})
    })
}

/// Runs one command, writing the view to `out`.
pub fn run_command<N: Notifier>(args: &Args, notifier: N, out: &mut dyn Write) -> VoteResult<()> {
    let settings = load_settings(args)?;
    debug!("settings: {:?}", settings);
    let mut session = Session::open(settings.clone(), notifier)?;

    match &args.command {
        Command::Ballot => {
            let state = session.load_state();
            write!(out, "{}", header(&session.countdown())).context(OutputSnafu {})?;
            write!(out, "{}", ballot_view(session.catalog(), &state)).context(OutputSnafu {})?;
        }
        Command::Nominations => {
            write!(out, "{}", nominations_view(session.catalog())).context(OutputSnafu {})?;
        }
        Command::Select { nomination, option } => {
            let state = session.select(nomination, option)?;
            let chosen = state.selection(nomination).unwrap_or_default();
            writeln!(
                out,
                "[CheckCircle] {}: {} ({} / {})",
                nomination,
                chosen,
                state.selections.len(),
                session.catalog().len()
            )
            .context(OutputSnafu {})?;
        }
        Command::Submit => {
            session.submit()?;
            let mut synth = session.synthesizer();
            let tally = synth.view(session.catalog());
            write!(out, "{}", results_view(session.catalog(), tally)).context(OutputSnafu {})?;
        }
        Command::Results => {
            let mut synth = session.synthesizer();
            let tally = synth.view(session.catalog());
            write!(out, "{}", results_view(session.catalog(), tally)).context(OutputSnafu {})?;
        }
        Command::Countdown { watch } => {
            if *watch {
                watch_countdown(&settings, out)?;
            } else {
                writeln!(out, "{}", session.countdown()).context(OutputSnafu {})?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use nomination_ballot::store::RecordingNotifier;

    fn run(storage: &str, extra: &[&str]) -> (VoteResult<()>, String, Vec<Notice>) {
        let mut v = vec!["vote", "--storage", storage];
        v.extend_from_slice(extra);
        let args = Args::parse_from(v);
        let notifier = RecordingNotifier::new();
        let mut out: Vec<u8> = Vec::new();
        let res = run_command(&args, &notifier, &mut out);
        (res, String::from_utf8(out).unwrap(), notifier.notices())
    }

    #[test]
    fn full_session_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();

        for id in 1..=6 {
            let id_s = id.to_string();
            let (res, out, notices) = run(&storage, &["select", id_s.as_str(), "2"]);
            assert!(res.is_ok());
            assert!(notices.is_empty());
            assert!(out.contains(&format!("({} / 7)", id)));
        }

        let (res, _, notices) = run(&storage, &["submit"]);
        assert!(matches!(
            res,
            Err(VoteError::Rejected {
                source: BallotError::IncompleteBallot { missing_count: 1 }
            })
        ));
        assert_eq!(notices[0].description, "Осталось выбрать: 1");

        // Change of mind on the first nomination, then the last one.
        let (res, out, _) = run(&storage, &["select", "1", "Смарт-часы Galaxy Watch 6"]);
        assert!(res.is_ok());
        assert!(out.contains("Смарт-часы Galaxy Watch 6"));
        let (res, _, _) = run(&storage, &["select", "7", "4"]);
        assert!(res.is_ok());

        let (res, out, notices) = run(&storage, &["--seed", "x", "submit"]);
        assert!(res.is_ok());
        assert_eq!(notices, vec![Notice::submitted()]);
        assert!(out.contains("Всего голосов"));

        let store = FileStore::new(&storage);
        let saved: BTreeMap<String, String> =
            serde_json::from_str(&store.get(BALLOT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.len(), 7);
        assert_eq!(saved["1"], "Смарт-часы Galaxy Watch 6");
        assert_eq!(saved["7"], "Пластик-переработка EcoPlast");
        assert_eq!(store.get(DRAFT_KEY).unwrap(), None);

        let (res, _, notices) = run(&storage, &["select", "2", "1"]);
        assert!(matches!(
            res,
            Err(VoteError::Rejected {
                source: BallotError::AlreadySubmitted
            })
        ));
        assert_eq!(notices[0].title, "Вы уже проголосовали!");

        let (res, out, _) = run(&storage, &["ballot"]);
        assert!(res.is_ok());
        assert!(out.contains("Спасибо за участие!"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let (res, _, notices) = run(&storage, &["select", "1", "9"]);
        assert!(matches!(
            res,
            Err(VoteError::Rejected {
                source: BallotError::InvalidSelection { .. }
            })
        ));
        assert_eq!(notices.len(), 1);
        let (res, _, _) = run(&storage, &["select", "nope", "1"]);
        assert!(res.is_err());
    }

    #[test]
    fn seeded_results_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let (_, a, _) = run(&storage, &["--seed", "2024", "results"]);
        let (_, b, _) = run(&storage, &["--seed", "2024", "results"]);
        assert_eq!(a, b);
        assert_eq!(a.matches("[Crown]").count(), 7);
    }

    #[test]
    fn custom_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let catalog_path = dir.path().join("catalog.json");
        fs::write(
            &catalog_path,
            r#"[{"id": "a", "title": "Only one", "icon": "Crown", "options": ["x", "y"]}]"#,
        )
        .unwrap();
        let catalog_path = catalog_path.display().to_string();
        let (res, out, _) = run(&storage, &["--catalog", &catalog_path, "nominations"]);
        assert!(res.is_ok());
        assert!(out.contains("[Crown] Only one"));

        let (res, _, _) = run(&storage, &["--catalog", &catalog_path, "select", "a", "y"]);
        assert!(res.is_ok());
        let (res, _, notices) = run(&storage, &["--catalog", &catalog_path, "submit"]);
        assert!(res.is_ok());
        assert_eq!(notices, vec![Notice::submitted()]);
    }

    #[test]
    fn locked_after_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let config = dir.path().join("settings.json");
        fs::write(
            &config,
            r#"{"deadline": "2000-01-01T00:00:00", "lockAfterDeadline": true}"#,
        )
        .unwrap();
        let config = config.display().to_string();
        let (res, _, notices) = run(&storage, &["--config", &config, "select", "1", "1"]);
        assert!(matches!(
            res,
            Err(VoteError::Rejected {
                source: BallotError::VotingClosed
            })
        ));
        assert_eq!(notices[0].title, "Голосование завершено");

        let (res, out, _) = run(&storage, &["--config", &config, "countdown"]);
        assert!(res.is_ok());
        assert_eq!(out.trim(), CLOSED_LABEL);
    }

    #[test]
    fn watch_stops_at_closed_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let config = dir.path().join("settings.json");
        fs::write(
            &config,
            r#"{"deadline": "2000-01-01T00:00:00", "tickMillis": 10}"#,
        )
        .unwrap();
        let config = config.display().to_string();
        let (res, out, _) = run(&storage, &["--config", &config, "countdown", "--watch"]);
        assert!(res.is_ok());
        assert!(out.contains(CLOSED_LABEL));
    }

    #[test]
    fn malformed_draft_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("votes.json").display().to_string();
        let mut store = FileStore::new(&storage);
        store.set(DRAFT_KEY, "{oops").unwrap();
        let (res, out, _) = run(&storage, &["ballot"]);
        assert!(res.is_ok());
        assert!(out.contains("Выбрано 0 из 7"));
    }
}
