// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

/// The icons a nomination may be displayed with.
///
/// Catalogs are checked against this list when they are loaded: a nomination
/// cannot refer to an icon that the presentation layer does not know.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum IconName {
    Trophy,
    Award,
    Sparkles,
    Palette,
    Rocket,
    Users,
    Leaf,
    // Icons used by the views themselves.
    Clock,
    Vote,
    List,
    BarChart3,
    CheckCircle,
    Send,
    Crown,
}

impl IconName {
    pub const ALL: [IconName; 14] = [
        IconName::Trophy,
        IconName::Award,
        IconName::Sparkles,
        IconName::Palette,
        IconName::Rocket,
        IconName::Users,
        IconName::Leaf,
        IconName::Clock,
        IconName::Vote,
        IconName::List,
        IconName::BarChart3,
        IconName::CheckCircle,
        IconName::Send,
        IconName::Crown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IconName::Trophy => "Trophy",
            IconName::Award => "Award",
            IconName::Sparkles => "Sparkles",
            IconName::Palette => "Palette",
            IconName::Rocket => "Rocket",
            IconName::Users => "Users",
            IconName::Leaf => "Leaf",
            IconName::Clock => "Clock",
            IconName::Vote => "Vote",
            IconName::List => "List",
            IconName::BarChart3 => "BarChart3",
            IconName::CheckCircle => "CheckCircle",
            IconName::Send => "Send",
            IconName::Crown => "Crown",
        }
    }
}

impl FromStr for IconName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconName::ALL
            .iter()
            .find(|icon| icon.as_str() == s)
            .copied()
            .ok_or_else(|| CatalogError::UnknownIcon(s.to_string()))
    }
}

impl Display for IconName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One voting category with a fixed, ordered set of candidate options.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Nomination {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: IconName,
    pub options: Vec<String>,
}

impl Nomination {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// The ballot of the local user.
///
/// `selections` maps a nomination id to the chosen option label. Once
/// `submitted` is set, the selections cover the whole catalog and are frozen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BallotState {
    pub selections: BTreeMap<String, String>,
    pub submitted: bool,
}

impl BallotState {
    pub fn empty() -> BallotState {
        BallotState::default()
    }

    pub fn selection(&self, nomination_id: &str) -> Option<&str> {
        self.selections.get(nomination_id).map(|s| s.as_str())
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Severity {
    Normal,
    Destructive,
}

/// A short notification for the user: every submission and every rejected
/// intent produces one.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(title: &str, description: &str, severity: Severity) -> Notice {
        Notice {
            title: title.to_string(),
            description: description.to_string(),
            severity,
        }
    }

    pub fn submitted() -> Notice {
        Notice::new("Спасибо за участие! 🎉", "Ваш голос учтен", Severity::Normal)
    }

    pub fn not_persisted() -> Notice {
        Notice::new(
            "Голос учтен, но не сохранен",
            "Не удалось сохранить голос на этом устройстве",
            Severity::Destructive,
        )
    }
}

/// Per-option counts of one nomination, in declaration order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NominationTally {
    pub nomination_id: String,
    pub counts: Vec<(String, u64)>,
}

impl NominationTally {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }
}

/// Counts for the whole catalog, in catalog order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TallyView {
    pub nominations: Vec<NominationTally>,
}

impl TallyView {
    pub fn get(&self, nomination_id: &str) -> Option<&NominationTally> {
        self.nominations
            .iter()
            .find(|nt| nt.nomination_id == nomination_id)
    }
}

// ******** Errors *********

/// Reasons for the store to refuse a user intent.
///
/// None of them is fatal: the ballot is left as it was and the user is told
/// through a `Notice`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotError {
    AlreadySubmitted,
    InvalidSelection {
        nomination_id: String,
        option: String,
    },
    IncompleteBallot {
        missing_count: usize,
    },
    VotingClosed,
}

impl BallotError {
    pub fn notice(&self) -> Notice {
        match self {
            BallotError::AlreadySubmitted => Notice::new(
                "Вы уже проголосовали!",
                "Можно проголосовать только один раз",
                Severity::Destructive,
            ),
            BallotError::InvalidSelection { .. } => Notice::new(
                "Неизвестный вариант",
                "Такой номинации или варианта нет в бюллетене",
                Severity::Destructive,
            ),
            BallotError::IncompleteBallot { missing_count } => Notice::new(
                "Заполните все номинации",
                format!("Осталось выбрать: {}", missing_count).as_str(),
                Severity::Destructive,
            ),
            BallotError::VotingClosed => Notice::new(
                "Голосование завершено",
                "Прием голосов закрыт",
                Severity::Destructive,
            ),
        }
    }
}

impl Error for BallotError {}

impl Display for BallotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotError::AlreadySubmitted => write!(f, "the ballot was already submitted"),
            BallotError::InvalidSelection {
                nomination_id,
                option,
            } => write!(
                f,
                "option {:?} is not declared for nomination {:?}",
                option, nomination_id
            ),
            BallotError::IncompleteBallot { missing_count } => {
                write!(f, "{} nomination(s) still without a choice", missing_count)
            }
            BallotError::VotingClosed => write!(f, "voting is closed"),
        }
    }
}

/// Failure of the durable key-value storage.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StorageError {
    Unavailable(String),
    QuotaExceeded { needed: usize, quota: usize },
    Corrupted(String),
}

impl Error for StorageError {}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StorageError::QuotaExceeded { needed, quota } => {
                write!(f, "storage quota exceeded: {} > {} bytes", needed, quota)
            }
            StorageError::Corrupted(msg) => write!(f, "storage corrupted: {}", msg),
        }
    }
}

/// Errors found while loading a catalog.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CatalogError {
    Empty,
    DuplicateNomination(String),
    NoOptions(String),
    DuplicateOption {
        nomination_id: String,
        option: String,
    },
    UnknownIcon(String),
    Parse(String),
}

impl Error for CatalogError {}

impl Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "the catalog has no nomination"),
            CatalogError::DuplicateNomination(id) => {
                write!(f, "nomination {:?} is declared twice", id)
            }
            CatalogError::NoOptions(id) => write!(f, "nomination {:?} has no option", id),
            CatalogError::DuplicateOption {
                nomination_id,
                option,
            } => write!(
                f,
                "option {:?} is declared twice in nomination {:?}",
                option, nomination_id
            ),
            CatalogError::UnknownIcon(name) => write!(f, "unknown icon {:?}", name),
            CatalogError::Parse(msg) => write!(f, "could not parse the catalog: {}", msg),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyError {
    EmptyRange { min_votes: u64, max_votes: u64 },
    RangeTooLarge { max_votes: u64, limit: u64 },
}

impl Error for TallyError {}

impl Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::EmptyRange {
                min_votes,
                max_votes,
            } => write!(f, "empty vote range {}..={}", min_votes, max_votes),
            TallyError::RangeTooLarge { max_votes, limit } => write!(
                f,
                "maximum vote count {} is above the limit of {}",
                max_votes, limit
            ),
        }
    }
}

// ********* Configuration **********

/// How often the synthetic tally is drawn.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TallyMode {
    /// Drawn once per session, then served from cache.
    Stable,
    /// Drawn again on every request, so the displayed counts move between
    /// refreshes.
    Jitter,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TallyRules {
    pub mode: TallyMode,
    pub min_votes: u64,
    pub max_votes: u64,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        mode: TallyMode::Stable,
        min_votes: 50,
        max_votes: 199,
    };

    /// Upper bound for `max_votes`. The totals of a nomination are sums of
    /// counts and must fit in a `u64`.
    pub const MAX_VOTES_LIMIT: u64 = u32::MAX as u64;

    pub fn new(mode: TallyMode, min_votes: u64, max_votes: u64) -> Result<TallyRules, TallyError> {
        if min_votes > max_votes {
            return Err(TallyError::EmptyRange {
                min_votes,
                max_votes,
            });
        }
        if max_votes > TallyRules::MAX_VOTES_LIMIT {
            return Err(TallyError::RangeTooLarge {
                max_votes,
                limit: TallyRules::MAX_VOTES_LIMIT,
            });
        }
        Ok(TallyRules {
            mode,
            min_votes,
            max_votes,
        })
    }
}

/// The storage key holding the submitted ballot.
pub const BALLOT_KEY: &str = "userVotes";

/// End of the voting period, in local time.
pub fn default_deadline() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MIN)
}
