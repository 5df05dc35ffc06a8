// Text views of the ballot, the catalog and the results.

use nomination_ballot::store::Notifier;
use nomination_ballot::tally::{percentage, rank};
use nomination_ballot::{BallotState, Catalog, IconName, Notice, Severity, TallyView};

pub const PAGE_TITLE: &str = "Народное голосование 2024";
const BAR_WIDTH: u64 = 20;

/// Prints the notices on the standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("{}", format_notice(notice));
    }
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.severity {
        Severity::Normal => format!("{} {}", notice.title, notice.description),
        Severity::Destructive => format!("[!] {}: {}", notice.title, notice.description),
    }
}

fn icon(name: IconName) -> String {
    format!("[{}]", name)
}

pub fn header(countdown: &str) -> String {
    format!(
        "{}\nВыбери лучших из лучших\n{} Осталось: {}\n",
        PAGE_TITLE,
        icon(IconName::Clock),
        countdown
    )
}

/// The voting view: every nomination with its options, the current choice
/// marked.
pub fn ballot_view(catalog: &Catalog, state: &BallotState) -> String {
    let mut out = String::new();
    for nom in catalog.nominations() {
        out.push_str(&format!("\n{} {} ({})\n", icon(nom.icon), nom.title, nom.id));
        out.push_str(&format!("    {}\n", nom.description));
        for (idx, option) in nom.options.iter().enumerate() {
            let mark = if state.selection(&nom.id) == Some(option.as_str()) {
                icon(IconName::CheckCircle)
            } else {
                "   ".to_string()
            };
            out.push_str(&format!("  {} {}. {}\n", mark, idx + 1, option));
        }
    }
    out.push('\n');
    if state.submitted {
        out.push_str(&format!(
            "{} Спасибо за участие! Ваш голос учтен. Результаты доступны по команде `vote results`\n",
            icon(IconName::CheckCircle)
        ));
    } else {
        out.push_str(&format!(
            "Выбрано {} из {}. {} Отправить голос: `vote submit`\n",
            state.selections.len(),
            catalog.len(),
            icon(IconName::Send)
        ));
    }
    out
}

/// The catalog browse view.
pub fn nominations_view(catalog: &Catalog) -> String {
    let mut out = String::new();
    for nom in catalog.nominations() {
        out.push_str(&format!("{} {}\n", icon(nom.icon), nom.title));
        out.push_str(&format!("    {}\n", nom.description));
        out.push_str(&format!("    {}\n", nom.options.join(" · ")));
    }
    out
}

fn bar(pct: u32) -> String {
    let filled = (pct as u64 * BAR_WIDTH + 50) / 100;
    let filled = filled.min(BAR_WIDTH) as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH as usize - filled)
    )
}

/// The results view: each nomination's options by decreasing count, the
/// leader crowned.
pub fn results_view(catalog: &Catalog, tally: &TallyView) -> String {
    let mut out = String::new();
    for nom in catalog.nominations() {
        let (ranked, total) = match (rank(tally, &nom.id), tally.get(&nom.id)) {
            (Some(r), Some(nt)) => (r, nt.total()),
            _ => continue,
        };
        out.push_str(&format!("\n{} {}\n", icon(nom.icon), nom.title));
        out.push_str(&format!("    Всего голосов: {}\n", total));
        for (idx, (option, count)) in ranked.iter().enumerate() {
            let pct = percentage(*count, total);
            let crown = if idx == 0 {
                icon(IconName::Crown)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {:>7} {}  {} ({}%)\n          {}\n",
                crown,
                option,
                count,
                pct,
                bar(pct)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomination_ballot::{ballot, NominationTally};

    #[test]
    fn ballot_marks_selection() {
        let catalog = Catalog::builtin();
        let state = ballot::select_option(&BallotState::empty(), catalog, "3", "Платформа EduTech")
            .unwrap();
        let view = ballot_view(catalog, &state);
        assert!(view.contains("[CheckCircle] 3. Платформа EduTech"));
        assert!(view.contains("Выбрано 1 из 7"));
        assert_eq!(view.matches("[CheckCircle]").count(), 1);
    }

    #[test]
    fn ballot_after_submission() {
        let catalog = Catalog::builtin();
        let mut state = BallotState::empty();
        for nom in catalog.nominations() {
            state = ballot::select_option(&state, catalog, &nom.id, &nom.options[0]).unwrap();
        }
        let state = ballot::submit(&state, catalog).unwrap();
        let view = ballot_view(catalog, &state);
        assert!(view.contains("Спасибо за участие!"));
        assert!(!view.contains("vote submit"));
    }

    #[test]
    fn nominations_lists_everything() {
        let view = nominations_view(Catalog::builtin());
        assert!(view.contains("[Leaf] Экологичный проект"));
        assert!(view.contains("Игра PixelWorld"));
        assert_eq!(view.lines().count(), 21);
    }

    #[test]
    fn results_are_ranked_with_percentages() {
        let catalog = Catalog::builtin();
        let nom = &catalog.nominations()[0];
        let tally = TallyView {
            nominations: vec![NominationTally {
                nomination_id: nom.id.clone(),
                counts: vec![
                    (nom.options[0].clone(), 50),
                    (nom.options[1].clone(), 150),
                    (nom.options[2].clone(), 100),
                    (nom.options[3].clone(), 100),
                ],
            }],
        };
        let view = results_view(catalog, &tally);
        assert!(view.contains("Всего голосов: 400"));
        assert!(view.contains(&format!("[Crown] {}  150 (38%)", nom.options[1])));
        assert!(view.contains(&format!("{}  50 (13%)", nom.options[0])));
        let first = view.find(&nom.options[2]).unwrap();
        let second = view.find(&nom.options[3]).unwrap();
        assert!(first < second);
        // Nominations without counts are skipped.
        assert!(!view.contains(&catalog.nominations()[1].title));
    }

    #[test]
    fn bars() {
        assert_eq!(bar(0), "░".repeat(20));
        assert_eq!(bar(100), "█".repeat(20));
        assert_eq!(bar(50).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn notices() {
        let n = Notice::new("Заполните все номинации", "Осталось выбрать: 2", Severity::Destructive);
        assert_eq!(format_notice(&n), "[!] Заполните все номинации: Осталось выбрать: 2");
        assert_eq!(format_notice(&Notice::submitted()), "Спасибо за участие! 🎉 Ваш голос учтен");
    }
}
