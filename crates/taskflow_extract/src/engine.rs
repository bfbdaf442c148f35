use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::{Regex, RegexSet};

use taskflow_core::{Category, Priority, Source, Task};

use crate::mode::ExtractMode;

// Category order doubles as the tie-break order when scores are equal.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Work,
        &[
            "meeting",
            "call",
            "email",
            "message",
            "contact",
            "project",
            "deadline",
            "client",
            "presentation",
            "report",
            "conference",
            "office",
            "work",
        ],
    ),
    (
        Category::Personal,
        &[
            "home",
            "family",
            "personal",
            "clean",
            "organize",
            "birthday",
            "anniversary",
            "friend",
        ],
    ),
    (
        Category::Health,
        &[
            "doctor",
            "dentist",
            "gym",
            "exercise",
            "medicine",
            "appointment",
            "health",
            "fitness",
            "workout",
        ],
    ),
    (
        Category::Learning,
        &[
            "learn",
            "study",
            "read",
            "course",
            "book",
            "tutorial",
            "practice",
            "skill",
            "education",
        ],
    ),
    (
        Category::Shopping,
        &[
            "buy",
            "purchase",
            "store",
            "shop",
            "get",
            "order",
            "groceries",
            "online",
        ],
    ),
    (
        Category::Finance,
        &["pay", "bank", "money", "finance", "bill", "tax"],
    ),
    (
        Category::Travel,
        &["travel", "flight", "hotel", "vacation", "trip"],
    ),
];

const HIGH_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "important",
    "critical",
    "deadline",
    "immediately",
    "priority",
];

const LOW_KEYWORDS: &[&str] = &[
    "later",
    "sometime",
    "maybe",
    "consider",
    "eventually",
];

fn keyword_set(keywords: &[&str]) -> RegexSet {
    let patterns: Vec<String> = keywords
        .iter()
        .map(|kw| format!(r"(?i)\b{kw}\b"))
        .collect();
    RegexSet::new(patterns).expect("keyword patterns are static and valid")
}

fn category_matchers() -> &'static Vec<(Category, RegexSet)> {
    static MATCHERS: OnceLock<Vec<(Category, RegexSet)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| (*category, keyword_set(keywords)))
            .collect()
    })
}

fn high_matcher() -> &'static RegexSet {
    static MATCHER: OnceLock<RegexSet> = OnceLock::new();
    MATCHER.get_or_init(|| keyword_set(HIGH_KEYWORDS))
}

fn low_matcher() -> &'static RegexSet {
    static MATCHER: OnceLock<RegexSet> = OnceLock::new();
    MATCHER.get_or_init(|| keyword_set(LOW_KEYWORDS))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-•*]\s*").expect("static pattern"))
}

fn numbering_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("static pattern"))
}

fn date_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(today|tomorrow|next week|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        )
        .expect("static pattern")
    })
}

/// Turns free text into tasks, one per usable line. `today` anchors the
/// relative due-date phrases so callers (and tests) control the clock.
pub fn extract(text: &str, mode: ExtractMode, today: NaiveDate) -> Vec<Task> {
    text.lines()
        .filter_map(|line| extract_line(line, mode, today))
        .collect()
}

fn extract_line(line: &str, mode: ExtractMode, today: NaiveDate) -> Option<Task> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped = bullet_re().replace(trimmed, "");
    let stripped = numbering_re().replace(&stripped, "");
    let title = stripped.trim();
    if title.chars().count() < 3 {
        return None;
    }

    let mut task = Task::new(title)
        .with_category(categorize(title, mode))
        .with_priority(prioritize(title))
        .with_source(Source::Extracted);
    if let Some(due) = due_date(title, today) {
        task = task.with_due_date(due);
    }
    Some(task)
}

fn categorize(title: &str, mode: ExtractMode) -> Category {
    let mut best: Option<(Category, usize)> = None;
    for (category, set) in category_matchers() {
        let score = set.matches(title).iter().count();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((*category, score));
        }
    }
    match best {
        Some((category, _)) => category,
        None if mode == ExtractMode::Email => Category::Work,
        None => Category::Other,
    }
}

fn prioritize(title: &str) -> Priority {
    if high_matcher().is_match(title) {
        Priority::High
    } else if low_matcher().is_match(title) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

fn due_date(title: &str, today: NaiveDate) -> Option<NaiveDate> {
    let found = date_phrase_re().find(title)?;
    let phrase = found.as_str().to_ascii_lowercase();
    match phrase.as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "next week" => today.checked_add_days(Days::new(7)),
        weekday => weekday
            .parse::<Weekday>()
            .ok()
            .map(|target| next_occurrence(today, target)),
    }
}

/// Next calendar date falling on `target`, strictly after `today`.
fn next_occurrence(today: NaiveDate, target: Weekday) -> NaiveDate {
    let delta = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let days = if delta == 0 { 7 } else { delta } as u64;
    today.checked_add_days(Days::new(days)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        // 2025-06-11 is a Wednesday
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn extract_one(line: &str) -> Task {
        let tasks = extract(line, ExtractMode::General, wednesday());
        assert_eq!(tasks.len(), 1);
        tasks.into_iter().next().unwrap()
    }

    #[test]
    fn test_strips_bullet_prefixes() {
        assert_eq!(extract_one("- buy milk").title, "buy milk");
        assert_eq!(extract_one("• buy milk").title, "buy milk");
        assert_eq!(extract_one("* buy milk").title, "buy milk");
        assert_eq!(extract_one("3. buy milk").title, "buy milk");
    }

    #[test]
    fn test_drops_blank_and_tiny_lines() {
        let text = "\n  \n- ok\nbuy milk\n";
        let tasks = extract(text, ExtractMode::General, wednesday());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "buy milk");
    }

    #[test]
    fn test_one_task_per_line() {
        let text = "buy milk\ncall the doctor\nread a book";
        let tasks = extract(text, ExtractMode::General, wednesday());
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn test_extracted_task_defaults() {
        let task = extract_one("water the plants");
        assert_eq!(task.id.len(), 36);
        assert!(!task.completed);
        assert_eq!(task.source, Some(Source::Extracted));
    }

    #[test]
    fn test_categorize_single_keyword() {
        assert_eq!(extract_one("buy groceries").category, Category::Shopping);
        assert_eq!(extract_one("gym session").category, Category::Health);
        assert_eq!(extract_one("pay the electricity bill").category, Category::Finance);
        assert_eq!(extract_one("plan the vacation").category, Category::Travel);
    }

    #[test]
    fn test_categorize_highest_score_wins() {
        // travel scores 3 (flight, hotel, trip), learning scores 1 (book)
        let task = extract_one("book flight and hotel for the trip");
        assert_eq!(task.category, Category::Travel);
    }

    #[test]
    fn test_categorize_tie_keeps_earlier_category() {
        // work (call) and finance (bank) both score 1; work is listed first
        let task = extract_one("call the bank");
        assert_eq!(task.category, Category::Work);
    }

    #[test]
    fn test_categorize_requires_word_boundary() {
        // "calling" must not match "call", "office" inside "officer" must not match
        let task = extract_one("recalling the festival lineup");
        assert_eq!(task.category, Category::Other);
    }

    #[test]
    fn test_categorize_zero_hits_is_other() {
        assert_eq!(extract_one("water the plants").category, Category::Other);
    }

    #[test]
    fn test_email_mode_defaults_to_work() {
        let tasks = extract("water the plants", ExtractMode::Email, wednesday());
        assert_eq!(tasks[0].category, Category::Work);
    }

    #[test]
    fn test_email_mode_keyword_hits_still_win() {
        let tasks = extract("buy groceries", ExtractMode::Email, wednesday());
        assert_eq!(tasks[0].category, Category::Shopping);
    }

    #[test]
    fn test_priority_high_keywords() {
        assert_eq!(extract_one("URGENT: file the report").priority, Priority::High);
        assert_eq!(extract_one("reply asap").priority, Priority::High);
    }

    #[test]
    fn test_priority_low_keywords() {
        assert_eq!(extract_one("maybe clean the garage").priority, Priority::Low);
    }

    #[test]
    fn test_priority_high_beats_low() {
        let task = extract_one("urgent now, rest can wait until later");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(extract_one("water the plants").priority, Priority::Medium);
    }

    #[test]
    fn test_deadline_is_both_work_and_high() {
        let task = extract_one("hit the deadline");
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_due_today_tomorrow_next_week() {
        let today = wednesday();
        assert_eq!(extract_one("call mom today").due_date, Some(today));
        assert_eq!(
            extract_one("buy milk tomorrow").due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 12).unwrap())
        );
        assert_eq!(
            extract_one("dentist next week").due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 18).unwrap())
        );
    }

    #[test]
    fn test_due_weekday_resolves_to_next_occurrence() {
        // today is Wednesday 2025-06-11
        assert_eq!(
            extract_one("gym on friday").due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 13).unwrap())
        );
        // same weekday as today lands a full week out
        assert_eq!(
            extract_one("standup wednesday").due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 18).unwrap())
        );
        // Monday is behind Wednesday in the week, so it wraps
        assert_eq!(
            extract_one("review monday").due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap())
        );
    }

    #[test]
    fn test_due_leftmost_phrase_wins() {
        let today = wednesday();
        assert_eq!(extract_one("today or tomorrow").due_date, Some(today));
    }

    #[test]
    fn test_due_absent_when_no_phrase() {
        assert!(extract_one("water the plants").due_date.is_none());
    }

    #[test]
    fn test_full_line() {
        let task = extract_one("- Buy groceries tomorrow ASAP");
        assert_eq!(task.title, "Buy groceries tomorrow ASAP");
        assert_eq!(task.category, Category::Shopping);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(
            task.due_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 12).unwrap())
        );
    }
}
