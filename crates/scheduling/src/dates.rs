//! Spoken date resolution
//!
//! Callers of the booking tools say things like "demain" or "lundi
//! prochain". This module turns those phrases into calendar dates. ISO
//! dates pass through unchanged; anything unrecognized is returned as-is so
//! the caller can ask for clarification instead of guessing.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Result of resolving a spoken date phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateResolution {
    Resolved(NaiveDate),
    /// The phrase was not understood; carries the original input
    Unrecognized(String),
}

impl DateResolution {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Resolved(date) => Some(*date),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Resolve a spoken date phrase relative to `today`.
///
/// Supported forms, in French and English:
/// - ISO dates ("2026-08-10")
/// - today / tomorrow / day after tomorrow
/// - a weekday name, meaning its first strictly future occurrence
/// - a weekday name with a next/"prochain" modifier, pushing the match one
///   further week out
pub fn resolve_spoken_date(input: &str, today: NaiveDate) -> DateResolution {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DateResolution::Unrecognized(input.to_string());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return DateResolution::Resolved(date);
    }

    let normalized = trimmed.to_lowercase().replace('\u{2019}', "'");

    match normalized.as_str() {
        "aujourd'hui" | "today" => return DateResolution::Resolved(today),
        "demain" | "tomorrow" => {
            return DateResolution::Resolved(today + Duration::days(1));
        }
        "apres-demain" | "après-demain" | "day after tomorrow" => {
            return DateResolution::Resolved(today + Duration::days(2));
        }
        _ => {}
    }

    let mut next_week = false;
    let mut weekday: Option<Weekday> = None;

    for token in normalized.split_whitespace() {
        match token {
            // Filler words in common phrasings ("le lundi", "ce lundi",
            // "day after tomorrow" is handled above)
            "le" | "ce" | "on" => {}
            "prochain" | "prochaine" | "next" => next_week = true,
            other => match weekday_from_name(other) {
                Some(day) if weekday.is_none() => weekday = Some(day),
                _ => return DateResolution::Unrecognized(input.to_string()),
            },
        }
    }

    match weekday {
        Some(target) => {
            let mut days_ahead = days_until_next(today, target);
            if next_week {
                days_ahead += 7;
            }
            DateResolution::Resolved(today + Duration::days(days_ahead))
        }
        None => DateResolution::Unrecognized(input.to_string()),
    }
}

/// Days from `today` to the first strictly future occurrence of `target`
/// (1..=7; a weekday named on its own day means next week's).
fn days_until_next(today: NaiveDate, target: Weekday) -> i64 {
    let today_index = today.weekday().num_days_from_monday() as i64;
    let target_index = target.num_days_from_monday() as i64;
    let delta = (target_index - today_index).rem_euclid(7);
    if delta == 0 {
        7
    } else {
        delta
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "lundi" | "monday" => Some(Weekday::Mon),
        "mardi" | "tuesday" => Some(Weekday::Tue),
        "mercredi" | "wednesday" => Some(Weekday::Wed),
        "jeudi" | "thursday" => Some(Weekday::Thu),
        "vendredi" | "friday" => Some(Weekday::Fri),
        "samedi" | "saturday" => Some(Weekday::Sat),
        "dimanche" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        // 2026-08-05 is a Wednesday
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(
            resolve_spoken_date("2026-08-10", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap())
        );
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(
            resolve_spoken_date("aujourd'hui", wednesday()),
            DateResolution::Resolved(wednesday())
        );
        assert_eq!(
            resolve_spoken_date("Demain", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap())
        );
        assert_eq!(
            resolve_spoken_date("après-demain", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
        );
        assert_eq!(
            resolve_spoken_date("day after tomorrow", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
        );
    }

    #[test]
    fn test_bare_weekday_is_first_future_occurrence() {
        // Next Monday after Wednesday 2026-08-05 is 2026-08-10 (5 days out).
        assert_eq!(
            resolve_spoken_date("lundi", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap())
        );
        // Same weekday as today rolls a full week.
        assert_eq!(
            resolve_spoken_date("mercredi", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 12).unwrap())
        );
    }

    #[test]
    fn test_next_modifier_adds_a_week() {
        // "lundi prochain" from a Wednesday lands more than 7 days out.
        let resolved = resolve_spoken_date("lundi prochain", wednesday());
        assert_eq!(
            resolved,
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 17).unwrap())
        );
        let date = resolved.date().unwrap();
        assert!((date - wednesday()).num_days() > 7);

        assert_eq!(
            resolve_spoken_date("next friday", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 14).unwrap())
        );
    }

    #[test]
    fn test_filler_words_ignored() {
        assert_eq!(
            resolve_spoken_date("ce samedi", wednesday()),
            DateResolution::Resolved(NaiveDate::from_ymd_opt(2026, 8, 8).unwrap())
        );
    }

    #[test]
    fn test_unrecognized_is_returned_verbatim() {
        assert_eq!(
            resolve_spoken_date("la semaine des quatre jeudis", wednesday()),
            DateResolution::Unrecognized("la semaine des quatre jeudis".to_string())
        );
        assert_eq!(
            resolve_spoken_date("", wednesday()),
            DateResolution::Unrecognized("".to_string())
        );
    }
}
