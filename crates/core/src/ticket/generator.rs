//! Random ticket generation.
//!
//! Randomness is always supplied by the caller, so a seeded RNG gives a
//! reproducible ticket stream.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rand::Rng;
use regex_lite::{Captures, Regex};

use super::templates::{candidates_for, templates_for};
use super::{Category, Priority, Ticket, TicketId};
use crate::config::Difficulty;
use crate::metrics::TICKETS_GENERATED;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Hard mode draws from this table instead of `Priority::ALL`, which
/// doubles the odds of the two shortest countdowns.
const HARD_PRIORITIES: [Priority; 6] = [
    Priority::Minor,
    Priority::Medium,
    Priority::Major,
    Priority::Major,
    Priority::Critical,
    Priority::Critical,
];

/// Builds tickets from the template tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketGenerator {
    difficulty: Difficulty,
}

impl TicketGenerator {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Generate a ticket with the given id.
    pub fn generate<R: Rng + ?Sized>(&self, id: TicketId, rng: &mut R) -> Ticket {
        let category = *pick(rng, &Category::ALL);
        let priority = match self.difficulty {
            Difficulty::Normal => *pick(rng, &Priority::ALL),
            Difficulty::Hard => *pick(rng, &HARD_PRIORITIES),
        };
        let description = self.describe(category, rng);

        TICKETS_GENERATED
            .with_label_values(&[category.as_str(), priority.as_str()])
            .inc();

        Ticket::new(id, description, category, priority)
    }

    /// Pick a template for `category` and fill it.
    pub fn describe<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> String {
        let template = *pick(rng, templates_for(category));
        fill_template(template, category, rng)
    }
}

/// Replace every `{token}` in `template` with a random candidate.
///
/// Each distinct token is drawn once, so a token repeated in a template gets
/// the same value everywhere. Tokens without candidates are rendered as
/// `[token]`. The first letter of the result is upper-cased.
pub fn fill_template<R: Rng + ?Sized>(template: &str, category: Category, rng: &mut R) -> String {
    let mut values: HashMap<&str, &'static str> = HashMap::new();
    for caps in TOKEN_RE.captures_iter(template) {
        let Some(token) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if values.contains_key(token) {
            continue;
        }
        if let Some(candidates) = candidates_for(token, category) {
            values.insert(token, *pick(rng, candidates));
        }
    }

    let filled = TOKEN_RE.replace_all(template, |caps: &Captures<'_>| {
        let token = &caps[1];
        match values.get(token) {
            Some(value) => (*value).to_string(),
            None => format!("[{}]", token),
        }
    });

    capitalize_first(&filled)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}
