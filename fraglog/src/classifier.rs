//! Turns one log line into a timestamp and an [`Event`].
//!
//! Lines look like `DD/MM/YYYY HH:MM:SS - <event>`. Anything that does not
//! carry that prefix is [`Classified::Ignored`]; a prefixed line whose event
//! text matches none of the known patterns becomes [`Event::Unknown`].
//! Classification never fails.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}) - (.+)$").expect("line pattern")
});

// Tried in this order, the first match wins.
static MATCH_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"New match (\d+) has started").expect("match start pattern"));
static MATCH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Match (\d+) has ended").expect("match end pattern"));
static WORLD_KILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<WORLD> killed (.+) by (.+)").expect("world kill pattern"));
static PLAYER_KILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+) killed (.+) using (.+)").expect("player kill pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MatchStart {
        match_id: String,
    },
    MatchEnd {
        match_id: String,
    },
    WorldKill {
        victim: String,
        weapon: String,
    },
    PlayerKill {
        killer: String,
        victim: String,
        weapon: String,
    },
    /// Event text that fit none of the patterns.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Ignored,
    Event {
        timestamp: NaiveDateTime,
        event: Event,
    },
}

pub fn classify(line: &str) -> Classified {
    let captures = match LINE.captures(line) {
        Some(c) => c,
        None => return Classified::Ignored,
    };

    // The grammar accepts things like 31/02/2019, those are not timestamps either.
    let timestamp = match NaiveDateTime::parse_from_str(&captures[1], TIMESTAMP_FORMAT) {
        Ok(t) => t,
        Err(_) => return Classified::Ignored,
    };

    Classified::Event {
        timestamp,
        event: parse_event(&captures[2]),
    }
}

pub fn parse_event(text: &str) -> Event {
    if let Some(c) = MATCH_START.captures(text) {
        return Event::MatchStart {
            match_id: c[1].to_owned(),
        };
    }

    if let Some(c) = MATCH_END.captures(text) {
        return Event::MatchEnd {
            match_id: c[1].to_owned(),
        };
    }

    if let Some(c) = WORLD_KILL.captures(text) {
        if !is_blank(&c[1]) {
            return Event::WorldKill {
                victim: c[1].to_owned(),
                weapon: c[2].to_owned(),
            };
        }
    } else if let Some(c) = PLAYER_KILL.captures(text) {
        if !is_blank(&c[1]) && !is_blank(&c[2]) {
            return Event::PlayerKill {
                killer: c[1].to_owned(),
                victim: c[2].to_owned(),
                weapon: c[3].to_owned(),
            };
        }
    }

    Event::Unknown(text.to_owned())
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}
