//! Daily chat message log.
//!
//! Messages relayed by the plugin are kept in one plain-text file per local
//! date, `<dir>/YYYY-MM-DD.txt`, one message per line:
//!
//! ```text
//! [14:03:12] [qq_to_game] Steve: hello from QQ
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::format::printable;

/// Number of days `recent` looks back.
const RECENT_WINDOW_DAYS: u64 = 7;

/// Longest range `statistics` will scan.
pub const MAX_STATS_DAYS: u32 = 365;

/// Which way a message travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    QqToGame,
    #[default]
    GameToQq,
    WebuiToGame,
    WebuiToQq,
    Console,
    Unknown,
}

impl Serialize for Direction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Direction::from_label(&label))
    }
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::QqToGame,
        Direction::GameToQq,
        Direction::WebuiToGame,
        Direction::WebuiToQq,
        Direction::Console,
        Direction::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::QqToGame => "qq_to_game",
            Direction::GameToQq => "game_to_qq",
            Direction::WebuiToGame => "webui_to_game",
            Direction::WebuiToQq => "webui_to_qq",
            Direction::Console => "console",
            Direction::Unknown => "unknown",
        }
    }

    /// Parse a stored label; anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == label)
            .unwrap_or(Direction::Unknown)
    }
}

fn default_message_type() -> String {
    "chat".to_string()
}

/// A single relayed chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unix seconds.
    pub timestamp: i64,
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_message_type", rename = "type")]
    pub message_type: String,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, content: impl Into<String>, direction: Direction) -> Self {
        Self {
            timestamp: Local::now().timestamp(),
            sender: sender.into(),
            content: content.into(),
            direction,
            message_type: default_message_type(),
        }
    }

    fn local_time(&self) -> DateTime<Local> {
        DateTime::from_timestamp(self.timestamp, 0)
            .map(|utc| utc.with_timezone(&Local))
            .unwrap_or_else(Local::now)
    }

    /// `HH:MM:SS` in local time.
    pub fn time_label(&self) -> String {
        self.local_time().format("%H:%M:%S").to_string()
    }
}

/// Counts over a range of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStats {
    pub total_messages: usize,
    /// Messages per `YYYY-MM-DD`, including empty days.
    pub daily_stats: BTreeMap<String, usize>,
    pub direction_stats: BTreeMap<String, usize>,
    /// Messages per hour of day, `"00"` to `"23"`.
    pub hourly_stats: BTreeMap<String, usize>,
}

impl MessageStats {
    fn empty() -> Self {
        Self {
            total_messages: 0,
            daily_stats: BTreeMap::new(),
            direction_stats: Direction::ALL
                .iter()
                .map(|d| (d.as_str().to_string(), 0))
                .collect(),
            hourly_stats: (0..24).map(|h| (format!("{:02}", h), 0)).collect(),
        }
    }
}

/// Reader and writer for the daily message files.
#[derive(Debug, Clone)]
pub struct MessageLog {
    dir: PathBuf,
}

impl MessageLog {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.txt", date.format("%Y-%m-%d")))
    }

    /// Append a message to the file of its local date.
    pub fn append(&self, message: &ChatMessage) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let time = message.local_time();
        let path = self.file_for(time.date_naive());
        let line = format!(
            "[{}] [{}] {}: {}",
            time.format("%H:%M:%S"),
            message.direction.as_str(),
            sender_field(&message.sender),
            printable(&message.content),
        );

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;
        debug!(path = %path.display(), direction = message.direction.as_str(), "Logged message");
        Ok(())
    }

    /// Up to `limit` messages from the last seven days, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ChatMessage> {
        self.recent_as_of(Local::now().date_naive(), limit)
    }

    pub fn recent_as_of(&self, today: NaiveDate, limit: usize) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        if limit == 0 {
            return messages;
        }

        for offset in 0..RECENT_WINDOW_DAYS {
            let Some(date) = today.checked_sub_days(Days::new(offset)) else {
                break;
            };
            let Ok(content) = fs::read_to_string(self.file_for(date)) else {
                continue;
            };
            for line in content.lines().rev().filter(|l| !l.trim().is_empty()) {
                match parse_line(date, line) {
                    Some(message) => {
                        messages.push(message);
                        if messages.len() >= limit {
                            return messages;
                        }
                    }
                    None => warn!(date = %date, line, "Skipping unparsable message line"),
                }
            }
        }
        messages
    }

    /// Counts for the `days` days ending today, clamped to
    /// `1..=MAX_STATS_DAYS`.
    pub fn statistics(&self, days: u32) -> MessageStats {
        self.statistics_as_of(Local::now().date_naive(), days)
    }

    pub fn statistics_as_of(&self, today: NaiveDate, days: u32) -> MessageStats {
        let mut stats = MessageStats::empty();
        for offset in (0..u64::from(days.clamp(1, MAX_STATS_DAYS))).rev() {
            let Some(date) = today.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            let content = fs::read_to_string(self.file_for(date)).unwrap_or_default();
            let mut daily = 0;
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                daily += 1;
                let direction = match parse_line(date, line) {
                    Some(message) => {
                        let hour = message.local_time().format("%H").to_string();
                        *stats.hourly_stats.entry(hour).or_default() += 1;
                        message.direction
                    }
                    None => Direction::Unknown,
                };
                *stats
                    .direction_stats
                    .entry(direction.as_str().to_string())
                    .or_default() += 1;
            }
            stats.total_messages += daily;
            stats
                .daily_stats
                .insert(date.format("%Y-%m-%d").to_string(), daily);
        }
        stats
    }
}

/// The sender as stored on a line. A `": "` inside the name would be read
/// back as the start of the content, so it loses its space.
fn sender_field(sender: &str) -> String {
    printable(sender).replace(": ", ":")
}

/// Parse `[HH:MM:SS] [direction] sender: content` for a message on `date`.
fn parse_line(date: NaiveDate, line: &str) -> Option<ChatMessage> {
    let (time, rest) = line.strip_prefix('[')?.split_once("] ")?;
    let (direction, rest) = rest.strip_prefix('[')?.split_once("] ")?;
    let (sender, content) = rest.split_once(": ")?;

    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;
    let local = Local
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()?;

    Some(ChatMessage {
        timestamp: local.timestamp(),
        sender: sender.trim().to_string(),
        content: content.trim().to_string(),
        direction: Direction::from_label(direction),
        message_type: default_message_type(),
    })
}
