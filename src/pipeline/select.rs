//! Announcement selection.
//!
//! Decides which extracted records are announceable and renders their
//! message text. Selection is lazy: a record is committed to state only when
//! the consumer asks for the next announcement, and it is committed before it
//! is handed out, so a publish that fails or never finishes is not repeated on
//! the next run.

use crate::error::Result;
use crate::models::{AnnounceConfig, EmblemImage, OrderPolicy, PartyEvent, PartyRecord};
use crate::storage::{StateLedger, StateStore};

/// Limits applied while selecting and rendering.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub order: OrderPolicy,
    /// Alias lines are added only while the message stays under this many characters
    pub alias_cap: usize,
    /// Maximum attachments per announcement
    pub emblem_cap: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from(&AnnounceConfig::default())
    }
}

impl From<&AnnounceConfig> for SelectionPolicy {
    fn from(config: &AnnounceConfig) -> Self {
        Self {
            order: config.order,
            alias_cap: config.alias_cap,
            emblem_cap: config.emblem_cap,
        }
    }
}

/// A record ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub record: PartyRecord,
    pub message: String,
    /// Leading emblems, at most `emblem_cap`
    pub attachments: Vec<EmblemImage>,
}

/// Why a record was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotNewOrRenamed,
    AlreadyAnnounced,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotNewOrRenamed => write!(f, "not new or changed name"),
            SkipReason::AlreadyAnnounced => write!(f, "already announced"),
        }
    }
}

/// Lazy iterator over announceable records.
pub struct Selection<'a, S: StateStore> {
    records: std::vec::IntoIter<PartyRecord>,
    ledger: &'a mut StateLedger<S>,
    policy: SelectionPolicy,
}

/// Select announceable records in policy order.
///
/// Records arrive in page order. Each yielded announcement has already been
/// marked as announced in `ledger`.
pub fn select_and_render<'a, S: StateStore>(
    mut records: Vec<PartyRecord>,
    ledger: &'a mut StateLedger<S>,
    policy: &SelectionPolicy,
) -> Selection<'a, S> {
    if policy.order == OrderPolicy::OldestFirst {
        records.reverse();
    }
    Selection {
        records: records.into_iter(),
        ledger,
        policy: policy.clone(),
    }
}

impl<S: StateStore> Selection<'_, S> {
    fn skip_reason(&self, record: &PartyRecord) -> Option<SkipReason> {
        if record.event().is_none() {
            Some(SkipReason::NotNewOrRenamed)
        } else if self.ledger.is_announced(&record.current_name) {
            Some(SkipReason::AlreadyAnnounced)
        } else {
            None
        }
    }
}

impl<S: StateStore> Iterator for Selection<'_, S> {
    type Item = Result<Announcement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.next()?;
            if let Some(reason) = self.skip_reason(&record) {
                log::info!("Skipping '{}': {}", record.current_name, reason);
                continue;
            }

            if let Err(e) = self.ledger.mark_announced(&record.current_name) {
                return Some(Err(e));
            }

            let Some(message) = render_message(&record, self.policy.alias_cap) else {
                continue;
            };
            let attachments = record
                .emblem_images
                .iter()
                .take(self.policy.emblem_cap)
                .cloned()
                .collect();

            return Some(Ok(Announcement {
                record,
                message,
                attachments,
            }));
        }
    }
}

/// Render the announcement text for a record, or `None` if it carries no event.
///
/// Aliases are appended in order while the message stays shorter than
/// `alias_cap` characters; the first alias that does not fit ends the list.
pub fn render_message(record: &PartyRecord, alias_cap: usize) -> Option<String> {
    let mut message = match record.event()? {
        PartyEvent::Renamed { from } => {
            format!("Party renamed: {} are now '{}'", from, record.current_name)
        }
        PartyEvent::Registered => format!("New party started: {}", record.current_name),
    };

    if !record.aliases.is_empty() {
        message.push_str("\n\nAKA:");
        let mut length = message.chars().count();

        for alias in &record.aliases {
            let line = format!("\n• \"{alias}\"");
            let line_length = line.chars().count();
            if length + line_length >= alias_cap {
                break;
            }
            message.push_str(&line);
            length += line_length;
        }
    }

    Some(message)
}
