//! Party record data structure.

use serde::{Deserialize, Serialize};

/// An image attached to a party application, usually a logo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmblemImage {
    /// Absolute URL of the image
    pub url: String,

    /// Alt text from the page (may be empty)
    pub description: String,
}

/// One party application block from the registry page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyRecord {
    /// Name the party is known by after this application
    pub current_name: String,

    /// Name before a rename, if the application is a rename
    pub previous_name: Option<String>,

    /// UK nation or region the application applies to
    pub region: Option<String>,

    /// Other names and descriptions listed for the party
    pub aliases: Vec<String>,

    /// Emblems in order of first appearance, unique by URL
    pub emblem_images: Vec<EmblemImage>,

    /// The application restates its own heading as the proposed name
    pub is_new_registration: bool,
}

/// The announceable event a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyEvent<'a> {
    /// First-time registration
    Registered,
    /// Rename from an earlier name
    Renamed { from: &'a str },
}

impl PartyRecord {
    /// Create a record with only a name; no event, no extras.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            current_name: name.into(),
            previous_name: None,
            region: None,
            aliases: Vec::new(),
            emblem_images: Vec::new(),
            is_new_registration: false,
        }
    }

    /// The event this record represents, if any.
    ///
    /// A rename takes precedence; extraction never sets both.
    pub fn event(&self) -> Option<PartyEvent<'_>> {
        match (&self.previous_name, self.is_new_registration) {
            (Some(from), _) => Some(PartyEvent::Renamed {
                from: from.as_str(),
            }),
            (None, true) => Some(PartyEvent::Registered),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        let plain = PartyRecord::named("Foo");
        assert_eq!(plain.event(), None);

        let mut new_party = PartyRecord::named("Foo");
        new_party.is_new_registration = true;
        assert_eq!(new_party.event(), Some(PartyEvent::Registered));

        let mut renamed = PartyRecord::named("Bar");
        renamed.previous_name = Some("Foo".to_string());
        assert_eq!(renamed.event(), Some(PartyEvent::Renamed { from: "Foo" }));
    }
}
