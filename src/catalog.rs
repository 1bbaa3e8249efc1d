//! News topic catalog.
//!
//! Closed list of the topics the news feed publishes, each paired with a
//! display colour. Used to keep clients from querying topics that no source
//! will ever own. Carries no protocol behaviour.

use std::fmt;

use crate::topic::Topic;

/// RGB display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsTopic {
    Business,
    Gaming,
    Entertainment,
    General,
    Music,
    Science,
    Sport,
    Technology,
}

impl NewsTopic {
    pub const ALL: [NewsTopic; 8] = [
        NewsTopic::Business,
        NewsTopic::Gaming,
        NewsTopic::Entertainment,
        NewsTopic::General,
        NewsTopic::Music,
        NewsTopic::Science,
        NewsTopic::Sport,
        NewsTopic::Technology,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            NewsTopic::Business => "business",
            NewsTopic::Gaming => "gaming",
            NewsTopic::Entertainment => "entertainment",
            NewsTopic::General => "general",
            NewsTopic::Music => "music",
            NewsTopic::Science => "science-and-nature",
            NewsTopic::Sport => "sport",
            NewsTopic::Technology => "technology",
        }
    }

    pub fn topic(&self) -> Topic {
        Topic::new(self.code())
    }

    pub fn colour(&self) -> Colour {
        match self {
            NewsTopic::Business => Colour::from_hex(0x3686FF),
            NewsTopic::Gaming => Colour::from_hex(0x6CEF86),
            NewsTopic::Entertainment => Colour::from_hex(0xEF68B9),
            NewsTopic::General => Colour::from_hex(0xA8B6AC),
            NewsTopic::Music => Colour::from_hex(0xD5BB22),
            NewsTopic::Science => Colour::from_hex(0x20D1C3),
            NewsTopic::Sport => Colour::rgb(255, 0, 6),
            NewsTopic::Technology => Colour::from_hex(0x41C720),
        }
    }

    /// Catalog entry for a topic, if the topic is in the catalog.
    pub fn from_topic(topic: &Topic) -> Option<NewsTopic> {
        Self::ALL.into_iter().find(|nt| nt.code() == topic.code())
    }
}

/// Colour associated with a topic, or `None` if the topic is not catalogued.
pub fn colour_from_topic(topic: &Topic) -> Option<Colour> {
    NewsTopic::from_topic(topic).map(|nt| nt.colour())
}
