use serde::{Deserialize, Serialize};

/// The four regions the site and portal localize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    Ca,
    Ae,
    Us,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Global, Region::Ca, Region::Ae, Region::Us];

    pub const fn as_str(self) -> &'static str {
        match self {
            Region::Global => "global",
            Region::Ca => "ca",
            Region::Ae => "ae",
            Region::Us => "us",
        }
    }

    /// Canonical path prefix; `global` is served unprefixed.
    pub const fn path_prefix(self) -> &'static str {
        match self {
            Region::Global => "",
            Region::Ca => "/ca",
            Region::Ae => "/ae",
            Region::Us => "/us",
        }
    }

    /// Strict parse of a stored value (cookie, database column).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "global" => Some(Region::Global),
            "ca" => Some(Region::Ca),
            "ae" => Some(Region::Ae),
            "us" => Some(Region::Us),
            _ => None,
        }
    }

    /// Region for the first path segment, accepting the `uae`/`usa` aliases.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "ca" => Some(Region::Ca),
            "ae" | "uae" => Some(Region::Ae),
            "us" | "usa" => Some(Region::Us),
            _ => None,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a loose, user-supplied spelling onto a region. Total: anything
/// unrecognized is `Global`.
pub fn normalize_locale_param(value: &str) -> Region {
    let cleaned = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
    match cleaned.as_str() {
        "ca" | "can" | "canada" | "en-ca" | "fr-ca" => Region::Ca,
        "ae" | "uae" | "dubai" | "abu-dhabi" | "emirates" | "united-arab-emirates" | "en-ae"
        | "ar-ae" => Region::Ae,
        "us" | "usa" | "america" | "united-states" | "united-states-of-america" | "en-us" => {
            Region::Us
        }
        _ => Region::Global,
    }
}

/// Region hinted by an `Accept-Language` header. Tags are checked in the order
/// the client sent them; the first one that maps to a region wins.
pub fn region_from_accept_language(header: &str) -> Option<Region> {
    header
        .split(',')
        .filter_map(|part| part.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .find_map(region_for_language_tag)
}

fn region_for_language_tag(tag: &str) -> Option<Region> {
    match tag.replace('_', "-").to_ascii_lowercase().as_str() {
        "en-ca" | "fr-ca" => Some(Region::Ca),
        "en-ae" | "ar-ae" | "en-gb" => Some(Region::Ae),
        "en-us" => Some(Region::Us),
        _ => None,
    }
}
