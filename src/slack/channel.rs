//! Route error reports to Slack channels by project.
//!
//! Routing is fixed at startup: an optional `project:channel` mapping plus a
//! default channel for everything else.

use crate::report::payload::ProjectId;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Slack refers to channels by their underlying ID, which can be found in the
/// UI by copying a link to the channel.
///
/// ```
/// let id = ChannelId("C0123456789".into());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Format without the surrounding newtype wrapper.
impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps project identifiers to the channel their reports are posted to.
pub type ChannelMap = HashMap<ProjectId, ChannelId>;

/// Why a mapping string was rejected. Carries the offending entry verbatim.
#[derive(Debug, PartialEq, Eq)]
pub enum ChannelMapError {
    MissingDelimiter(String),
    EmptyProject(String),
    EmptyChannel(String),
    DuplicateProject(String),
}

impl fmt::Display for ChannelMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            ChannelMapError::MissingDelimiter(e) => {
                format!("Invalid mapping pair, expected `project:channel`: {:?}", e)
            }
            ChannelMapError::EmptyProject(e) => format!("Empty project in mapping pair: {:?}", e),
            ChannelMapError::EmptyChannel(e) => format!("Empty channel in mapping pair: {:?}", e),
            ChannelMapError::DuplicateProject(p) => format!("Duplicate project in mapping: {}", p),
        };

        write!(f, "{}", x)
    }
}

const LIST_DELIMITER: char = ',';
const PAIR_DELIMITER: char = ':';

/// Parse a mapping such as `proj-a:C111, proj-b:C222`.
///
/// Pairs are split on the first `:`, so channel values may themselves contain
/// colons. A blank string is an empty map. Any bad entry fails the whole
/// parse; a partial map would silently misroute alerts.
pub fn parse_channel_map(raw: &str) -> Result<ChannelMap, ChannelMapError> {
    let mut map = ChannelMap::new();

    if raw.trim().is_empty() {
        return Ok(map);
    }

    for pair in raw.split(LIST_DELIMITER) {
        let (project, channel) = pair
            .split_once(PAIR_DELIMITER)
            .ok_or_else(|| ChannelMapError::MissingDelimiter(pair.to_owned()))?;

        let (project, channel) = (project.trim(), channel.trim());

        if project.is_empty() {
            return Err(ChannelMapError::EmptyProject(pair.to_owned()));
        }
        if channel.is_empty() {
            return Err(ChannelMapError::EmptyChannel(pair.to_owned()));
        }

        let prev = map.insert(
            ProjectId(project.to_owned()),
            ChannelId(channel.to_owned()),
        );
        if prev.is_some() {
            return Err(ChannelMapError::DuplicateProject(project.to_owned()));
        }
    }

    Ok(map)
}

/// Read-only routing table consulted once per report.
#[derive(Debug)]
pub struct ChannelRouting {
    map: ChannelMap,
    default: ChannelId,
}

impl ChannelRouting {
    /// The default channel must be non-empty; [crate::config] refuses to
    /// start otherwise.
    pub fn new(map: ChannelMap, default: ChannelId) -> Self {
        ChannelRouting { map, default }
    }

    /// The channel for `project`, falling back to the default.
    pub fn resolve(&self, project: &ProjectId) -> &ChannelId {
        self.map.get(project).unwrap_or(&self.default)
    }

    pub fn default_channel(&self) -> &ChannelId {
        &self.default
    }

    pub fn mapped_projects(&self) -> usize {
        self.map.len()
    }
}
