//! The twelve-digit save code.
//!
//! A code is three four-digit fields: the state id of the current node, a
//! digest of the choice history, and the resource bands. It is lossy on
//! purpose. Decoding recovers the node exactly, each resource to its band's
//! multiple of ten, and nothing of the history.

use std::fmt;

use meridian_core::error::DomainError;

use super::resources::ResourceLevels;
use super::rewind::RewindEntry;

/// Code of the start node; unmapped node ids encode to it.
pub const START_STATE_CODE: u16 = 1000;

/// Fixed node id to state code table.
pub const STATE_TABLE: &[(&str, u16)] = &[
    ("start", 1000),
    ("assess_injury", 1001),
    ("rush_to_pods", 1002),
    ("systems_check", 1003),
    ("pod_status_check", 1004),
    ("grab_supplies", 1005),
    ("maintenance_shaft", 1006),
    ("debris_shortcut", 1007),
    ("pod_bay_arrival_safe", 1008),
    ("choose_pod_2", 1009),
    ("successful_escape", 1010),
    ("distress_signal_attempt", 1011),
    ("attempt_pod_3_repair", 1012),
    ("emergency_seal_repair", 1013),
    ("temporary_seal_escape", 1014),
    ("return_to_pod_2", 1015),
    ("manual_override_attempt", 1016),
    ("emergency_launch_pod_2", 1017),
    ("quick_diagnostic", 1018),
    ("final_systems_check", 1019),
    ("immediate_movement", 1020),
    ("find_alternate_route", 1021),
    ("careful_approach", 1022),
    ("boost_signal", 1023),
    ("oxygen_race", 1024),
    ("pod_2_direct", 1025),
    ("investigate_pod_3", 1026),
    ("repair_pod_1", 1027),
    ("test_backup_comm", 1028),
    ("main_corridor_approach", 1029),
    ("utility_tunnels", 1030),
    ("treat_injury_then_pods", 1031),
    ("pods_despite_injury", 1032),
    ("quick_pod_1_fix", 1033),
    ("risky_launch", 1034),
    ("search_for_materials", 1035),
    ("forced_pod_3_choice", 1036),
];

const FIELD_MODULUS: usize = 10_000;
const CODE_DIGITS: usize = 12;

/// State code for a node id.
#[must_use]
pub fn state_code(node_id: &str) -> u16 {
    STATE_TABLE
        .iter()
        .find(|(id, _)| *id == node_id)
        .map_or(START_STATE_CODE, |(_, code)| *code)
}

/// Node id for a state code, if the table has one.
#[must_use]
pub fn node_for_code(code: u16) -> Option<&'static str> {
    STATE_TABLE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(id, _)| *id)
}

/// Digest of the choice history.
#[must_use]
pub fn history_digest(history: &[RewindEntry]) -> u16 {
    let digest = history.iter().fold(0usize, |hash, entry| {
        (hash * 31
            + entry.choice.text.chars().count()
            + entry.choice.tag().len()
            + entry.choice_index)
            % FIELD_MODULUS
    });
    u16::try_from(digest).unwrap_or_default()
}

fn band(value: i32) -> i32 {
    (value / 10).clamp(0, 9)
}

/// Resource bands packed as four decimal digits: oxygen, power, stress,
/// trust.
#[must_use]
pub fn resource_digest(levels: &ResourceLevels) -> u16 {
    let packed = band(levels.oxygen) * 1000
        + band(levels.power) * 100
        + band(levels.stress) * 10
        + band(levels.trust);
    u16::try_from(packed).unwrap_or_default()
}

fn unpack_resources(digest: u16) -> ResourceLevels {
    let digit = |place: u16| i32::from(digest / place % 10) * 10;
    ResourceLevels {
        oxygen: digit(1000),
        power: digit(100),
        stress: digit(10),
        trust: digit(1),
    }
}

/// What a save code restores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSession {
    /// Node to resume at.
    pub node_id: &'static str,
    /// Resources recovered to their band's multiple of ten.
    pub resources: ResourceLevels,
    /// Choices made. Always zero: history is not recoverable.
    pub choices_made: u32,
}

/// A parsed twelve-digit save code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveCode {
    state: u16,
    history: u16,
    resources: u16,
}

impl SaveCode {
    /// Encodes a session position.
    #[must_use]
    pub fn encode(node_id: &str, history: &[RewindEntry], levels: &ResourceLevels) -> Self {
        Self {
            state: state_code(node_id),
            history: history_digest(history),
            resources: resource_digest(levels),
        }
    }

    /// Parses free-form input. Whitespace and dashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormat` unless exactly twelve ASCII
    /// digits remain.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let digits: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if digits.len() != CODE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidFormat(format!(
                "expected {CODE_DIGITS} digits, got {:?}",
                input.trim()
            )));
        }
        let field = |range: std::ops::Range<usize>| {
            digits[range]
                .parse::<u16>()
                .map_err(|e| DomainError::InvalidFormat(e.to_string()))
        };
        Ok(Self {
            state: field(0..4)?,
            history: field(4..8)?,
            resources: field(8..12)?,
        })
    }

    /// Resolves the code against the state table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownState` if the state id is not in the
    /// table.
    pub fn decode(&self) -> Result<DecodedSession, DomainError> {
        let node_id = node_for_code(self.state).ok_or(DomainError::UnknownState(self.state))?;
        Ok(DecodedSession {
            node_id,
            resources: unpack_resources(self.resources),
            choices_made: 0,
        })
    }

    /// State id field.
    #[must_use]
    pub fn state(&self) -> u16 {
        self.state
    }

    /// History digest field.
    #[must_use]
    pub fn history(&self) -> u16 {
        self.history
    }

    /// The resource-band field.
    #[must_use]
    pub fn resources(&self) -> u16 {
        self.resources
    }

    /// The twelve digits without separators.
    #[must_use]
    pub fn digits(&self) -> String {
        format!("{:04}{:04}{:04}", self.state, self.history, self.resources)
    }
}

impl fmt::Display for SaveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:04}-{:04}",
            self.state, self.history, self.resources
        )
    }
}

/// Parses and decodes in one step.
///
/// # Errors
///
/// Returns `DomainError::InvalidFormat` or `DomainError::UnknownState`.
pub fn decode(input: &str) -> Result<DecodedSession, DomainError> {
    SaveCode::parse(input)?.decode()
}
