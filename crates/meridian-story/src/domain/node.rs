//! Story nodes, choices and endings.

use serde::{Deserialize, Serialize};

/// Partial resource record. Each field is independently optional; absent
/// fields are left untouched when the patch is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePatch {
    /// Oxygen component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen: Option<i32>,
    /// Power component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<i32>,
    /// Stress component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<i32>,
    /// Trust component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<i32>,
}

impl ResourcePatch {
    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.oxygen.is_none() && self.power.is_none() && self.stress.is_none() && self.trust.is_none()
    }
}

/// Authored resource effect of a node.
///
/// `set` replaces levels outright; `drift` adjusts them relative to their
/// current value. When both are present `set` is applied first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEffect {
    /// Absolute levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<ResourcePatch>,
    /// Relative adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift: Option<ResourcePatch>,
}

/// Connection quality of the link to the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    /// Strong signal.
    Online,
    /// Degraded signal.
    Weak,
    /// No signal.
    Offline,
}

impl SignalStatus {
    /// Label shown in the connection indicator.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "SIGNAL STRONG",
            Self::Weak => "SIGNAL WEAK",
            Self::Offline => "SIGNAL LOST",
        }
    }
}

/// Changes to the contact panel declared by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    /// Display name of the contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Connection status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalStatus>,
}

/// Classification tag of a choice. Drives both presentation styling and the
/// resource deltas applied when the choice is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    /// Cautious advice.
    Safe,
    /// Pressing, time-critical advice.
    Urgent,
    /// Systems-oriented advice.
    Technical,
    /// Emotional support.
    Supportive,
    /// Procedural, by-the-book advice.
    Professional,
    /// Command-style orders.
    Military,
    /// Meta-choice: restart the session.
    Restart,
    /// Meta-choice: produce a save code at an ending.
    SaveCompletion,
    /// Any tag outside the vocabulary.
    #[default]
    #[serde(other)]
    Other,
}

impl ChoiceKind {
    /// The tag as written in story documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Urgent => "urgent",
            Self::Technical => "technical",
            Self::Supportive => "supportive",
            Self::Professional => "professional",
            Self::Military => "military",
            Self::Restart => "restart",
            Self::SaveCompletion => "save_completion",
            Self::Other => "other",
        }
    }

    /// Parses an authored tag. Anything outside the vocabulary is `Other`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "safe" => Self::Safe,
            "urgent" => Self::Urgent,
            "technical" => Self::Technical,
            "supportive" => Self::Supportive,
            "professional" => Self::Professional,
            "military" => Self::Military,
            "restart" => Self::Restart,
            "save_completion" => Self::SaveCompletion,
            _ => Self::Other,
        }
    }
}

/// Side effect attached to a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoiceAction {
    /// Show a system message, then hold narrative delivery.
    Delay {
        /// Message shown while holding; a generic one is used when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Hold length in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
    /// Change the connection indicator.
    SignalChange {
        /// New connection status.
        status: SignalStatus,
    },
    /// Show a one-off system notice.
    SystemMessage {
        /// Notice text.
        message: String,
    },
}

/// A player choice on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChoiceRecord", into = "ChoiceRecord")]
pub struct Choice {
    /// Display text, echoed as the player's message when taken.
    pub text: String,
    /// Classification tag.
    pub kind: ChoiceKind,
    /// Key of the node this choice leads to.
    pub next: Option<String>,
    /// Optional side effect.
    pub action: Option<ChoiceAction>,
    /// Authored tag that fell outside the vocabulary.
    unrecognized_tag: Option<String>,
}

impl Choice {
    /// Creates a choice without an action.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: ChoiceKind, next: Option<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            next,
            action: None,
            unrecognized_tag: None,
        }
    }

    /// The tag as authored. Tags outside the vocabulary keep their spelling
    /// even though they resolve to [`ChoiceKind::Other`].
    #[must_use]
    pub fn tag(&self) -> &str {
        self.unrecognized_tag
            .as_deref()
            .unwrap_or_else(|| self.kind.as_str())
    }
}

/// Wire form of a [`Choice`].
#[derive(Serialize, Deserialize)]
struct ChoiceRecord {
    text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ChoiceAction>,
}

impl From<ChoiceRecord> for Choice {
    fn from(record: ChoiceRecord) -> Self {
        let kind = record
            .tag
            .as_deref()
            .map_or(ChoiceKind::Other, ChoiceKind::from_tag);
        let unrecognized_tag = record
            .tag
            .filter(|tag| kind == ChoiceKind::Other && tag.as_str() != kind.as_str());
        Self {
            text: record.text,
            kind,
            next: record.next,
            action: record.action,
            unrecognized_tag,
        }
    }
}

impl From<Choice> for ChoiceRecord {
    fn from(choice: Choice) -> Self {
        Self {
            tag: Some(choice.tag().to_owned()),
            text: choice.text,
            next: choice.next,
            action: choice.action,
        }
    }
}

/// Authored ending of the narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    /// Ending title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ending summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ending {
    /// Title, or the generic one when the author left it out.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("MISSION COMPLETE")
    }

    /// Message, or the generic one when the author left it out.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("Communication terminated.")
    }

    /// Ending substituted for a node that has neither choices nor an ending.
    #[must_use]
    pub fn implicit() -> Self {
        Self {
            title: Some("TRANSMISSION ENDED".to_owned()),
            message: Some("The channel falls silent. There is nothing more to say.".to_owned()),
        }
    }
}

/// How a node hands control back once its messages are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal<'a> {
    /// The narrative ends here.
    Ending(&'a Ending),
    /// The player picks one of these.
    Choices(&'a [Choice]),
    /// Authoring error: nothing follows.
    DeadEnd,
}

/// One unit of narrative content plus its exit transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    /// Unique node key.
    pub id: String,
    /// Contact panel changes applied on entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactUpdate>,
    /// Messages from the contact, delivered in order.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Resource effect applied once when the node is entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<ResourceEffect>,
    /// Choices offered after the messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Ending reached at this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<Ending>,
}

impl StoryNode {
    /// Creates a node with messages only.
    #[must_use]
    pub fn new(id: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            contact: None,
            messages,
            effects: None,
            choices: Vec::new(),
            ending: None,
        }
    }

    /// Adds choices to the node.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    /// Adds an ending to the node.
    #[must_use]
    pub fn with_ending(mut self, ending: Ending) -> Self {
        self.ending = Some(ending);
        self
    }

    /// Adds a resource effect to the node.
    #[must_use]
    pub fn with_effects(mut self, effects: ResourceEffect) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Resolves the node's terminal instruction. An ending takes precedence
    /// over choices; a node with neither is a dead end.
    #[must_use]
    pub fn terminal(&self) -> Terminal<'_> {
        match (&self.ending, self.choices.is_empty()) {
            (Some(ending), _) => Terminal::Ending(ending),
            (None, false) => Terminal::Choices(&self.choices),
            (None, true) => Terminal::DeadEnd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ending_wins_over_choices() {
        // Arrange
        let node = StoryNode::new("both", vec![])
            .with_choices(vec![Choice::new("Go", ChoiceKind::Safe, Some("next".into()))])
            .with_ending(Ending::default());

        // Act
        let terminal = node.terminal();

        // Assert
        assert!(matches!(terminal, Terminal::Ending(_)));
    }

    #[test]
    fn test_node_without_choices_or_ending_is_dead_end() {
        let node = StoryNode::new("empty", vec!["...".into()]);
        assert_eq!(node.terminal(), Terminal::DeadEnd);
    }

    #[test]
    fn test_unrecognized_tag_parses_as_other() {
        let choice: Choice =
            serde_yaml::from_str("text: Hi\ntype: diplomatic\nnext: a\n").unwrap();
        assert_eq!(choice.kind, ChoiceKind::Other);
    }

    #[test]
    fn test_unrecognized_tag_keeps_its_authored_spelling() {
        // Arrange
        let choice: Choice =
            serde_yaml::from_str("text: Hold on\ntype: emotional\nnext: a\n").unwrap();

        // Act
        let yaml = serde_yaml::to_string(&choice).unwrap();
        let reloaded: Choice = serde_yaml::from_str(&yaml).unwrap();

        // Assert
        assert_eq!(choice.tag(), "emotional");
        assert_eq!(reloaded, choice);
        assert_eq!(reloaded.tag(), "emotional");
    }

    #[test]
    fn test_known_tag_matches_constructed_choice() {
        let parsed: Choice =
            serde_yaml::from_str("text: Go\ntype: urgent\nnext: a\n").unwrap();

        assert_eq!(
            parsed,
            Choice::new("Go", ChoiceKind::Urgent, Some("a".into()))
        );
        assert_eq!(parsed.tag(), "urgent");
    }

    #[test]
    fn test_missing_tag_defaults_to_other() {
        let choice: Choice = serde_yaml::from_str("text: Hi\nnext: a\n").unwrap();
        assert_eq!(choice.kind, ChoiceKind::Other);
    }

    #[test]
    fn test_delay_action_parses_with_duration() {
        // Arrange
        let yaml = "type: delay\nmessage: Crawling...\nduration: 4000\n";

        // Act
        let action: ChoiceAction = serde_yaml::from_str(yaml).unwrap();

        // Assert
        assert_eq!(
            action,
            ChoiceAction::Delay {
                message: Some("Crawling...".into()),
                duration: Some(4000),
            }
        );
    }

    #[test]
    fn test_ending_defaults() {
        let ending = Ending::default();
        assert_eq!(ending.title(), "MISSION COMPLETE");
        assert_eq!(ending.message(), "Communication terminated.");
    }

    #[test]
    fn test_signal_labels() {
        assert_eq!(SignalStatus::Online.label(), "SIGNAL STRONG");
        assert_eq!(SignalStatus::Weak.label(), "SIGNAL WEAK");
        assert_eq!(SignalStatus::Offline.label(), "SIGNAL LOST");
    }
}
