use crate::rng::BattleRng;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::{Builder, Uuid};

pub const CMI5_CATEGORY: &str = "https://w3id.org/xapi/cmi5/context/categories/cmi5";
pub const SESSION_ID_EXTENSION: &str = "https://w3id.org/xapi/cmi5/context/extensions/sessionid";
pub const PROGRESS_EXTENSION: &str = "https://w3id.org/xapi/cmi5/result/extensions/progress";
pub const STARTER_EXTENSION: &str = "https://scadamon.training/xapi/extensions/starter";
pub const INTERACTION_TYPE: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";
pub const BADGE_TYPE: &str = "https://scadamon.training/xapi/badge";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Initialized,
    Launched,
    Progressed,
    Answered,
    Passed,
    Failed,
    Completed,
    Terminated,
    Earned,
}

impl Verb {
    pub fn name(self) -> &'static str {
        match self {
            Verb::Initialized => "initialized",
            Verb::Launched => "launched",
            Verb::Progressed => "progressed",
            Verb::Answered => "answered",
            Verb::Passed => "passed",
            Verb::Failed => "failed",
            Verb::Completed => "completed",
            Verb::Terminated => "terminated",
            Verb::Earned => "earned",
        }
    }

    pub fn iri(self) -> String {
        format!("http://adlnet.gov/expapi/verbs/{}", self.name())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbRef {
    pub id: String,
    pub display: BTreeMap<String, String>,
}

impl VerbRef {
    pub fn new(verb: Verb, display: &str) -> Self {
        Self {
            id: verb.iri(),
            display: en_us(display),
        }
    }
}

impl From<Verb> for VerbRef {
    fn from(verb: Verb) -> Self {
        VerbRef::new(verb, verb.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<BTreeMap<String, String>>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<ActivityDefinition>,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: "Activity".to_string(),
            definition: None,
        }
    }

    pub fn question(activity_id: &str, question_id: &str) -> Self {
        Self {
            definition: Some(ActivityDefinition {
                name: None,
                kind: INTERACTION_TYPE.to_string(),
            }),
            ..Self::new(format!("{}/questions/{}", activity_id, question_id))
        }
    }

    /// `https://scadamon.training/badges/<badge-with-dashes>`
    pub fn badge(badge: &str) -> Self {
        let slug = badge
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        Self {
            definition: Some(ActivityDefinition {
                name: Some(en_us(badge)),
                kind: BADGE_TYPE.to_string(),
            }),
            ..Self::new(format!("https://scadamon.training/badges/{}", slug))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextActivities {
    pub category: Vec<CategoryRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    pub context_activities: ContextActivities,
    pub extensions: BTreeMap<String, Value>,
}

impl StatementContext {
    pub fn cmi5(registration: Option<String>, session_id: &str) -> Self {
        let mut extensions = BTreeMap::new();
        extensions.insert(
            SESSION_ID_EXTENSION.to_string(),
            Value::String(session_id.to_string()),
        );
        Self {
            registration,
            context_activities: ContextActivities {
                category: vec![CategoryRef {
                    id: CMI5_CATEGORY.to_string(),
                }],
            },
            extensions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub scaled: f64,
    pub raw: u8,
    pub min: u8,
    pub max: u8,
}

impl Score {
    pub fn percent(raw: u8) -> Self {
        Self {
            scaled: raw as f64 / 100.0,
            raw,
            min: 0,
            max: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

impl StatementResult {
    pub fn with_extension(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.to_string(), value.into());
        self
    }

    pub fn progress(percent: u8) -> Self {
        Self::default().with_extension(PROGRESS_EXTENSION, percent)
    }
}

/// One xAPI statement as posted to a learning record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: String,
    pub actor: Value,
    pub verb: VerbRef,
    pub object: Activity,
    pub context: StatementContext,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatementResult>,
}

impl Statement {
    pub fn verb_name(&self) -> Option<&str> {
        self.verb.id.rsplit('/').next()
    }
}

/// Parts of a statement a caller chooses; the session fills in the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementParts {
    pub verb: VerbRef,
    pub object: Option<Activity>,
    pub result: Option<StatementResult>,
}

impl StatementParts {
    pub fn new(verb: impl Into<VerbRef>) -> Self {
        Self {
            verb: verb.into(),
            object: None,
            result: None,
        }
    }

    pub fn object(mut self, object: Activity) -> Self {
        self.object = Some(object);
        self
    }

    pub fn result(mut self, result: StatementResult) -> Self {
        self.result = Some(result);
        self
    }
}

fn en_us(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("en-US".to_string(), text.to_string());
    map
}

/// ISO 8601 duration: `PT`, hours if any, minutes if any, then seconds always.
pub fn format_duration(elapsed: TimeDelta) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;

    let mut duration = String::from("PT");
    if hours > 0 {
        duration.push_str(&format!("{}H", hours));
    }
    if minutes % 60 > 0 {
        duration.push_str(&format!("{}M", minutes % 60));
    }
    duration.push_str(&format!("{}S", seconds % 60));
    duration
}

/// Version 4 UUID with its random bits drawn from `rng`.
pub fn random_uuid(rng: &mut BattleRng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes, "uuid");
    Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, "PT0S")]
    #[case(59, "PT59S")]
    #[case(60, "PT1M0S")]
    #[case(3600, "PT1H0S")]
    #[case(3725, "PT1H2M5S")]
    fn test_format_duration(#[case] seconds: i64, #[case] expected: &str) {
        assert_eq!(format_duration(TimeDelta::seconds(seconds)), expected);
    }

    #[test]
    fn test_uuid_is_version_four() {
        let mut rng = BattleRng::seeded(7);
        let id = random_uuid(&mut rng);
        assert_eq!(id.get_version_num(), 4);
        assert_eq!(id.get_variant(), uuid::Variant::RFC4122);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_scripted_rng_gives_repeatable_uuids() {
        let first = random_uuid(&mut BattleRng::new_for_test(vec![17, 42, 99]));
        let second = random_uuid(&mut BattleRng::new_for_test(vec![17, 42, 99]));
        assert_eq!(first, second);
        assert_ne!(first, random_uuid(&mut BattleRng::new_for_test(vec![18])));
    }

    #[test]
    fn test_badge_activity_slug() {
        let activity = Activity::badge("Foundation  Badge");
        assert_eq!(activity.id, "https://scadamon.training/badges/foundation-badge");
        let definition = activity.definition.unwrap();
        assert_eq!(definition.kind, BADGE_TYPE);
        assert_eq!(definition.name.unwrap()["en-US"], "Foundation  Badge");
    }

    #[test]
    fn test_result_serializes_only_present_fields() {
        let json = serde_json::to_value(StatementResult::progress(40)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "extensions": { PROGRESS_EXTENSION: 40 } })
        );
    }
}
