//! Per-schema redaction policies
//!
//! A [`SchemaPolicy`] maps a topic name to the ordered list of
//! [`RedactionRule`]s that apply to its records. The table is built once at
//! startup and shared read-only by the pipeline.
//!
//! # Built-in schemas
//!
//! | Topic | Rules |
//! |---|---|
//! | `cmssw_pop_raw_metric` | hash `data.user_dn` |
//! | `condor_raw_metric` | noop `data.User`, noop `data.CRAB_UserHN` |
//! | `xrootd_raw_metric` | noop `data.user_dn`, noop `data.client_host` |
//! | `quota_raw_metric` | noop `data.user` |
//! | `archive_raw_metric` | noop `data.owner` |
//!
//! `noop` rules name PII-bearing fields for which no redaction has been
//! decided yet. They are kept in the table so the gap stays visible and
//! enumerable through [`SchemaPolicy::placeholder_rules`].

use super::config::AnonymizationConfig;
use super::record::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// CMSSW file-access popularity records
pub const CMSSW_POP_TOPIC: &str = "cmssw_pop_raw_metric";
/// HTCondor job records
pub const CONDOR_TOPIC: &str = "condor_raw_metric";
/// XRootD transfer records
pub const XROOTD_TOPIC: &str = "xrootd_raw_metric";
/// Storage quota records
pub const QUOTA_TOPIC: &str = "quota_raw_metric";
/// Tape archive records
pub const ARCHIVE_TOPIC: &str = "archive_raw_metric";

/// How a rule transforms its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Replace the string value with its digest
    Hash,
    /// Remove the field
    Drop,
    /// Known PII field without an implemented redaction; left untouched
    Noop,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Hash => write!(f, "hash"),
            Transform::Drop => write!(f, "drop"),
            Transform::Noop => write!(f, "noop"),
        }
    }
}

/// A (field path, transform) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRule {
    /// Field inside the record's `data` section
    pub path: FieldPath,
    /// Transform applied to it
    pub transform: Transform,
}

impl RedactionRule {
    /// Create a rule
    pub fn new(path: FieldPath, transform: Transform) -> Self {
        Self { path, transform }
    }

    /// Hash the field at `path`
    pub fn hash(path: &'static str) -> Self {
        Self::new(FieldPath::from_static(path), Transform::Hash)
    }

    /// Drop the field at `path`
    pub fn drop_field(path: &'static str) -> Self {
        Self::new(FieldPath::from_static(path), Transform::Drop)
    }

    /// Placeholder for the field at `path`
    pub fn noop(path: &'static str) -> Self {
        Self::new(FieldPath::from_static(path), Transform::Noop)
    }
}

impl fmt::Display for RedactionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.transform, self.path.qualified())
    }
}

/// What to do with records from a topic that has no policy entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTopicPolicy {
    /// Republish unchanged
    #[default]
    PassThrough,
    /// Drop the record
    Reject,
}

impl fmt::Display for UnknownTopicPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownTopicPolicy::PassThrough => write!(f, "pass_through"),
            UnknownTopicPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Outcome of a policy lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision<'a> {
    /// Apply these rules in order
    Apply(&'a [RedactionRule]),
    /// Unknown topic, republish unchanged
    PassThrough,
    /// Unknown topic, drop the record
    Reject,
}

/// Immutable topic → rules table
#[derive(Debug, Clone, Default)]
pub struct SchemaPolicy {
    table: HashMap<String, Vec<RedactionRule>>,
    unknown_topic: UnknownTopicPolicy,
    schema_override: Option<String>,
}

impl SchemaPolicy {
    /// Empty table; every topic is unknown
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table seeded with the built-in schemas
    pub fn builtin() -> Self {
        Self::empty()
            .register(CMSSW_POP_TOPIC, vec![RedactionRule::hash("user_dn")])
            .register(
                CONDOR_TOPIC,
                vec![RedactionRule::noop("User"), RedactionRule::noop("CRAB_UserHN")],
            )
            .register(
                XROOTD_TOPIC,
                vec![
                    RedactionRule::noop("user_dn"),
                    RedactionRule::noop("client_host"),
                ],
            )
            .register(QUOTA_TOPIC, vec![RedactionRule::noop("user")])
            .register(ARCHIVE_TOPIC, vec![RedactionRule::noop("owner")])
    }

    /// Built-in table configured from the anonymization settings
    pub fn from_config(config: &AnonymizationConfig) -> Self {
        Self::builtin()
            .with_unknown_topic(config.unknown_topic)
            .with_schema_override(config.schema_override.clone())
    }

    /// Add or replace the rules for `topic`
    pub fn register(mut self, topic: impl Into<String>, rules: Vec<RedactionRule>) -> Self {
        self.table.insert(topic.into(), rules);
        self
    }

    /// Set the handling of unknown topics
    pub fn with_unknown_topic(mut self, unknown_topic: UnknownTopicPolicy) -> Self {
        self.unknown_topic = unknown_topic;
        self
    }

    /// Look up rules under `schema` instead of the message topic
    pub fn with_schema_override(mut self, schema: Option<String>) -> Self {
        self.schema_override = schema.filter(|s| !s.trim().is_empty());
        self
    }

    /// Handling of unknown topics
    pub fn unknown_topic(&self) -> UnknownTopicPolicy {
        self.unknown_topic
    }

    /// Schema override, if any
    pub fn schema_override(&self) -> Option<&str> {
        self.schema_override.as_deref()
    }

    /// Key used to look up a message from `topic`
    pub fn schema_key<'a>(&'a self, topic: &'a str) -> &'a str {
        self.schema_override.as_deref().unwrap_or(topic)
    }

    /// Rules applied to messages from `topic`, honouring the schema override
    pub fn rules_for(&self, topic: &str) -> &[RedactionRule] {
        self.rules_for_schema(self.schema_key(topic))
    }

    /// Rules registered under `schema` itself, ignoring the override
    ///
    /// Empty if nothing is registered under that name.
    pub fn rules_for_schema(&self, schema: &str) -> &[RedactionRule] {
        self.table.get(schema).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Decide how to handle a message from `topic`
    pub fn lookup(&self, topic: &str) -> PolicyDecision<'_> {
        match self.table.get(self.schema_key(topic)) {
            Some(rules) => PolicyDecision::Apply(rules),
            None => match self.unknown_topic {
                UnknownTopicPolicy::PassThrough => PolicyDecision::PassThrough,
                UnknownTopicPolicy::Reject => PolicyDecision::Reject,
            },
        }
    }

    /// Whether `topic` has an entry
    pub fn is_known(&self, topic: &str) -> bool {
        self.table.contains_key(self.schema_key(topic))
    }

    /// Registered topic names, sorted
    pub fn known_topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self.table.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }

    /// All `noop` rules with their topic, sorted by topic
    pub fn placeholder_rules(&self) -> Vec<(&str, &RedactionRule)> {
        let mut placeholders = Vec::new();
        for topic in self.known_topics() {
            for rule in self.rules_for_schema(topic) {
                if rule.transform == Transform::Noop {
                    placeholders.push((topic, rule));
                }
            }
        }
        placeholders
    }
}
