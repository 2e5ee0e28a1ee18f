//! Main anonymization engine
//!
//! The [`AnonymizationEngine`] owns the immutable policy table and the
//! configured [`HashRedactor`], and applies a topic's rules to a decoded
//! [`Record`].
//!
//! # Examples
//!
//! ```
//! use kafka_anonymizer::anonymization::{codec, AnonymizationEngine, PolicyDecision};
//! use kafka_anonymizer::anonymization::hasher::{redact, HashAlgorithm};
//! use kafka_anonymizer::anonymization::policy::SchemaPolicy;
//!
//! let engine = AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha1);
//! let mut record = codec::decode(br#"{"data": {"user_dn": "CN=Alice"}}"#).unwrap();
//!
//! if let PolicyDecision::Apply(rules) = engine.lookup("cmssw_pop_raw_metric") {
//!     let report = engine.apply(&mut record, rules);
//!     assert_eq!(report.hashed, vec!["data.user_dn".to_string()]);
//! }
//! assert_eq!(
//!     record.data().unwrap()["user_dn"],
//!     redact("CN=Alice", HashAlgorithm::Sha1)
//! );
//! ```

use crate::anonymization::{
    config::AnonymizationConfig,
    hasher::{HashAlgorithm, HashRedactor},
    policy::{PolicyDecision, RedactionRule, SchemaPolicy, Transform},
    record::Record,
    report::RedactionReport,
};
use std::sync::Arc;

/// Applies schema policies to records
///
/// # Thread Safety
///
/// The engine is immutable after construction. Cloning is cheap and shares
/// the policy table.
#[derive(Debug, Clone)]
pub struct AnonymizationEngine {
    policy: Arc<SchemaPolicy>,
    redactor: HashRedactor,
}

impl AnonymizationEngine {
    /// Create an engine from a policy table and digest algorithm
    pub fn new(policy: SchemaPolicy, algorithm: HashAlgorithm) -> Self {
        Self {
            policy: Arc::new(policy),
            redactor: HashRedactor::new(algorithm),
        }
    }

    /// Create an engine with the built-in policies and configured settings
    pub fn from_config(config: &AnonymizationConfig) -> Self {
        Self::new(SchemaPolicy::from_config(config), config.algorithm())
    }

    /// Policy table
    pub fn policy(&self) -> &SchemaPolicy {
        &self.policy
    }

    /// Digest algorithm
    pub fn algorithm(&self) -> HashAlgorithm {
        self.redactor.algorithm()
    }

    /// Decide how to handle a message from `topic`
    pub fn lookup(&self, topic: &str) -> PolicyDecision<'_> {
        self.policy.lookup(topic)
    }

    /// Apply `rules` to `record` in declaration order
    ///
    /// Rules are independent. A rule that cannot be applied is reported and
    /// the remaining rules still run; the envelope is never touched because
    /// rule paths are relative to the `data` section.
    pub fn apply(&self, record: &mut Record, rules: &[RedactionRule]) -> RedactionReport {
        let mut report = RedactionReport::new();

        for rule in rules {
            let path = &rule.path;
            match rule.transform {
                Transform::Hash => {
                    let digest = match record.get_str(path) {
                        Ok(value) => self.redactor.redact(value),
                        Err(e) => {
                            report.add_error(e);
                            continue;
                        }
                    };
                    match record.replace_str(path, digest) {
                        Ok(()) => report.hashed.push(path.qualified()),
                        Err(e) => report.add_error(e),
                    }
                }
                Transform::Drop => match record.remove(path) {
                    Ok(_) => report.dropped.push(path.qualified()),
                    Err(e) => report.add_error(e),
                },
                Transform::Noop => {
                    tracing::debug!(
                        field = %path.qualified(),
                        "Field has no redaction implemented, left unchanged"
                    );
                    report.placeholders.push(path.qualified());
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::codec;
    use crate::anonymization::hasher::redact;
    use crate::anonymization::policy::CMSSW_POP_TOPIC;
    use crate::domain::errors::FieldError;
    use serde_json::{json, Value};

    fn decode(value: Value) -> Record {
        codec::decode(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_hash_rule() {
        let engine = AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha256);
        let mut record = decode(json!({
            "metadata": {"producer": "cmssw", "_id": "x"},
            "data": {"user_dn": "CN=Alice", "site_name": "T2_CH_CERN"}
        }));

        let rules = engine.policy().rules_for(CMSSW_POP_TOPIC);
        let report = engine.apply(&mut record, rules);

        assert_eq!(report.hashed, vec!["data.user_dn".to_string()]);
        assert_eq!(
            Value::from(record),
            json!({
                "metadata": {"producer": "cmssw", "_id": "x"},
                "data": {
                    "user_dn": redact("CN=Alice", HashAlgorithm::Sha256),
                    "site_name": "T2_CH_CERN"
                }
            })
        );
    }

    #[test]
    fn test_rules_are_independent() {
        let policy = SchemaPolicy::empty().register(
            "custom",
            vec![
                RedactionRule::hash("count"),
                RedactionRule::hash("absent"),
                RedactionRule::drop_field("secret"),
                RedactionRule::hash("owner"),
                RedactionRule::noop("host"),
            ],
        );
        let engine = AnonymizationEngine::new(policy, HashAlgorithm::Sha1);
        let mut record = decode(json!({
            "data": {"count": 3, "secret": "s", "owner": "bob", "host": "h1"}
        }));

        let rules = engine.policy().rules_for("custom").to_vec();
        let report = engine.apply(&mut record, &rules);

        assert_eq!(report.hashed, vec!["data.owner".to_string()]);
        assert_eq!(report.dropped, vec!["data.secret".to_string()]);
        assert_eq!(report.placeholders, vec!["data.host".to_string()]);
        assert_eq!(report.missing, vec!["data.absent".to_string()]);
        assert_eq!(
            report.mismatches,
            vec![FieldError::TypeMismatch {
                path: "data.count".to_string(),
                expected: "string",
                found: "number",
            }]
        );
        assert_eq!(
            Value::from(record),
            json!({"data": {"count": 3, "owner": redact("bob", HashAlgorithm::Sha1), "host": "h1"}})
        );
    }

    #[test]
    fn test_missing_field_adds_nothing() {
        let engine = AnonymizationEngine::new(SchemaPolicy::builtin(), HashAlgorithm::Sha1);
        let original = json!({"metadata": {"type": "cmssw"}, "data": {"site_name": "T1"}});
        let mut record = decode(original.clone());

        let report = engine.apply(&mut record, engine.policy().rules_for(CMSSW_POP_TOPIC));

        assert!(report.is_unchanged());
        assert_eq!(report.missing.len(), 1);
        assert_eq!(Value::from(record), original);
    }

    #[test]
    fn test_from_config_uses_algorithm() {
        let config = AnonymizationConfig {
            hash_algorithm: "sha512".to_string(),
            ..AnonymizationConfig::default()
        };
        let engine = AnonymizationEngine::from_config(&config);
        assert_eq!(engine.algorithm(), HashAlgorithm::Sha512);
    }
}
