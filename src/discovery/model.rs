//! Health check records read from Biz-Ops and the file_sd document built from them

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;
use url::Url;

/// GraphQL query selecting every health check with its monitoring systems
pub const HEALTHCHECKS_QUERY: &str = r#"{
  Healthchecks {
    code,
    url,
    isLive,
    monitors {
      code
    }
  }
}
"#;

/// Treat an explicit `null` the same as an absent field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level GraphQL response
#[derive(Debug, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub data: HealthcheckData,

    /// GraphQL-level errors reported alongside (or instead of) data
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthcheckData {
    #[serde(rename = "Healthchecks", default, deserialize_with = "nullable")]
    pub healthchecks: Vec<Healthcheck>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphQlErrorMessage {
    #[serde(default)]
    pub message: String,
}

/// One monitored endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Healthcheck {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub url: String,

    #[serde(rename = "isLive", default)]
    pub is_live: bool,

    /// Systems that monitor this health check, in registry order
    #[serde(rename = "monitors", default, deserialize_with = "nullable")]
    pub systems: Vec<System>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct System {
    #[serde(rename = "code", default)]
    pub code: String,
}

/// Value of the `observe` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Observe {
    Yes,
    No,
}

impl From<bool> for Observe {
    fn from(is_live: bool) -> Self {
        if is_live { Observe::Yes } else { Observe::No }
    }
}

/// Grouping key of a target group, serialized as its `labels` object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LabelKey {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String,
    pub observe: Observe,
}

/// One file_sd entry. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    pub targets: Vec<String>,
    pub labels: LabelKey,
}

/// The full file_sd document, entries in first-seen label order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscoveryDocument {
    groups: Vec<TargetGroup>,
}

/// Accept only absolute URLs written verbatim
///
/// `Url::parse` trims surrounding spaces and strips tab/CR/LF, but the raw
/// string is what lands in the document, so those are rejected up front.
fn check_target_url(raw: &str) -> Result<(), String> {
    if raw
        .chars()
        .any(|c| c.is_ascii_whitespace() || c.is_control())
    {
        return Err("contains whitespace or control characters".to_string());
    }
    Url::parse(raw).map(|_| ()).map_err(|e| e.to_string())
}

impl DiscoveryDocument {
    /// Group health checks by (system, observe), dropping unparseable URLs
    ///
    /// A health check with N systems lands in N groups. One without any
    /// system goes to the group with an empty system label.
    pub fn from_healthchecks(healthchecks: &[Healthcheck]) -> Self {
        let mut grouped: IndexMap<LabelKey, Vec<String>> = IndexMap::new();

        for healthcheck in healthchecks {
            if let Err(e) = check_target_url(&healthcheck.url) {
                error!(
                    event = "ERROR_PARSING_HEALTH_CHECK_URL",
                    code = %healthcheck.code,
                    url = %healthcheck.url,
                    err = %e,
                    "Failed to parse a health check URL from the Biz Ops API."
                );
                continue;
            }

            let observe = Observe::from(healthcheck.is_live);
            let systems: Vec<&str> = if healthcheck.systems.is_empty() {
                vec![""]
            } else {
                healthcheck
                    .systems
                    .iter()
                    .map(|system| system.code.as_str())
                    .collect()
            };

            for system in systems {
                let key = LabelKey {
                    system: system.to_string(),
                    observe,
                };
                grouped
                    .entry(key)
                    .or_default()
                    .push(healthcheck.url.clone());
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(labels, targets)| TargetGroup { targets, labels })
            .collect();

        Self { groups }
    }

    /// True when no group carries a single target
    pub fn has_no_targets(&self) -> bool {
        self.groups.iter().all(|group| group.targets.is_empty())
    }

    pub fn groups(&self) -> &[TargetGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Pretty-printed JSON, two-space indent
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(code: &str, url: &str, is_live: bool, systems: &[&str]) -> Healthcheck {
        Healthcheck {
            code: code.to_string(),
            url: url.to_string(),
            is_live,
            systems: systems
                .iter()
                .map(|s| System {
                    code: s.to_string(),
                })
                .collect(),
        }
    }

    fn as_json(document: &DiscoveryDocument) -> serde_json::Value {
        serde_json::from_slice(&document.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_single_live_healthcheck() {
        let document = DiscoveryDocument::from_healthchecks(&[check(
            "a",
            "https://x.com/__health",
            true,
            &["sys1"],
        )]);

        assert_eq!(
            as_json(&document),
            json!([{
                "targets": ["https://x.com/__health"],
                "labels": { "system": "sys1", "observe": "yes" }
            }])
        );
    }

    #[test]
    fn test_groups_by_system_and_liveness_in_first_seen_order() {
        let document = DiscoveryDocument::from_healthchecks(&[
            check("1", "https://one.com", true, &["sysB"]),
            check("2", "https://two.com", false, &["sysA"]),
            check("3", "https://three.com", true, &["sysB"]),
            check("4", "https://four.com", false, &["sysB"]),
        ]);

        assert_eq!(
            as_json(&document),
            json!([
                {
                    "targets": ["https://one.com", "https://three.com"],
                    "labels": { "system": "sysB", "observe": "yes" }
                },
                {
                    "targets": ["https://two.com"],
                    "labels": { "system": "sysA", "observe": "no" }
                },
                {
                    "targets": ["https://four.com"],
                    "labels": { "system": "sysB", "observe": "no" }
                }
            ])
        );
    }

    #[test]
    fn test_fans_out_to_every_system() {
        let document = DiscoveryDocument::from_healthchecks(&[check(
            "shared",
            "https://shared.com/__gtg",
            true,
            &["sys1", "sys2"],
        )]);

        assert_eq!(document.len(), 2);
        for (group, system) in document.groups().iter().zip(["sys1", "sys2"]) {
            assert_eq!(group.targets, vec!["https://shared.com/__gtg".to_string()]);
            assert_eq!(group.labels.system, system);
            assert_eq!(group.labels.observe, Observe::Yes);
        }
    }

    #[test]
    fn test_no_systems_uses_empty_system_label() {
        let document =
            DiscoveryDocument::from_healthchecks(&[check("lonely", "https://l.com", false, &[])]);

        assert_eq!(
            as_json(&document),
            json!([{
                "targets": ["https://l.com"],
                "labels": { "observe": "no" }
            }])
        );
    }

    #[test]
    fn test_invalid_urls_are_dropped() {
        let document = DiscoveryDocument::from_healthchecks(&[
            check("bad", "not-a-url", true, &["sys1"]),
            check("good", "https://url2.com", false, &["sys2"]),
        ]);

        assert_eq!(
            as_json(&document),
            json!([{
                "targets": ["https://url2.com"],
                "labels": { "system": "sys2", "observe": "no" }
            }])
        );
    }

    #[test]
    fn test_only_invalid_urls_leaves_no_targets() {
        let document =
            DiscoveryDocument::from_healthchecks(&[check("b", "not-a-url", true, &["sys1"])]);
        assert!(document.has_no_targets());
        assert!(document.is_empty());
    }

    #[test]
    fn test_urls_with_whitespace_or_control_characters_are_dropped() {
        let document = DiscoveryDocument::from_healthchecks(&[
            check("lead", " https://x.com/__health", true, &["sys1"]),
            check("trail", "https://x.com/__health ", true, &["sys1"]),
            check("newline", "https://x.com/__he\nalth", true, &["sys1"]),
            check("tab", "https://x.com/__he\talth", true, &["sys1"]),
            check("inner", "https://x.com/__he alth", true, &["sys1"]),
            check("nul", "https://x.com/\u{0}", true, &["sys1"]),
        ]);

        assert!(document.has_no_targets());
    }

    #[test]
    fn test_whitespace_check_keeps_clean_urls() {
        let document = DiscoveryDocument::from_healthchecks(&[
            check("bad", "https://x.com/ ", true, &["sys1"]),
            check("good", "https://x.com/__health?a=b%20c", true, &["sys1"]),
        ]);

        assert_eq!(
            document.groups()[0].targets,
            vec!["https://x.com/__health?a=b%20c".to_string()]
        );
    }

    #[test]
    fn test_duplicate_urls_are_kept() {
        let document = DiscoveryDocument::from_healthchecks(&[
            check("1", "https://dup.com", true, &["s"]),
            check("2", "https://dup.com", true, &["s"]),
        ]);
        assert_eq!(document.groups()[0].targets.len(), 2);
    }

    #[test]
    fn test_serialized_field_order_is_stable() {
        let document =
            DiscoveryDocument::from_healthchecks(&[check("a", "https://a.com", true, &["s"])]);
        let text = String::from_utf8(document.to_json().unwrap()).unwrap();

        let targets_at = text.find("\"targets\"").unwrap();
        let labels_at = text.find("\"labels\"").unwrap();
        assert!(targets_at < labels_at);
        assert!(text.find("\"system\"").unwrap() < text.find("\"observe\"").unwrap());
        assert!(text.starts_with("[\n  {\n    \"targets\""));
    }

    #[test]
    fn test_response_decoding_tolerates_missing_and_null_fields() {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": {
                "Healthchecks": [
                    { "code": "a", "url": "https://a.com", "isLive": true, "monitors": [{ "code": "s" }] },
                    { "code": "b", "url": "https://b.com", "monitors": null },
                    { "code": "c", "url": "https://c.com" }
                ]
            }
        }))
        .unwrap();

        let checks = response.data.healthchecks;
        assert_eq!(checks.len(), 3);
        assert!(checks[0].is_live);
        assert_eq!(checks[0].systems[0].code, "s");
        assert!(!checks[1].is_live);
        assert!(checks[1].systems.is_empty());
        assert!(checks[2].systems.is_empty());

        let empty: GraphQlResponse =
            serde_json::from_value(json!({ "data": null, "errors": [{ "message": "boom" }] }))
                .unwrap();
        assert!(empty.data.healthchecks.is_empty());
        assert_eq!(empty.errors[0].message, "boom");
    }
}
