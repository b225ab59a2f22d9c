//! Assertion target normalization
//!
//! Every decoded assertion passes through here before it is compared
//! against anything. Floats are already truncated when the target is
//! decoded; this pass settles the remaining cross-format cases so that
//! structural equality between desired and locked specs is meaningful:
//!
//! * a status code written as a quoted string (`"200"`) becomes numeric,
//! * a numeric target on a header or body assertion is rejected,
//! * an empty header key reads as no key, and header assertions need one.
//!
//! Normalizing is idempotent.

use crate::error::{OpenstatusError, Result};
use crate::model::{Assertion, AssertionKind, AssertionTarget, MonitorSpec};

/// Normalize assertions in place, failing on a target that cannot match its kind
pub fn normalize_assertions(assertions: &mut [Assertion]) -> Result<()> {
    for (index, assertion) in assertions.iter_mut().enumerate() {
        normalize_assertion(assertion).map_err(|reason| {
            OpenstatusError::Config(format!("assertion {}: {}", index + 1, reason))
        })?;
    }
    Ok(())
}

/// Normalize the assertions of one monitor, naming the monitor on failure
pub fn normalize_monitor(key: &str, spec: &mut MonitorSpec) -> Result<()> {
    normalize_assertions(&mut spec.assertions).map_err(|e| match e {
        OpenstatusError::Config(reason) => {
            OpenstatusError::Config(format!("monitor '{}': {}", key, reason))
        }
        other => other,
    })
}

fn normalize_assertion(assertion: &mut Assertion) -> std::result::Result<(), String> {
    if assertion.key.as_deref() == Some("") {
        assertion.key = None;
    }

    match assertion.kind {
        AssertionKind::StatusCode => {
            if let AssertionTarget::Text(text) = &assertion.target {
                let code = text.trim().parse::<i64>().map_err(|_| {
                    format!("statusCode target must be a number, got {:?}", text)
                })?;
                assertion.target = AssertionTarget::Numeric(code);
            }
        }
        AssertionKind::Header | AssertionKind::TextBody => {
            if let AssertionTarget::Numeric(value) = assertion.target {
                return Err(format!(
                    "{} target must be a string, got number {}",
                    assertion.kind, value
                ));
            }
            if assertion.kind == AssertionKind::Header && assertion.key.is_none() {
                return Err("header assertion needs a key".to_string());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Compare;

    #[test]
    fn numeric_status_code_is_unchanged() {
        let mut assertions = vec![Assertion::status_code(Compare::Eq, 200)];
        normalize_assertions(&mut assertions).unwrap();
        assert_eq!(assertions[0].target, AssertionTarget::Numeric(200));
    }

    #[test]
    fn quoted_status_code_becomes_numeric() {
        let mut assertions = vec![Assertion {
            kind: AssertionKind::StatusCode,
            compare: Compare::Eq,
            target: AssertionTarget::Text("200".to_string()),
            key: None,
        }];
        normalize_assertions(&mut assertions).unwrap();
        assert_eq!(assertions[0], Assertion::status_code(Compare::Eq, 200));
    }

    #[test]
    fn decoded_float_status_equals_integer_literal() {
        let mut decoded: Vec<Assertion> = serde_json::from_str(
            r#"[{"kind":"statusCode","compare":"eq","target":200.0}]"#,
        )
        .unwrap();
        normalize_assertions(&mut decoded).unwrap();
        assert_eq!(decoded, vec![Assertion::status_code(Compare::Eq, 200)]);
    }

    #[test]
    fn non_numeric_status_code_is_a_config_error() {
        let mut assertions = vec![Assertion {
            kind: AssertionKind::StatusCode,
            compare: Compare::Eq,
            target: AssertionTarget::Text("OK".to_string()),
            key: None,
        }];
        let err = normalize_assertions(&mut assertions).unwrap_err();
        assert!(matches!(err, OpenstatusError::Config(_)));
        assert!(err.to_string().contains("assertion 1"), "{err}");
    }

    #[test]
    fn numeric_body_target_is_rejected() {
        let mut assertions = vec![Assertion {
            kind: AssertionKind::TextBody,
            compare: Compare::Contains,
            target: AssertionTarget::Numeric(42),
            key: None,
        }];
        let err = normalize_assertions(&mut assertions).unwrap_err();
        assert!(err.to_string().contains("must be a string"), "{err}");
    }

    #[test]
    fn header_without_key_is_rejected() {
        let mut assertions = vec![Assertion {
            kind: AssertionKind::Header,
            compare: Compare::Eq,
            target: AssertionTarget::Text("gzip".to_string()),
            key: Some(String::new()),
        }];
        assert!(normalize_assertions(&mut assertions).is_err());
    }

    #[test]
    fn empty_key_on_body_assertion_is_dropped() {
        let mut assertions = vec![Assertion {
            key: Some(String::new()),
            ..Assertion::text_body(Compare::Contains, "ok")
        }];
        normalize_assertions(&mut assertions).unwrap();
        assert_eq!(assertions[0], Assertion::text_body(Compare::Contains, "ok"));
    }

    #[test]
    fn normalizing_twice_equals_normalizing_once() {
        let mut once = vec![
            Assertion {
                kind: AssertionKind::StatusCode,
                compare: Compare::Gte,
                target: AssertionTarget::Text(" 204 ".to_string()),
                key: Some(String::new()),
            },
            Assertion::header("Server", Compare::NotEmpty, ""),
        ];
        normalize_assertions(&mut once).unwrap();
        let mut twice = once.clone();
        normalize_assertions(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn monitor_errors_name_the_monitor() {
        let mut spec = MonitorSpec::http("api", "https://api.test");
        spec.assertions.push(Assertion {
            kind: AssertionKind::TextBody,
            compare: Compare::Eq,
            target: AssertionTarget::Numeric(1),
            key: None,
        });
        let err = normalize_monitor("api-check", &mut spec).unwrap_err();
        assert!(err.to_string().contains("monitor 'api-check'"), "{err}");
    }
}
