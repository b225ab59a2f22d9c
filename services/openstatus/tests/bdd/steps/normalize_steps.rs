//! BDD step definitions for assertion target normalization

use cucumber::{given, then, when};

use openstatus::{parse_desired_state, AssertionTarget, OpenstatusError};

use crate::world::OpenstatusWorld;

fn document_with_assertion(kind: &str, compare: &str, target: &str) -> String {
    format!(
        r#"
web:
  name: Web
  frequency: 10m
  kind: http
  request:
    url: https://web.test
  assertions:
    - kind: {kind}
      compare: {compare}
      target: {target}
"#
    )
}

#[given(regex = r"^a desired state document with a status code target (.+)$")]
fn status_code_document(world: &mut OpenstatusWorld, target: String) {
    world.document = Some(document_with_assertion("statusCode", "eq", &target));
}

#[given(regex = r"^a desired state document with a body target (.+)$")]
fn body_document(world: &mut OpenstatusWorld, target: String) {
    world.document = Some(document_with_assertion("textBody", "contains", &target));
}

#[when("I parse the desired state")]
fn parse_document(world: &mut OpenstatusWorld) {
    let document = world.document.as_deref().expect("document should be set");
    world.parsed = Some(parse_desired_state(document));
}

#[then(expr = "the status code target is the integer {int}")]
fn status_code_is(world: &mut OpenstatusWorld, code: i64) {
    match world.parsed.as_ref().expect("document should be parsed") {
        Ok(desired) => {
            assert_eq!(
                desired["web"].assertions[0].target,
                AssertionTarget::Numeric(code)
            );
        }
        Err(e) => panic!("expected the document to parse, got {}", e),
    }
}

#[then("parsing fails with a configuration error")]
fn parsing_fails(world: &mut OpenstatusWorld) {
    match world.parsed.as_ref().expect("document should be parsed") {
        Err(OpenstatusError::Config(_)) => {}
        other => panic!("expected a configuration error, got {:?}", other),
    }
}
