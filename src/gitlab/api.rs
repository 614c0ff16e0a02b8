//! `api` group: forward an arbitrary verb / endpoint / body to the server.

use serde_json::Value;

use super::{Body, GitLab, Response, TransportError, present, reject};

/// `data` is a JSON document. With `form` truthy it must be an object and
/// is sent form-encoded. `token`, when given, replaces the default token for
/// this request only.
pub fn execute(
    api: &GitLab,
    method: Option<&str>,
    endpoint: Option<&str>,
    data: Option<&str>,
    form: Option<&str>,
    token: Option<&str>,
) -> Result<Response, TransportError> {
    let (Some(method), Some(endpoint)) = (present(method), present(endpoint)) else {
        return reject("Method and endpoint are required");
    };
    let body = match present(data) {
        None => None,
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) if form_requested(form) => match form_fields(value) {
                Some(fields) => Some(Body::Form(fields)),
                None => return reject("Form data must be a flat JSON object"),
            },
            Ok(value) => Some(Body::Json(value)),
            Err(e) => return reject(&format!("Data is not valid JSON: {e}")),
        },
    };
    api.call_as(method, endpoint, body, present(token))
}

fn form_requested(flag: Option<&str>) -> bool {
    present(flag).is_some_and(|f| {
        matches!(
            f.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    })
}

/// Scalars become strings; nested arrays/objects are not representable.
fn form_fields(value: Value) -> Option<Vec<(String, String)>> {
    let Value::Object(map) = value else {
        return None;
    };
    map.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            Value::Number(n) => Some((k, n.to_string())),
            Value::Bool(b) => Some((k, b.to_string())),
            Value::Null => Some((k, String::new())),
            Value::Array(_) | Value::Object(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::testing::recording_client;
    use serde_json::json;

    #[test]
    fn forwards_json_body_with_override_token() {
        let (api, sent) = recording_client();
        execute(
            &api,
            Some("post"),
            Some("projects"),
            Some(r#"{"name":"x"}"#),
            None,
            Some("user-token"),
        )
        .unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].token, "user-token");
        assert_eq!(reqs[0].body, Some(Body::Json(json!({"name": "x"}))));
        assert!(!reqs[0].form);
    }

    #[test]
    fn form_mode_flattens_object() {
        let (api, sent) = recording_client();
        execute(
            &api,
            Some("POST"),
            Some("projects"),
            Some(r#"{"name":"x","count":2}"#),
            Some("true"),
            None,
        )
        .unwrap();
        let reqs = sent.borrow();
        assert!(reqs[0].form);
        assert_eq!(
            reqs[0].body,
            Some(Body::Form(vec![
                ("count".into(), "2".into()),
                ("name".into(), "x".into())
            ]))
        );
    }

    #[test]
    fn bad_input_is_reported_locally() {
        let (api, sent) = recording_client();
        assert!(execute(&api, None, Some("x"), None, None, None).unwrap().is_local());
        let resp = execute(&api, Some("POST"), Some("x"), Some("{oops"), None, None).unwrap();
        assert!(resp.json().unwrap()["error"].as_str().unwrap().starts_with("Data is not valid JSON"));
        let resp = execute(&api, Some("POST"), Some("x"), Some("[1]"), Some("1"), None).unwrap();
        assert!(resp.is_local());
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn unsupported_verb_passes_through_transport_rules() {
        let (api, sent) = recording_client();
        let resp = execute(&api, Some("PATCH"), Some("users/1"), None, None, None).unwrap();
        assert_eq!(resp.body, crate::gitlab::METHOD_NOT_SUPPORTED);
        assert!(sent.borrow().is_empty());
    }
}
