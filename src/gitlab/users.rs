//! `users` group. Listing, lookup and creation need an admin token.

use serde_json::Value;

use super::{Body, GitLab, Response, TransportError, object, present, reject, with_query};

type Outcome = Result<Response, TransportError>;

pub fn list_users(api: &GitLab) -> Outcome {
    api.call("GET", "users", None)
}

pub fn get_user(api: &GitLab, id: Option<&str>) -> Outcome {
    let Some(id) = present(id) else {
        return reject("User id is required");
    };
    api.call("GET", &format!("users/{id}"), None)
}

/// Confirmation e-mail is skipped so the account is usable immediately.
pub fn create_user(
    api: &GitLab,
    username: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Outcome {
    let (Some(username), Some(name), Some(email), Some(password)) = (
        present(username),
        present(name),
        present(email),
        present(password),
    ) else {
        return reject("Required all parameters");
    };
    let mut data = object(&[
        ("username", Some(username)),
        ("name", Some(name)),
        ("email", Some(email)),
        ("password", Some(password)),
    ]);
    data.insert("skip_confirmation".into(), Value::Bool(true));
    api.call("POST", "users", Some(Body::Json(Value::Object(data))))
}

pub fn update_user(
    api: &GitLab,
    id: Option<&str>,
    username: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Outcome {
    let Some(id) = present(id) else {
        return reject("User id is required");
    };
    let data = object(&[
        ("username", username),
        ("name", name),
        ("email", email),
        ("password", password),
    ]);
    if data.is_empty() {
        return reject("Nothing to update, and request was not sent.");
    }
    api.call(
        "PUT",
        &format!("users/{id}"),
        Some(Body::Json(Value::Object(data))),
    )
}

/// GitLab searches username and e-mail through the same `search` key, so
/// only one of them may be given. E-mail searches must carry the full domain.
pub fn find_users(api: &GitLab, in_username: Option<&str>, in_email: Option<&str>) -> Outcome {
    let term = match (present(in_username), present(in_email)) {
        (None, None) => return reject("No information provided to search."),
        (Some(_), Some(_)) => {
            return reject(
                "GitLab cannot search username and email at once, please provide only one search parameter: username or email.",
            );
        }
        (Some(t), None) | (None, Some(t)) => t,
    };
    api.call("GET", &with_query("users", &[("search", term)]), None)
}

pub fn delete_user(api: &GitLab, id: Option<&str>) -> Outcome {
    let Some(id) = present(id) else {
        return reject("User id is required");
    };
    api.call("DELETE", &format!("users/{id}"), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::Method;
    use crate::gitlab::testing::{only_path, recording_client};
    use serde_json::json;

    #[test]
    fn create_user_requires_every_field() {
        let (api, sent) = recording_client();
        let resp = create_user(&api, Some("ada"), Some("Ada"), None, Some("pw")).unwrap();
        assert_eq!(resp.json().unwrap(), json!({"error": "Required all parameters"}));
        let resp = create_user(&api, Some("ada"), Some(""), Some("a@x"), Some("pw")).unwrap();
        assert!(resp.is_local());
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn create_user_posts_full_body() {
        let (api, sent) = recording_client();
        create_user(&api, Some("ada"), Some("Ada L"), Some("a@x.io"), Some("pw")).unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].method, Method::Post);
        assert_eq!(
            reqs[0].body,
            Some(Body::Json(json!({
                "username": "ada",
                "name": "Ada L",
                "email": "a@x.io",
                "password": "pw",
                "skip_confirmation": true
            })))
        );
    }

    #[test]
    fn update_user_sends_only_supplied_fields() {
        let (api, sent) = recording_client();
        update_user(&api, Some("4"), None, Some("New"), Some(""), None).unwrap();
        assert_eq!(only_path(&sent), "/api/v4/users/4");
        assert_eq!(
            sent.borrow()[0].body,
            Some(Body::Json(json!({"name": "New"})))
        );
    }

    #[test]
    fn update_user_with_nothing_is_rejected() {
        let (api, sent) = recording_client();
        let resp = update_user(&api, Some("4"), None, None, None, None).unwrap();
        assert_eq!(
            resp.json().unwrap()["error"],
            "Nothing to update, and request was not sent."
        );
        let resp = update_user(&api, None, Some("x"), None, None, None).unwrap();
        assert_eq!(resp.json().unwrap()["error"], "User id is required");
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn find_users_accepts_exactly_one_term() {
        let (api, sent) = recording_client();
        assert!(find_users(&api, None, None).unwrap().is_local());
        assert!(find_users(&api, Some("a"), Some("b@x")).unwrap().is_local());
        assert!(sent.borrow().is_empty());

        find_users(&api, None, Some("@example.com")).unwrap();
        assert_eq!(only_path(&sent), "/api/v4/users?search=%40example.com");
    }

    #[test]
    fn get_and_delete_need_an_id() {
        let (api, sent) = recording_client();
        assert!(get_user(&api, Some("")).unwrap().is_local());
        assert!(delete_user(&api, None).unwrap().is_local());
        assert!(sent.borrow().is_empty());
        delete_user(&api, Some("9")).unwrap();
        assert_eq!(sent.borrow()[0].method, Method::Delete);
    }
}
