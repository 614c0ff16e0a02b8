//! `projects` group.

use serde_json::Value;

use super::{Body, GitLab, Response, TransportError, object, present, reject, with_query};

type Outcome = Result<Response, TransportError>;

const DEFAULT_VISIBILITY: &str = "private";

pub fn list_projects(api: &GitLab) -> Outcome {
    api.call("GET", "projects", None)
}

pub fn get_project(api: &GitLab, id: Option<&str>) -> Outcome {
    let Some(id) = present(id) else {
        return reject("Project id is required");
    };
    api.call("GET", &format!("projects/{id}"), None)
}

/// New projects get a README on `main`; visibility defaults to private.
pub fn create_project(
    api: &GitLab,
    name: Option<&str>,
    description: Option<&str>,
    visibility: Option<&str>,
) -> Outcome {
    let Some(name) = present(name) else {
        return reject("Project name is required");
    };
    api.call("POST", "projects", Some(new_project_body(name, description, visibility)))
}

/// Same as [`create_project`] but owned by `user_id` (admin token required).
pub fn create_project_for_user(
    api: &GitLab,
    name: Option<&str>,
    description: Option<&str>,
    user_id: Option<&str>,
    visibility: Option<&str>,
) -> Outcome {
    let Some(name) = present(name) else {
        return reject("Project name is required");
    };
    let Some(user_id) = present(user_id) else {
        return reject("User id is required");
    };
    api.call(
        "POST",
        &format!("projects/user/{user_id}"),
        Some(new_project_body(name, description, visibility)),
    )
}

fn new_project_body(name: &str, description: Option<&str>, visibility: Option<&str>) -> Body {
    let mut data = object(&[("name", Some(name)), ("description", description)]);
    data.insert("initialize_with_readme".into(), Value::from("true"));
    data.insert("default_branch".into(), Value::from("main"));
    data.insert(
        "visibility".into(),
        Value::from(present(visibility).unwrap_or(DEFAULT_VISIBILITY)),
    );
    Body::Json(Value::Object(data))
}

pub fn update_project(
    api: &GitLab,
    id: Option<&str>,
    name: Option<&str>,
    description: Option<&str>,
    visibility: Option<&str>,
) -> Outcome {
    let Some(id) = present(id) else {
        return reject("Project id is required");
    };
    let data = object(&[
        ("name", name),
        ("description", description),
        ("visibility", visibility),
    ]);
    if data.is_empty() {
        return reject("Nothing to update, and request was not sent.");
    }
    api.call(
        "PUT",
        &format!("projects/{id}"),
        Some(Body::Json(Value::Object(data))),
    )
}

pub fn find_projects(api: &GitLab, in_name: Option<&str>, in_description: Option<&str>) -> Outcome {
    let term = match (present(in_name), present(in_description)) {
        (None, None) => return reject("No information provided to search."),
        (Some(_), Some(_)) => {
            return reject("Please provide only one search parameter: name or description.");
        }
        (Some(t), None) | (None, Some(t)) => t,
    };
    api.call("GET", &with_query("projects", &[("search", term)]), None)
}

pub fn delete_project(api: &GitLab, id: Option<&str>) -> Outcome {
    let Some(id) = present(id) else {
        return reject("Project id is required");
    };
    api.call("DELETE", &format!("projects/{id}"), None)
}
