//! `repository` group: tree listing.

use super::{GitLab, Response, TransportError, present, reject, with_query};

const DEFAULT_PER_PAGE: &str = "100";

pub fn get_tree(
    api: &GitLab,
    project_id: Option<&str>,
    per_page: Option<&str>,
    git_ref: Option<&str>,
    path: Option<&str>,
) -> Result<Response, TransportError> {
    let Some(project_id) = present(project_id) else {
        return reject("Project id is required");
    };
    let per_page = present(per_page).unwrap_or(DEFAULT_PER_PAGE);
    if per_page.parse::<u32>().is_err() {
        return reject("per_page must be a number");
    }
    let mut query = vec![("per_page", per_page)];
    if let Some(p) = present(path) {
        query.push(("path", p));
    }
    if let Some(r) = present(git_ref) {
        query.push(("ref", r));
    }
    api.call(
        "GET",
        &with_query(&format!("projects/{project_id}/repository/tree"), &query),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::testing::{only_path, recording_client};

    #[test]
    fn tree_defaults_to_one_hundred_entries() {
        let (api, sent) = recording_client();
        get_tree(&api, Some("8"), None, None, None).unwrap();
        assert_eq!(only_path(&sent), "/api/v4/projects/8/repository/tree?per_page=100");
    }

    #[test]
    fn tree_with_ref_and_path() {
        let (api, sent) = recording_client();
        get_tree(&api, Some("8"), Some("20"), Some("dev"), Some("src")).unwrap();
        assert_eq!(
            only_path(&sent),
            "/api/v4/projects/8/repository/tree?per_page=20&path=src&ref=dev"
        );
    }

    #[test]
    fn tree_rejects_bad_page_size() {
        let (api, sent) = recording_client();
        assert!(get_tree(&api, Some("8"), Some("lots"), None, None).unwrap().is_local());
        assert!(get_tree(&api, None, None, None, None).unwrap().is_local());
        assert!(sent.borrow().is_empty());
    }
}
