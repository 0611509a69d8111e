//! GitHub REST payloads shaped the way the API returns them

use serde_json::{Value, json};

/// Open pull request `number` of `acme/<repo>` from `head` into `base`
pub fn pull_request(repo: &str, number: u64, head: &str, base: &str, updated_at: &str) -> Value {
    json!({
        "url": format!("https://api.github.com/repos/acme/{repo}/pulls/{number}"),
        "id": 1_000_000 + number,
        "node_id": format!("PR_node{number}"),
        "html_url": format!("https://github.com/acme/{repo}/pull/{number}"),
        "number": number,
        "state": "open",
        "title": format!("Change {number}"),
        "head": { "label": format!("acme:{head}"), "ref": head, "sha": "1111111" },
        "base": { "label": format!("acme:{base}"), "ref": base, "sha": "2222222" },
        "created_at": "2024-04-30T09:00:00Z",
        "updated_at": updated_at
    })
}

/// Review `id` in state `state` (e.g. `APPROVED`)
pub fn review(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "node_id": format!("PRR_node{id}"),
        "html_url": format!("https://github.com/acme/foo/pull/42#pullrequestreview-{id}"),
        "body": "",
        "state": state,
        "commit_id": "1111111",
        "pull_request_url": "https://api.github.com/repos/acme/foo/pulls/42",
        "author_association": "NONE",
        "submitted_at": "2024-05-01T10:00:00Z"
    })
}

/// User object as embedded in comments
pub fn user(login: &str) -> Value {
    let api = format!("https://api.github.com/users/{login}");
    json!({
        "login": login,
        "id": 4242,
        "node_id": "U_node4242",
        "avatar_url": "https://avatars.githubusercontent.com/u/4242",
        "gravatar_id": "",
        "url": api,
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("{api}/followers"),
        "following_url": format!("{api}/following"),
        "gists_url": format!("{api}/gists"),
        "starred_url": format!("{api}/starred"),
        "subscriptions_url": format!("{api}/subscriptions"),
        "organizations_url": format!("{api}/orgs"),
        "repos_url": format!("{api}/repos"),
        "events_url": format!("{api}/events"),
        "received_events_url": format!("{api}/received_events"),
        "type": "User",
        "site_admin": false
    })
}

/// Issue comment created by `login`
pub fn comment(id: u64, body: &str, login: &str) -> Value {
    json!({
        "id": id,
        "node_id": format!("IC_node{id}"),
        "url": format!("https://api.github.com/repos/acme/foo/issues/comments/{id}"),
        "html_url": format!("https://github.com/acme/foo/pull/42#issuecomment-{id}"),
        "issue_url": "https://api.github.com/repos/acme/foo/issues/42",
        "body": body,
        "user": user(login),
        "created_at": "2024-05-01T10:05:00Z",
        "updated_at": "2024-05-01T10:05:00Z",
        "author_association": "NONE"
    })
}
