#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use reqwest::Method;
use rinth_api::transport::{RawResponse, Request, Transport, TransportError};
use rinth_api::{AuthToken, Modrinth};
use serde_json::{Value, json};
use url::Url;

pub const SHA1: &str = "cc297357ff0031f805a744ca3a1378a112c2ddf4";
pub const SHA512: &str = "d0760a2df6f123fb3546080a85f3a44608e1f8ad9f9f7c57b5380cf72235ad380a5bbd494263639032d63bb0f0c9e0847a62426a6028a73a4b4c8e7734b4e8f5";

/// An in-memory [`Transport`] answering from a fixed route table and
/// recording every request it sees.
///
/// Clones share their state, so a test can keep one handle and give another
/// to [`Modrinth`].
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    state: Rc<RefCell<State>>,
}

#[derive(Debug, Default)]
struct State {
    routes: Vec<(Method, String, RawResponse)>,
    files: Vec<(Url, Vec<u8>)>,
    requests: Vec<Request>,
    fetched: Vec<Url>,
}

impl MockTransport {
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) -> &Self {
        let response = RawResponse {
            status,
            body: serde_json::to_vec(body).unwrap(),
        };
        self.state
            .borrow_mut()
            .routes
            .push((method, path.to_owned(), response));
        self
    }

    pub fn on_get(&self, path: &str, body: &Value) -> &Self {
        self.respond(Method::GET, path, 200, body)
    }

    pub fn file(&self, url: &str, bytes: &[u8]) -> &Self {
        self.state
            .borrow_mut()
            .files
            .push((Url::parse(url).unwrap(), bytes.to_vec()));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    pub fn last_request(&self) -> Request {
        self.requests().pop().expect("No request was sent")
    }

    pub fn fetched(&self) -> Vec<Url> {
        self.state.borrow().fetched.clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());
        let response = state
            .routes
            .iter()
            .rev()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map_or_else(
                || RawResponse {
                    status: 404,
                    body: br#"{"error":"not_found"}"#.to_vec(),
                },
                |(_, _, response)| response.clone(),
            );
        Ok(response)
    }

    fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let mut state = self.state.borrow_mut();
        state.fetched.push(url.clone());
        let response = state
            .files
            .iter()
            .find(|(file_url, _)| file_url == url)
            .map_or_else(
                || RawResponse {
                    status: 404,
                    body: vec![],
                },
                |(_, bytes)| RawResponse {
                    status: 200,
                    body: bytes.clone(),
                },
            );
        Ok(response)
    }
}

pub fn modrinth(transport: &MockTransport) -> Modrinth {
    Modrinth::with_transport(transport.clone())
}

pub fn token(raw: &str) -> AuthToken {
    AuthToken::try_new(raw.to_owned()).unwrap()
}

pub fn project_json(id: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": slug.to_uppercase(),
        "description": format!("The {slug} project"),
        "categories": ["optimization", "utility"],
        "additional_categories": ["utility", "decoration"],
        "client_side": "required",
        "server_side": "optional",
        "body": "",
        "status": "approved",
        "requested_status": null,
        "license": { "id": "MIT", "name": "MIT License", "url": null },
        "project_type": "mod",
        "issues_url": format!("https://github.com/example/{slug}/issues"),
        "source_url": null,
        "wiki_url": "",
        "discord_url": null,
        "donation_urls": [],
        "team": format!("team-{id}"),
        "downloads": 100,
        "followers": 10,
        "icon_url": null,
        "color": null,
        "published": "2022-01-01T00:00:00Z",
        "updated": "2024-01-01T00:00:00Z",
        "approved": "2022-01-02T00:00:00Z",
        "queued": null,
        "versions": [],
        "game_versions": ["1.20.1"],
        "loaders": ["fabric"],
        "gallery": []
    })
}

pub fn file_json(version_id: &str, name: &str, primary: bool) -> Value {
    json!({
        "hashes": { "sha1": SHA1, "sha512": SHA512 },
        "url": file_url(version_id, name),
        "filename": name,
        "primary": primary,
        "size": 2,
        "file_type": null
    })
}

pub fn file_url(version_id: &str, name: &str) -> String {
    format!("https://cdn.modrinth.com/data/x/versions/{version_id}/{name}")
}

pub fn dependency_json(project_id: Option<&str>, version_id: Option<&str>, kind: &str) -> Value {
    json!({
        "project_id": project_id,
        "version_id": version_id,
        "file_name": null,
        "dependency_type": kind
    })
}

pub fn version_json(
    id: &str,
    project_id: &str,
    version_type: &str,
    dependencies: Vec<Value>,
    files: Vec<Value>,
) -> Value {
    json!({
        "id": id,
        "project_id": project_id,
        "author_id": "DzLrfrbK",
        "name": format!("Version {id}"),
        "version_number": format!("{id}-number"),
        "changelog": null,
        "dependencies": dependencies,
        "game_versions": ["1.20.1"],
        "version_type": version_type,
        "loaders": ["fabric"],
        "featured": false,
        "status": "listed",
        "requested_status": null,
        "date_published": "2024-01-20T19:00:00Z",
        "downloads": 5,
        "files": files
    })
}

pub fn user_json(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": null,
        "email": null,
        "bio": "",
        "avatar_url": null,
        "created": "2020-11-25T21:30:09Z",
        "role": "developer",
        "badges": 0,
        "github_id": null,
        "payout_data": null
    })
}

pub fn member_json(team_id: &str, user: Value, role: &str) -> Value {
    json!({
        "team_id": team_id,
        "user": user,
        "role": role,
        "permissions": null,
        "accepted": true,
        "payouts_split": null,
        "ordering": 0
    })
}
