mod common;

use color_eyre::eyre::Report;
use common::{
    MockTransport, SHA1, dependency_json, file_json, file_url, modrinth, project_json, token,
    user_json, version_json,
};
use reqwest::Method;
use rinth_api::{DependencyExt, Error};
use rinth_model::{Dependency, DependencyType, HashAlgorithm};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn transport() -> MockTransport {
    let transport = MockTransport::default();
    transport.on_get(
        "/version/yaoBL9D9",
        &version_json(
            "yaoBL9D9",
            "AANobbMI",
            "release",
            vec![
                dependency_json(Some("abc"), None, "required"),
                dependency_json(Some("def"), None, "optional"),
            ],
            vec![
                file_json("yaoBL9D9", "sodium-sources.jar", false),
                file_json("yaoBL9D9", "sodium.jar", true),
            ],
        ),
    );
    transport.on_get("/project/abc", &project_json("abc", "abc-mod"));
    transport.on_get("/project/def", &project_json("def", "def-mod"));
    transport
}

#[rstest]
fn dependencies_resolve_in_list_order(transport: MockTransport) -> Result<(), Report> {
    let modrinth = modrinth(&transport);
    let version = modrinth.get_version("yaoBL9D9")?;
    let projects = version.get_dependencies()?;

    let slugs: Vec<_> = projects.iter().map(|project| project.slug().to_owned()).collect();
    assert_eq!(slugs, ["abc-mod", "def-mod"]);
    assert!(version.dependencies()[0].is_required());
    assert!(version.dependencies()[1].is_optional());
    assert_eq!(
        transport.paths(),
        ["GET /version/yaoBL9D9", "GET /project/abc", "GET /project/def"]
    );
    Ok(())
}

#[rstest]
fn primary_files_keep_their_order(transport: MockTransport) -> Result<(), Report> {
    let modrinth = modrinth(&transport);
    let version = modrinth.get_version("yaoBL9D9")?;
    let primary: Vec<_> = version.primary_files().iter().map(|file| file.name.clone()).collect();
    assert_eq!(primary, ["sodium.jar"]);
    assert_eq!(version.files().len(), 2);
    assert_eq!(version.files()[0].hashes.hex(HashAlgorithm::Sha1), SHA1);
    Ok(())
}

#[rstest]
fn batch_versions(transport: MockTransport) -> Result<(), Report> {
    transport.on_get(
        "/versions",
        &json!([
            version_json("b", "p", "beta", vec![], vec![]),
            version_json("a", "p", "alpha", vec![], vec![]),
        ]),
    );
    let modrinth = modrinth(&transport);
    let versions = modrinth.get_versions(&["a", "b"])?;
    let ids: Vec<_> = versions.iter().map(|version| version.id().to_owned()).collect();
    assert_eq!(ids, ["b", "a"]);
    Ok(())
}

#[rstest]
#[case(json!(version_json("one", "p", "release", vec![], vec![])), 1)]
#[case(json!([
    version_json("one", "p", "release", vec![], vec![]),
    version_json("two", "q", "release", vec![], vec![]),
]), 2)]
fn hash_lookups_accept_both_shapes(
    #[case] response: Value,
    #[case] expected: usize,
) -> Result<(), Report> {
    let transport = MockTransport::default();
    transport.on_get(&format!("/version_file/{SHA1}"), &response);
    let modrinth = modrinth(&transport);
    let versions = rinth_api::Version::get_all_from_hash(&modrinth, SHA1, HashAlgorithm::Sha1)?;
    assert_eq!(versions.len(), expected);
    assert_eq!(
        transport.last_request().query,
        [
            ("algorithm".to_owned(), "sha1".to_owned()),
            ("multiple".to_owned(), "true".to_owned()),
        ]
    );
    Ok(())
}

#[rstest]
fn single_hash_lookup() -> Result<(), Report> {
    let transport = MockTransport::default();
    transport.on_get(
        "/version_file/deadbeef",
        &version_json("one", "p", "release", vec![], vec![]),
    );
    let modrinth = modrinth(&transport);
    let version =
        rinth_api::Version::get_from_hash(&modrinth, "deadbeef", HashAlgorithm::Sha512)?;
    assert_eq!(version.id(), "one");
    assert_eq!(
        transport.last_request().query[0],
        ("algorithm".to_owned(), "sha512".to_owned())
    );
    Ok(())
}

#[rstest]
fn deleting_files_by_hash_needs_a_token() -> Result<(), Report> {
    let transport = MockTransport::default();
    let modrinth = modrinth(&transport);
    let error = rinth_api::Version::delete_file_from_hash(
        &modrinth,
        SHA1,
        HashAlgorithm::Sha1,
        Some("yaoBL9D9"),
        None,
    )
    .unwrap_err();
    assert!(matches!(error, Error::MissingAuthorization { .. }));
    assert!(transport.requests().is_empty());

    transport.respond(Method::DELETE, &format!("/version_file/{SHA1}"), 204, &Value::Null);
    let explicit = token("mrp_explicit");
    rinth_api::Version::delete_file_from_hash(
        &modrinth,
        SHA1,
        HashAlgorithm::Sha1,
        Some("yaoBL9D9"),
        Some(&explicit),
    )?;
    let request = transport.last_request();
    assert_eq!(request.auth, Some(explicit));
    assert_eq!(request.query[1], ("version_id".to_owned(), "yaoBL9D9".to_owned()));
    Ok(())
}

#[rstest]
fn related_entities(transport: MockTransport) -> Result<(), Report> {
    transport.on_get("/project/AANobbMI", &project_json("AANobbMI", "sodium"));
    transport.on_get("/user/DzLrfrbK", &user_json("DzLrfrbK", "jellysquid3"));
    let modrinth = modrinth(&transport);
    let version = modrinth.get_version("yaoBL9D9")?;
    assert_eq!(version.fetch_project()?.slug(), "sodium");
    assert_eq!(version.fetch_author()?.username(), "jellysquid3");
    Ok(())
}

#[rstest]
fn dependency_versions(transport: MockTransport) -> Result<(), Report> {
    transport.on_get(
        "/version/pinned",
        &version_json("pinned", "abc", "release", vec![], vec![]),
    );
    transport.on_get(
        "/project/def/version",
        &json!([
            version_json("latest", "def", "release", vec![], vec![]),
            version_json("older", "def", "release", vec![], vec![]),
        ]),
    );
    transport.on_get("/project/empty", &project_json("empty", "empty"));
    transport.on_get("/project/empty/version", &json!([]));
    let modrinth = modrinth(&transport);

    let pinned = Dependency::on_version("pinned", DependencyType::Required);
    assert_eq!(pinned.fetch_version(&modrinth)?.unwrap().id(), "pinned");

    let floating = Dependency::on_project("def", DependencyType::Optional);
    assert_eq!(floating.fetch_version(&modrinth)?.unwrap().id(), "latest");

    let versionless = Dependency::on_project("empty", DependencyType::Optional);
    assert!(versionless.fetch_version(&modrinth)?.is_none());
    Ok(())
}

#[rstest]
fn dependency_lookups_carry_the_token(transport: MockTransport) -> Result<(), Report> {
    transport.on_get(
        "/project/def/version",
        &json!([version_json("latest", "def", "release", vec![], vec![])]),
    );
    transport.on_get("/project/AANobbMI", &project_json("AANobbMI", "sodium"));
    let modrinth = modrinth(&transport);
    let own = token("mrp_own");

    let floating = Dependency::on_project("def", DependencyType::Optional);
    let latest = floating.fetch_version_with_auth(&modrinth, Some(&own))?.unwrap();
    assert_eq!(latest.fetch_project()?.slug(), "def-mod");
    assert!(transport.requests().iter().all(|request| request.auth == Some(own.clone())));

    let version = modrinth.get_version_with_auth("yaoBL9D9", Some(&own))?;
    version.fetch_project()?;
    assert_eq!(transport.last_request().path, "/project/AANobbMI");
    assert_eq!(transport.last_request().auth, Some(own));
    Ok(())
}

#[rstest]
fn recursive_downloads_skip_incompatible_dependencies() -> Result<(), Report> {
    let transport = MockTransport::default();
    transport.on_get(
        "/version/root",
        &version_json(
            "root",
            "p",
            "release",
            vec![
                dependency_json(None, Some("dep"), "required"),
                dependency_json(None, Some("bad"), "incompatible"),
            ],
            vec![file_json("root", "root.jar", true)],
        ),
    );
    transport.on_get(
        "/version/dep",
        &version_json("dep", "q", "release", vec![], vec![file_json("dep", "dep.jar", true)]),
    );
    transport.file(&file_url("root", "root.jar"), b"root");
    transport.file(&file_url("dep", "dep.jar"), b"dep");

    let modrinth = modrinth(&transport);
    let version = modrinth.get_version("root")?;

    let shallow = version.download(false)?;
    assert_eq!(shallow.len(), 1);

    let downloads = version.download(true)?;
    let names: Vec<_> = downloads.iter().map(|download| download.file_name.as_str()).collect();
    assert_eq!(names, ["root.jar", "dep.jar"]);
    assert_eq!(downloads[1].bytes, b"dep");
    assert!(!transport.paths().contains(&"GET /version/bad".to_owned()));
    Ok(())
}

#[rstest]
fn missing_files_are_not_found() -> Result<(), Report> {
    let transport = MockTransport::default();
    transport.on_get(
        "/version/gone",
        &version_json("gone", "p", "release", vec![], vec![file_json("gone", "gone.jar", true)]),
    );
    let modrinth = modrinth(&transport);
    let error = modrinth.get_version("gone")?.download(false).unwrap_err();
    assert!(matches!(error, Error::NotFound { .. }));
    Ok(())
}
