use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use url::Url;

use crate::literal::{
    DependencyType, FileType, HashAlgorithm, RequestedVersionStatus, VersionStatus, VersionType,
};
use crate::multipart::{FilePart, MultipartPayload, Part};
use crate::wire::{Wire, WireError};

/// A version of a project, as returned by `/version/{id}`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct VersionModel {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub name: String,
    pub version_number: String,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub changelog: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    pub game_versions: Vec<String>,
    pub version_type: VersionType,
    pub loaders: Vec<String>,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VersionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_status: Option<RequestedVersionStatus>,
    pub date_published: DateTime<Utc>,
    pub downloads: u64,
    pub files: Vec<File>,
}

impl Wire for VersionModel {
    const ENTITY: &'static str = "version";
}

impl VersionModel {
    /// Files flagged as primary, in their original order.
    pub fn primary_files(&self) -> impl Iterator<Item = &File> {
        self.files.iter().filter(|file| file.primary)
    }

    pub fn required_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies
            .iter()
            .filter(|dependency| dependency.dependency_type == DependencyType::Required)
    }

    pub fn optional_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies
            .iter()
            .filter(|dependency| dependency.dependency_type == DependencyType::Optional)
    }
}

/// A file attached to a version.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct File {
    pub hashes: Hashes,
    pub url: Url,
    #[serde(rename = "filename")]
    pub name: String,
    pub primary: bool,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
}

impl File {
    /// The extension of [`Self::name`], without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(OsStr::to_str)
    }

    /// Whether this file is a resource pack shipped along with the version.
    #[must_use]
    pub const fn is_resourcepack(&self) -> bool {
        self.file_type.is_some()
    }
}

/// **SHA1** and **SHA512** hashes of a [`File`], combined.
///
/// Both are always served for hosted files. Other algorithms in the `hashes`
/// object are ignored.
#[serde_as]
#[must_use]
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Hashes {
    pub sha1: Sha1,
    pub sha512: Sha512,
}

impl Hashes {
    /// The lowercase hex digest for `algorithm`.
    #[must_use]
    pub fn hex(&self, algorithm: HashAlgorithm) -> String {
        match algorithm {
            HashAlgorithm::Sha1 => self.sha1.to_string(),
            HashAlgorithm::Sha512 => self.sha512.to_string(),
        }
    }
}

/// A thin wrapper around a [`serde`]-compatible **SHA1** hash.
#[serde_as]
#[must_use]
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Sha1(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 20]);

/// A thin wrapper around a [`serde`]-compatible **SHA512** hash.
#[serde_as]
#[must_use]
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Sha512(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 64]);

fn write_hex(formatter: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    bytes
        .iter()
        .try_for_each(|byte| write!(formatter, "{byte:02x}"))
}

impl fmt::Display for Sha1 {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(formatter, &self.0)
    }
}

impl fmt::Display for Sha512 {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(formatter, &self.0)
    }
}

/// A dependency of a version on another project, version or loose file.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub dependency_type: DependencyType,
}

impl Dependency {
    pub fn on_project(project_id: impl Into<String>, dependency_type: DependencyType) -> Self {
        Self {
            version_id: None,
            project_id: Some(project_id.into()),
            file_name: None,
            dependency_type,
        }
    }

    pub fn on_version(version_id: impl Into<String>, dependency_type: DependencyType) -> Self {
        Self {
            version_id: Some(version_id.into()),
            project_id: None,
            file_name: None,
            dependency_type,
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.dependency_type == DependencyType::Required
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.dependency_type == DependencyType::Optional
    }

    #[must_use]
    pub fn is_incompatible(&self) -> bool {
        self.dependency_type == DependencyType::Incompatible
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.dependency_type == DependencyType::Embedded
    }
}

/// Server-side version filters of `/project/{id}/version`, plus a release
/// channel filter applied to the response.
#[derive(Clone, Default, PartialEq, Eq, Debug, Builder)]
#[must_use]
pub struct VersionFilter {
    #[builder(default)]
    pub loaders: Vec<String>,
    #[builder(default)]
    pub game_versions: Vec<String>,
    pub featured: Option<bool>,
    #[builder(default)]
    pub version_types: Vec<VersionType>,
}

impl VersionFilter {
    /// Query parameters of the listing endpoint. List values are JSON encoded.
    ///
    /// # Errors
    ///
    /// Fails if a list cannot be encoded, see [`Wire::to_wire`].
    pub fn query(&self) -> Result<Vec<(String, String)>, WireError> {
        let encode = |list: &[String]| {
            serde_json::to_string(list).map_err(|source| WireError::Encode {
                entity: "version filter",
                source,
            })
        };
        let mut query = vec![];
        if !self.loaders.is_empty() {
            query.push(("loaders".to_owned(), encode(&self.loaders)?));
        }
        if !self.game_versions.is_empty() {
            query.push(("game_versions".to_owned(), encode(&self.game_versions)?));
        }
        if let Some(featured) = self.featured {
            query.push(("featured".to_owned(), featured.to_string()));
        }
        Ok(query)
    }

    /// Whether `version` passes the release channel filter.
    #[must_use]
    pub fn accepts(&self, version: &VersionModel) -> bool {
        self.version_types.is_empty() || self.version_types.contains(&version.version_type)
    }
}

/// The `data` part of `POST /version`.
///
/// `file_parts` and `primary_file` are filled in by
/// [`NewVersion::to_multipart_payload`], from the files it is given.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Builder)]
#[must_use]
pub struct NewVersion {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub version_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub changelog: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub dependencies: Vec<Dependency>,
    pub game_versions: Vec<String>,
    pub version_type: VersionType,
    pub loaders: Vec<String>,
    #[builder(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VersionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_status: Option<RequestedVersionStatus>,
    /// Set by the project the version is created on.
    #[builder(default, into)]
    pub project_id: String,
    #[serde(default)]
    #[builder(skip)]
    pub file_parts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(skip)]
    pub primary_file: Option<String>,
}

impl Wire for NewVersion {
    const ENTITY: &'static str = "new version";
}

impl NewVersion {
    /// Name of the multipart part carrying the file at `index`.
    #[must_use]
    pub fn file_part_name(index: usize) -> String {
        format!("file-{index}")
    }

    /// Encodes the creation request: the `data` part first, then one part per
    /// file in the order given.
    ///
    /// The metadata's `file_parts` lists the part names by position, and
    /// `primary_file` names the first file flagged as primary, if any.
    ///
    /// # Errors
    ///
    /// Fails if the metadata cannot be encoded, see [`Wire::to_wire`].
    pub fn to_multipart_payload(
        &self,
        files: Vec<FilePart>,
    ) -> Result<MultipartPayload, WireError> {
        let metadata = Self {
            file_parts: (0..files.len()).map(Self::file_part_name).collect(),
            primary_file: files
                .iter()
                .position(|file| file.primary)
                .map(Self::file_part_name),
            ..self.clone()
        };
        let data = serde_json::to_vec(&metadata).map_err(|source| WireError::Encode {
            entity: Self::ENTITY,
            source,
        })?;

        let parts = std::iter::once(Part::field("data", data))
            .chain(
                files
                    .into_iter()
                    .enumerate()
                    .map(|(index, file)| Part::file(Self::file_part_name(index), file)),
            )
            .collect();
        Ok(MultipartPayload::new(parts))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::{Value, json};

    use super::*;

    const SHA1: &str = "cc297357ff0031f805a744ca3a1378a112c2ddf4";
    const SHA512: &str = "d0760a2df6f123fb3546080a85f3a44608e1f8ad9f9f7c57b5380cf72235ad380a5bbd494263639032d63bb0f0c9e0847a62426a6028a73a4b4c8e7734b4e8f5";

    fn file_json(name: &str, primary: bool) -> Value {
        json!({
            "hashes": { "sha1": SHA1, "sha512": SHA512 },
            "url": format!("https://cdn.modrinth.com/data/AANobbMI/versions/yaoBL9D9/{name}"),
            "filename": name,
            "primary": primary,
            "size": 1_024,
            "file_type": null
        })
    }

    fn version_json(files: Vec<Value>) -> Value {
        json!({
            "id": "yaoBL9D9",
            "project_id": "AANobbMI",
            "author_id": "DzLrfrbK",
            "name": "Sodium 0.5.8",
            "version_number": "mc1.20.1-0.5.8",
            "changelog": "",
            "changelog_url": null,
            "dependencies": [
                { "version_id": null, "project_id": "P7dR8mSH", "file_name": null, "dependency_type": "required" },
                { "project_id": "Xbc0uyRg", "dependency_type": "incompatible" }
            ],
            "game_versions": ["1.20.1"],
            "version_type": "release",
            "loaders": ["fabric", "quilt"],
            "featured": true,
            "status": "listed",
            "requested_status": null,
            "date_published": "2024-01-20T19:00:00.000000Z",
            "downloads": 1_000_000,
            "files": files
        })
    }

    #[test]
    fn decodes_and_round_trips() {
        let version =
            VersionModel::from_wire(version_json(vec![file_json("sodium.jar", true)])).unwrap();
        assert_eq!(version.changelog, None);
        assert_eq!(version.status, Some(VersionStatus::Listed));
        assert_eq!(version.files[0].hashes.hex(HashAlgorithm::Sha1), SHA1);
        assert_eq!(version.files[0].hashes.hex(HashAlgorithm::Sha512), SHA512);
        assert_eq!(version.files[0].extension(), Some("jar"));
        assert!(!version.files[0].is_resourcepack());

        let wire = version.to_wire().unwrap();
        assert!(wire.get("changelog").is_none());
        assert!(wire["dependencies"][0].get("version_id").is_none());
        assert_eq!(VersionModel::from_wire(wire).unwrap(), version);
    }

    #[test]
    fn unknown_version_types_are_malformed() {
        let mut json = version_json(vec![]);
        json["version_type"] = json!("nightly");
        let error = VersionModel::from_wire(json).unwrap_err();
        assert!(matches!(error, WireError::Malformed { entity: "version", .. }));
    }

    #[test]
    fn bad_hashes_are_malformed() {
        let mut file = file_json("sodium.jar", true);
        file["hashes"]["sha1"] = json!("not-hex");
        assert!(VersionModel::from_wire(version_json(vec![file])).is_err());
    }

    #[test]
    fn other_hash_algorithms_are_ignored() {
        let mut file = file_json("sodium.jar", true);
        file["hashes"]["sha256"] = json!("ab".repeat(32));
        let version = VersionModel::from_wire(version_json(vec![file])).unwrap();
        assert_eq!(version.files[0].hashes.hex(HashAlgorithm::Sha512), SHA512);

        let mut file = file_json("sodium.jar", true);
        file["hashes"].as_object_mut().unwrap().remove("sha512");
        assert!(VersionModel::from_wire(version_json(vec![file])).is_err());
    }

    #[test]
    fn primary_files_keep_their_order() {
        let version = VersionModel::from_wire(version_json(vec![
            file_json("a.jar", true),
            file_json("b-sources.jar", false),
            file_json("c.jar", true),
        ]))
        .unwrap();
        let primary = version
            .primary_files()
            .map(|file| file.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(primary, ["a.jar", "c.jar"]);

        let version = VersionModel::from_wire(version_json(vec![])).unwrap();
        assert_eq!(version.primary_files().count(), 0);
    }

    #[test]
    fn dependency_kinds() {
        let version = VersionModel::from_wire(version_json(vec![])).unwrap();
        assert_eq!(version.required_dependencies().count(), 1);
        assert_eq!(version.optional_dependencies().count(), 0);
        assert!(version.dependencies[1].is_incompatible());
        assert!(!version.dependencies[1].is_embedded());
    }

    #[test]
    fn filter_query() {
        let filter = VersionFilter::builder()
            .loaders(vec!["fabric".into()])
            .game_versions(vec!["1.20.1".into(), "1.20.4".into()])
            .featured(true)
            .build();
        assert_eq!(
            filter.query().unwrap(),
            [
                ("loaders".to_owned(), r#"["fabric"]"#.to_owned()),
                ("game_versions".to_owned(), r#"["1.20.1","1.20.4"]"#.to_owned()),
                ("featured".to_owned(), "true".to_owned()),
            ]
        );
        assert!(VersionFilter::default().query().unwrap().is_empty());
    }

    #[test]
    fn multipart_payload_orders_metadata_then_files() {
        let new_version = NewVersion::builder()
            .name("Release 1.0")
            .version_number("1.0.0")
            .game_versions(vec!["1.20.1".into()])
            .version_type(VersionType::Release)
            .loaders(vec!["fabric".into()])
            .project_id("AANobbMI")
            .build();
        let files = vec![
            FilePart::new("sources.jar", b"first".to_vec()),
            FilePart::new("mod.jar", b"second".to_vec()).with_primary(true),
        ];

        let payload = new_version.to_multipart_payload(files).unwrap();
        let names = payload
            .parts()
            .iter()
            .map(|part| part.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["data", "file-0", "file-1"]);
        assert_eq!(payload.parts()[1].body, b"first");
        assert_eq!(payload.parts()[2].body, b"second");
        assert_eq!(payload.parts()[2].file_name.as_deref(), Some("mod.jar"));

        let metadata: Value = serde_json::from_slice(&payload.parts()[0].body).unwrap();
        assert_eq!(metadata["file_parts"], json!(["file-0", "file-1"]));
        assert_eq!(metadata["primary_file"], json!("file-1"));
        assert_eq!(metadata["project_id"], json!("AANobbMI"));
        assert!(metadata.get("changelog").is_none());
    }

    #[test]
    fn multipart_payload_without_a_primary_file() {
        let raw = indoc! {r#"
            {
                "name": "Beta",
                "version_number": "0.1.0",
                "game_versions": ["1.21"],
                "version_type": "beta",
                "loaders": ["neoforge"],
                "featured": false,
                "project_id": "abc"
            }
        "#};
        let new_version = NewVersion::from_wire_slice(raw.as_bytes()).unwrap();
        let payload = new_version
            .to_multipart_payload(vec![FilePart::new("a.jar", vec![])])
            .unwrap();
        let metadata: Value = serde_json::from_slice(&payload.parts()[0].body).unwrap();
        assert_eq!(metadata["file_parts"], json!(["file-0"]));
        assert!(metadata.get("primary_file").is_none());
    }
}
