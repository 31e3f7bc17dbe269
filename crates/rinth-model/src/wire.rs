use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Free-form JSON object for fields whose schema the API does not pin down.
pub type OpaqueMap = serde_json::Map<String, Value>;

#[derive(thiserror::Error, Debug)]
pub enum WireError {
    #[error("Received a malformed {entity} payload")]
    Malformed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {entity} into its wire form")]
    Encode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A model that has a JSON wire representation.
///
/// Key names and the omit-vs-null policy of every field live on the
/// [`serde`] attributes of the implementing type, this trait only pins the
/// conversions and their error reporting.
pub trait Wire: Serialize + DeserializeOwned {
    /// What this model is called in error messages.
    const ENTITY: &'static str;

    /// Decodes a model from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Fails with [`WireError::Malformed`] if a required key is missing, a
    /// value has the wrong shape or a literal is outside of its set.
    fn from_wire(value: Value) -> Result<Self, WireError> {
        serde_json::from_value(value).map_err(|source| WireError::Malformed {
            entity: Self::ENTITY,
            source,
        })
    }

    /// Decodes a model straight from a response body.
    ///
    /// # Errors
    ///
    /// Same as [`Wire::from_wire`], plus invalid JSON.
    fn from_wire_slice(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(|source| WireError::Malformed {
            entity: Self::ENTITY,
            source,
        })
    }

    /// Encodes this model into its JSON wire form.
    ///
    /// # Errors
    ///
    /// Fails with [`WireError::Encode`] if [`serde_json`] refuses the value,
    /// which the models of this crate never trigger.
    fn to_wire(&self) -> Result<Value, WireError> {
        serde_json::to_value(self).map_err(|source| WireError::Encode {
            entity: Self::ENTITY,
            source,
        })
    }
}

impl<T: Wire> Wire for Vec<T> {
    const ENTITY: &'static str = T::ENTITY;
}

/// Deserializes an optional string field where the API may send `""`, `null`
/// or nothing at all to mean "absent".
///
/// # Errors
///
/// Fails if a non-empty string does not parse into `T`.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    use serde::Deserialize;

    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;

    use super::{Wire, WireError};

    #[derive(serde::Serialize, Deserialize, PartialEq, Debug)]
    struct Link {
        #[serde(default, deserialize_with = "super::empty_as_none")]
        url: Option<Url>,
    }

    impl Wire for Link {
        const ENTITY: &'static str = "link";
    }

    #[test]
    fn empty_null_and_missing_are_all_absent() {
        for raw in [json!({ "url": "" }), json!({ "url": null }), json!({})] {
            assert_eq!(Link::from_wire(raw).unwrap(), Link { url: None });
        }
    }

    #[test]
    fn bad_urls_are_malformed() {
        let error = Link::from_wire(json!({ "url": "not a url" })).unwrap_err();
        assert!(matches!(error, WireError::Malformed { entity: "link", .. }));
    }

    #[test]
    fn lists_share_the_entity_name() {
        let error = Vec::<Link>::from_wire_slice(b"{}").unwrap_err();
        assert!(matches!(error, WireError::Malformed { entity: "link", .. }));
    }
}
