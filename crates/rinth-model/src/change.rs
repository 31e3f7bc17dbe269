use serde::{Serialize, Serializer};

/// A field of a patch request.
///
/// The API tells "leave as is" apart from "clear": an omitted key keeps the
/// current value, an explicit `null` removes it. Patch models mark the field
/// with `skip_serializing_if = "Change::is_unchanged"` so [`Change::Unchanged`]
/// never reaches the wire, [`Change::Clear`] becomes `null`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[must_use]
pub enum Change<T> {
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> Change<T> {
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Applies this change on top of the `current` value.
    pub fn apply(&self, current: Option<T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Self::Unchanged => current,
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }
}

impl<T> From<Option<T>> for Change<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

impl<T: Serialize> Serialize for Change<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Unchanged | Self::Clear => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::Change;

    #[derive(Serialize, Default)]
    struct Patch {
        #[serde(skip_serializing_if = "Change::is_unchanged")]
        wiki_url: Change<String>,
    }

    #[test]
    fn unchanged_is_omitted() {
        let patch = Patch::default();
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({}));
    }

    #[test]
    fn clear_is_null() {
        let patch = Patch {
            wiki_url: Change::Clear,
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "wiki_url": null }));
    }

    #[test]
    fn set_is_the_value() {
        let patch = Patch {
            wiki_url: Change::Set("https://wiki.example.org".into()),
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "wiki_url": "https://wiki.example.org" })
        );
    }

    #[test]
    fn apply() {
        let current = Some(1);
        assert_eq!(Change::Unchanged.apply(current), Some(1));
        assert_eq!(Change::<i32>::Clear.apply(current), None);
        assert_eq!(Change::Set(2).apply(current), Some(2));
        assert_eq!(Change::Set(2).apply(None), Some(2));
    }
}
