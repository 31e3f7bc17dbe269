use std::fmt;

use nutype::nutype;

/// A Modrinth personal access token, sent verbatim in `Authorization`.
///
/// Its [`Debug`] output never contains the token itself.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(Clone, PartialEq, Eq, AsRef, TryFrom, Serialize, Deserialize)
)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn expose(&self) -> &str {
        self.as_ref()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AuthToken(<redacted>)")
    }
}

/// Picks the token for a request: the explicit one, then the one the entity
/// was fetched with, then the client default.
pub(crate) fn resolve<'a>(
    explicit: Option<&'a AuthToken>,
    fetched_with: Option<&'a AuthToken>,
    client_default: Option<&'a AuthToken>,
) -> Option<&'a AuthToken> {
    explicit.or(fetched_with).or(client_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_trimmed_and_never_empty() {
        let token = AuthToken::try_new("  mrp_abc \n".to_owned()).unwrap();
        assert_eq!(token.expose(), "mrp_abc");
        assert!(AuthToken::try_new("   ".to_owned()).is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let token = AuthToken::try_new("mrp_secret".to_owned()).unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn resolution_order() {
        let token = |raw: &str| AuthToken::try_new(raw.to_owned()).unwrap();
        let (explicit, fetched, default) = (token("a"), token("b"), token("c"));
        assert_eq!(resolve(Some(&explicit), Some(&fetched), Some(&default)), Some(&explicit));
        assert_eq!(resolve(None, Some(&fetched), Some(&default)), Some(&fetched));
        assert_eq!(resolve(None, None, Some(&default)), Some(&default));
        assert_eq!(resolve(None, None, None), None);
    }
}
