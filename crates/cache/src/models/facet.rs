use crate::models::Author;

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct AuthorProxy {
    #[facet(rename = "n")]
    name: String,
    #[facet(rename = "r", default, transparent, skip_serializing_if = Option::is_none)]
    role: Option<String>,
}
impl From<&Author> for AuthorProxy {
    fn from(author: &Author) -> Self {
        Self {
            name: author.name.clone(),
            role: author.role.clone(),
        }
    }
}
impl From<AuthorProxy> for Author {
    fn from(author: AuthorProxy) -> Self {
        Self {
            name: author.name,
            role: author.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_json::{from_str as from_json, to_string as to_json};
    use rstest::rstest;

    #[rstest]
    #[case(AuthorProxy{name: "Ursula K. Le Guin".to_string(), role: None}, r#"{"n":"Ursula K. Le Guin"}"#)]
    #[case(AuthorProxy{name: "Edith Grossman".to_string(), role: Some("translator".to_string())}, r#"{"n":"Edith Grossman","r":"translator"}"#)]
    fn test_author_serialize(#[case] input: AuthorProxy, #[case] expected: impl AsRef<str>) {
        let json = to_json(&input).unwrap();
        assert_eq!(json.as_str(), expected.as_ref());
    }

    #[rstest]
    #[case(AuthorProxy{name: "Ursula K. Le Guin".to_string(), role: None}, r#"{"n":"Ursula K. Le Guin"}"#)]
    #[case(AuthorProxy{name: "Edith Grossman".to_string(), role: Some("translator".to_string())}, r#"{"n":"Edith Grossman","r":"translator"}"#)]
    fn test_author_deserialize(#[case] expected: AuthorProxy, #[case] input: impl AsRef<str>) {
        let obj = from_json::<AuthorProxy>(input.as_ref()).unwrap();
        assert_eq!(obj, expected);
    }

    #[test]
    fn test_genres_round_trip_as_plain_strings() {
        let genres = vec!["fantasy".to_string(), "science fiction".to_string()];
        let json = to_json(&genres).unwrap();
        assert_eq!(json, r#"["fantasy","science fiction"]"#);
        assert_eq!(from_json::<Vec<String>>(&json).unwrap(), genres);
    }
}
