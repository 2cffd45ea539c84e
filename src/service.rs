use reqwest::Url;

use crate::{ApiError, Method, Request};

/// Public Marvel API gateway.
pub const MARVEL_BASE_URL: &str = "https://gateway.marvel.com:443";

/// Describes an endpoint relative to a base URL.
pub trait Service {
    /// Path segments appended to the base URL. Each segment is percent-encoded
    /// on its own, so `/`, `?` and `#` cannot escape it.
    fn path(&self) -> Vec<String>;

    /// Query parameters in addition to the API key.
    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn method(&self) -> Method {
        Method::Get
    }
}

/// Endpoints of the Marvel public API used by the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarvelService {
    /// Characters matching an exact name.
    Characters { name: String },
    /// A single character by identifier.
    Character { identifier: String },
    /// Comics featuring a character.
    Comics { character_id: i64 },
}

impl Service for MarvelService {
    fn path(&self) -> Vec<String> {
        let mut segments = vec!["v1".to_owned(), "public".to_owned(), "characters".to_owned()];
        match self {
            Self::Characters { .. } => {}
            Self::Character { identifier } => segments.push(identifier.clone()),
            Self::Comics { character_id } => {
                segments.push(character_id.to_string());
                segments.push("comics".to_owned());
            }
        }
        segments
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Characters { name } => vec![("name", name.clone())],
            Self::Character { .. } | Self::Comics { .. } => Vec::new(),
        }
    }
}

/// Resolves `service` against `base_url` and signs it with `api_key`.
///
/// Example: `Characters { name: "Hulk" }` against the default base URL
/// becomes `https://gateway.marvel.com/v1/public/characters?apikey=<key>&name=Hulk`.
///
/// Empty, `.` and `..` segments are rejected.
pub fn build_request<S: Service + ?Sized>(
    service: &S,
    base_url: &str,
    api_key: &str,
) -> Result<Request, ApiError> {
    let mut url =
        Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(format!("'{base_url}': {err}")))?;

    let segments = service.path();
    if let Some(segment) = segments
        .iter()
        .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
    {
        return Err(ApiError::InvalidUrl(format!(
            "invalid path segment '{segment}'"
        )));
    }

    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("'{base_url}' cannot be a base")))?
        .pop_if_empty()
        .extend(&segments);

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("apikey", api_key);
        for (name, value) in service.parameters() {
            query.append_pair(name, &value);
        }
    }

    Ok(Request::new(service.method(), url))
}

#[cfg(test)]
mod tests {
    use super::{build_request, MarvelService, Service, MARVEL_BASE_URL};
    use crate::{ApiError, Method};

    #[test]
    fn characters_request_carries_key_and_name() {
        let request = build_request(
            &MarvelService::Characters {
                name: "Iron Man".to_owned(),
            },
            MARVEL_BASE_URL,
            "key123",
        )
        .expect("must build request");

        assert_eq!(request.method(), Method::Get);
        assert_eq!(
            request.url().as_str(),
            "https://gateway.marvel.com/v1/public/characters?apikey=key123&name=Iron+Man"
        );
    }

    #[test]
    fn character_path_includes_identifier() {
        let service = MarvelService::Character {
            identifier: "1009610".to_owned(),
        };
        assert_eq!(service.path(), vec!["v1", "public", "characters", "1009610"]);
        assert!(service.parameters().is_empty());
    }

    #[test]
    fn comics_request_trims_trailing_slash_on_base() {
        let request = build_request(
            &MarvelService::Comics {
                character_id: 1009351,
            },
            "http://127.0.0.1:8080/",
            "k",
        )
        .expect("must build request");

        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:8080/v1/public/characters/1009351/comics?apikey=k"
        );
    }

    #[test]
    fn identifier_cannot_escape_its_path_segment() {
        let request = build_request(
            &MarvelService::Character {
                identifier: "../../admin".to_owned(),
            },
            MARVEL_BASE_URL,
            "k",
        )
        .expect("must build request");
        assert_eq!(
            request.url().as_str(),
            "https://gateway.marvel.com/v1/public/characters/..%2F..%2Fadmin?apikey=k"
        );

        let request = build_request(
            &MarvelService::Character {
                identifier: "1?apikey=evil#".to_owned(),
            },
            MARVEL_BASE_URL,
            "k",
        )
        .expect("must build request");
        assert_eq!(request.url().path(), "/v1/public/characters/1%3Fapikey=evil%23");
        assert_eq!(request.url().query(), Some("apikey=k"));
        assert_eq!(request.url().fragment(), None);
    }

    #[test]
    fn dot_segment_identifier_is_rejected() {
        for identifier in ["..", ".", ""] {
            let err = build_request(
                &MarvelService::Character {
                    identifier: identifier.to_owned(),
                },
                MARVEL_BASE_URL,
                "k",
            )
            .expect_err("must fail");
            assert!(matches!(err, ApiError::InvalidUrl(_)));
        }
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = build_request(
            &MarvelService::Characters {
                name: "Thor".to_owned(),
            },
            "not a base",
            "k",
        )
        .expect_err("must fail");
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
