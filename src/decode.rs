use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::{wire, ApiError, Character, Comic, Image, Page, Response};

/// Rejects non-2xx responses, keeping the body for diagnostics.
pub(crate) fn check_status(response: Response) -> Result<Response, ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }
    Err(ApiError::Http {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

pub(crate) fn decode_characters(body: &[u8]) -> Result<Page<Character>, ApiError> {
    decode_page(body, decode_character)
}

pub(crate) fn decode_comics(body: &[u8]) -> Result<Page<Comic>, ApiError> {
    decode_page(body, decode_comic)
}

fn decode_page<W, T>(
    body: &[u8],
    convert: impl Fn(W) -> Result<T, ApiError>,
) -> Result<Page<T>, ApiError>
where
    W: DeserializeOwned,
{
    let envelope = serde_json::from_slice::<wire::Envelope<W>>(body).map_err(|err| {
        ApiError::Decode(format!(
            "invalid response JSON: {err}; body: {}",
            String::from_utf8_lossy(body)
        ))
    })?;

    let Some(data) = envelope.data else {
        return Err(match envelope.message {
            Some(message) => ApiError::Server { message },
            None => ApiError::Decode("response carries neither data nor message".to_owned()),
        });
    };

    let results = data
        .results
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        offset: data.offset,
        limit: data.limit,
        total: data.total,
        count: data.count,
        results,
    })
}

fn decode_character(character: wire::Character) -> Result<Character, ApiError> {
    Ok(Character {
        id: character.id,
        name: character.name,
        description: character.description,
        thumbnail: character.thumbnail.map(decode_image).transpose()?,
    })
}

fn decode_comic(comic: wire::Comic) -> Result<Comic, ApiError> {
    Ok(Comic {
        id: comic.id,
        title: comic.title,
        description: comic.description,
        thumbnail: comic.thumbnail.map(decode_image).transpose()?,
    })
}

pub(crate) fn decode_image(thumbnail: wire::Thumbnail) -> Result<Image, ApiError> {
    let raw = format!("{}.{}", thumbnail.path, thumbnail.extension);
    Url::parse(&raw)
        .map(|url| Image { url })
        .map_err(|err| ApiError::Decode(format!("invalid image url '{raw}': {err}")))
}
