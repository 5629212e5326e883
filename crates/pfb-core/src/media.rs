//! Media descriptor returned by the search service and cached as a session record.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Images grouped as `media_type -> language code -> ordered URLs`.
pub type ImageIndex = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Cached search result backing all navigation for one media id.
///
/// Written once per search and never partially mutated; a repeated search for
/// the same id replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(
        default,
        deserialize_with = "de_media_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<DisplayValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de_images")]
    pub images: ImageIndex,
}

impl MediaRecord {
    /// URLs for one `(media_type, lang)` selection; empty when absent.
    pub fn images_for(&self, media_type: &str, lang: &str) -> &[String] {
        self.images
            .get(media_type)
            .and_then(|langs| langs.get(lang))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Languages (sorted) with their image counts for a media type.
    pub fn languages(&self, media_type: &str) -> Vec<(&str, usize)> {
        self.images
            .get(media_type)
            .map(|langs| {
                langs
                    .iter()
                    .map(|(lang, urls)| (lang.as_str(), urls.len()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A loosely typed display field: the search service sends some of these as
/// text, some as numbers, and genres sometimes as a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Text(String),
    Number(serde_json::Number),
    List(Vec<String>),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Text(s) => f.write_str(s),
            DisplayValue::Number(n) => write!(f, "{n}"),
            DisplayValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

fn de_media_id<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_images<'de, D>(de: D) -> std::result::Result<ImageIndex, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ImageIndex>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_media_id_and_mixed_scalars() {
        let r: MediaRecord = serde_json::from_value(json!({
            "media_id": 27205,
            "title": "Inception",
            "year": 2010,
            "rating": 8.4,
            "votes": "35000",
            "genres": ["Action", "Sci-Fi"],
            "images": {"posters": {"en": ["a", "b"], "xx": ["c"]}},
            "extra": {"ignored": true}
        }))
        .unwrap();

        assert_eq!(r.media_id.as_deref(), Some("27205"));
        assert_eq!(r.year.as_ref().map(|v| v.to_string()).as_deref(), Some("2010"));
        assert_eq!(r.rating.as_ref().map(|v| v.to_string()).as_deref(), Some("8.4"));
        assert_eq!(
            r.genres.as_ref().map(|v| v.to_string()).as_deref(),
            Some("Action, Sci-Fi")
        );
        assert_eq!(r.images_for("posters", "en").len(), 2);
        assert!(r.images_for("backdrops", "en").is_empty());
        assert_eq!(r.languages("posters"), vec![("en", 2), ("xx", 1)]);
    }

    #[test]
    fn null_images_and_blank_id_are_tolerated() {
        let r: MediaRecord =
            serde_json::from_value(json!({"media_id": "  ", "images": null})).unwrap();
        assert_eq!(r.media_id, None);
        assert!(r.images.is_empty());
    }

    #[test]
    fn survives_cache_round_trip() {
        let r: MediaRecord = serde_json::from_value(json!({
            "media_id": "603",
            "title": "The Matrix",
            "images": {"backdrops": {"en": ["u1"]}}
        }))
        .unwrap();
        let bytes = serde_json::to_vec(&r).unwrap();
        let back: MediaRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, r);
    }
}
