//! Release metadata returned by the title API

use crate::catalog::{CatalogEntry, UNKNOWN_GENRE, UNKNOWN_TYPE};
use crate::DumpError;
use serde::Deserialize;

/// Typed view of the fields the dump depends on
///
/// Everything else in the API response is carried untouched in
/// [`ReleaseRecord::raw`] and persisted verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFields {
    pub id: u64,
    pub code: String,
    pub names: ReleaseNames,
    #[serde(rename = "type", default)]
    pub release_type: Option<ReleaseType>,
    #[serde(default)]
    pub genres: Option<Vec<Option<String>>>,
    pub posters: Posters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseNames {
    pub ru: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseType {
    #[serde(default)]
    pub string: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Posters {
    pub original: Poster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poster {
    pub url: String,
}

/// One release: the typed fields plus the full document they came from
#[derive(Debug, Clone)]
pub struct ReleaseRecord {
    pub fields: ReleaseFields,
    pub raw: serde_json::Value,
}

impl ReleaseRecord {
    /// Interprets an API response for `identifier`
    ///
    /// Fails if a required field is missing or the code cannot be used as a
    /// directory name.
    pub fn from_value(identifier: &str, raw: serde_json::Value) -> Result<Self, DumpError> {
        let fields: ReleaseFields =
            serde_json::from_value(raw.clone()).map_err(|e| DumpError::InvalidRecord {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;

        let code = fields.code.as_str();
        if code.is_empty() || code == "." || code.contains("..") || code.contains(['/', '\\']) {
            return Err(DumpError::InvalidRecord {
                identifier: identifier.to_string(),
                reason: format!("code '{}' is not a valid directory name", code),
            });
        }

        Ok(Self { fields, raw })
    }

    pub fn code(&self) -> &str {
        &self.fields.code
    }

    pub fn id(&self) -> u64 {
        self.fields.id
    }

    pub fn poster_path(&self) -> &str {
        &self.fields.posters.original.url
    }

    /// The entry registered in every catalog this release belongs to
    pub fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry::new(self.fields.names.ru.clone(), self.fields.code.clone())
    }

    /// Type tag, falling back to [`UNKNOWN_TYPE`]
    pub fn type_tag(&self) -> &str {
        self.fields
            .release_type
            .as_ref()
            .and_then(|t| t.string.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_TYPE)
    }

    /// Genre tags, in listed order without repeats
    ///
    /// An empty or absent list yields [`UNKNOWN_GENRE`] alone, as does any
    /// null or empty entry.
    pub fn genre_tags(&self) -> Vec<&str> {
        let genres = self.fields.genres.as_deref().unwrap_or_default();
        if genres.is_empty() {
            return vec![UNKNOWN_GENRE];
        }

        let mut tags: Vec<&str> = Vec::with_capacity(genres.len());
        for genre in genres {
            let tag = genre
                .as_deref()
                .filter(|g| !g.is_empty())
                .unwrap_or(UNKNOWN_GENRE);
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Full metadata document, compact, in the order the API sent it
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, DumpError> {
        serde_json::to_vec(&self.raw)
            .map_err(|e| DumpError::json(format!("release {}", self.code()), e))
    }
}
