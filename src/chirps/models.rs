// Chirp entity and request DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::chirps::error::ChirpError;

/// A chirp as stored in the document and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Chirp {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "I had something interesting for breakfast")]
    pub body: String,
    #[schema(example = 1)]
    pub author_id: i32,
}

/// Request body for POST /api/chirps
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateChirpRequest {
    #[schema(example = "I had something interesting for breakfast")]
    pub body: String,
}

/// Query string for GET /api/chirps
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListChirpsQuery {
    /// Only return chirps written by this user; blank means every author
    #[param(value_type = Option<i32>)]
    pub author_id: Option<String>,
    /// "asc" (default) or "desc", ordering by chirp id
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChirpFilter {
    pub author_id: Option<i32>,
}

/// Sort order options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses an optional sort parameter; absent or blank means ascending
    pub fn parse(value: Option<&str>) -> Result<Self, ChirpError> {
        let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(SortOrder::Asc);
        };

        match raw.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ChirpError::Validation(format!(
                "Invalid sort order '{}'. Must be 'asc' or 'desc'",
                raw
            ))),
        }
    }
}

impl ListChirpsQuery {
    pub fn into_parts(self) -> Result<(ChirpFilter, SortOrder), ChirpError> {
        let author_id = parse_author_id(self.author_id.as_deref())?;
        let order = SortOrder::parse(self.sort.as_deref())?;
        Ok((ChirpFilter { author_id }, order))
    }
}

fn parse_author_id(value: Option<&str>) -> Result<Option<i32>, ChirpError> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| ChirpError::Validation(format!("Invalid author_id '{}'", raw)))
}
