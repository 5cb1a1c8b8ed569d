// src/catalog.rs
// Movie catalog (TMDB) client: search and detail lookup

use crate::error::{CineQueryError, Result};
use crate::http::backend_error;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Base URL for poster images (w500 rendition)
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Language parameter for detail lookups
const DETAIL_LANGUAGE: &str = "sv-SE";

/// A genre entry on a movie detail record
#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// A search hit from /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A full movie record from /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub overview: Option<String>,
}

impl MovieDetails {
    /// Premiere year: the leading yyyy of release_date, when present
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .filter(|d| d.len() >= 4)
            .map(|d| &d[..4])
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<MovieSummary>,
}

/// Bearer-authenticated client for the movie catalog API
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Search the catalog by title
    pub async fn search(&self, query: &str) -> Result<Vec<MovieSummary>> {
        let url = format!("{}/search/movie", self.base_url);
        let response: SearchResponse = self.fetch(&url, &[("query", query)]).await?;
        Ok(response.results)
    }

    /// Fetch the full record for one movie
    pub async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        let url = format!("{}/movie/{}", self.base_url, id);
        self.fetch(&url, &[("language", DETAIL_LANGUAGE)]).await
    }

    /// Authenticated GET returning parsed JSON.
    ///
    /// Non-OK responses yield the body's `error` message when present,
    /// else a fixed HTTP-status fallback.
    async fn fetch<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CineQueryError::Backend(
                backend_error(response, format!("HTTP error! Status: {}", status.as_u16())).await,
            ));
        }

        Ok(response.json().await?)
    }
}

/// Full poster URL for a movie's poster_path
pub fn poster_url(poster_path: &str) -> String {
    format!("{}{}", IMAGE_BASE_URL, poster_path)
}
