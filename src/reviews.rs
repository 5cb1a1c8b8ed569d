// src/reviews.rs
// Review list controller: fetch/create/edit/delete against the backend
// review collection, with a confirm-before-delete interaction

use crate::error::{CineQueryError, Result};
use crate::http::backend_error;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long a pending delete stays armed before it auto-disarms
pub const CONFIRM_WINDOW: Duration = Duration::from_secs(5);

/// Fallback message for review mutations that fail without a usable error body
const GENERIC_FALLBACK: &str = "Något gick fel.";

/// Message for drafts with a missing or empty required field
const MISSING_FIELDS: &str = "Alla fält måste fyllas i!";

/// Message for ratings outside 1–5
const RATING_RANGE: &str = "Betyget måste vara mellan 1 och 5!";

/// Message for authenticated operations attempted without a token
const NOT_SIGNED_IN: &str = "Du måste vara inloggad!";

/// The review author as the backend serves it: populated on reads,
/// a plain user id on records that were never joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewAuthor {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        username: String,
    },
    Id(String),
}

impl ReviewAuthor {
    /// The author's user id
    pub fn id(&self) -> &str {
        match self {
            Self::Populated { id, .. } => id,
            Self::Id(id) => id,
        }
    }

    /// The author's username, when the backend populated it
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Populated { username, .. } => Some(username),
            Self::Id(_) => None,
        }
    }
}

/// A review record, owned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub movie_id: String,
    pub movie_title: String,
    #[serde(rename = "userId")]
    pub author: ReviewAuthor,
    pub rating: u8,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form state for a review being written.
///
/// `rating` stays `None` until the user picks one; [`ReviewDraft::validate`]
/// rejects incomplete drafts before any network call is made.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub movie_id: String,
    pub movie_title: String,
    pub user_id: String,
    pub rating: Option<u8>,
    pub review_text: String,
}

impl ReviewDraft {
    fn validate(&self) -> Result<()> {
        if self.movie_id.trim().is_empty()
            || self.movie_title.trim().is_empty()
            || self.user_id.trim().is_empty()
            || self.review_text.trim().is_empty()
        {
            return Err(CineQueryError::Validation(MISSING_FIELDS.to_string()));
        }
        match self.rating {
            None => Err(CineQueryError::Validation(MISSING_FIELDS.to_string())),
            Some(rating) if !(1..=5).contains(&rating) => {
                Err(CineQueryError::Validation(RATING_RANGE.to_string()))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Outcome of a [`ReviewController::delete_review`] invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First invocation: the delete is armed and awaits confirmation
    Armed,
    /// Confirmed within the window: the review is gone
    Deleted,
}

/// Per-view controller over one movie's review list.
///
/// Holds the fetched list, the caller's already-reviewed flag, and the
/// per-review pending-delete state. Constructed when a movie detail view
/// opens; [`ReviewController::detach`] cancels in-flight fetches when the
/// view goes away, so nothing mutates state afterwards.
pub struct ReviewController {
    client: reqwest::Client,
    base_url: String,
    storage: Storage,
    reviews: Vec<Review>,
    already_reviewed: bool,
    pending_deletes: HashMap<String, Instant>,
    confirm_window: Duration,
    cancel: CancellationToken,
}

impl ReviewController {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, storage: Storage) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            storage,
            reviews: Vec::new(),
            already_reviewed: false,
            pending_deletes: HashMap::new(),
            confirm_window: CONFIRM_WINDOW,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the confirm-delete window (tests use a short one)
    pub fn with_confirm_window(mut self, window: Duration) -> Self {
        self.confirm_window = window;
        self
    }

    /// The most recently fetched review list
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Cached result of the last has_reviewed lookup or submit
    pub fn already_reviewed(&self) -> bool {
        self.already_reviewed
    }

    /// True while the confirm window for `review_id` is open
    pub fn pending_delete(&self, review_id: &str) -> bool {
        self.pending_deletes
            .get(review_id)
            .is_some_and(|armed_at| armed_at.elapsed() <= self.confirm_window)
    }

    /// Cancel in-flight fetches; called when the owning view goes away
    pub fn detach(&self) {
        self.cancel.cancel();
    }

    /// Load all reviews for a movie (public endpoint).
    ///
    /// Failures degrade to an empty list with a warning; a cancelled fetch
    /// leaves the current list untouched.
    pub async fn load_reviews_for_movie(&mut self, movie_id: &str) -> &[Review] {
        match self.fetch_reviews(movie_id).await {
            Ok(reviews) => self.reviews = reviews,
            Err(CineQueryError::Cancelled) => {
                debug!(movie_id, "Review fetch cancelled");
            }
            Err(e) => {
                warn!(movie_id, error = %e, "Failed to load reviews");
                self.reviews.clear();
            }
        }
        &self.reviews
    }

    /// Whether `user_id` already has a review for `movie_id`.
    ///
    /// Caller-side policy only: the affordance to write a second review is
    /// hidden, but nothing here proves the server enforces uniqueness.
    pub async fn has_reviewed(&mut self, movie_id: &str, user_id: &str) -> Result<bool> {
        let token = self.bearer_token()?;
        let url = format!("{}/reviews", self.base_url);

        let request = self
            .client
            .get(url)
            .query(&[("movieId", movie_id), ("userId", user_id)])
            .header("Authorization", format!("Bearer {}", token))
            .send();

        let matches: Vec<Review> = self
            .cancellable(async {
                let response = request.await?;
                if !response.status().is_success() {
                    let status = response.status();
                    return Err(CineQueryError::Backend(
                        backend_error(response, format!("HTTP error! Status: {}", status.as_u16()))
                            .await,
                    ));
                }
                Ok(response.json().await?)
            })
            .await?;

        self.already_reviewed = !matches.is_empty();
        Ok(self.already_reviewed)
    }

    /// Submit a new review.
    ///
    /// Validates the draft before any network call, then refreshes the list
    /// and flips the already-reviewed flag on success.
    pub async fn submit_review(&mut self, draft: &ReviewDraft) -> Result<()> {
        draft.validate()?;
        let token = self.bearer_token()?;

        let response = self
            .client
            .post(format!("{}/reviews", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CineQueryError::Backend(
                backend_error(response, GENERIC_FALLBACK).await,
            ));
        }

        let movie_id = draft.movie_id.clone();
        self.load_reviews_for_movie(&movie_id).await;
        self.already_reviewed = true;
        Ok(())
    }

    /// Update an existing review's rating and text.
    ///
    /// The full payload is resent, immutable fields included. On failure the
    /// list is left untouched so the caller keeps its form state.
    pub async fn edit_review(&mut self, review_id: &str, rating: u8, review_text: &str) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(CineQueryError::Validation(RATING_RANGE.to_string()));
        }
        if review_text.trim().is_empty() {
            return Err(CineQueryError::Validation(MISSING_FIELDS.to_string()));
        }

        let Some(review) = self.reviews.iter().find(|r| r.id == review_id) else {
            return Err(CineQueryError::Validation(GENERIC_FALLBACK.to_string()));
        };

        let mut payload = review.clone();
        payload.rating = rating;
        payload.review_text = review_text.to_string();

        let token = self.bearer_token()?;
        let response = self
            .client
            .put(format!("{}/reviews/{}", self.base_url, review_id))
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CineQueryError::Backend(
                backend_error(response, GENERIC_FALLBACK).await,
            ));
        }

        let movie_id = payload.movie_id.clone();
        self.load_reviews_for_movie(&movie_id).await;
        Ok(())
    }

    /// Two-phase delete.
    ///
    /// The first invocation arms a pending delete for `review_id` and
    /// returns [`DeleteOutcome::Armed`]; a second invocation while the
    /// window is open performs the DELETE and removes the review from the
    /// in-memory list. Once the window lapses the next invocation arms
    /// again. Windows are per-review-id, so pending deletes on different
    /// reviews are independent. A failed DELETE disarms and returns the
    /// error; confirming again restarts the two-phase sequence.
    pub async fn delete_review(&mut self, review_id: &str) -> Result<DeleteOutcome> {
        let now = Instant::now();
        let armed = self
            .pending_deletes
            .get(review_id)
            .is_some_and(|armed_at| now.duration_since(*armed_at) <= self.confirm_window);

        if !armed {
            // Expired entries from other reviews are dropped on the way
            let window = self.confirm_window;
            self.pending_deletes
                .retain(|_, armed_at| now.duration_since(*armed_at) <= window);
            self.pending_deletes.insert(review_id.to_string(), now);
            return Ok(DeleteOutcome::Armed);
        }

        self.pending_deletes.remove(review_id);
        self.perform_delete(review_id).await?;
        self.reviews.retain(|r| r.id != review_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn perform_delete(&self, review_id: &str) -> Result<()> {
        let token = self.bearer_token()?;
        let response = self
            .client
            .delete(format!("{}/reviews/{}", self.base_url, review_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CineQueryError::Backend(
                backend_error(response, GENERIC_FALLBACK).await,
            ));
        }
        Ok(())
    }

    async fn fetch_reviews(&self, movie_id: &str) -> Result<Vec<Review>> {
        let request = self
            .client
            .get(format!("{}/reviews/movie/{}", self.base_url, movie_id))
            .send();

        self.cancellable(async {
            let response = request.await?;
            if !response.status().is_success() {
                let status = response.status();
                return Err(CineQueryError::Backend(
                    backend_error(response, format!("HTTP error! Status: {}", status.as_u16()))
                        .await,
                ));
            }
            Ok(response.json().await?)
        })
        .await
    }

    /// Race a fetch against the view-lifetime cancellation token
    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(CineQueryError::Cancelled),
            result = fut => result,
        }
    }

    fn bearer_token(&self) -> Result<String> {
        self.storage
            .token()
            .ok_or_else(|| CineQueryError::Auth(NOT_SIGNED_IN.to_string()))
    }
}
