// src/watched.rs
// Client-local watched-movie tracker, keyed per user

use crate::error::Result;
use crate::storage::Storage;
use tracing::debug;

/// Per-user set of watched movie ids.
///
/// Persisted client-side only as a JSON array under
/// `watchedMovies_{userId}`; never synced to the backend, so clearing
/// client storage loses it.
pub struct WatchedList {
    storage: Storage,
}

impl WatchedList {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All watched movie ids for `user_id`
    pub fn movies(&self, user_id: &str) -> Vec<u64> {
        let Some(raw) = self.storage.get(&storage_key(user_id)) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(movies) => movies,
            Err(e) => {
                debug!(user_id, error = %e, "Discarding unreadable watched list");
                Vec::new()
            }
        }
    }

    /// Whether `user_id` has marked `movie_id` as watched
    pub fn is_watched(&self, user_id: &str, movie_id: u64) -> bool {
        self.movies(user_id).contains(&movie_id)
    }

    /// Add `movie_id` to the watched set; idempotent
    pub fn mark_watched(&self, user_id: &str, movie_id: u64) -> Result<()> {
        let mut movies = self.movies(user_id);
        if !movies.contains(&movie_id) {
            movies.push(movie_id);
            self.save(user_id, &movies)?;
        }
        Ok(())
    }

    /// Remove `movie_id` from the watched set; idempotent
    pub fn mark_unwatched(&self, user_id: &str, movie_id: u64) -> Result<()> {
        let mut movies = self.movies(user_id);
        let before = movies.len();
        movies.retain(|id| *id != movie_id);
        if movies.len() != before {
            self.save(user_id, &movies)?;
        }
        Ok(())
    }

    fn save(&self, user_id: &str, movies: &[u64]) -> Result<()> {
        self.storage
            .set(&storage_key(user_id), &serde_json::to_string(movies)?)
    }
}

fn storage_key(user_id: &str) -> String {
    format!("watchedMovies_{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_list() -> (tempfile::TempDir, WatchedList) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, WatchedList::new(storage))
    }

    #[test]
    fn test_empty_by_default() {
        let (_dir, list) = temp_list();
        assert!(list.movies("1").is_empty());
        assert!(!list.is_watched("1", 603));
    }

    #[test]
    fn test_mark_then_unmark_restores_unwatched() {
        let (_dir, list) = temp_list();
        list.mark_watched("1", 603).unwrap();
        assert!(list.is_watched("1", 603));
        list.mark_unwatched("1", 603).unwrap();
        assert!(!list.is_watched("1", 603));
    }

    #[test]
    fn test_double_mark_stores_no_duplicate() {
        let (_dir, list) = temp_list();
        list.mark_watched("1", 603).unwrap();
        list.mark_watched("1", 603).unwrap();
        assert_eq!(list.movies("1"), vec![603]);
    }

    #[test]
    fn test_unmark_missing_is_idempotent() {
        let (_dir, list) = temp_list();
        list.mark_unwatched("1", 999).unwrap();
        assert!(list.movies("1").is_empty());
    }

    #[test]
    fn test_lists_are_per_user() {
        let (_dir, list) = temp_list();
        list.mark_watched("1", 603).unwrap();
        list.mark_watched("2", 604).unwrap();
        assert!(list.is_watched("1", 603));
        assert!(!list.is_watched("2", 603));
        assert_eq!(list.movies("2"), vec![604]);
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let (_dir, list) = temp_list();
        list.storage.set("watchedMovies_1", "not json").unwrap();
        assert!(list.movies("1").is_empty());
        // And recovers on the next write
        list.mark_watched("1", 603).unwrap();
        assert_eq!(list.movies("1"), vec![603]);
    }

    #[test]
    fn test_storage_key_shape() {
        assert_eq!(storage_key("42"), "watchedMovies_42");
    }
}
