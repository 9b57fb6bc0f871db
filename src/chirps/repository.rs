// Chirp repository layered on the document store

use tracing::{debug, info, warn};

use crate::chirps::{
    error::ChirpError,
    models::{Chirp, ChirpFilter, SortOrder},
    profanity::clean_chirp_body,
};
use crate::store::DocumentStore;

/// Typed chirp operations
#[derive(Clone)]
pub struct ChirpRepository {
    store: DocumentStore,
}

impl ChirpRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Create a chirp for an existing author
    ///
    /// The body is length-checked and masked before the write lock is taken;
    /// the author check and id allocation happen inside it.
    pub async fn create(&self, body: &str, author_id: i32) -> Result<Chirp, ChirpError> {
        let body = clean_chirp_body(body)?;

        let chirp = self
            .store
            .with_write_lock(|doc| {
                if !doc.users.contains_key(&author_id) {
                    return Err(ChirpError::AuthorNotFound(author_id));
                }

                let id = doc.allocate_chirp_id()?;
                let chirp = Chirp {
                    id,
                    body,
                    author_id,
                };
                doc.chirps.insert(id, chirp.clone());
                Ok(chirp)
            })
            .await?;

        info!("Created chirp {} for author {}", chirp.id, author_id);
        Ok(chirp)
    }

    pub async fn get(&self, id: i32) -> Result<Chirp, ChirpError> {
        debug!("Fetching chirp {}", id);
        self.store
            .with_read_lock(|doc| doc.chirps.get(&id).cloned().ok_or(ChirpError::NotFound(id)))
            .await
    }

    /// All chirps matching `filter`, ordered by id
    pub async fn list(&self, filter: ChirpFilter, order: SortOrder) -> Result<Vec<Chirp>, ChirpError> {
        let mut chirps: Vec<Chirp> = self
            .store
            .with_read_lock(|doc| {
                Ok::<_, ChirpError>(
                    doc.chirps
                        .values()
                        .filter(|chirp| filter.author_id.map_or(true, |author| chirp.author_id == author))
                        .cloned()
                        .collect(),
                )
            })
            .await?;

        match order {
            SortOrder::Asc => chirps.sort_by_key(|chirp| chirp.id),
            SortOrder::Desc => chirps.sort_by_key(|chirp| std::cmp::Reverse(chirp.id)),
        }

        debug!("Listed {} chirps ({:?}, {:?})", chirps.len(), filter, order);
        Ok(chirps)
    }

    /// Delete a chirp on behalf of its author
    pub async fn delete(&self, id: i32, requester_id: i32) -> Result<(), ChirpError> {
        self.store
            .with_write_lock(|doc| {
                let chirp = doc.chirps.get(&id).ok_or(ChirpError::NotFound(id))?;
                if chirp.author_id != requester_id {
                    warn!(
                        "User {} attempted to delete chirp {} owned by {}",
                        requester_id, id, chirp.author_id
                    );
                    return Err(ChirpError::Forbidden {
                        chirp_id: id,
                        requester: requester_id,
                    });
                }
                doc.chirps.remove(&id);
                Ok(())
            })
            .await?;

        info!("Deleted chirp {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;
    use crate::store::Document;

    async fn setup(authors: &[i32]) -> (tempfile::TempDir, DocumentStore, ChirpRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocumentStore::open(dir.path().join("database.json"))
            .await
            .expect("open store");

        let ids = authors.to_vec();
        store
            .with_write_lock(move |doc: &mut Document| {
                for id in ids {
                    doc.users.insert(
                        id,
                        User {
                            id,
                            email: format!("user{}@example.com", id),
                            hashed_password: "not-a-real-hash".to_string(),
                            is_chirpy_red: false,
                            refresh_token: None,
                        },
                    );
                }
                Ok::<_, crate::store::StoreError>(())
            })
            .await
            .expect("seed users");

        let repo = ChirpRepository::new(store.clone());
        (dir, store, repo)
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_body() {
        let (_dir, _store, repo) = setup(&[1]).await;

        let created = repo.create("hello world", 1).await.expect("create");
        assert_eq!(created.id, 1);
        assert_eq!(created.author_id, 1);

        let fetched = repo.get(created.id).await.expect("get");
        assert_eq!(fetched, created);
        assert_eq!(fetched.body, "hello world");
    }

    #[tokio::test]
    async fn test_create_allocates_previous_max_plus_one() {
        let (_dir, _store, repo) = setup(&[1]).await;

        for expected in 1..=3 {
            let chirp = repo.create("tick", 1).await.expect("create");
            assert_eq!(chirp.id, expected);
        }
    }

    #[tokio::test]
    async fn test_create_masks_profanity() {
        let (_dir, _store, repo) = setup(&[1]).await;
        let chirp = repo
            .create("This is a kerfuffle opinion", 1)
            .await
            .expect("create");
        assert_eq!(chirp.body, "This is a **** opinion");
    }

    #[tokio::test]
    async fn test_create_rejects_long_body_without_writing() {
        let (_dir, store, repo) = setup(&[1]).await;

        let result = repo.create(&"x".repeat(141), 1).await;
        assert!(matches!(result, Err(ChirpError::Validation(_))));
        assert!(store.load().await.expect("load").chirps.is_empty());

        assert!(repo.create(&"x".repeat(140), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_requires_existing_author() {
        let (_dir, _store, repo) = setup(&[1]).await;
        let result = repo.create("hello", 99).await;
        assert!(matches!(result, Err(ChirpError::AuthorNotFound(99))));
    }

    #[tokio::test]
    async fn test_get_missing_chirp() {
        let (_dir, _store, repo) = setup(&[1]).await;
        assert!(matches!(repo.get(42).await, Err(ChirpError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (_dir, _store, repo) = setup(&[1, 2]).await;
        repo.create("a", 1).await.expect("create");
        repo.create("b", 2).await.expect("create");
        repo.create("c", 1).await.expect("create");

        let all = repo
            .list(ChirpFilter::default(), SortOrder::Asc)
            .await
            .expect("list");
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let desc = repo
            .list(ChirpFilter::default(), SortOrder::Desc)
            .await
            .expect("list");
        assert_eq!(desc.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        let by_author = repo
            .list(ChirpFilter { author_id: Some(1) }, SortOrder::Desc)
            .await
            .expect("list");
        assert_eq!(by_author.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1]);

        let nobody = repo
            .list(ChirpFilter { author_id: Some(7) }, SortOrder::Asc)
            .await
            .expect("list");
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let (_dir, _store, repo) = setup(&[1, 2]).await;
        let chirp = repo.create("mine", 1).await.expect("create");

        let result = repo.delete(chirp.id, 2).await;
        assert!(matches!(result, Err(ChirpError::Forbidden { .. })));
        assert_eq!(repo.get(chirp.id).await.expect("still there"), chirp);
    }

    #[tokio::test]
    async fn test_delete_by_author_removes_chirp() {
        let (_dir, _store, repo) = setup(&[1]).await;
        let chirp = repo.create("mine", 1).await.expect("create");

        repo.delete(chirp.id, 1).await.expect("delete");
        assert!(matches!(repo.get(chirp.id).await, Err(ChirpError::NotFound(_))));
        assert!(matches!(
            repo.delete(chirp.id, 1).await,
            Err(ChirpError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let (_dir, _store, repo) = setup(&[1]).await;
        repo.create("one", 1).await.expect("create");
        let second = repo.create("two", 1).await.expect("create");
        repo.delete(second.id, 1).await.expect("delete");

        let third = repo.create("three", 1).await.expect("create");
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_sequential_ids() {
        let (_dir, _store, repo) = setup(&[1]).await;
        const N: i32 = 25;

        let mut handles = Vec::new();
        for i in 0..N {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&format!("chirp number {}", i), 1).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join").expect("create").id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=N).collect::<Vec<_>>());

        let listed = repo
            .list(ChirpFilter::default(), SortOrder::Asc)
            .await
            .expect("list");
        assert_eq!(listed.len(), N as usize);
    }
}
