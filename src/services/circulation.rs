//! Circulation worker
//!
//! Checkouts and returns are not applied by the request handler. They are
//! queued as jobs for a single background task, and the handler waits for
//! the job's reply up to a configured timeout. A job that outlives the
//! timeout still runs to completion; only its reply is discarded.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, BookId},
        holder::{HolderId, HolderRow, LIBRARY_HOLDER_NAME},
    },
    repository::Repository,
};

/// Lookups and the single write circulation needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CirculationStore: Send + Sync {
    async fn find_book(&self, id: BookId) -> AppResult<Option<Book>>;

    async fn find_holder(&self, id: HolderId) -> AppResult<Option<HolderRow>>;

    async fn find_holder_by_name(&self, name: &str) -> AppResult<Option<HolderRow>>;

    async fn assign(&self, id: BookId, holder_id: HolderId) -> AppResult<Book>;
}

#[async_trait]
impl CirculationStore for Repository {
    async fn find_book(&self, id: BookId) -> AppResult<Option<Book>> {
        self.books.find_by_id(id).await
    }

    async fn find_holder(&self, id: HolderId) -> AppResult<Option<HolderRow>> {
        self.holders.find_by_id(id).await
    }

    async fn find_holder_by_name(&self, name: &str) -> AppResult<Option<HolderRow>> {
        self.holders.find_by_name(name).await
    }

    async fn assign(&self, id: BookId, holder_id: HolderId) -> AppResult<Book> {
        self.books.set_holder(id, holder_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Checkout { book_id: BookId, holder_id: HolderId },
    Return { book_id: BookId },
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Checkout { book_id, holder_id } => {
                write!(f, "checkout of book {} to holder {}", book_id, holder_id)
            }
            Job::Return { book_id } => write!(f, "return of book {}", book_id),
        }
    }
}

struct Envelope {
    job: Job,
    reply: oneshot::Sender<AppResult<Book>>,
}

/// Handle for submitting circulation jobs
#[derive(Clone)]
pub struct CirculationDesk {
    jobs: mpsc::Sender<Envelope>,
    timeout: Duration,
}

impl CirculationDesk {
    /// Start the worker on the current tokio runtime
    pub fn spawn(store: Arc<dyn CirculationStore>, config: &CirculationConfig) -> Self {
        Self::start(
            store,
            config.queue_size,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn start(store: Arc<dyn CirculationStore>, queue_size: usize, timeout: Duration) -> Self {
        let (jobs, receiver) = mpsc::channel(queue_size.max(1));
        tokio::spawn(run(store, receiver));
        Self { jobs, timeout }
    }

    pub async fn checkout(&self, book_id: BookId, holder_id: HolderId) -> AppResult<Book> {
        self.submit(Job::Checkout { book_id, holder_id }).await
    }

    pub async fn return_book(&self, book_id: BookId) -> AppResult<Book> {
        self.submit(Job::Return { book_id }).await
    }

    /// Queue `job` and wait for its outcome
    pub async fn submit(&self, job: Job) -> AppResult<Book> {
        let (reply, outcome) = oneshot::channel();
        self.jobs
            .send(Envelope { job, reply })
            .await
            .map_err(|_| AppError::Internal("Circulation worker is not running".to_string()))?;

        match tokio::time::timeout(self.timeout, outcome).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(AppError::Internal(format!("No reply for {}", job))),
            Err(_) => Err(AppError::Timeout(format!(
                "The {} did not finish within {}s",
                job,
                self.timeout.as_secs_f32()
            ))),
        }
    }
}

async fn run(store: Arc<dyn CirculationStore>, mut jobs: mpsc::Receiver<Envelope>) {
    tracing::info!("Circulation worker started");
    while let Some(Envelope { job, reply }) = jobs.recv().await {
        let outcome = perform(store.as_ref(), job).await;
        match &outcome {
            Ok(book) => tracing::info!("Finished {}: holder={}", job, book.holder.name),
            Err(e) => tracing::warn!("Failed {}: {}", job, e),
        }
        // The submitter may have timed out
        let _ = reply.send(outcome);
    }
    tracing::info!("Circulation worker stopped");
}

/// Apply one job against the store
pub async fn perform(store: &dyn CirculationStore, job: Job) -> AppResult<Book> {
    match job {
        Job::Checkout { book_id, holder_id } => {
            require_book(store, book_id).await?;
            let holder = store
                .find_holder(holder_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Holder {} not found", holder_id)))?;
            store.assign(book_id, holder.id).await
        }
        Job::Return { book_id } => {
            require_book(store, book_id).await?;
            let library = library_holder_id(store).await?;
            store.assign(book_id, library).await
        }
    }
}

async fn require_book(store: &dyn CirculationStore, id: BookId) -> AppResult<Book> {
    store
        .find_book(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

/// Id of the holder named exactly "Library"
pub async fn library_holder_id(store: &dyn CirculationStore) -> AppResult<HolderId> {
    store
        .find_holder_by_name(LIBRARY_HOLDER_NAME)
        .await?
        .map(|holder| holder.id)
        .ok_or_else(|| AppError::BadRequest("Library holder not found".to_string()))
}

/// Holder a new book is assigned to: the given one if it exists, else the
/// Library holder
pub async fn shelve_target(
    store: &dyn CirculationStore,
    holder_id: Option<HolderId>,
) -> AppResult<HolderId> {
    match holder_id {
        Some(id) => store
            .find_holder(id)
            .await?
            .map(|holder| holder.id)
            .ok_or_else(|| AppError::NotFound(format!("Holder {} not found", id))),
        None => library_holder_id(store).await,
    }
}
