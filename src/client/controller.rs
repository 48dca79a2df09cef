//! Upload controller.
//!
//! Tracks what the user sees while picking, dragging and uploading files:
//! the interaction phase, a single status line and the last catalog the
//! server returned. Each outgoing call is bounded by a timeout and can be
//! cancelled as a group with [`UploadController::cancel_all`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, Aborted};

use crate::file::{CatalogEntry, FileDescriptor};
use crate::{Result, VaultError};

use super::transport::{LocalFile, VaultApi, DEFAULT_TIMEOUT};

/// Status line shown when an upload fails.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

/// Status line shown when the catalog cannot be fetched.
pub const LIST_FAILED_MESSAGE: &str = "Failed to load files. Is the backend running?";

fn uploading_message(name: &str) -> String {
    format!("Uploading {name}...")
}

fn uploaded_message(name: &str) -> String {
    format!("Successfully uploaded {name}!")
}

/// Interaction phase of the drop zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPhase {
    /// Nothing happening.
    #[default]
    Idle,
    /// Files are being dragged over the drop zone.
    Dragging,
    /// At least one upload is in flight.
    Uploading,
}

/// Snapshot of everything the user sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Current interaction phase.
    pub phase: UploadPhase,
    /// Status line, if any.
    pub message: Option<String>,
    /// Last catalog received from the server.
    pub files: Vec<CatalogEntry>,
    /// Uploads started but not yet finished.
    pub uploads_in_flight: usize,
}

/// Drives uploads and catalog refreshes against a [`VaultApi`].
pub struct UploadController<A> {
    api: A,
    timeout: Duration,
    view: Mutex<ViewState>,
    started: AtomicBool,
    next_call_id: AtomicU64,
    calls: Mutex<HashMap<u64, AbortHandle>>,
}

/// Removes a finished call from the registry.
struct CallGuard<'a> {
    calls: &'a Mutex<HashMap<u64, AbortHandle>>,
    id: u64,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl<A: VaultApi> UploadController<A> {
    /// Create a new controller with the default call timeout.
    pub fn new(api: A) -> Self {
        Self {
            api,
            timeout: DEFAULT_TIMEOUT,
            view: Mutex::new(ViewState::default()),
            started: AtomicBool::new(false),
            next_call_id: AtomicU64::new(0),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Set the deadline applied to each outgoing call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.view().clone()
    }

    /// Current interaction phase.
    pub fn phase(&self) -> UploadPhase {
        self.view().phase
    }

    /// Current status line.
    pub fn message(&self) -> Option<String> {
        self.view().message.clone()
    }

    /// Last catalog received from the server.
    pub fn files(&self) -> Vec<CatalogEntry> {
        self.view().files.clone()
    }

    /// Load the catalog for the first time.
    ///
    /// Returns `false` without doing anything if the controller was already started.
    pub async fn start(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.refresh().await;
        true
    }

    /// Files entered the drop zone.
    pub fn drag_enter(&self) {
        let mut view = self.view();
        if view.phase == UploadPhase::Idle {
            view.phase = UploadPhase::Dragging;
        }
    }

    /// Files are moving over the drop zone.
    pub fn drag_over(&self) {
        self.drag_enter();
    }

    /// Files left the drop zone without being dropped.
    pub fn drag_leave(&self) {
        let mut view = self.view();
        if view.phase == UploadPhase::Dragging {
            view.phase = UploadPhase::Idle;
        }
    }

    /// Files were dropped on the drop zone. Only the first one is uploaded.
    pub async fn drop_files(&self, files: Vec<LocalFile>) -> Option<Result<FileDescriptor>> {
        self.drag_leave();
        self.select_files(files).await
    }

    /// Files were picked through a file dialog. Only the first one is uploaded.
    pub async fn select_files(&self, files: Vec<LocalFile>) -> Option<Result<FileDescriptor>> {
        let file = files.into_iter().next()?;
        Some(self.upload(file).await)
    }

    /// Upload one file and refresh the catalog if it was stored.
    pub async fn upload(&self, file: LocalFile) -> Result<FileDescriptor> {
        {
            let mut view = self.view();
            view.uploads_in_flight += 1;
            view.phase = UploadPhase::Uploading;
            view.message = Some(uploading_message(&file.name));
        }

        let result = self.call(self.api.upload(&file)).await;

        {
            let mut view = self.view();
            view.uploads_in_flight = view.uploads_in_flight.saturating_sub(1);
            if view.uploads_in_flight == 0 {
                view.phase = UploadPhase::Idle;
            }
            view.message = Some(match &result {
                Ok(_) => uploaded_message(&file.name),
                Err(_) => UPLOAD_FAILED_MESSAGE.to_string(),
            });
        }

        match result {
            Ok(response) => {
                tracing::info!("Uploaded {} as {}", file.name, response.file.stored_name);
                let _ = self.refresh().await;
                Ok(response.file)
            }
            Err(e) => {
                tracing::warn!("Upload of {} failed: {}", file.name, e);
                Err(e)
            }
        }
    }

    /// Fetch the catalog and replace the displayed list.
    ///
    /// Overlapping refreshes are not ordered: whichever response arrives
    /// last is what stays on screen.
    pub async fn refresh(&self) -> Result<()> {
        match self.call(self.api.list_files()).await {
            Ok(files) => {
                self.view().files = files;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load files: {}", e);
                self.view().message = Some(LIST_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Abort every call currently in flight.
    pub fn cancel_all(&self) {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        if !calls.is_empty() {
            tracing::debug!("Cancelling {} call(s)", calls.len());
        }
        for handle in calls.values() {
            handle.abort();
        }
    }

    async fn call<F, T>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle);
        let _guard = CallGuard {
            calls: &self.calls,
            id,
        };

        let bounded = tokio::time::timeout(self.timeout, request);
        match Abortable::new(bounded, registration).await {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(VaultError::Timeout(self.timeout)),
            Err(Aborted) => Err(VaultError::Cancelled),
        }
    }
}
