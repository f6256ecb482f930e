//! Material sync job driver.
//!
//! Runs a [`SyncMachine`] against real collaborators. Every transport
//! callback, archive callback and confirmation result is fed back through
//! one lock, so state transitions and notifications are serialized even
//! though the confirmations run concurrently.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use matsync_protocol::constants::JSON_CONTENT_TYPE;
use matsync_protocol::{PrinterTarget, SyncResult};
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, Span, debug, info_span};
use uuid::Uuid;

use crate::collaborators::{ArchiveProducer, PrinterRegistry, ProgressFn, Transport};
use crate::error::SyncError;
use crate::machine::{Action, JobEvent, SyncMachine};
use crate::types::{Phase, StatusMap, SyncConfig, SyncEvent, SyncOutcome};

/// One-shot material sync to a set of printers.
///
/// Must be started from inside a Tokio runtime.
pub struct MaterialSyncJob {
    inner: Arc<JobInner>,
    registry: Option<Arc<dyn PrinterRegistry>>,
    events_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
}

struct JobInner {
    id: Uuid,
    span: Span,
    transport: Arc<dyn Transport>,
    producer: Arc<dyn ArchiveProducer>,
    temp_dir: Option<PathBuf>,
    machine: Mutex<SyncMachine>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
    outcome_tx: watch::Sender<Option<SyncOutcome>>,
}

impl MaterialSyncJob {
    pub fn new(
        config: SyncConfig,
        transport: Arc<dyn Transport>,
        producer: Arc<dyn ArchiveProducer>,
    ) -> Self {
        let id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outcome_tx, _) = watch::channel(None);
        let inner = JobInner {
            id,
            span: info_span!("material_sync", job_id = %id),
            transport,
            producer,
            temp_dir: config.temp_dir.clone(),
            machine: Mutex::new(SyncMachine::new(config)),
            events_tx,
            outcome_tx,
        };
        Self {
            inner: Arc::new(inner),
            registry: None,
            events_rx: Some(events_rx),
        }
    }

    /// Attaches the registry used by [`start_registered`](Self::start_registered).
    pub fn with_registry(mut self, registry: Arc<dyn PrinterRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.events_rx.take()
    }

    /// Starts syncing to `targets`.
    ///
    /// An empty target list fails with [`SyncError::Configuration`] before
    /// anything is emitted or sent.
    pub fn start(&self, targets: Vec<PrinterTarget>) -> Result<(), SyncError> {
        let _entered = self.inner.span.enter();
        let mut machine = self.inner.lock();
        let actions = machine.start(targets)?;
        self.inner.dispatch(machine, actions);
        Ok(())
    }

    /// Starts syncing to every target the attached registry lists.
    pub fn start_registered(&self) -> Result<(), SyncError> {
        let targets = self
            .registry
            .as_ref()
            .map(|r| r.list_sync_targets())
            .unwrap_or_default();
        self.start(targets)
    }

    /// Resolves with the outcome once the job completes.
    ///
    /// A job that is never started never completes.
    pub async fn wait(&self) -> Option<SyncOutcome> {
        let mut rx = self.inner.outcome_tx.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| (*outcome).clone())
    }

    pub fn outcome(&self) -> Option<SyncOutcome> {
        self.inner.outcome_tx.borrow().clone()
    }

    pub fn result(&self) -> Option<SyncResult> {
        self.outcome().map(|o| o.result)
    }

    pub fn error(&self) -> Option<SyncError> {
        self.outcome().and_then(|o| o.error)
    }

    /// Snapshot of per-printer status.
    pub fn status(&self) -> StatusMap {
        self.inner.lock().statuses().snapshot()
    }

    pub fn progress(&self) -> f64 {
        self.inner.lock().progress()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase()
    }

    /// Where the archive was written. The job never deletes it.
    pub fn archive_path(&self) -> Option<PathBuf> {
        self.inner.lock().archive_path().map(PathBuf::from)
    }

    /// Material profile id assigned by the cloud.
    pub fn archive_remote_id(&self) -> Option<String> {
        self.inner.lock().archive_remote_id().map(str::to_string)
    }
}

impl JobInner {
    fn lock(&self) -> MutexGuard<'_, SyncMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn feed(self: &Arc<Self>, event: JobEvent) {
        let _entered = self.span.enter();
        let mut machine = self.lock();
        let actions = machine.handle(event);
        self.dispatch(machine, actions);
    }

    /// Publishes notifications while the machine is still locked, then
    /// releases it and starts the remaining work.
    fn dispatch(self: &Arc<Self>, machine: MutexGuard<'_, SyncMachine>, actions: Vec<Action>) {
        let mut work = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                Action::Emit(event) => self.publish(event),
                other => work.push(other),
            }
        }
        drop(machine);

        for action in work {
            self.perform(action);
        }
    }

    fn publish(&self, event: SyncEvent) {
        let completed = match &event {
            SyncEvent::Completed(outcome) => Some(outcome.clone()),
            SyncEvent::Progress { .. } => None,
        };
        // Nobody listening is fine.
        let _ = self.events_tx.send(event);
        if let Some(outcome) = completed {
            self.outcome_tx.send_replace(Some(outcome));
        }
    }

    fn perform(self: &Arc<Self>, action: Action) {
        let inner = Arc::clone(self);
        match action {
            Action::Emit(event) => self.publish(event),
            Action::ProduceArchive => {
                tokio::spawn(inner.produce_archive().instrument(self.span.clone()));
            }
            Action::RequestUploadSlot { url, body } => {
                let task = async move {
                    debug!(%url, "requesting upload slot");
                    let result = inner.transport.put(&url, JSON_CONTENT_TYPE, body).await;
                    inner.feed(JobEvent::UploadRequestResolved(result));
                };
                tokio::spawn(task.instrument(self.span.clone()));
            }
            Action::UploadArchive {
                url,
                path,
                content_type,
            } => {
                let task = async move {
                    let body = match tokio::fs::read(&path).await {
                        Ok(body) => body,
                        Err(e) => {
                            inner.feed(JobEvent::ArchiveFailed(format!(
                                "could not read {}: {e}",
                                path.display()
                            )));
                            return;
                        }
                    };
                    debug!(bytes = body.len(), "uploading archive");
                    let result = inner.transport.put(&url, &content_type, body).await;
                    inner.feed(JobEvent::UploadResolved(result));
                };
                tokio::spawn(task.instrument(self.span.clone()));
            }
            Action::Confirm { printer_id, url } => {
                let task = async move {
                    debug!(printer = %printer_id, "confirming material upload");
                    let outcome = inner.transport.get(&url).await;
                    inner.feed(JobEvent::ConfirmationResolved {
                        printer_id,
                        outcome,
                    });
                };
                tokio::spawn(task.instrument(self.span.clone()));
            }
        }
    }

    async fn produce_archive(self: Arc<Self>) {
        let path = match self.archive_location() {
            Ok(path) => path,
            Err(e) => {
                self.feed(JobEvent::ArchiveFailed(format!(
                    "could not create archive file: {e}"
                )));
                return;
            }
        };
        self.lock().set_archive_path(path.clone());

        let progress_sink = Arc::clone(&self);
        let on_progress: ProgressFn =
            Arc::new(move |fraction: f64| progress_sink.feed(JobEvent::ArchiveProgress(fraction)));

        let event = match self.producer.produce(&path, on_progress).await {
            Ok(()) => match tokio::fs::metadata(&path).await {
                Ok(meta) => JobEvent::ArchiveReady {
                    file_size: meta.len(),
                },
                Err(e) => JobEvent::ArchiveFailed(format!("could not stat archive: {e}")),
            },
            Err(e) => JobEvent::ArchiveFailed(e.0),
        };
        self.feed(event);
    }

    /// Reserves a uniquely named file for the archive and keeps it on disk.
    fn archive_location(&self) -> std::io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("matsync-").suffix(".umm");
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.into_temp_path().keep().map_err(|e| e.error)
    }
}
