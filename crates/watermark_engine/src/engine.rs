use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use watermark_logging::{wm_debug, wm_trace, wm_warn};

use crate::client::{ReqwestService, ServiceSettings, WatermarkService};
use crate::filename::sanitize_file_name;
use crate::persist::ResultStore;
use crate::{EngineEvent, FailureKind, FileId, ServiceError, UploadRequest};

enum EngineCommand {
    Upload {
        file_id: FileId,
        request: UploadRequest,
    },
    Poll {
        file_id: FileId,
        job_id: String,
        delay: Duration,
    },
    Download {
        file_id: FileId,
        url: String,
        file_name: String,
    },
    Zip {
        filenames: Vec<String>,
    },
}

/// Runs service calls on a tokio runtime owned by a worker thread and hands
/// their results back as `EngineEvent`s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings, output_dir: PathBuf) -> Result<Self, ServiceError> {
        let service = ReqwestService::new(settings)?;
        Self::with_service(Arc::new(service), output_dir)
    }

    pub fn with_service(
        service: Arc<dyn WatermarkService>,
        output_dir: PathBuf,
    ) -> Result<Self, ServiceError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let store = Arc::new(ResultStore::new(output_dir));

        let worker_cancel = cancel.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let service = service.clone();
                let store = store.clone();
                let event_tx = event_tx.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = handle_command(service.as_ref(), store.as_ref(), command, event_tx) => {}
                    }
                });
            }
            wm_debug!("Engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    pub fn upload(&self, file_id: FileId, request: UploadRequest) {
        self.send(EngineCommand::Upload { file_id, request });
    }

    pub fn poll(&self, file_id: FileId, job_id: impl Into<String>, delay: Duration) {
        self.send(EngineCommand::Poll {
            file_id,
            job_id: job_id.into(),
            delay,
        });
    }

    pub fn download(&self, file_id: FileId, url: impl Into<String>, file_name: impl Into<String>) {
        self.send(EngineCommand::Download {
            file_id,
            url: url.into(),
            file_name: file_name.into(),
        });
    }

    pub fn request_zip(&self, filenames: Vec<String>) {
        self.send(EngineCommand::Zip { filenames });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Abandon every in-flight request and pending poll.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            wm_warn!("Engine worker is gone; dropping command");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn handle_command(
    service: &dyn WatermarkService,
    store: &ResultStore,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Upload { file_id, request } => EngineEvent::UploadFinished {
            file_id,
            result: service.upload(&request).await,
        },
        EngineCommand::Poll {
            file_id,
            job_id,
            delay,
        } => {
            tokio::time::sleep(delay).await;
            wm_trace!("Poll file_id={} job_id={}", file_id, job_id);
            EngineEvent::StatusFetched {
                file_id,
                result: service.status(&job_id).await,
            }
        }
        EngineCommand::Download {
            file_id,
            url,
            file_name,
        } => {
            let result = match service.download(&url).await {
                Ok(bytes) => save(store, &file_name, &bytes),
                Err(err) => Err(err),
            };
            EngineEvent::ResultDownloaded { file_id, result }
        }
        EngineCommand::Zip { filenames } => EngineEvent::ZipDownloaded {
            result: fetch_zip(service, store, &filenames).await,
        },
    };
    let _ = event_tx.send(event);
}

async fn fetch_zip(
    service: &dyn WatermarkService,
    store: &ResultStore,
    filenames: &[String],
) -> Result<PathBuf, ServiceError> {
    let zip_url = service.request_zip(filenames).await?;
    let name = crate::wire::last_segment(&zip_url)
        .unwrap_or_else(|| format!("Packed_Watermark_Images_{}.zip", filenames.len()));
    let bytes = service.download(&zip_url).await?;
    save(store, &name, &bytes)
}

fn save(store: &ResultStore, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ServiceError> {
    let safe = sanitize_file_name(file_name);
    store
        .save(&safe, bytes)
        .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))
}
