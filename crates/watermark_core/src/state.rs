use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::naming::{has_allowed_extension, unique_name, watermarked_name};
use crate::view_model::{AppViewModel, BatchView, FileRowView};
use crate::{ProcessOptions, UploadParams};

pub type FileId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Selecting files and options.
    #[default]
    Idle,
    /// A batch is being uploaded and polled.
    Running,
    /// Every file of the batch reached a terminal state.
    Finished,
}

/// Server-side job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// Why a file ended up failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The upload endpoint refused the file.
    Rejected(String),
    /// The server asked for a logo again after one was sent.
    LogoRejected,
    /// The job failed on the server; `None` when it gave no message.
    Server(Option<String>),
    /// The job reported success without a result URL.
    MissingResult,
    /// The server no longer knows the job.
    Expired,
    /// Too many consecutive poll failures.
    Unreachable(String),
    /// The job did not finish within the poll budget.
    PollTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    NotStarted,
    InFlight,
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ZipState {
    #[default]
    Unavailable,
    Available,
    Requested,
    Saved(PathBuf),
    Failed(String),
}

/// Something the user should be told once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SelectWatermark,
    NothingSelected,
    RejectedFiles(Vec<String>),
}

/// Lifecycle phase of one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePhase {
    Selected,
    Uploading,
    AwaitingLogoChoice,
    Queued,
    Processing,
    Succeeded,
    Failed(FailureReason),
}

impl FilePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FilePhase::Succeeded | FilePhase::Failed(_))
    }
}

/// Polling cadence and give-up limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_polls: u32,
    pub max_consecutive_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            interval: Duration::from_secs(1),
            max_polls: 600,
            max_consecutive_errors: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_id: FileId,
    pub path: PathBuf,
    pub display_name: String,
}

/// A file the server accepted, tracked until its job is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub file_id: FileId,
    pub source_name: String,
    pub job_id: String,
    pub status: TaskStatus,
    /// Percent, never decreases.
    pub progress: u8,
    pub stage: Option<String>,
    pub result_url: Option<String>,
    /// Name the result is saved under, unique within the batch.
    pub local_name: Option<String>,
    pub failure: Option<FailureReason>,
    pub download: DownloadState,
    pub(crate) polls: u32,
    pub(crate) poll_errors: u32,
}

impl UploadTask {
    fn new(file_id: FileId, source_name: String, job_id: String) -> Self {
        Self {
            file_id,
            source_name,
            job_id,
            status: TaskStatus::Queued,
            progress: 0,
            stage: None,
            result_url: None,
            local_name: None,
            failure: None,
            download: DownloadState::NotStarted,
            polls: 0,
            poll_errors: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchState {
    pub total_count: usize,
    pub completed_count: usize,
    pub succeeded_filenames: Vec<String>,
}

impl BatchState {
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count >= self.total_count
    }

    pub fn zip_available(&self) -> bool {
        self.is_complete() && !self.succeeded_filenames.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileEntry {
    pub(crate) file: SelectedFile,
    pub(crate) phase: FilePhase,
    pub(crate) logo_override: Option<crate::LogoPreference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    options: ProcessOptions,
    policy: PollPolicy,
    next_file_id: FileId,
    files: BTreeMap<FileId, FileEntry>,
    tasks: BTreeMap<FileId, UploadTask>,
    rejected: Vec<String>,
    batch: BatchState,
    zip: ZipState,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn batch(&self) -> &BatchState {
        &self.batch
    }

    pub fn zip(&self) -> &ZipState {
        &self.zip
    }

    pub fn task(&self, file_id: FileId) -> Option<&UploadTask> {
        self.tasks.get(&file_id)
    }

    /// True once the batch is finished and no download or zip is outstanding.
    pub fn is_settled(&self) -> bool {
        self.session == SessionState::Finished
            && self
                .tasks
                .values()
                .all(|task| task.download != DownloadState::InFlight)
            && self.zip != ZipState::Requested
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .files
            .values()
            .map(|entry| {
                let task = self.tasks.get(&entry.file.file_id);
                FileRowView {
                    file_id: entry.file.file_id,
                    name: entry.file.display_name.clone(),
                    phase: entry.phase.clone(),
                    progress: task.map(|t| t.progress).unwrap_or(0),
                    stage: task.and_then(|t| t.stage.clone()),
                    download: task
                        .map(|t| t.download.clone())
                        .unwrap_or(DownloadState::NotStarted),
                }
            })
            .collect::<Vec<_>>();
        let succeeded = rows
            .iter()
            .filter(|row| row.phase == FilePhase::Succeeded)
            .count();
        let failed = rows
            .iter()
            .filter(|row| matches!(row.phase, FilePhase::Failed(_)))
            .count();

        AppViewModel {
            session: self.session,
            lang: self.options.lang,
            selected_count: self.files.len(),
            rejected: self.rejected.clone(),
            rows,
            batch: BatchView {
                total: self.batch.total_count,
                completed: self.batch.completed_count,
                succeeded,
                failed,
            },
            zip: self.zip.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn set_options(&mut self, options: ProcessOptions) {
        self.options = options;
        self.mark_dirty();
    }

    /// Replaces the selection and forgets the previous batch.
    pub(crate) fn select_files(&mut self, paths: Vec<PathBuf>) {
        self.files.clear();
        self.tasks.clear();
        self.rejected.clear();
        self.batch = BatchState::default();
        self.zip = ZipState::Unavailable;
        self.notice = None;
        self.session = SessionState::Idle;

        for path in paths {
            let display_name = display_name(&path);
            if !has_allowed_extension(&display_name) {
                self.rejected.push(display_name);
                continue;
            }
            self.next_file_id += 1;
            let file_id = self.next_file_id;
            self.files.insert(
                file_id,
                FileEntry {
                    file: SelectedFile {
                        file_id,
                        path,
                        display_name,
                    },
                    phase: FilePhase::Selected,
                    logo_override: None,
                },
            );
        }
        if !self.rejected.is_empty() {
            self.notice = Some(Notice::RejectedFiles(self.rejected.clone()));
        }
        self.mark_dirty();
    }

    pub(crate) fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Moves every selected file to `Uploading` and returns what to send.
    pub(crate) fn start_batch(&mut self, style: u8) -> Vec<(FileId, PathBuf, UploadParams)> {
        self.session = SessionState::Running;
        self.notice = None;
        self.batch = BatchState {
            total_count: self.files.len(),
            ..BatchState::default()
        };
        self.tasks.clear();
        self.zip = ZipState::Unavailable;
        let options = self.options.clone();
        let uploads = self
            .files
            .values_mut()
            .map(|entry| {
                entry.phase = FilePhase::Uploading;
                let params = UploadParams {
                    watermark_style: style,
                    quality: options.quality,
                    burn_after_read: options.burn_after_read,
                    logo_preference: options.logo_preference,
                    lang: options.lang,
                };
                (entry.file.file_id, entry.file.path.clone(), params)
            })
            .collect();
        self.mark_dirty();
        uploads
    }

    pub(crate) fn entry(&self, file_id: FileId) -> Option<&FileEntry> {
        self.files.get(&file_id)
    }

    pub(crate) fn entry_mut(&mut self, file_id: FileId) -> Option<&mut FileEntry> {
        self.files.get_mut(&file_id)
    }

    /// Params for re-sending a file with the given logo.
    pub(crate) fn resend_with_logo(
        &mut self,
        file_id: FileId,
        logo: crate::LogoPreference,
    ) -> Option<(PathBuf, UploadParams)> {
        let style = self.options.selected_style()?;
        let options = self.options.clone();
        let entry = self.files.get_mut(&file_id)?;
        entry.logo_override = Some(logo);
        entry.phase = FilePhase::Uploading;
        let params = UploadParams {
            watermark_style: style,
            quality: options.quality,
            burn_after_read: options.burn_after_read,
            logo_preference: Some(logo),
            lang: options.lang,
        };
        let path = entry.file.path.clone();
        self.mark_dirty();
        Some((path, params))
    }

    pub(crate) fn create_task(&mut self, file_id: FileId, job_id: String) {
        let Some(entry) = self.files.get_mut(&file_id) else {
            return;
        };
        entry.phase = FilePhase::Queued;
        let task = UploadTask::new(file_id, entry.file.display_name.clone(), job_id);
        self.tasks.insert(file_id, task);
        self.mark_dirty();
    }

    pub(crate) fn task_mut(&mut self, file_id: FileId) -> Option<&mut UploadTask> {
        self.tasks.get_mut(&file_id)
    }

    pub(crate) fn set_phase(&mut self, file_id: FileId, phase: FilePhase) {
        if let Some(entry) = self.files.get_mut(&file_id) {
            entry.phase = phase;
            self.mark_dirty();
        }
    }

    /// Marks the task succeeded and returns the local download name.
    pub(crate) fn succeed_task(
        &mut self,
        file_id: FileId,
        result_url: String,
        server_name: Option<String>,
    ) -> Option<String> {
        let source_name = &self.tasks.get(&file_id)?.source_name;
        let local_name = unique_name(watermarked_name(source_name), |candidate| {
            self.tasks
                .values()
                .any(|other| other.local_name.as_deref() == Some(candidate))
        });
        let task = self.tasks.get_mut(&file_id)?;
        task.status = TaskStatus::Succeeded;
        task.progress = 100;
        task.result_url = Some(result_url);
        task.local_name = Some(local_name.clone());
        task.download = DownloadState::InFlight;
        if let Some(name) = server_name {
            self.batch.succeeded_filenames.push(name);
        }
        self.set_phase(file_id, FilePhase::Succeeded);
        self.complete_one();
        Some(local_name)
    }

    pub(crate) fn fail_task(&mut self, file_id: FileId, reason: FailureReason) {
        if let Some(task) = self.tasks.get_mut(&file_id) {
            task.status = TaskStatus::Failed;
            task.failure = Some(reason.clone());
        }
        self.set_phase(file_id, FilePhase::Failed(reason));
        self.complete_one();
    }

    /// Counts one more terminal file and closes the batch after the last one.
    pub(crate) fn complete_one(&mut self) {
        self.batch.completed_count += 1;
        self.mark_dirty();
        if self.batch.is_complete() && self.session == SessionState::Running {
            self.session = SessionState::Finished;
            self.zip = if self.batch.zip_available() {
                ZipState::Available
            } else {
                ZipState::Unavailable
            };
        }
    }

    pub(crate) fn set_zip(&mut self, zip: ZipState) {
        self.zip = zip;
        self.mark_dirty();
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
