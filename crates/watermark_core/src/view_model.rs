use crate::{DownloadState, FileId, FilePhase, Lang, Notice, SessionState, ZipState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchView {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub lang: Lang,
    pub selected_count: usize,
    pub rejected: Vec<String>,
    pub rows: Vec<FileRowView>,
    pub batch: BatchView,
    pub zip: ZipState,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub file_id: FileId,
    pub name: String,
    pub phase: FilePhase,
    pub progress: u8,
    pub stage: Option<String>,
    pub download: DownloadState,
}
