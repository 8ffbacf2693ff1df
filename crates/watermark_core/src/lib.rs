//! Watermark client core: pure batch state machine, view model and strings.
mod effect;
mod i18n;
mod msg;
mod naming;
mod options;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use i18n::{substitute, texts, Lang, Texts};
pub use msg::{Msg, StatusReport};
pub use naming::{has_allowed_extension, watermarked_name, ALLOWED_EXTENSIONS};
pub use options::{LogoPreference, ProcessOptions, Quality, UploadParams};
pub use state::{
    AppState, BatchState, DownloadState, FailureReason, FileId, FilePhase, Notice, PollPolicy,
    SelectedFile, SessionState, TaskStatus, UploadTask, ZipState,
};
pub use update::update;
pub use view_model::{AppViewModel, BatchView, FileRowView};
