/// Interface language. Also forwarded to the server as `?lang=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }

    /// Accepts `zh`/`en` and tolerates trailing query junk such as `en?x=1`.
    pub fn parse(raw: &str) -> Option<Self> {
        let head = raw.split('?').next().unwrap_or(raw).trim();
        match head.to_ascii_lowercase().as_str() {
            "zh" => Some(Lang::Zh),
            "en" => Some(Lang::En),
            _ => None,
        }
    }
}

pub struct Texts {
    pub selected: &'static str,
    pub rejected: &'static str,
    pub nothing_selected: &'static str,
    pub select_watermark: &'static str,
    pub status_selected: &'static str,
    pub status_uploading: &'static str,
    pub status_queued: &'static str,
    pub status_processing: &'static str,
    pub status_success: &'static str,
    pub status_failed: &'static str,
    pub logo_prompt: &'static str,
    pub logo_waiting: &'static str,
    pub saved_to: &'static str,
    pub save_failed: &'static str,
    pub batch_summary: &'static str,
    pub zip_available: &'static str,
    pub zip_packing: &'static str,
    pub zip_saved: &'static str,
    pub zip_failed: &'static str,
    pub error_unexpected: &'static str,
    pub error_timeout: &'static str,
    pub error_expired: &'static str,
    pub error_unreachable: &'static str,
    pub error_missing_result: &'static str,
    pub error_logo_rejected: &'static str,
}

static ZH: Texts = Texts {
    selected: "已选择 {n} 张",
    rejected: "已忽略不支持的文件：{n}",
    nothing_selected: "请先选择图片！",
    select_watermark: "请选择一种水印样式！",
    status_selected: "待处理",
    status_uploading: "正在上传...",
    status_queued: "排队中...",
    status_processing: "处理中...",
    status_success: "成功",
    status_failed: "失败",
    logo_prompt: "检测到 Xiaomi 机型，请为 {n} 选择 Logo（xiaomi/leica）：",
    logo_waiting: "等待选择 Logo",
    saved_to: "已保存到 {n}",
    save_failed: "保存失败：{n}",
    batch_summary: "处理完成：{n}",
    zip_available: "可打包下载所有图片",
    zip_packing: "正在打包...",
    zip_saved: "压缩包已保存到 {n}",
    zip_failed: "打包失败：{n}",
    error_unexpected: "发生意外错误。",
    error_timeout: "处理超时。",
    error_expired: "任务已过期。",
    error_unreachable: "无法连接服务器：{n}",
    error_missing_result: "服务器未返回处理结果。",
    error_logo_rejected: "服务器拒绝了所选 Logo。",
};

static EN: Texts = Texts {
    selected: "{n} Selected",
    rejected: "Skipped unsupported files: {n}",
    nothing_selected: "Please choose images first.",
    select_watermark: "Please select a watermark style.",
    status_selected: "Pending",
    status_uploading: "Uploading...",
    status_queued: "Queued...",
    status_processing: "Processing...",
    status_success: "Success",
    status_failed: "Failed",
    logo_prompt: "Xiaomi detected for {n}. Choose which logo to use (xiaomi/leica): ",
    logo_waiting: "Waiting for logo choice",
    saved_to: "Saved to {n}",
    save_failed: "Save failed: {n}",
    batch_summary: "Completed: {n}",
    zip_available: "Download All as ZIP is available",
    zip_packing: "Packing ZIP...",
    zip_saved: "ZIP saved to {n}",
    zip_failed: "ZIP failed: {n}",
    error_unexpected: "Unexpected error occurred.",
    error_timeout: "Processing timed out.",
    error_expired: "The task has expired.",
    error_unreachable: "Server unreachable: {n}",
    error_missing_result: "The server returned no processed image.",
    error_logo_rejected: "The server rejected the chosen logo.",
};

pub fn texts(lang: Lang) -> &'static Texts {
    match lang {
        Lang::Zh => &ZH,
        Lang::En => &EN,
    }
}

/// Replaces every `{n}` placeholder in `template`.
pub fn substitute(template: &str, value: impl std::fmt::Display) -> String {
    template.replace("{n}", &value.to_string())
}
