use crate::Lang;

/// Output quality requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    High,
    Medium,
    Low,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Quality::High),
            "medium" => Some(Quality::Medium),
            "low" => Some(Quality::Low),
            _ => None,
        }
    }
}

/// Logo used for Xiaomi cameras, which ship both brand marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoPreference {
    Xiaomi,
    Leica,
}

impl LogoPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            LogoPreference::Xiaomi => "xiaomi",
            LogoPreference::Leica => "leica",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "xiaomi" => Some(LogoPreference::Xiaomi),
            "leica" => Some(LogoPreference::Leica),
            _ => None,
        }
    }
}

/// Settings the user picks before processing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOptions {
    /// Server-side style number. `None` (or 0) means nothing picked yet.
    pub watermark_style: Option<u8>,
    pub quality: Quality,
    pub burn_after_read: bool,
    pub logo_preference: Option<LogoPreference>,
    pub lang: Lang,
}

impl ProcessOptions {
    pub(crate) fn selected_style(&self) -> Option<u8> {
        self.watermark_style.filter(|style| *style > 0)
    }
}

/// Form fields sent with a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    pub watermark_style: u8,
    pub quality: Quality,
    pub burn_after_read: bool,
    pub logo_preference: Option<LogoPreference>,
    pub lang: Lang,
}
