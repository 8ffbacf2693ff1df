use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use watermark_core::{Lang, LogoPreference, Quality};
use watermark_logging::LogDestination;

use crate::config::ClientConfig;

/// Batch client for the image watermark service.
#[derive(Debug, Parser)]
#[command(name = "wmclient", version, about)]
pub struct Cli {
    /// Images to watermark (png, jpg, jpeg).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// RON config file. Missing is fine unless given explicitly.
    #[arg(long, env = "WMCLIENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the watermark service.
    #[arg(long, env = "WMCLIENT_SERVER")]
    pub server: Option<String>,

    /// Watermark style number.
    #[arg(short, long)]
    pub style: Option<u8>,

    #[arg(short, long, value_enum)]
    pub quality: Option<QualityArg>,

    /// Ask the server to delete results shortly after they are read.
    #[arg(long)]
    pub burn: bool,

    /// Logo used when the server detects a Xiaomi camera.
    #[arg(long, value_enum)]
    pub logo: Option<LogoArg>,

    #[arg(long, value_enum)]
    pub lang: Option<LangArg>,

    /// Directory for processed images and the zip archive.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download every result as one zip once the batch is done.
    #[arg(long)]
    pub zip: bool,

    #[arg(long, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,

    /// Log at debug level; repeat (`-vv`) for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogoArg {
    Xiaomi,
    Leica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LangArg {
    Zh,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(style) = self.style {
            config.watermark_style = Some(style);
        }
        if let Some(quality) = self.quality {
            config.quality = match quality {
                QualityArg::High => Quality::High,
                QualityArg::Medium => Quality::Medium,
                QualityArg::Low => Quality::Low,
            }
            .as_str()
            .to_string();
        }
        if self.burn {
            config.burn_after_read = true;
        }
        if let Some(logo) = self.logo {
            let logo = match logo {
                LogoArg::Xiaomi => LogoPreference::Xiaomi,
                LogoArg::Leica => LogoPreference::Leica,
            };
            config.logo_preference = Some(logo.as_str().to_string());
        }
        if let Some(lang) = self.lang {
            let lang = match lang {
                LangArg::Zh => Lang::Zh,
                LangArg::En => Lang::En,
            };
            config.lang = lang.code().to_string();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.zip {
            config.zip = true;
        }
    }
}
