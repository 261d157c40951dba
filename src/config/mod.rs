// src/config/mod.rs

use anyhow::{Context, Result};
use std::{env, path::PathBuf};

/// Port the server actually binds. `PORT` from the environment is only echoed
/// in the startup line for whatever proxy sits in front.
pub const BIND_PORT: u16 = 8080;

const DEFAULT_XLSX_PATH: &str = "./archivo_default.xlsx";

/// Runtime configuration, read once at startup from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shareable link to the workbook; rewritten into a direct-download URL.
    pub shared_link: String,
    /// Worksheet to load from the downloaded workbook.
    pub sheet_name: String,
    /// Where the workbook is persisted locally between refreshes.
    pub workbook_path: PathBuf,
    /// Sole origin allowed on the websocket channel; `None` disables the check.
    pub allowed_ws_origin: Option<String>,
    /// Externally visible port, informational only.
    pub advertised_port: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let shared_link = env::var("SHARED_LINK").context("SHARED_LINK is not set")?;
        let sheet_name = env::var("SHEET_NAME").context("SHEET_NAME is not set")?;
        let workbook_path = env::var("DIR_AND_NAME_XLSX")
            .unwrap_or_else(|_| DEFAULT_XLSX_PATH.to_string())
            .into();
        Ok(Self {
            shared_link,
            sheet_name,
            workbook_path,
            allowed_ws_origin: env::var("BOKEH_ALLOW_WS_ORIGIN").ok(),
            advertised_port: env::var("PORT").ok(),
        })
    }
}
