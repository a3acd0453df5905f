// ABOUTME: Client discovery publishing of the advertised SSE URL
// ABOUTME: Updates .cursor/mcp.json in the workspace root when the .cursor directory exists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Publishes the advertised URL where clients look for it
#[async_trait]
pub trait ClientDiscovery: Send + Sync {
    /// Record `url` under `server_name`; returns whether anything was written
    async fn publish(&self, server_name: &str, url: &str) -> AppResult<bool>;
}

/// `.cursor/mcp.json` writer
#[derive(Debug, Clone)]
pub struct CursorMcpConfig {
    root: PathBuf,
}

impl CursorMcpConfig {
    /// Directory name the client keeps its settings in
    pub const DIRECTORY: &'static str = ".cursor";
    /// Settings file inside [`Self::DIRECTORY`]
    pub const FILE_NAME: &'static str = "mcp.json";

    /// Writer rooted at the workspace directory `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path of the settings file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(Self::DIRECTORY).join(Self::FILE_NAME)
    }

    async fn read_existing(path: &Path) -> AppResult<Map<String, Value>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::invalid_format(format!(
                "{} does not contain a JSON object",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl ClientDiscovery for CursorMcpConfig {
    async fn publish(&self, server_name: &str, url: &str) -> AppResult<bool> {
        if !fs::try_exists(self.root.join(Self::DIRECTORY)).await? {
            debug!(root = %self.root.display(), "No .cursor directory, skipping discovery update");
            return Ok(false);
        }

        let path = self.path();
        let mut settings = Self::read_existing(&path).await?;
        let servers = settings
            .entry("mcpServers")
            .or_insert_with(|| Value::Object(Map::new()));
        if !servers.is_object() {
            *servers = Value::Object(Map::new());
        }
        if let Value::Object(servers) = servers {
            servers.insert(server_name.to_owned(), json!({ "url": url }));
        }

        let mut contents = serde_json::to_string_pretty(&Value::Object(settings))?;
        contents.push('\n');
        fs::write(&path, contents).await?;

        info!(path = %path.display(), server = %server_name, url = %url, "Updated client discovery file");
        Ok(true)
    }
}
