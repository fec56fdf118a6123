// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use compras_db::{GatewayConfig, locate};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "compras";

const VALID_PAGE_SIZES: [u32; 5] = [1024, 2048, 4096, 8192, 16384];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: Connection,
    #[serde(default)]
    pub installation: Installation,
}

/// Engine connect options. Everything is optional in the file; the
/// defaults are the engine's own (`127.0.0.1:3050`, `SYSDBA`/`masterkey`,
/// 4096-byte pages).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Connection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub page_size: Option<u32>,
    /// Explicit company database file; skips the installation scan when
    /// it exists on disk.
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Installation {
    /// Root scanned for `Aspel-SAE <version>` folders.
    pub root: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("COMPRAS_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set COMPRAS_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(port) = self.connection.port
            && port == 0
        {
            bail!("connection.port in {} must be nonzero", path.display());
        }

        if let Some(page_size) = self.connection.page_size
            && !VALID_PAGE_SIZES.contains(&page_size)
        {
            bail!(
                "connection.page_size in {} must be one of {:?}, got {}",
                path.display(),
                VALID_PAGE_SIZES,
                page_size
            );
        }

        if let Some(user) = &self.connection.user
            && user.trim().is_empty()
        {
            bail!("connection.user in {} must not be blank", path.display());
        }

        Ok(())
    }

    pub fn install_root(&self) -> PathBuf {
        self.installation
            .root
            .as_deref()
            .map_or_else(|| PathBuf::from(locate::DEFAULT_INSTALL_ROOT), PathBuf::from)
    }

    /// Explicit database override: the config file wins over the
    /// `COMPRAS_DB_PATH` environment variable.
    pub fn db_override(&self) -> Option<PathBuf> {
        if let Some(path) = &self.connection.db_path {
            return Some(PathBuf::from(path));
        }
        env::var_os("COMPRAS_DB_PATH").map(PathBuf::from)
    }

    /// The immutable connection value handed to every gateway operation.
    /// This is the only place ambient state (environment, disk scan) is
    /// consulted; query logic never looks anything up.
    pub fn gateway_config(&self) -> GatewayConfig {
        let override_path = self.db_override();
        let database_path =
            locate::resolve_database_path(&self.install_root(), override_path.as_deref());

        let mut gateway = GatewayConfig::new(database_path);
        if let Some(host) = &self.connection.host {
            gateway.host = host.clone();
        }
        if let Some(port) = self.connection.port {
            gateway.port = port;
        }
        if let Some(user) = &self.connection.user {
            gateway.user = user.clone();
        }
        if let Some(password) = &self.connection.password {
            gateway.password = password.clone();
        }
        if let Some(page_size) = self.connection.page_size {
            gateway.page_size = page_size;
        }
        gateway.role = self.connection.role.clone();
        gateway
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# compras config\n# Place this file at: {}\n\n[connection]\nhost = \"{}\"\nport = {}\nuser = \"{}\"\npassword = \"{}\"\npage_size = {}\n# role = \"RDB$ADMIN\"\n# Optional. Skips the installation scan when set and present on disk.\n# db_path = \"C:\\\\Program Files (x86)\\\\Aspel\\\\Aspel-SAE 7.0\\\\Empresa01\\\\Datos\\\\SAE70EMPRE01.FDB\"\n\n[installation]\n# root = \"{}\"\n",
            path.display(),
            compras_db::DEFAULT_HOST,
            compras_db::DEFAULT_PORT,
            compras_db::DEFAULT_USER,
            compras_db::DEFAULT_PASSWORD,
            compras_db::DEFAULT_PAGE_SIZE,
            locate::DEFAULT_INSTALL_ROOT.replace('\\', "\\\\"),
        )
    }
}
