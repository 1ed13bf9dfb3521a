//! Tenant context: which organization requests are scoped to.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Synchronous read of the currently selected tenant.
pub trait TenantResolver: Send + Sync {
    fn current_tenant(&self) -> Option<String>;
}

impl<F> TenantResolver for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_tenant(&self) -> Option<String> {
        self()
    }
}

/// Resolver for requests that are never tenant-scoped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTenant;

impl TenantResolver for NoTenant {
    fn current_tenant(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TenantFile {
    tenant_id: Option<String>,
}

/// The tenant-selection store.
///
/// Holds the active tenant in memory and, when created with [`TenantStore::load`],
/// mirrors every change to a small JSON file so the selection survives
/// between CLI invocations.
#[derive(Debug, Default)]
pub struct TenantStore {
    current: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TenantStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the persisted selection. A missing file means no tenant.
    pub fn load(path: &Path) -> Result<Self> {
        let current = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read tenant file: {}", path.display()))?;
            let file: TenantFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse tenant file: {}", path.display()))?;
            file.tenant_id
        } else {
            None
        };

        Ok(Self {
            current: RwLock::new(current),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn select(&self, tenant_id: impl Into<String>) -> Result<()> {
        self.set(Some(tenant_id.into()))
    }

    pub fn clear(&self) -> Result<()> {
        self.set(None)
    }

    fn set(&self, tenant_id: Option<String>) -> Result<()> {
        if let Some(path) = &self.path {
            let content = serde_json::to_string_pretty(&TenantFile {
                tenant_id: tenant_id.clone(),
            })
            .context("Failed to serialize tenant selection")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write tenant file: {}", path.display()))?;
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = tenant_id;
        Ok(())
    }
}

impl TenantResolver for TenantStore {
    fn current_tenant(&self) -> Option<String> {
        self.current()
    }
}
