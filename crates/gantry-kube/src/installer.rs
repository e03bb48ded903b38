//! Driver installer boundary
//!
//! Staging and installing the driver binary, and enumerating its create-time
//! flags, happen outside this crate. The controller only consumes this
//! interface; `MockDriverInstaller` stands in for it under test.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use gantry_core::{Driver, DriverFlag};

use crate::error::{KubeError, Result};

/// External capability to stage/install a driver and enumerate its flags
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait DriverInstaller: Send + Sync {
    /// Fetch the driver binary into a staging location
    async fn stage(&self, driver: &Driver) -> Result<()>;

    /// Make the staged binary available for execution
    async fn install(&self, driver: &Driver) -> Result<()>;

    /// Enumerate the driver's create-time flags, keyed by its
    /// prefix-stripped name
    async fn create_flags(&self, short_name: &str) -> Result<Vec<DriverFlag>>;
}

/// In-memory installer for testing
#[derive(Clone, Default)]
pub struct MockDriverInstaller {
    flags: Vec<DriverFlag>,
    fail_stage: bool,
    fail_install: bool,
    fail_flags: bool,
    calls: Arc<RwLock<InstallerCalls>>,
}

/// Record of installer invocations for testing assertions
#[derive(Debug, Default, Clone)]
pub struct InstallerCalls {
    pub stages: usize,
    pub installs: usize,
    /// Short names passed to flag enumeration, in order
    pub enumerations: Vec<String>,
}

impl MockDriverInstaller {
    /// Installer advertising the given flag set
    pub fn with_flags(flags: Vec<DriverFlag>) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    /// Fail the staging step
    pub fn failing_stage(mut self) -> Self {
        self.fail_stage = true;
        self
    }

    /// Fail the install step
    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    /// Fail flag enumeration
    pub fn failing_flags(mut self) -> Self {
        self.fail_flags = true;
        self
    }

    /// Get recorded invocations for assertions
    pub fn calls(&self) -> InstallerCalls {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl DriverInstaller for MockDriverInstaller {
    async fn stage(&self, driver: &Driver) -> Result<()> {
        {
            let mut calls = self.calls.write().unwrap();
            calls.stages += 1;
        }

        if self.fail_stage {
            return Err(KubeError::Install {
                driver: driver.name.clone(),
                message: "stage failed".to_string(),
            });
        }
        Ok(())
    }

    async fn install(&self, driver: &Driver) -> Result<()> {
        {
            let mut calls = self.calls.write().unwrap();
            calls.installs += 1;
        }

        if self.fail_install {
            return Err(KubeError::Install {
                driver: driver.name.clone(),
                message: "install failed".to_string(),
            });
        }
        Ok(())
    }

    async fn create_flags(&self, short_name: &str) -> Result<Vec<DriverFlag>> {
        {
            let mut calls = self.calls.write().unwrap();
            calls.enumerations.push(short_name.to_string());
        }

        if self.fail_flags {
            return Err(KubeError::Install {
                driver: short_name.to_string(),
                message: "flag enumeration failed".to_string(),
            });
        }
        Ok(self.flags.clone())
    }
}
