// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction Module
//!
//! Platform-specific abstractions for operating system functionality.
//!
//! ## Architecture Pattern
//!
//! Following hexagonal architecture principles:
//! - **Interface**: `Platform` trait defines the contract
//! - **Implementations**:
//!   - `UnixPlatform`: POSIX implementation (Linux + macOS)
//!   - `WindowsPlatform`: Windows API implementation
//! - **Selection**: Compile-time platform selection via `#[cfg]`
//!
//! The bootstrap module sits outside the enterprise application layers, so it
//! is where OS-specific APIs are allowed to live directly instead of being
//! scattered as conditional compilation through the rest of the workspace.
//!
//! ## Usage
//!
//! ```rust
//! use bootstrap::platform::create_platform;
//!
//! let platform = create_platform();
//! println!("Running on: {}", platform.platform_name());
//! println!("CPU cores: {}", platform.cpu_count());
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

/// Platform-specific errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not supported on this platform: {0}")]
    NotSupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Platform error: {0}")]
    Other(String),
}

/// Platform abstraction trait for OS-specific operations.
///
/// Stateless, thread-safe, and implemented once per target OS so the rest of
/// the workspace never needs a `#[cfg(unix)]`/`#[cfg(windows)]` of its own.
#[async_trait]
pub trait Platform: Send + Sync {
    /// System page size, in bytes (typically 4096).
    fn page_size(&self) -> usize;

    /// Number of logical CPU cores available to the process.
    fn cpu_count(&self) -> usize;

    /// Total physical memory, in bytes.
    fn total_memory(&self) -> Result<u64, PlatformError>;

    /// Available (free) memory, in bytes.
    fn available_memory(&self) -> Result<u64, PlatformError>;

    /// Platform-specific line separator (`"\n"` on Unix, `"\r\n"` on Windows).
    fn line_separator(&self) -> &'static str;

    /// Platform-specific `PATH` separator (`':'` on Unix, `';'` on Windows).
    fn path_separator(&self) -> char;

    /// Platform identifier: "linux", "macos", "windows", etc.
    fn platform_name(&self) -> &'static str;

    /// Platform-specific temporary directory.
    fn temp_dir(&self) -> PathBuf;

    /// Whether the process is running with elevated privileges.
    fn is_elevated(&self) -> bool;

    /// Set file permissions (Unix-specific, no-op on Windows).
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError>;

    /// Whether a path points to an executable file.
    fn is_executable(&self, path: &Path) -> bool;

    /// Flush file buffers to disk, used by the record store's WAL checkpoints.
    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError>;
}

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

/// Returns the platform implementation appropriate for the current OS,
/// selected at compile time.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}
