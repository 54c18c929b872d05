//! Platform file attributes: hidden flag, permission bits, executable bit.
//!
//! The generator only talks to the [`AttributeApplier`] trait and treats every
//! failure as a warning.

use log::debug;
use std::io;
use std::path::Path;

/// Capability for applying platform attributes to a created entry.
pub trait AttributeApplier {
    fn set_hidden(&self, path: &Path) -> io::Result<()>;

    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Adds the owner execute bit to the current mode.
    fn set_executable(&self, path: &Path) -> io::Result<()>;
}

/// Applies attributes through the host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformAttributes;

impl PlatformAttributes {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl AttributeApplier for PlatformAttributes {
    fn set_hidden(&self, path: &Path) -> io::Result<()> {
        // Dot-prefixed names are the only notion of hidden here.
        debug!("No hidden attribute on this platform for {}", path.display());
        Ok(())
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o100))
    }
}

#[cfg(windows)]
impl AttributeApplier for PlatformAttributes {
    fn set_hidden(&self, path: &Path) -> io::Result<()> {
        let status = std::process::Command::new("attrib")
            .arg("+h")
            .arg(path)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("attrib exited with {}", status)))
        }
    }

    fn set_permissions(&self, path: &Path, _mode: u32) -> io::Result<()> {
        debug!("Permission bits are not supported for {}", path.display());
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        debug!("Executable bit is not supported for {}", path.display());
        Ok(())
    }
}

#[cfg(not(any(unix, windows)))]
impl AttributeApplier for PlatformAttributes {
    fn set_hidden(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn set_permissions(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }

    fn set_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
