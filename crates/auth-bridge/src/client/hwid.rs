//! Hardware identifier lookup.
//!
//! KeyAuth binds sessions to a machine identifier. A configured override wins;
//! otherwise each platform uses the identifier the vendor SDK reports:
//!
//! - Windows: the current user's SID, from `whoami /user`
//! - macOS: the `IOPlatformSerialNumber` reported by `ioreg`
//! - elsewhere: the systemd machine id, read through a capability handle on
//!   its parent directory

use std::path::{Path, PathBuf};
use std::process::Command;

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::error::ClientFault;

const MACHINE_ID_DIR: &str = "/etc";
const MACHINE_ID_FILE: &str = "machine-id";
const SERIAL_NUMBER_KEY: &str = "\"IOPlatformSerialNumber\"";

/// How to pull the identifier out of a command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwidExtractor {
    /// The SID field of `whoami /user /fo csv /nh`.
    WindowsSid,
    /// The serial number line of `ioreg -rd1 -c IOPlatformExpertDevice`.
    MacSerialNumber,
}

impl HwidExtractor {
    /// Extracts the identifier from command output, if present.
    ///
    /// # Example
    ///
    /// ```
    /// use auth_bridge::HwidExtractor;
    ///
    /// let output = "\"desktop\\\\alice\",\"S-1-5-21-1004336348-1177238915-682003330-1001\"\r\n";
    /// assert_eq!(
    ///     HwidExtractor::WindowsSid.extract(output).as_deref(),
    ///     Some("S-1-5-21-1004336348-1177238915-682003330-1001")
    /// );
    /// ```
    #[must_use]
    pub fn extract(self, output: &str) -> Option<String> {
        match self {
            Self::WindowsSid => output
                .split([',', '\n', '\r'])
                .map(|field| field.trim().trim_matches('"'))
                .find(|field| field.starts_with("S-1-"))
                .map(str::to_owned),
            Self::MacSerialNumber => output
                .lines()
                .find(|line| line.contains(SERIAL_NUMBER_KEY))
                .and_then(|line| line.split_once('='))
                .map(|(_, value)| value.trim().trim_matches('"').to_owned())
                .filter(|value| !value.is_empty()),
        }
    }
}

/// Where the hardware identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwidSource {
    /// A fixed identifier from configuration.
    Fixed(String),
    /// A file whose trimmed contents are the identifier.
    File {
        /// Directory holding the file.
        dir: PathBuf,
        /// File name within `dir`.
        file_name: PathBuf,
    },
    /// A system command whose output carries the identifier.
    Command {
        /// Program to run.
        program: String,
        /// Arguments passed to `program`.
        args: Vec<String>,
        /// How to read the identifier from stdout.
        extractor: HwidExtractor,
    },
}

impl HwidSource {
    /// The override when present, else this platform's default source.
    #[must_use]
    pub fn from_override(hwid_override: Option<&str>) -> Self {
        hwid_override.map_or_else(Self::platform_default, |value| {
            Self::Fixed(value.to_owned())
        })
    }

    /// The source the vendor SDK uses on the current platform.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::windows_sid()
        } else if cfg!(target_os = "macos") {
            Self::mac_serial_number()
        } else {
            Self::machine_id()
        }
    }

    /// The systemd machine id file.
    #[must_use]
    pub fn machine_id() -> Self {
        Self::File {
            dir: PathBuf::from(MACHINE_ID_DIR),
            file_name: PathBuf::from(MACHINE_ID_FILE),
        }
    }

    /// The current Windows user's SID.
    #[must_use]
    pub fn windows_sid() -> Self {
        Self::Command {
            program: "whoami".to_owned(),
            args: ["/user", "/fo", "csv", "/nh"].map(str::to_owned).to_vec(),
            extractor: HwidExtractor::WindowsSid,
        }
    }

    /// The macOS hardware serial number.
    #[must_use]
    pub fn mac_serial_number() -> Self {
        Self::Command {
            program: "ioreg".to_owned(),
            args: ["-rd1", "-c", "IOPlatformExpertDevice"]
                .map(str::to_owned)
                .to_vec(),
            extractor: HwidExtractor::MacSerialNumber,
        }
    }

    /// Reads the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientFault::Hwid`] when the source cannot be read or yields
    /// nothing.
    pub fn resolve(&self) -> Result<String, ClientFault> {
        match self {
            Self::Fixed(value) => Ok(value.clone()),
            Self::File { dir, file_name } => read_identifier(dir, file_name),
            Self::Command {
                program,
                args,
                extractor,
            } => run_identifier_command(program, args, *extractor),
        }
    }
}

fn read_identifier(dir: &Path, file_name: &Path) -> Result<String, ClientFault> {
    let handle = Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| ClientFault::Hwid {
        message: format!("open '{}': {err}", dir.display()),
    })?;
    let contents = handle
        .read_to_string(file_name)
        .map_err(|err| ClientFault::Hwid {
            message: format!("read '{}': {err}", dir.join(file_name).display()),
        })?;
    let identifier = contents.trim();
    if identifier.is_empty() {
        return Err(ClientFault::Hwid {
            message: format!("'{}' is empty", dir.join(file_name).display()),
        });
    }
    Ok(identifier.to_owned())
}

fn run_identifier_command(
    program: &str,
    args: &[String],
    extractor: HwidExtractor,
) -> Result<String, ClientFault> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| ClientFault::Hwid {
            message: format!("run '{program}': {err}"),
        })?;
    if !output.status.success() {
        return Err(ClientFault::Hwid {
            message: format!("'{program}' exited with {}", output.status),
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!(program, "hwid command finished");
    extractor.extract(&stdout).ok_or_else(|| ClientFault::Hwid {
        message: format!("'{program}' printed no identifier"),
    })
}
