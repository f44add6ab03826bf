//! Skip a generation step when none of its inputs changed.
//!
//! The gate compares the modification time of every source file against a
//! sentinel file that marks the last successful run. The wrapped command runs
//! when the sentinel is missing or any source is strictly newer; only a zero
//! exit status touches the sentinel, so a failed run is retried next time.
//!
//! ```text
//! regen-gate blocks.json block_properties.json out/BLOCK_TABLES -- mc-data-gen ...
//! ```
//!
//! The sentinel basename must be `[A-Z_]+` so the gate is never pointed at
//! a real output file by mistake.

mod error;

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use tracing::{debug, info};

pub use error::{GateError, Result};

/// Environment variable that forces the command to run.
pub const FORCE_ENV: &str = "REGEN_GATE_FORCE";

/// Parsed `<source-file>... <sentinel-file> -- <command> [args...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateArgs {
    pub sources: Vec<PathBuf>,
    pub sentinel: PathBuf,
    pub command: Vec<OsString>,
}

impl GateArgs {
    /// Parses the arguments that follow the program name.
    ///
    /// # Errors
    /// Returns [`GateError::Usage`] if `--`, the sentinel, or the command is
    /// missing.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let separator = args
            .iter()
            .position(|arg| arg.as_os_str() == "--")
            .ok_or(GateError::Usage("missing `--` before the command"))?;

        let (files, command) = (&args[..separator], &args[separator + 1..]);
        let Some((sentinel, sources)) = files.split_last() else {
            return Err(GateError::Usage("missing sentinel file"));
        };
        if command.is_empty() {
            return Err(GateError::Usage("missing command after `--`"));
        }

        Ok(Self {
            sources: sources.iter().map(PathBuf::from).collect(),
            sentinel: PathBuf::from(sentinel),
            command: command.to_vec(),
        })
    }
}

/// Runtime switches read from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateConfig {
    /// Run the command even if the sentinel is up to date
    pub force: bool,
}

impl GateConfig {
    pub fn from_env() -> Self {
        Self {
            force: std::env::var_os(FORCE_ENV).is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sentinel newer than every source, nothing ran
    UpToDate,
    /// Command ran and succeeded, sentinel touched
    Regenerated,
}

/// Checks that the sentinel basename is uppercase letters and underscores.
///
/// # Errors
/// Returns [`GateError::InvalidSentinelName`] otherwise.
pub fn validate_sentinel_name(sentinel: &Path) -> Result<()> {
    // `file_name` skips a trailing separator, which would accept a directory
    let trailing_separator = sentinel
        .as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| std::path::is_separator(b as char));

    let valid = !trailing_separator
        && sentinel
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| {
                !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
            });

    if valid {
        Ok(())
    } else {
        Err(GateError::InvalidSentinelName {
            path: sentinel.to_path_buf(),
        })
    }
}

/// True if the sentinel is missing or any source is strictly newer.
///
/// # Errors
/// Fails if a source file cannot be stat'ed.
pub fn is_out_of_date(sentinel: &Path, sources: &[PathBuf]) -> Result<bool> {
    let stamp = match fs::metadata(sentinel) {
        Ok(metadata) => metadata.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("sentinel {} missing", sentinel.display());
            return Ok(true);
        }
        Err(e) => return Err(e.into()),
    };

    for source in sources {
        let modified = fs::metadata(source)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| GateError::Source {
                path: source.clone(),
                source: e,
            })?;
        if modified > stamp {
            debug!("{} is newer than {}", source.display(), sentinel.display());
            return Ok(true);
        }
    }
    Ok(false)
}

/// Creates `path` if needed and sets its modification time to now.
pub fn touch(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.set_modified(SystemTime::now())
}

fn run_command(command: &[OsString]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or(GateError::Usage("missing command after `--`"))?;

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| GateError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        // No code means the command was killed by a signal
        Err(GateError::CommandFailed {
            code: status.code().filter(|&code| code != 0).unwrap_or(1),
        })
    }
}

/// Runs the command if the sentinel is stale, touching it on success.
///
/// # Errors
/// Returns [`GateError::InvalidSentinelName`] before looking at any file,
/// and [`GateError::CommandFailed`] with the command's status if it failed.
pub fn run(args: &GateArgs, config: GateConfig) -> Result<Outcome> {
    validate_sentinel_name(&args.sentinel)?;

    if !config.force && !is_out_of_date(&args.sentinel, &args.sources)? {
        debug!("{} is up to date", args.sentinel.display());
        return Ok(Outcome::UpToDate);
    }

    info!(command = ?args.command, "regenerating {}", args.sentinel.display());
    run_command(&args.command)?;
    touch(&args.sentinel)?;
    Ok(Outcome::Regenerated)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn set_mtime(path: &Path, secs: u64) {
        let file = OpenOptions::new().append(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_parse_args() {
        let args = GateArgs::parse(["a.json", "b.json", "STAMP", "--", "gen", "--out", "x"]).unwrap();
        assert_eq!(args.sources, [PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.sentinel, PathBuf::from("STAMP"));
        assert_eq!(args.command, ["gen", "--out", "x"]);
    }

    #[test]
    fn test_parse_args_without_sources() {
        let args = GateArgs::parse(["STAMP", "--", "gen"]).unwrap();
        assert!(args.sources.is_empty());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(
            GateArgs::parse(["a", "STAMP", "gen"]),
            Err(GateError::Usage(_))
        ));
        assert!(matches!(
            GateArgs::parse(["--", "gen"]),
            Err(GateError::Usage("missing sentinel file"))
        ));
        assert!(matches!(
            GateArgs::parse(["a", "STAMP", "--"]),
            Err(GateError::Usage("missing command after `--`"))
        ));
    }

    #[test]
    fn test_sentinel_names() {
        for ok in ["BLOCK_TABLE", "out/dir/PACKETS", "_", "A"] {
            assert!(validate_sentinel_name(Path::new(ok)).is_ok(), "{ok}");
        }
        for bad in [
            "foo.stamp",
            "BLOCK-TABLE",
            "Block_Table",
            "out/",
            "OUT/",
            "out/BLOCK_TABLE/",
            "..",
            "",
            "STAMP1",
        ] {
            assert!(
                matches!(
                    validate_sentinel_name(Path::new(bad)),
                    Err(GateError::InvalidSentinelName { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_out_of_date() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("blocks.json");
        let sentinel = dir.path().join("STAMP");
        fs::write(&source, "{}").unwrap();
        let sources = [source.clone()];

        assert!(is_out_of_date(&sentinel, &sources).unwrap());

        fs::write(&sentinel, "").unwrap();
        set_mtime(&source, 1_000);
        set_mtime(&sentinel, 2_000);
        assert!(!is_out_of_date(&sentinel, &sources).unwrap());

        // equal times are not stale
        set_mtime(&source, 2_000);
        assert!(!is_out_of_date(&sentinel, &sources).unwrap());

        set_mtime(&source, 2_001);
        assert!(is_out_of_date(&sentinel, &sources).unwrap());
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("STAMP");
        fs::write(&sentinel, "").unwrap();
        let sources = [dir.path().join("missing.json")];
        assert!(matches!(
            is_out_of_date(&sentinel, &sources),
            Err(GateError::Source { .. })
        ));
    }

    #[test]
    fn test_touch_creates_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("STAMP");
        touch(&sentinel).unwrap();
        assert!(sentinel.exists());

        set_mtime(&sentinel, 1_000);
        touch(&sentinel).unwrap();
        let modified = fs::metadata(&sentinel).unwrap().modified().unwrap();
        assert!(modified > SystemTime::UNIX_EPOCH + Duration::from_secs(1_000));
    }

    #[test]
    fn test_invalid_name_checked_first() {
        let args = GateArgs::parse(["missing.json", "foo.stamp", "--", "false"]).unwrap();
        assert!(matches!(
            run(&args, GateConfig::default()),
            Err(GateError::InvalidSentinelName { .. })
        ));
    }
}
