//! One provisioning run as the binary performs it: provisioning under a panic
//! guard, then the status or error report.

use std::{
    fs,
    panic::{self, UnwindSafe},
    path::Path,
};

use anyhow::{Context, Error};
use log::{error, info};
use serde::Serialize;

use swap_api::{
    error::{InternalError, ProvisioningError, ReportError, SwapError, SwapResultExt},
    ProvisionerConfig,
};

use crate::{cli::Cli, SwapHost, SwapProvisioner, SwapReport, SwapSize};

/// Provisions swap on `host` and writes the reports requested by `args`.
pub fn run<H>(
    args: &Cli,
    host: H,
    config: Result<ProvisionerConfig, SwapError>,
) -> Result<SwapReport, SwapError>
where
    H: SwapHost + UnwindSafe,
{
    let res = config
        .message("Failed to load the configuration")
        .and_then(|config| provision(args, host, config));

    match &res {
        Ok(report) => {
            if let Some(status_path) = &args.status {
                if let Err(e) =
                    write_yaml(status_path, report).structured(ProvisioningError::WriteReport)
                {
                    error!("{e:?}");
                }
            }
        }
        Err(e) => {
            if let Some(error_path) = &args.error {
                if let Err(e2) = write_yaml(error_path, e) {
                    error!("Failed to write error to file: {e2:?}");
                }
            }
            error!("armbian-swap failed: {e:?}");
        }
    }

    res
}

/// Process exit status of a run.
pub fn exit_status(res: &Result<SwapReport, SwapError>) -> u8 {
    match res {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn provision<H>(args: &Cli, host: H, config: ProvisionerConfig) -> Result<SwapReport, SwapError>
where
    H: SwapHost + UnwindSafe,
{
    info!("armbian-swap version: {}", crate::VERSION);

    let size = SwapSize::from_arg(args.size.as_deref());

    let res = panic::catch_unwind(move || {
        SwapProvisioner::new(host, config)
            .message("Failed to initialize the swap provisioner")?
            .provision(size)
            .message("Failed to provision swap")
    });

    match res {
        Err(e) => Err(SwapError::new(InternalError::Panic(format!("{e:?}")))),
        Ok(r) => r,
    }
}

fn write_yaml(path: &Path, value: &impl Serialize) -> Result<(), Error> {
    let contents = serde_yaml::to_string(value).context("Failed to serialize")?;
    fs::write(path, contents).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{ffi::OsStr, path::PathBuf};

    use clap::Parser;
    use swap_api::error::InvalidInputError;

    use crate::engine::testutils::{test_config, MockHost};

    fn cli(dir: &Path, size: &str) -> (Cli, PathBuf, PathBuf) {
        let status = dir.join("status.yaml");
        let error = dir.join("error.yaml");
        let args = Cli::parse_from([
            OsStr::new("armbian-swap"),
            OsStr::new(size),
            OsStr::new("--status"),
            status.as_os_str(),
            OsStr::new("--error"),
            error.as_os_str(),
        ]);
        (args, status, error)
    }

    #[test]
    fn test_run_success() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (args, status, error) = cli(dir.path(), "2");

        let res = run(&args, MockHost::new("/dev/mmcblk0p1", 5), Ok(config.clone()));
        assert_eq!(exit_status(&res), 0);

        let report = fs::read_to_string(status).unwrap();
        assert!(report.contains(&format!(
            "swap-file: {}",
            config.default_base_path.join(".swap/swapfile").display()
        )));
        assert!(report.contains("size-gib: 2"));
        assert!(!error.exists());
    }

    #[test]
    fn test_run_not_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (args, status, error) = cli(dir.path(), "2");
        let mut host = MockHost::new("/dev/mmcblk0p1", 5);
        host.root = false;

        let res = run(&args, host, Ok(config.clone()));
        assert_eq!(exit_status(&res), 1);

        let report = fs::read_to_string(error).unwrap();
        assert!(report.contains("error: missing-required-permissions"));
        assert!(report.contains("category: execution-environment-misconfiguration"));
        assert!(!status.exists());
        assert!(!config.default_base_path.join(".swap").exists());
        assert!(!config.fstab_path.exists());
    }

    #[test]
    fn test_run_insufficient_space() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (args, status, error) = cli(dir.path(), "4");

        let res = run(&args, MockHost::new("/dev/mmcblk0p1", 1), Ok(config.clone()));
        assert_eq!(exit_status(&res), 1);

        let report = fs::read_to_string(error).unwrap();
        assert!(report.contains("insufficient-space"));
        assert!(report.contains("category: unsupported-configuration"));
        assert!(!status.exists());
        assert!(!config.default_base_path.join(".swap").exists());
    }

    #[test]
    fn test_run_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let (args, _, error) = cli(dir.path(), "2");

        let res = run(
            &args,
            MockHost::new("/dev/mmcblk0p1", 5),
            Err(SwapError::new(InvalidInputError::ParseConfig)),
        );
        assert_eq!(exit_status(&res), 1);
        assert!(fs::read_to_string(error)
            .unwrap()
            .contains("error: parse-config"));
    }

    #[test]
    fn test_run_without_report_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let args = Cli::parse_from(["armbian-swap", "abc"]);

        let res = run(&args, MockHost::new("/dev/sda1", 5), Ok(config));
        assert_eq!(exit_status(&res), 0);
        assert_eq!(res.unwrap().size_gib, 1);
    }
}
