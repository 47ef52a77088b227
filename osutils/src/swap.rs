use std::path::Path;

use anyhow::{Context, Error};

use crate::dependencies::Dependency;

/// Formats `path` as swap space carrying `label`.
pub fn mkswap(path: impl AsRef<Path>, label: &str) -> Result<(), Error> {
    Dependency::Mkswap
        .cmd()
        .arg("--verbose")
        .args(["--label", label])
        .arg(path.as_ref())
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to execute mkswap on '{}'",
                path.as_ref().display()
            )
        })
}

/// Runs swapon on the specified path.
pub fn swapon(path: impl AsRef<Path>) -> Result<(), Error> {
    Dependency::Swapon
        .cmd()
        .arg("--verbose")
        .arg(path.as_ref())
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to execute swapon on '{}'",
                path.as_ref().display()
            )
        })
}

/// Runs swapoff on the specified path.
pub fn swapoff(path: impl AsRef<Path>) -> Result<(), Error> {
    Dependency::Swapoff
        .cmd()
        .arg("--verbose")
        .arg(path.as_ref())
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to execute swapoff on '{}'",
                path.as_ref().display()
            )
        })
}

/// Kind of backing store of an active swap space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapType {
    File,
    Partition,
    Other(String),
}

impl From<&str> for SwapType {
    fn from(value: &str) -> Self {
        match value {
            "file" => SwapType::File,
            "partition" => SwapType::Partition,
            other => SwapType::Other(other.to_string()),
        }
    }
}

/// Represents an active swap space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSpace {
    pub name: String,
    pub swap_type: SwapType,
    pub size: u64,
    pub priority: i32,
}

impl SwapSpace {
    /// Lists active swap spaces in the order the kernel reports them; the
    /// most recently activated one comes last.
    pub fn read() -> Result<Vec<SwapSpace>, Error> {
        let output = Dependency::Swapon
            .cmd()
            .arg("--show=NAME,TYPE,SIZE,PRIO")
            .arg("--raw")
            .arg("--bytes")
            .arg("--noheadings")
            .output_and_check()
            .context("Failed to execute swapon")?;

        Self::parse_table(&output)
    }

    fn parse_table(output: &str) -> Result<Vec<SwapSpace>, Error> {
        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                SwapSpace::from_str(line)
                    .with_context(|| format!("Failed to parse swap space line: {line}"))
            })
            .collect()
    }

    fn from_str(line: &str) -> Result<SwapSpace, Error> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .context("Failed to parse swap space name")?
            .to_string();

        let swap_type = parts
            .next()
            .context("Failed to parse swap space type")?
            .into();

        let size = parts
            .next()
            .context("Failed to parse swap space size")?
            .parse::<u64>()
            .context("Failed to parse swap space size as integer")?;

        let priority = parts
            .next()
            .context("Failed to parse swap space priority")?
            .parse::<i32>()
            .context("Failed to parse swap space priority as integer")?;

        Ok(SwapSpace {
            name,
            swap_type,
            size,
            priority,
        })
    }
}
