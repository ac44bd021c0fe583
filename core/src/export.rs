//! CSV persistence of scan results.
//!
//! One header row, then one row per record in report order:
//!
//! ```text
//! IP Address,Status,Hostname,Aliases,Addresses,DNS Error
//! 192.168.1.1,active,router.local,,192.168.1.1,
//! ```
//!
//! Multi-valued cells are joined with `", "` and quoted by the writer as needed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hostsweep_common::report::ScanRecord;
use hostsweep_common::{debug, success};
use thiserror::Error;

pub const HEADER: [&str; 6] = [
    "IP Address",
    "Status",
    "Hostname",
    "Aliases",
    "Addresses",
    "DNS Error",
];

const LIST_SEPARATOR: &str = ", ";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode CSV for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ExportError {
    pub fn path(&self) -> &Path {
        match self {
            ExportError::Io { path, .. } | ExportError::Csv { path, .. } => path,
        }
    }
}

/// Somewhere finished records can be written to.
pub trait ResultSink: Send + Sync {
    /// Writes `records` and returns the path actually used.
    /// `None` lets the sink pick a destination.
    fn write(&self, records: &[ScanRecord], destination: Option<&Path>)
    -> Result<PathBuf, ExportError>;
}

/// Writes a CSV file next to its final name, then renames it into place,
/// so a reader never observes a half-written export.
#[derive(Debug, Default, Clone)]
pub struct CsvSink {
    directory: Option<PathBuf>,
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory for generated file names. Explicit destinations ignore it.
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    fn resolve(&self, destination: Option<&Path>) -> PathBuf {
        match (destination, &self.directory) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(dir)) => dir.join(default_file_name()),
            (None, None) => default_file_name(),
        }
    }
}

impl ResultSink for CsvSink {
    fn write(
        &self,
        records: &[ScanRecord],
        destination: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        let path = self.resolve(destination);
        let tmp = tmp_path(&path);

        let written = File::create(&tmp)
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|file| write_records(BufWriter::new(file), records, &path))
            .and_then(|()| {
                fs::rename(&tmp, &path).map_err(|source| ExportError::Io {
                    path: path.clone(),
                    source,
                })
            });

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        debug!("Wrote {} row(s) to {}", records.len(), path.display());
        success!("Results exported to: {}", path.display());
        Ok(path)
    }
}

/// `scan_results_YYYYMMDD_HHMMSS.csv`, stamped with local time.
pub fn default_file_name() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("scan_results_{stamp}.csv"))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serializes the header and every record into `out`.
pub fn write_records<W: Write>(
    out: W,
    records: &[ScanRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER).map_err(csv_err)?;
    for record in records {
        writer.write_record(to_row(record)).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn to_row(record: &ScanRecord) -> [String; 6] {
    let identity = &record.identity;
    [
        record.target.to_string(),
        record.status().to_string(),
        identity.hostname().unwrap_or_default().to_string(),
        identity.aliases().join(LIST_SEPARATOR),
        identity.addresses().join(LIST_SEPARATOR),
        identity.error().unwrap_or_default().to_string(),
    ]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
