//! Loads tabular files into records through polars.

use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::DashError;
use crate::record::{ColumnDescriptor, Record, Value};

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// A loaded file: its records plus one descriptor per column.
#[derive(Debug)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
    pub columns: Vec<ColumnDescriptor>,
}

pub fn load_data_file(path: PathBuf) -> Result<Dataset, DashError> {
    let file_info = get_file_info(path)?;
    debug!(
        "Loading {:?} file {} ({} bytes)",
        file_info.file_type,
        file_info.path.display(),
        file_info.file_size
    );
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    // Each column is converted in its own rayon task.
    let start_time = Instant::now();
    let df = frame.collect()?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let loaded: Result<Vec<Vec<Value>>, _> = names
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = loaded?;

    let mut cells: Vec<_> = columns.into_iter().map(|c| c.into_iter()).collect();
    let records: Vec<Record> = (0..df.height())
        .map(|_| {
            names
                .iter()
                .zip(cells.iter_mut())
                .map(|(name, cell)| (name.clone(), cell.next().unwrap_or(Value::Null)))
                .collect()
        })
        .collect();

    info!(
        "Loaded {} records with {} columns in {}ms",
        records.len(),
        names.len(),
        start_time.elapsed().as_millis()
    );

    Ok(Dataset {
        name: file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string(),
        records,
        columns: names
            .iter()
            .map(|name| ColumnDescriptor::new(name.as_str(), name.as_str()))
            .collect(),
    })
}

fn detect_file_type(path: &Path) -> Result<FileType, DashError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DashError::UnknownFileType),
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<Value>, PolarsError> {
    let column = df.column(col_name)?;
    if is_numeric_type(column.dtype()) {
        let col = column.cast(&DataType::Float64)?;
        let series = col.f64()?;
        return Ok(series
            .into_iter()
            .map(|v| v.map(Value::Number).unwrap_or(Value::Null))
            .collect());
    }

    let col = column.cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| match value {
            Some(s) => Value::Text(s.replace("\r\n", " ↵ ").replace('\n', " ↵ ")),
            None => Value::Null,
        })
        .collect())
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, DashError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DashError::FileNotFound,
        ErrorKind::PermissionDenied => DashError::PermissionDenied,
        _ => DashError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DashError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
