use crate::error::{Result, StatsError};
use crate::model::{Period, RawRecord};
use nom::{
    bytes::complete::take_till1,
    character::complete::{space0, space1},
    multi::separated_list1,
    sequence::delimited,
    IResult, Parser,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse one whitespace-delimited field
fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace()).parse(input)
}

/// Parse all fields of a line, ignoring leading and trailing blanks
fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(space0, separated_list1(space1, field), space0).parse(input)
}

/// Parse a single hand-history line into a record
pub fn parse_line(line: &str) -> Result<RawRecord> {
    let (rest, parts) =
        fields(line.trim_end()).map_err(|e| StatsError::InvalidRecord(e.to_string()))?;
    if !rest.is_empty() {
        return Err(StatsError::InvalidRecord(format!("unexpected input '{}'", rest)));
    }
    RawRecord::from_fields(&parts)
}

/// Read records from the content of one log file.
///
/// Blank lines are skipped. The first malformed line aborts the read.
pub fn read_pdb(content: &str, path: &Path) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_line(line).map_err(|e| e.at(path, idx + 1))?;
        records.push(record);
    }

    Ok(records)
}

/// Read records from a log file
pub fn read_pdb_file(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path).map_err(|source| StatsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_pdb(&content, path)
}

/// Recursively collect files under `dir` whose name starts with `prefix`, in path order
pub fn find_log_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_log_files(dir, prefix, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_log_files(dir: &Path, prefix: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_log_files(&path, prefix, files)?;
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        if matches {
            files.push(path);
        } else {
            log::debug!("skipping {}", path.display());
        }
    }
    Ok(())
}

/// Read every log file under a directory into one record list.
///
/// A missing directory, or one without matching files, yields no records.
pub fn read_dir_records(dir: &Path, prefix: &str) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for path in find_log_files(dir, prefix)? {
        log::info!("working on file {}", path.display());
        records.extend(read_pdb_file(&path)?);
    }
    Ok(records)
}

/// Read the raw records of a single-month period
pub fn read_period(period: &Period, prefix: &str) -> Result<Vec<RawRecord>> {
    let dir = period
        .raw_dir()
        .ok_or_else(|| StatsError::Config(format!("period {} has no raw log directory", period)))?;
    read_dir_records(&dir, prefix)
}
