use std::fmt;
use std::path::{Path, PathBuf};

/// Address of one cached aggregate: `<data_folder>/<year>/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub year: String,
    pub name: String,
}

impl CacheKey {
    pub fn new(year: &str, name: &str) -> Self {
        Self {
            year: year.to_string(),
            name: name.to_string(),
        }
    }

    pub fn path(&self, data_folder: &Path) -> PathBuf {
        data_folder.join(&self.year).join(&self.name)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Month(String),
    Months(Vec<String>),
}

/// A unit of work: one month of raw logs, or a set of cached months of one year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub data_folder: PathBuf,
    pub year: String,
    pub span: Span,
}

impl Period {
    pub fn month(data_folder: &Path, year: &str, month: &str) -> Self {
        Self {
            data_folder: data_folder.to_path_buf(),
            year: year.to_string(),
            span: Span::Month(month.to_string()),
        }
    }

    pub fn year(data_folder: &Path, year: &str, months: &[String]) -> Self {
        Self {
            data_folder: data_folder.to_path_buf(),
            year: year.to_string(),
            span: Span::Months(months.to_vec()),
        }
    }

    /// Directory holding the raw logs of a single month (`<data_folder>/<year><month>`)
    pub fn raw_dir(&self) -> Option<PathBuf> {
        match &self.span {
            Span::Month(month) => Some(self.data_folder.join(format!("{}{}", self.year, month))),
            Span::Months(_) => None,
        }
    }

    /// Directory holding the cached aggregates of this period's year
    pub fn cache_dir(&self) -> PathBuf {
        self.data_folder.join(&self.year)
    }

    /// Cache key for a single month
    pub fn cache_key(&self) -> Option<CacheKey> {
        match &self.span {
            Span::Month(month) => Some(CacheKey::new(&self.year, month)),
            Span::Months(_) => None,
        }
    }

    pub fn months(&self) -> Vec<&str> {
        match &self.span {
            Span::Month(month) => vec![month.as_str()],
            Span::Months(months) => months.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Span::Month(month) => write!(f, "{}-{}", self.year, month),
            Span::Months(months) => write!(f, "{} [{}]", self.year, months.join(",")),
        }
    }
}
