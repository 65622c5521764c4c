use anyhow::{Context, Result};
use tracing::warn;

/// Decides whether a new CSV version materially differs from the stored one.
///
/// Columns listed in `ignore_columns` are dropped from both sides before the
/// comparison, so a new `Stand` alone never triggers a write.
#[derive(Debug, Clone, Default)]
pub struct TableComparer {
    ignore_columns: Vec<String>,
}

struct Projected {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableComparer {
    pub fn ignoring<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignore_columns
    }

    /// Returns `true` if `current` should replace `previous`.
    ///
    /// An unreadable previous version counts as different; an unreadable
    /// current version is an error.
    pub fn differs(&self, previous: &[u8], current: &[u8]) -> Result<bool> {
        let current = self
            .project(current)
            .context("new table is not valid CSV")?;
        let previous = match self.project(previous) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Stored table is unreadable, treating as changed");
                return Ok(true);
            }
        };

        Ok(previous.header != current.header || previous.rows != current.rows)
    }

    fn project(&self, bytes: &[u8]) -> Result<Projected> {
        let mut rdr = csv::Reader::from_reader(bytes);
        let headers = rdr.headers()?.clone();

        let keep: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !self.ignore_columns.iter().any(|c| c.as_str() == *name))
            .map(|(i, _)| i)
            .collect();

        let header = keep.iter().map(|&i| headers[i].to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(
                keep.iter()
                    .map(|&i| record.get(i).unwrap_or_default().to_string())
                    .collect(),
            );
        }

        Ok(Projected { header, rows })
    }
}
