//! CSV parser for the district feed.

use crate::error::TransformError;
use crate::record::{CaseRecord, SOURCE_COLUMNS};
use tracing::debug;

/// Decodes the raw feed into typed [`CaseRecord`]s.
///
/// # Errors
///
/// Returns [`TransformError::MissingColumn`] if the header lacks one of the
/// expected columns, [`TransformError::EmptyTable`] if there are no data
/// rows, and [`TransformError::Csv`] for malformed rows or cells that do not
/// hold a value of the column's type (including fractional counts).
pub fn parse_table(bytes: &[u8]) -> Result<Vec<CaseRecord>, TransformError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);

    let headers = rdr.headers()?.clone();
    for column in SOURCE_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(TransformError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: CaseRecord = result?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(TransformError::EmptyTable);
    }

    debug!(rows = records.len(), columns = headers.len(), "Source table parsed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "IdLandkreis,Bundesland,IdBundesland,Landkreis,Faelle,FaelleDelta,Todesfaelle,TodesfaelleDelta,Genesen,GenesenDelta,population,Inzidenz,Todesrate,NeueFaelleLetzte7Tage,InzidenzLetzte7Tage";

    #[test]
    fn test_parse_valid_rows() {
        let csv = format!(
            "{HEADER}\n1001,Schleswig-Holstein,1,SK Flensburg,120,2,3,0,110,1,90164,133.09,3.33,5,5.55\n"
        );
        let records = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1001);
        assert_eq!(records[0].district, "SK Flensburg");
        assert_eq!(records[0].cases, 120);
        assert_eq!(records[0].incidence, Some(133.09));
    }

    #[test]
    fn test_parse_accepts_float_rendered_counts_and_extra_columns() {
        let csv = format!(
            "{HEADER},Stand\n1001.0,Schleswig-Holstein,1.0,SK Flensburg,120.0,2,3,0,110,1,90164,133.09,3.33,5.0,5.55,01.01.21\n"
        );
        let records = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(records[0].id, 1001);
        assert_eq!(records[0].state_id, 1);
        assert_eq!(records[0].new_cases_7d, 5);
    }

    #[test]
    fn test_parse_keeps_empty_rate_as_none() {
        let csv = format!(
            "{HEADER}\n1001,Schleswig-Holstein,1,SK Flensburg,120,2,3,0,110,1,90164,,3.33,5,\n"
        );
        let records = parse_table(csv.as_bytes()).unwrap();
        assert_eq!(records[0].incidence, None);
        assert_eq!(records[0].death_rate, Some(3.33));
        assert_eq!(records[0].incidence_7d, None);
    }

    #[test]
    fn test_parse_rejects_fractional_count() {
        let csv = format!(
            "{HEADER}\n1001,Schleswig-Holstein,1,SK Flensburg,120.5,2,3,0,110,1,90164,133.09,3.33,5,5.55\n"
        );
        assert!(matches!(
            parse_table(csv.as_bytes()),
            Err(TransformError::Csv(_))
        ));
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "IdLandkreis,Bundesland\n1001,Schleswig-Holstein\n";
        match parse_table(csv.as_bytes()) {
            Err(TransformError::MissingColumn(name)) => assert_eq!(name, "IdBundesland"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_header_only_is_empty_table() {
        let csv = format!("{HEADER}\n");
        assert!(matches!(
            parse_table(csv.as_bytes()),
            Err(TransformError::EmptyTable)
        ));
    }
}
