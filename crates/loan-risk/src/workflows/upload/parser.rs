use super::mapping::canonical_column;
use std::io::Read;

/// Header and raw rows read from a delimited upload.
#[derive(Debug)]
pub(crate) struct RawUpload {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

pub(crate) fn read_upload<R: Read>(reader: R, delimiter: u8) -> Result<RawUpload, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = csv_reader
        .headers()?
        .iter()
        .map(canonical_column)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawUpload { columns, rows })
}
