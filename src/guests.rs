use crate::render::RenderError;

/// Extract guest names from an uploaded delimited-text file: first column
/// of every data row, in file order. The leading row is a header and is
/// consumed; blank first columns are skipped.
pub fn parse_guest_list(bytes: &[u8]) -> Result<Vec<String>, RenderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut guests = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| RenderError::Input(format!("invalid guest list: {e}")))?;
        let Some(first) = record.get(0) else {
            continue;
        };
        let name = first.trim();
        if name.is_empty() {
            continue;
        }
        guests.push(name.to_string());
    }
    Ok(guests)
}
