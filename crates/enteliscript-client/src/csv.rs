//! Row stream for CSV-driven batch property writes.
//!
//! The file format is a header row
//! `site_name, device, object_type, instance, property_name, property_value`
//! followed by one write per row. Rows are streamed, never collected, so
//! arbitrarily large batch files work and abandoning the iterator early is
//! free.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use enteliscript_types::error::{EnteliError, Result};
use enteliscript_types::ObjectRef;

/// Expected header columns, in order.
pub const CSV_COLUMNS: [&str; 6] = [
    "site_name",
    "device",
    "object_type",
    "instance",
    "property_name",
    "property_value",
];

/// One parsed batch-write row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub site: String,
    pub device: String,
    pub object: ObjectRef,
    pub property: String,
    pub value: String,
}

impl CsvRow {
    /// Human-readable path of the property this row targets,
    /// e.g. `MainSite/dev1/AV3/present-value`.
    pub fn property_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.site, self.device, self.object, self.property
        )
    }
}

/// Streaming iterator over the rows of a batch-write CSV file.
#[derive(Debug)]
pub struct CsvRows<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl CsvRows<BufReader<File>> {
    /// Open a CSV file and validate its header row.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> CsvRows<R> {
    /// Build a row stream from any buffered reader. Consumes and validates
    /// the header line.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(EnteliError::Csv("empty file (no header row)".to_string())),
        };
        let fields = split_fields(&header);
        let names: Vec<String> = fields
            .iter()
            .map(|f| f.trim().to_ascii_lowercase())
            .collect();
        if names != CSV_COLUMNS {
            return Err(EnteliError::Csv(format!(
                "bad header '{header}' (expected {})",
                CSV_COLUMNS.join(", ")
            )));
        }
        Ok(Self { lines, line_no: 1 })
    }

    fn parse_row(&self, line: &str) -> Result<CsvRow> {
        let fields = split_fields(line);
        if fields.len() != CSV_COLUMNS.len() {
            return Err(EnteliError::Csv(format!(
                "line {}: expected {} columns, got {}",
                self.line_no,
                CSV_COLUMNS.len(),
                fields.len()
            )));
        }
        let instance: u32 = fields[3].trim().parse().map_err(|_| {
            EnteliError::Csv(format!(
                "line {}: bad instance number '{}'",
                self.line_no,
                fields[3].trim()
            ))
        })?;
        Ok(CsvRow {
            site: fields[0].trim().to_string(),
            device: fields[1].trim().to_string(),
            object: ObjectRef::new(fields[2].trim(), instance),
            property: fields[4].trim().to_string(),
            value: fields[5].clone(),
        })
    }
}

impl<R: BufRead> Iterator for CsvRows<R> {
    type Item = Result<CsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_row(&line));
        }
    }
}

/// Split one CSV line into fields, honoring double-quoted fields that may
/// contain commas and `""` escapes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            }
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    const HEADER: &str = "site_name,device,object_type,instance,property_name,property_value";

    fn rows_of(text: &str) -> CsvRows<Cursor<Vec<u8>>> {
        CsvRows::from_reader(Cursor::new(text.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn parses_simple_rows() {
        let text = format!("{HEADER}\nMain,dev1,AV,1,present-value,72.5\n");
        let rows: Vec<_> = rows_of(&text).collect();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.site, "Main");
        assert_eq!(row.device, "dev1");
        assert_eq!(row.object, ObjectRef::new("AV", 1));
        assert_eq!(row.property, "present-value");
        assert_eq!(row.value, "72.5");
    }

    #[test]
    fn property_path_format() {
        let text = format!("{HEADER}\nMain,dev1,av,3,description,Lobby\n");
        let row = rows_of(&text).next().unwrap().unwrap();
        assert_eq!(row.property_path(), "Main/dev1/AV3/description");
    }

    #[test]
    fn skips_blank_lines() {
        let text = format!("{HEADER}\n\nMain,dev1,AV,1,p,v\n\n");
        let rows: Vec<_> = rows_of(&text).collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn quoted_field_keeps_comma() {
        let text = format!("{HEADER}\nMain,dev1,AV,1,description,\"Lobby, east wing\"\n");
        let row = rows_of(&text).next().unwrap().unwrap();
        assert_eq!(row.value, "Lobby, east wing");
    }

    #[test]
    fn doubled_quote_escapes() {
        let text = format!("{HEADER}\nMain,dev1,AV,1,description,\"say \"\"hi\"\"\"\n");
        let row = rows_of(&text).next().unwrap().unwrap();
        assert_eq!(row.value, "say \"hi\"");
    }

    #[test]
    fn header_is_case_insensitive() {
        let text = "Site_Name, Device, Object_Type, Instance, Property_Name, Property_Value\n";
        assert!(CsvRows::from_reader(Cursor::new(text.as_bytes().to_vec())).is_ok());
    }

    #[test]
    fn rejects_wrong_header() {
        let text = "a,b,c\n";
        let err = CsvRows::from_reader(Cursor::new(text.as_bytes().to_vec())).unwrap_err();
        assert!(format!("{err}").contains("bad header"));
    }

    #[test]
    fn rejects_empty_file() {
        assert!(CsvRows::from_reader(Cursor::new(Vec::new())).is_err());
    }

    #[test]
    fn bad_column_count_names_line() {
        let text = format!("{HEADER}\nMain,dev1,AV,1,p\n");
        let err = rows_of(&text).next().unwrap().unwrap_err();
        assert!(format!("{err}").contains("line 2"));
    }

    #[test]
    fn bad_instance_names_line() {
        let text = format!("{HEADER}\nMain,dev1,AV,one,p,v\n");
        let err = rows_of(&text).next().unwrap().unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("line 2"));
        assert!(msg.contains("one"));
    }

    #[test]
    fn errors_do_not_stop_the_stream() {
        let text = format!("{HEADER}\nMain,dev1,AV,one,p,v\nMain,dev1,AV,2,p,v\n");
        let rows: Vec<_> = rows_of(&text).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_err());
        assert!(rows[1].is_ok());
    }
}
