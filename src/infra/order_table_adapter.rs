use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::constants::{
    COL_ADDRESS, COL_AMOUNT, COL_CITY, COL_ID, COL_LABEL, COL_PLATFORM, COL_QUANTITY,
    COL_RECIPIENT, COL_STATE, COL_ZIP, INPUT_COLUMNS, OUTPUT_COLUMNS,
};
use crate::domain::{MergedShipment, NormalizedOrderRow};
use crate::error::{PackerError, Result};

const ORDER_TABLE: &str = "order table";

/// Header positions of the input columns
struct ColumnIndex {
    positions: [usize; INPUT_COLUMNS.len()],
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut positions = [0; INPUT_COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(INPUT_COLUMNS) {
            *slot = headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or_else(|| PackerError::MissingColumn {
                    table: ORDER_TABLE.to_string(),
                    column: column.to_string(),
                })?;
        }
        Ok(Self { positions })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        INPUT_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| record.get(self.positions[i]))
            .unwrap_or("")
            .trim()
    }
}

/// Non-numeric amounts count as zero
fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Accepts `3` as well as spreadsheet-style `3.0`; anything else counts as zero
fn parse_quantity(raw: &str) -> i64 {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        })
        .unwrap_or(0)
}

/// Reads the normalized order table. A missing required column aborts the batch.
pub fn read_orders(path: &Path) -> Result<Vec<NormalizedOrderRow>> {
    let file = File::open(path)?;
    let rows = read_orders_from(file)?;
    info!("Read {} order rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_orders_from<R: Read>(reader: R) -> Result<Vec<NormalizedOrderRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(NormalizedOrderRow {
            id: index.get(&record, COL_ID).to_string(),
            recipient: index.get(&record, COL_RECIPIENT).to_string(),
            address: index.get(&record, COL_ADDRESS).to_string(),
            city: index.get(&record, COL_CITY).to_string(),
            state: index.get(&record, COL_STATE).to_string(),
            zip: index.get(&record, COL_ZIP).to_string(),
            annotation: index.get(&record, COL_LABEL).to_string(),
            quantity: parse_quantity(index.get(&record, COL_QUANTITY)),
            amount: parse_amount(index.get(&record, COL_AMOUNT)),
            platform: index.get(&record, COL_PLATFORM).to_string(),
        });
    }
    debug!("Parsed {} rows", rows.len());
    Ok(rows)
}

fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Writes shipments in the given order with the output column layout
pub fn write_shipments_to<W: Write>(writer: W, shipments: &[MergedShipment]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(OUTPUT_COLUMNS)?;
    for shipment in shipments {
        writer.write_record([
            shipment.joined_ids().as_str(),
            shipment.recipient.as_str(),
            shipment.address.as_str(),
            shipment.city.as_str(),
            shipment.state.as_str(),
            shipment.zip.as_str(),
            shipment.annotation.as_str(),
            format_amount(shipment.amount).as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the merged table next to its destination and renames it into place, so a failed
/// run never leaves a partial file behind.
pub fn write_shipments(path: &Path, shipments: &[MergedShipment]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    write_shipments_to(staged.as_file_mut(), shipments)?;
    staged.persist(path).map_err(|e| PackerError::Io(e.error))?;

    info!("Wrote {} shipments to {}", shipments.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,rname,address,city,state,zip,custom_label,Quantity,amt,source_platform\n";

    #[test]
    fn test_read_orders_trims_and_coerces() {
        let data = format!(
            "{}{}{}",
            HEADER,
            " 11-22222-33333 , Jo , 1 Main St ,Melbourne,VIC,3000, [NG]/[C5]A*1 ,2,12.50,ebay\n",
            "A2,Sam,2 Side Rd,Sydney,NSW,2000,[SP]/[C4]B*1,1.0,AU $9,shopify\n"
        );

        let rows = read_orders_from(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "11-22222-33333");
        assert_eq!(rows[0].address, "1 Main St");
        assert_eq!(rows[0].annotation, "[NG]/[C5]A*1");
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].amount, 12.5);
        assert_eq!(rows[1].quantity, 1);
        assert_eq!(rows[1].amount, 0.0);
    }

    #[test]
    fn test_columns_may_come_in_any_order() {
        let data = "source_platform,amt,Quantity,custom_label,zip,state,city,address,rname,id\n\
                    kogan,4,1,[KG]/[Small]X,3000,VIC,Melbourne,1 Main St,Jo,K1\n";
        let rows = read_orders_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].id, "K1");
        assert_eq!(rows[0].platform, "kogan");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let data = "id,rname,address,city,state,zip,custom_label,Quantity,source_platform\n";
        match read_orders_from(data.as_bytes()) {
            Err(PackerError::MissingColumn { column, .. }) => assert_eq!(column, "amt"),
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_shipments_layout() {
        let shipment = MergedShipment {
            ids: vec!["A1".to_string(), "A2".to_string()],
            recipient: "Jo".to_string(),
            address: "1 Main St".to_string(),
            city: "Melbourne".to_string(),
            state: "VIC".to_string(),
            zip: "3000".to_string(),
            platform: "ebay".to_string(),
            annotation: "[NG]/[C5] A *2".to_string(),
            quantity: 2,
            amount: 10.0,
        };

        let mut out = Vec::new();
        write_shipments_to(&mut out, &[shipment]).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,rname,address,city,state,zip,custom_label,amt",
                "\"A1, A2\",Jo,1 Main St,Melbourne,VIC,3000,[NG]/[C5] A *2,10.00",
            ]
        );
    }
}
