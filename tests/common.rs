#![allow(dead_code)]

use inventory_eoq_service::table::{CellValue, RawTable};

/// Inventory export with padded headers, an extraneous column and messy numbers
pub const SAMPLE_CSV: &str = concat!(
    " Item ,Descript,Qty On Hand,Unit Cost,Curr Year Usage,Warehouse Notes\n",
    "A1,Hex bolt,\"1,200\",$2.50,500,aisle 3\n",
    "A2,Washer,15,N/A,40,\n",
    "A3,Free sample,0,$0.00,12,\n",
    ",,,,,orphan note\n",
    "A4,Returned stock,\"$1,000.00\",$4.00,-25,\n",
);

/// Workbook whose first sheet mirrors `SAMPLE_CSV`; a second "Archive" sheet must be ignored
pub const SAMPLE_XLSX_PATH: &str = "sample-data-files/inventory_sample.xlsx";

pub fn sample_xlsx() -> Vec<u8> {
    std::fs::read(SAMPLE_XLSX_PATH).expect("sample workbook should be readable")
}

pub const MULTIPART_BOUNDARY: &str = "inventory-test-boundary";

pub fn raw_table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(|v| CellValue::from_text(*v)).collect());
    }
    table
}

/// Build a multipart/form-data body with one file part and optional text fields
pub fn multipart_body(filename: &str, contents: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
