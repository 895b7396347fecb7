//! Minimal `.xlsx` workbooks written for loader tests.

use anyhow::Result;
use std::{fs::File, io::Write, path::Path};
use zip::{write::SimpleFileOptions, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// Excel serial day, rendered with the built-in date format.
    Date(f64),
    Blank,
}

/// Write a one-sheet workbook to `path`. Row 1 is the first entry of `rows`;
/// the first cell of each row lands in column `first_col` (0 = A).
pub fn write_xlsx(path: &Path, first_col: usize, rows: &[Vec<Cell>]) -> Result<()> {
    let mut strings: Vec<&str> = Vec::new();
    let mut sheet = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><worksheet xmlns=\"{}\"><sheetData>", MAIN_NS);
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, cell) in row.iter().enumerate() {
            let at = format!("{}{}", column_letter(first_col + c), r + 1);
            match cell {
                Cell::Text(s) => {
                    sheet.push_str(&format!("<c r=\"{}\" t=\"s\"><v>{}</v></c>", at, strings.len()));
                    strings.push(*s);
                }
                Cell::Number(n) => sheet.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", at, n)),
                Cell::Date(n) => sheet.push_str(&format!("<c r=\"{}\" s=\"1\"><v>{}</v></c>", at, n)),
                Cell::Blank => {}
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let shared: String = strings
        .iter()
        .map(|s| format!("<si><t>{}</t></si>", escape(s)))
        .collect();

    let mut zip = ZipWriter::new(File::create(path)?);
    let mut entry = |name: &str, body: String| -> Result<()> {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };
    entry(
        "[Content_Types].xml",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"xml\" ContentType=\"application/xml\"></Default>\
         </Types>"
            .to_string(),
    )?;
    entry(
        "xl/workbook.xml",
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <workbook xmlns=\"{}\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <sheets><sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"></sheet></sheets></workbook>",
            MAIN_NS
        ),
    )?;
    entry(
        "xl/_rels/workbook.xml.rels",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"></Relationship>\
         </Relationships>"
            .to_string(),
    )?;
    // style 1 is numFmtId 14, Excel's built-in short date
    entry(
        "xl/styles.xml",
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <styleSheet xmlns=\"{}\"><cellXfs count=\"2\">\
             <xf numFmtId=\"0\"></xf><xf numFmtId=\"14\" applyNumberFormat=\"1\"></xf>\
             </cellXfs></styleSheet>",
            MAIN_NS
        ),
    )?;
    entry(
        "xl/sharedStrings.xml",
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><sst xmlns=\"{}\" count=\"{n}\" uniqueCount=\"{n}\">{}</sst>",
            MAIN_NS,
            shared,
            n = strings.len()
        ),
    )?;
    entry("xl/worksheets/sheet1.xml", sheet)?;
    zip.finish()?;
    Ok(())
}

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
