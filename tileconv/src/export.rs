//! Export payload handed to code formatters, and the file writers built on
//! top of it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use serde::Serialize;

use crate::codec::PaletteData;
use crate::error::Result;

/// Width of the values in an export line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Bytes,
    Words,
}

/// One annotated sequence of values, e.g. one tile or one map row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLine {
    pub kind: DataKind,
    pub values: Vec<u16>,
    pub comment: String,
}

impl ExportLine {
    pub fn bytes(values: &[u8], comment: impl Into<String>) -> Self {
        ExportLine {
            kind: DataKind::Bytes,
            values: values.iter().map(|&b| b as u16).collect(),
            comment: comment.into(),
        }
    }

    pub fn words(values: Vec<u16>, comment: impl Into<String>) -> Self {
        ExportLine {
            kind: DataKind::Words,
            values,
            comment: comment.into(),
        }
    }

    pub fn palette(data: PaletteData, comment: impl Into<String>) -> Self {
        match data {
            PaletteData::Bytes(bytes) => ExportLine::bytes(&bytes, comment),
            PaletteData::Words(words) => ExportLine::words(words, comment),
        }
    }

    /// Raw bytes of the line, words low byte first
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self.kind {
            DataKind::Bytes => self.values.iter().map(|&v| v as u8).collect(),
            DataKind::Words => self.values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Space separated hex values: two digits per byte, four per word
    pub fn to_hex(&self) -> String {
        self.values
            .iter()
            .map(|&v| match self.kind {
                DataKind::Bytes => hex::encode([v as u8]),
                DataKind::Words => hex::encode(v.to_be_bytes()),
            })
            .join(" ")
    }
}

/// Concatenate the raw bytes of every line
pub fn flatten(lines: &[ExportLine]) -> Vec<u8> {
    lines.iter().flat_map(ExportLine::to_le_bytes).collect()
}

/// Write the concatenated bytes of `lines` to a binary file
pub fn write_binary(path: impl AsRef<Path>, lines: &[ExportLine]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&flatten(lines))?;
    Ok(())
}

/// Write one hex line per export line
pub fn write_hex(path: impl AsRef<Path>, lines: &[ExportLine]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(&mut file, "{}", line.to_hex())?;
    }
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_bytes() {
        let line = ExportLine::bytes(&[0x01, 0xff], "Tile 00");
        assert_eq!(line.to_le_bytes(), vec![0x01, 0xff]);
        assert_eq!(line.to_hex(), "01 ff");

        let line = ExportLine::words(vec![0x7fff, 0x0010], "Palette 0");
        assert_eq!(line.to_le_bytes(), vec![0xff, 0x7f, 0x10, 0x00]);
        assert_eq!(line.to_hex(), "7fff 0010");
    }

    #[test]
    fn test_palette_line_kind() {
        let line = ExportLine::palette(PaletteData::Bytes(vec![0xe4]), "Palette 0");
        assert_eq!(line.kind, DataKind::Bytes);
        let line = ExportLine::palette(PaletteData::Words(vec![1, 2, 3, 4]), "Palette 1");
        assert_eq!(line.kind, DataKind::Words);
        assert_eq!(line.values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_serialize_line() {
        let line = ExportLine::bytes(&[3], "Row 0");
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["kind"], "bytes");
        assert_eq!(json["comment"], "Row 0");
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let lines = vec![
            ExportLine::bytes(&[0x10, 0x20], "Row 0"),
            ExportLine::bytes(&[0x30], "Row 1"),
        ];

        let bin = dir.path().join("map.bin");
        write_binary(&bin, &lines).unwrap();
        assert_eq!(std::fs::read(&bin).unwrap(), vec![0x10, 0x20, 0x30]);

        let hex = dir.path().join("map.hex");
        write_hex(&hex, &lines).unwrap();
        assert_eq!(std::fs::read_to_string(&hex).unwrap(), "10 20\n30\n");
    }
}
