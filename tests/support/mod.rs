#![allow(dead_code)]

//! Builder for documents assembled byte by byte.

use chainring::sans::check::compute_crc;

pub const ENUM: u8 = 0x00;
pub const SINT8: u8 = 0x01;
pub const UINT8: u8 = 0x02;
pub const SINT16: u8 = 0x83;
pub const UINT16: u8 = 0x84;
pub const SINT32: u8 = 0x85;
pub const UINT32: u8 = 0x86;
pub const STRING: u8 = 0x07;
pub const FLOAT32: u8 = 0x88;
pub const FLOAT64: u8 = 0x89;
pub const UINT8Z: u8 = 0x0A;
pub const UINT16Z: u8 = 0x8B;
pub const UINT32Z: u8 = 0x8C;
pub const BYTE: u8 = 0x0D;
pub const SINT64: u8 = 0x8E;
pub const UINT64: u8 = 0x8F;
pub const UINT64Z: u8 = 0x90;

pub struct Document {
    header_size: u8,
    data_type: [u8; 4],
    records: Vec<u8>,
    data_size: Option<u32>,
    header_crc: Option<u16>,
    file_crc: Option<u16>,
    trailing: Vec<u8>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            header_size: 14,
            data_type: *b".FIT",
            records: Vec::new(),
            data_size: None,
            header_crc: None,
            file_crc: None,
            trailing: Vec::new(),
        }
    }

    pub fn header_size(mut self, size: u8) -> Self {
        self.header_size = size;
        self
    }

    pub fn data_type(mut self, data_type: &[u8; 4]) -> Self {
        self.data_type = *data_type;
        self
    }

    /// Declare a data region size other than the size of the records added.
    pub fn data_size(mut self, size: u32) -> Self {
        self.data_size = Some(size);
        self
    }

    pub fn header_crc(mut self, crc: u16) -> Self {
        self.header_crc = Some(crc);
        self
    }

    pub fn file_crc(mut self, crc: u16) -> Self {
        self.file_crc = Some(crc);
        self
    }

    pub fn trailing(mut self, r: &[u8]) -> Self {
        self.trailing.extend_from_slice(r);
        self
    }

    /// Add a little endian definition record.
    pub fn definition(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_with(local, 0, global, fields, None)
    }

    /// Add a definition record with a given architecture byte, and developer
    /// fields if supplied.
    pub fn definition_with(
        mut self,
        local: u8,
        architecture: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        developer_fields: Option<&[(u8, u8, u8)]>,
    ) -> Self {
        let developer = if developer_fields.is_some() { 0x20 } else { 0x00 };
        self.records.push(0x40 | developer | (local & 0x0F));

        let global = if architecture == 1 {
            global.to_be_bytes()
        } else {
            global.to_le_bytes()
        };
        self.records.extend_from_slice(&[0x00, architecture]);
        self.records.extend_from_slice(&global);

        self.records.push(fields.len() as u8);
        for &(number, size, base_type) in fields {
            self.records.extend_from_slice(&[number, size, base_type]);
        }

        if let Some(developer_fields) = developer_fields {
            self.records.push(developer_fields.len() as u8);
            for &(number, size, index) in developer_fields {
                self.records.extend_from_slice(&[number, size, index]);
            }
        }

        self
    }

    /// Add a data record with a normal header.
    pub fn data(mut self, local: u8, body: &[u8]) -> Self {
        self.records.push(local & 0x0F);
        self.records.extend_from_slice(body);
        self
    }

    /// Add a data record with a compressed timestamp header.
    pub fn compressed(mut self, local: u8, offset: u8, body: &[u8]) -> Self {
        self.records.push(0x80 | ((local & 0x03) << 5) | (offset & 0x1F));
        self.records.extend_from_slice(body);
        self
    }

    /// Add bytes to the data region verbatim.
    pub fn raw(mut self, r: &[u8]) -> Self {
        self.records.extend_from_slice(r);
        self
    }

    /// Number of data region bytes added so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn build(&self) -> Vec<u8> {
        let data_size = self.data_size.unwrap_or(self.records.len() as u32);

        let mut out = vec![self.header_size, 0x20];
        out.extend_from_slice(&2195u16.to_le_bytes());
        out.extend_from_slice(&data_size.to_le_bytes());
        out.extend_from_slice(&self.data_type);

        if self.header_size == 14 {
            let crc = self.header_crc.unwrap_or_else(|| compute_crc(0, &out));
            out.extend_from_slice(&crc.to_le_bytes());
        }

        out.extend_from_slice(&self.records);

        let crc = self.file_crc.unwrap_or_else(|| compute_crc(0, &out));
        out.extend_from_slice(&crc.to_le_bytes());

        out.extend_from_slice(&self.trailing);
        out
    }
}
