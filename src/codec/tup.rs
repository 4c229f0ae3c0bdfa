//! TUP attribute bag: named byte blobs carried in one TARS map.

use std::collections::BTreeMap;

use super::{DecodeError, EncodeError, TarsReader, TarsWriter};

/// Keys under which a return value is stored. Readers accept either one.
pub const RETURN_KEYS: [&str; 2] = ["", "tars_ret"];

/// A string-keyed bag of independently TARS-encoded blobs.
///
/// On the wire this is a single `Map` at tag 0 whose keys are strings (tag 0)
/// and whose values are byte vectors (tag 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniAttribute {
    data: BTreeMap<String, Vec<u8>>,
}

impl UniAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Store an already encoded blob under `name`, replacing any previous one.
    pub fn put_buffer(&mut self, name: impl Into<String>, buffer: Vec<u8>) {
        self.data.insert(name.into(), buffer);
    }

    pub fn get_buffer(&self, name: &str) -> Option<&[u8]> {
        self.data.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Store a return value blob under every return key.
    pub fn put_return(&mut self, buffer: Vec<u8>) {
        for key in RETURN_KEYS {
            self.data.insert(key.to_string(), buffer.clone());
        }
    }

    /// Look up a return value blob under any of the return keys.
    pub fn get_return(&self) -> Option<&[u8]> {
        RETURN_KEYS.iter().find_map(|key| self.get_buffer(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn encode(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
        writer.write_map_header(self.data.len(), 0)?;
        for (key, value) in &self.data {
            writer.write_string(key, 0)?;
            writer.write_bytes(value, 1)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = TarsWriter::new();
        self.encode(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode an attribute bag. An absent map decodes as an empty bag.
    pub fn decode(reader: &mut TarsReader<'_>) -> Result<Self, DecodeError> {
        let mut data = BTreeMap::new();
        if let Some(len) = reader.read_map_header(0, false)? {
            for _ in 0..len {
                let key = super::reader::required(reader.read_string(0, true)?, 0)?;
                let value = super::reader::required(reader.read_bytes(1, true)?, 1)?;
                data.insert(key, value);
            }
        }
        Ok(Self { data })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(&mut TarsReader::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_layout() {
        let mut attr = UniAttribute::new();
        attr.put_buffer("a", vec![0x0c]);
        let bytes = attr.to_bytes().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x08, 0x00, 0x01, // map at tag 0, one pair
                0x06, 0x01, b'a', // key
                0x1d, 0x00, 0x00, 0x01, 0x0c, // value blob
            ]
        );
        assert_eq!(UniAttribute::from_bytes(&bytes).unwrap(), attr);
    }

    #[test]
    fn test_return_under_both_keys() {
        let mut attr = UniAttribute::new();
        attr.put_return(vec![1, 2]);
        assert_eq!(attr.get_buffer(""), Some(&[1u8, 2][..]));
        assert_eq!(attr.get_buffer("tars_ret"), Some(&[1u8, 2][..]));

        let mut legacy = UniAttribute::new();
        legacy.put_buffer("tars_ret", vec![9]);
        assert_eq!(legacy.get_return(), Some(&[9u8][..]));
    }

    #[test]
    fn test_empty_input_is_empty_bag() {
        assert!(UniAttribute::from_bytes(&[]).unwrap().is_empty());
    }
}
