//! Property-based tests for the wire codec.
//!
//! Whatever a writer produces, a reader must return unchanged, and no input
//! may make a decoder panic.

mod common;

use proptest::prelude::*;
use tars_idl::codec::{TarsReader, TarsWriter};
use tars_idl::codegen::TarsCodec;
use tars_idl::rpc::{TarsField, TarsStruct};
use tars_idl::value::{StructValue, Value};

proptest! {
    #[test]
    fn roundtrip_signed(a in any::<i8>(), b in any::<i16>(), c in any::<i32>(), d in any::<i64>(), tag in 0u8..200) {
        let mut w = TarsWriter::new();
        w.write_i8(a, tag);
        w.write_i16(b, tag + 1);
        w.write_i32(c, tag + 2);
        w.write_i64(d, tag + 3);

        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_i8(tag, true).unwrap(), Some(a));
        prop_assert_eq!(r.read_i16(tag + 1, true).unwrap(), Some(b));
        prop_assert_eq!(r.read_i32(tag + 2, true).unwrap(), Some(c));
        prop_assert_eq!(r.read_i64(tag + 3, true).unwrap(), Some(d));
    }

    #[test]
    fn roundtrip_unsigned(a in any::<u8>(), b in any::<u16>(), c in any::<u32>(), d in any::<u64>()) {
        let mut w = TarsWriter::new();
        w.write_u8(a, 0);
        w.write_u16(b, 1);
        w.write_u32(c, 2);
        w.write_u64(d, 3);

        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_u8(0, true).unwrap(), Some(a));
        prop_assert_eq!(r.read_u16(1, true).unwrap(), Some(b));
        prop_assert_eq!(r.read_u32(2, true).unwrap(), Some(c));
        prop_assert_eq!(r.read_u64(3, true).unwrap(), Some(d));
    }

    #[test]
    fn narrow_encodings_widen(v in any::<i16>()) {
        let mut w = TarsWriter::new();
        w.write_i16(v, 4);
        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_i64(4, true).unwrap(), Some(i64::from(v)));
    }

    #[test]
    fn roundtrip_strings(s in ".{0,400}", tag in any::<u8>()) {
        let mut w = TarsWriter::new();
        w.write_string(&s, tag).unwrap();
        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_string(tag, true).unwrap(), Some(s));
    }

    #[test]
    fn roundtrip_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        let mut w = TarsWriter::new();
        w.write_bytes(&bytes, 7).unwrap();
        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_bytes(7, true).unwrap(), Some(bytes));
    }

    #[test]
    fn unknown_fields_are_skipped(skipped in proptest::collection::vec(any::<i64>(), 0..8), name in "[a-z]{0,20}") {
        let mut w = TarsWriter::new();
        let mut nested = TarsWriter::new();
        for (i, v) in skipped.iter().enumerate() {
            nested.write_i64(*v, u8::try_from(i).unwrap());
        }
        w.write_struct_begin(0);
        w.write_raw(nested.as_bytes());
        w.write_struct_end();
        skipped.write_field(&mut w, 1).unwrap();
        w.write_string(&name, 2).unwrap();

        let mut r = TarsReader::new(w.as_bytes());
        prop_assert_eq!(r.read_string(2, true).unwrap(), Some(name));
    }

    #[test]
    fn roundtrip_user_struct(name in "\\PC{0,40}", age in any::<i32>()) {
        let demo = common::demo();
        let codec = TarsCodec::new(&demo.schema);
        let user = codec.struct_codec("Demo::User").unwrap();
        let value = StructValue::new("Demo::User")
            .with("name", name.as_str())
            .with("age", age);
        let bytes = user.to_bytes(&value).unwrap();
        let decoded = user.from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.get("name"), Some(&Value::from(name)));
        prop_assert_eq!(decoded.get("age"), Some(&Value::I32(age)));
    }

    #[test]
    fn arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let demo = common::demo();
        let codec = TarsCodec::new(&demo.schema);
        let _ = codec.struct_codec("Demo::Team").unwrap().from_bytes(&bytes);
        let _ = tars_idl::RequestPacket::from_bytes(&bytes);
        let _ = tars_idl::UniAttribute::from_bytes(&bytes);
    }
}
