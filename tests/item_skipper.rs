//! Skipping complete data items with `consume_next_data_item`

use cbor_item::{CborError, Decoder, DecoderConfig, ElementType, Encoder};

const SENTINEL: u64 = 0xdead;

/// tag(5) { "k1": [1, h'00ff', (_ "ab", "cd")], "k2": null } followed by a sentinel
fn nested_document() -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.write_tag(5);
    encoder.write_map_start(2);
    encoder.write_string("k1");
    encoder.write_array_start(3);
    encoder.write_uint(1);
    encoder.write_bytes(&[0x00, 0xff]);
    encoder.write_indef_string_start();
    encoder.write_string("ab");
    encoder.write_string("cd");
    encoder.write_break();
    encoder.write_string("k2");
    encoder.write_null();
    encoder.write_uint(SENTINEL);
    encoder.into_vec()
}

#[test]
fn test_skip_nested_document() {
    let data = nested_document();
    let mut decoder = Decoder::new(&data);
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), SENTINEL);
    assert_eq!(decoder.get_remaining_length(), 0);
}

#[test]
fn test_skip_inner_items() {
    let data = nested_document();
    let mut decoder = Decoder::new(&data);
    assert_eq!(decoder.pop_next_tag().unwrap(), 5);
    assert_eq!(decoder.pop_next_map_start().unwrap(), 2);
    assert_eq!(decoder.pop_next_text().unwrap(), "k1");

    // skip the array value, land on the second key
    assert_eq!(decoder.peek_type().unwrap(), ElementType::ArrayStart);
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_text().unwrap(), "k2");
    decoder.pop_next_null().unwrap();
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), SENTINEL);
}

#[test]
fn test_skip_indefinite_string_chunks() {
    let data = nested_document();
    let mut decoder = Decoder::new(&data);
    decoder.pop_next_tag().unwrap();
    decoder.pop_next_map_start().unwrap();
    decoder.pop_next_text().unwrap();
    decoder.pop_next_array_start().unwrap();
    decoder.pop_next_unsigned_int().unwrap();
    decoder.pop_next_bytes().unwrap();

    assert_eq!(decoder.peek_type().unwrap(), ElementType::IndefTextStart);
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_text().unwrap(), "k2");
}

#[test]
fn test_map_count_is_enforced() {
    // map of 2 pairs with only 3 items present
    let mut encoder = Encoder::new();
    encoder.write_map_start(2);
    encoder.write_uint(1);
    encoder.write_uint(2);
    encoder.write_uint(3);

    let mut decoder = Decoder::new(encoder.get_encoded_data());
    assert_eq!(
        decoder.consume_next_data_item(),
        Err(CborError::InsufficientData {
            needed: 1,
            remaining: 0
        })
    );
}

#[test]
fn test_empty_indefinite_array() {
    let mut encoder = Encoder::new();
    encoder.write_indef_array_start();
    encoder.write_break();
    encoder.write_uint(SENTINEL);

    let mut decoder = Decoder::new(encoder.get_encoded_data());
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), SENTINEL);
}

#[test]
fn test_missing_break() {
    // [_ 1, 2 with no break; the sentinel is taken as a third element
    let mut encoder = Encoder::new();
    encoder.write_indef_array_start();
    encoder.write_uint(1);
    encoder.write_uint(2);
    encoder.write_uint(SENTINEL);

    let mut decoder = Decoder::new(encoder.get_encoded_data());
    assert_eq!(
        decoder.consume_next_data_item(),
        Err(CborError::InsufficientData {
            needed: 1,
            remaining: 0
        })
    );
    assert_eq!(decoder.get_remaining_length(), 0);
}

#[test]
fn test_type_mismatch_is_reported() {
    let mut encoder = Encoder::new();
    encoder.write_uint(7);
    let mut decoder = Decoder::new(encoder.get_encoded_data());

    assert_eq!(
        decoder.pop_next_text(),
        Err(CborError::TypeMismatch {
            expected: ElementType::Text,
            found: ElementType::UnsignedInt,
        })
    );
    assert_eq!(
        decoder.pop_next_map_start(),
        Err(CborError::TypeMismatch {
            expected: ElementType::MapStart,
            found: ElementType::UnsignedInt,
        })
    );
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), 7);
}

#[test]
fn test_peek_does_not_move_skip_boundary() {
    let data = nested_document();
    let mut decoder = Decoder::new(&data);
    for _ in 0..3 {
        assert_eq!(decoder.peek_type().unwrap(), ElementType::Tag);
    }
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), SENTINEL);
}

#[test]
fn test_truncated_string_payload() {
    // array of one 4-byte string with only 2 bytes present
    let data = [0x81, 0x44, 0x01, 0x02];
    let mut decoder = Decoder::new(&data);
    assert!(matches!(
        decoder.consume_next_data_item(),
        Err(CborError::InsufficientData { needed: 4, .. })
    ));
}

#[test]
fn test_skip_mixed_indefinite_containers() {
    // {_ "a": [_ {}, (_ h'01', h'')], 1: {_ }} then sentinel
    let mut encoder = Encoder::new();
    encoder.write_indef_map_start();
    encoder.write_string("a");
    encoder.write_indef_array_start();
    encoder.write_map_start(0);
    encoder.write_indef_bytes_start();
    encoder.write_bytes(&[0x01]);
    encoder.write_bytes(&[]);
    encoder.write_break();
    encoder.write_break();
    encoder.write_uint(1);
    encoder.write_indef_map_start();
    encoder.write_break();
    encoder.write_break();
    encoder.write_uint(SENTINEL);

    let mut decoder = Decoder::new(encoder.get_encoded_data());
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.pop_next_unsigned_int().unwrap(), SENTINEL);
}

#[test]
fn test_deep_nesting() {
    const DEPTH: usize = 20_000;
    let mut encoder = Encoder::with_capacity(DEPTH + 1);
    for _ in 0..DEPTH {
        encoder.write_array_start(1);
    }
    encoder.write_uint(0);
    let data = encoder.into_vec();

    let mut decoder = Decoder::new(&data);
    assert_eq!(
        decoder.consume_next_data_item(),
        Err(CborError::NestingTooDeep(10_000))
    );

    let config = DecoderConfig::default().with_max_nesting(DEPTH);
    let mut decoder = Decoder::with_config(&data, config);
    decoder.consume_next_data_item().unwrap();
    assert_eq!(decoder.get_remaining_length(), 0);
}

#[test]
fn test_deep_nesting_into_value() {
    let mut encoder = Encoder::new();
    for _ in 0..1_000 {
        encoder.write_indef_array_start();
    }
    for _ in 0..1_000 {
        encoder.write_break();
    }
    let data = encoder.into_vec();

    let mut decoder = Decoder::new(&data);
    let mut value = decoder.pop_next_data_item().unwrap();
    let mut depth = 0;
    while let Some([inner]) = value.as_array() {
        value = inner.clone();
        depth += 1;
    }
    assert_eq!(depth, 999);

    let config = DecoderConfig::default().with_max_nesting(999);
    let mut decoder = Decoder::with_config(&data, config);
    assert_eq!(
        decoder.pop_next_data_item(),
        Err(CborError::NestingTooDeep(999))
    );
}
