use proptest::prelude::*;
use tabula_model::{Attribute, AttributeKind};
use tabula_payload::{parse_stream, ControlMessage, Frame, PayloadWriter};

/// Re-emits a parsed frame through the writer primitives.
fn emit(frame: &Frame, w: &mut PayloadWriter) {
    match frame {
        Frame::Payload { frames } => {
            w.control(ControlMessage::StartPayload);
            for f in frames {
                emit(f, w);
            }
            w.control(ControlMessage::EndPayload);
        }
        Frame::Table { name, frames } => {
            w.control(ControlMessage::StartTable);
            w.write_string(name);
            for f in frames {
                emit(f, w);
            }
            w.control(ControlMessage::EndTable);
        }
        Frame::Data { name, kind, values } => w.attribute_run(name, *kind, values.iter()),
        Frame::Reference { name, values } => {
            w.attribute_run(name, AttributeKind::Reference, values.iter())
        }
    }
}

/// Leaf frames: attribute runs over a few representative kinds. Floats are
/// exercised by the codec properties; NaN would break tree equality here.
fn run_frame() -> impl Strategy<Value = Frame> {
    let values_u8 = proptest::collection::vec(any::<u8>().prop_map(Attribute::U8), 0..16);
    let values_i64 = proptest::collection::vec(any::<i64>().prop_map(Attribute::I64), 0..16);
    let values_bool = proptest::collection::vec(any::<bool>().prop_map(Attribute::Boolean), 0..16);
    let values_str =
        proptest::collection::vec("[a-z0-9 ]{0,12}".prop_map(Attribute::from), 0..8);
    let values_ref = proptest::collection::vec(any::<u32>().prop_map(Attribute::Reference), 0..16);
    prop_oneof![
        ("[a-z_][a-z0-9_]{0,9}", values_u8).prop_map(|(name, values)| Frame::Data {
            name,
            kind: AttributeKind::U8,
            values,
        }),
        ("[a-z_][a-z0-9_]{0,9}", values_i64).prop_map(|(name, values)| Frame::Data {
            name,
            kind: AttributeKind::I64,
            values,
        }),
        ("[a-z_][a-z0-9_]{0,9}", values_bool).prop_map(|(name, values)| Frame::Data {
            name,
            kind: AttributeKind::Boolean,
            values,
        }),
        ("[a-z_][a-z0-9_]{0,9}", values_str).prop_map(|(name, values)| Frame::Data {
            name,
            kind: AttributeKind::String,
            values,
        }),
        ("[a-z_][a-z0-9_]{0,9}", values_ref)
            .prop_map(|(name, values)| Frame::Reference { name, values }),
    ]
}

fn frame_tree() -> impl Strategy<Value = Frame> {
    run_frame().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            ("[a-z_][a-z0-9_]{0,9}", proptest::collection::vec(inner.clone(), 0..4))
                .prop_map(|(name, frames)| Frame::Table { name, frames }),
            proptest::collection::vec(inner, 0..4)
                .prop_map(|frames| Frame::Payload { frames }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// Whatever the writer emits, the reader reconstructs.
    #[test]
    fn prop_written_frames_parse_back(frames in proptest::collection::vec(frame_tree(), 0..4)) {
        let mut w = PayloadWriter::new();
        for frame in &frames {
            emit(frame, &mut w);
        }
        let parsed = parse_stream(w.as_bytes()).expect("writer output must parse");
        prop_assert_eq!(parsed, frames);
    }

    /// The reader returns an error or frames for any input, never a panic.
    #[test]
    fn prop_parser_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_stream(&bytes);
    }
}
