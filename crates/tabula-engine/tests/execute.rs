use std::fs;

use pretty_assertions::assert_eq;
use tabula_engine::{Engine, EngineError, FrameKind, Instruction};
use tabula_model::{Attribute, AttributeKind};
use tabula_payload::{parse_stream, Frame};
use tabula_store::StoreError;

fn create(name: &str) -> Instruction {
    Instruction::CreateTable {
        name: name.to_string(),
    }
}

fn column(name: &str, kind: AttributeKind) -> Instruction {
    Instruction::CreateColumn {
        name: name.to_string(),
        kind,
    }
}

fn append(value: Attribute) -> Instruction {
    Instruction::Append { value }
}

fn open(frame: FrameKind) -> Instruction {
    Instruction::Open { frame }
}

fn close(frame: FrameKind) -> Instruction {
    Instruction::Close { frame }
}

#[test]
fn sorted_column_round_trips_through_the_payload() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let instructions = vec![
        create("t"),
        column("x", AttributeKind::U32),
        append(Attribute::U32(2)),
        append(Attribute::U32(3)),
        append(Attribute::U32(1)),
        Instruction::Read,
        Instruction::Sort,
        open(FrameKind::Payload),
        open(FrameKind::Table),
        Instruction::Send,
        close(FrameKind::Table),
        close(FrameKind::Payload),
        Instruction::End,
    ];
    let outcome = engine.execute(&instructions);

    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert_eq!(outcome.executed, instructions.len());

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Payload {
            frames: vec![Frame::Table {
                name: "t".to_string(),
                frames: vec![Frame::Data {
                    name: "x".to_string(),
                    kind: AttributeKind::U32,
                    values: vec![Attribute::U32(1), Attribute::U32(2), Attribute::U32(3)],
                }],
            }],
        }]
    );
}

#[test]
fn send_without_sort_keeps_append_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        column("x", AttributeKind::I64),
        append(Attribute::I64(5)),
        append(Attribute::I64(-5)),
        Instruction::Read,
        Instruction::Send,
    ]);
    assert!(outcome.is_success());

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Data {
            name: "x".to_string(),
            kind: AttributeKind::I64,
            values: vec![Attribute::I64(5), Attribute::I64(-5)],
        }]
    );
}

#[test]
fn reference_columns_frame_with_reference_markers() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        column("parent", AttributeKind::Reference),
        append(Attribute::Reference(2)),
        append(Attribute::Reference(0)),
        Instruction::Read,
        Instruction::Sort,
        Instruction::Send,
    ]);
    assert!(outcome.is_success());

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Reference {
            name: "parent".to_string(),
            values: vec![Attribute::Reference(0), Attribute::Reference(2)],
        }]
    );
}

#[test]
fn first_failure_halts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        Instruction::SelectTable {
            name: "ghost".to_string(),
        },
        // Never reached; would otherwise fail too.
        Instruction::Read,
    ]);

    assert_eq!(outcome.executed, 1);
    assert!(matches!(
        outcome.error,
        Some(EngineError::Store(StoreError::TableNotFound(ref name))) if name == "ghost"
    ));
}

#[test]
fn end_discards_the_rest_of_the_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        Instruction::End,
        // Would fail if executed: no column selected.
        Instruction::Read,
    ]);

    assert!(outcome.is_success());
    assert_eq!(outcome.executed, 2);
}

#[test]
fn column_operations_require_a_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[append(Attribute::U8(1))]);
    assert!(matches!(outcome.error, Some(EngineError::NoTableSelected)));

    let outcome = engine.execute(&[create("t"), Instruction::Read]);
    assert!(matches!(outcome.error, Some(EngineError::NoColumnSelected)));

    let outcome = engine.execute(&[
        create("u"),
        Instruction::SelectColumn {
            name: "x".to_string(),
        },
    ]);
    assert!(matches!(
        outcome.error,
        Some(EngineError::Store(StoreError::ColumnNotFound { .. }))
    ));
}

#[test]
fn sort_and_send_require_loaded_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[create("t"), Instruction::Sort]);
    assert!(matches!(
        outcome.error,
        Some(EngineError::NothingLoaded { op: "sort" })
    ));

    let outcome = engine.execute(&[
        Instruction::SelectTable {
            name: "t".to_string(),
        },
        column("x", AttributeKind::U8),
        Instruction::Free,
        Instruction::Send,
    ]);
    assert!(matches!(
        outcome.error,
        Some(EngineError::NothingLoaded { op: "send" })
    ));
}

#[test]
fn free_then_read_starts_from_natural_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    // sort, free, read again: the old permutation must not leak into send.
    let outcome = engine.execute(&[
        create("t"),
        column("x", AttributeKind::U16),
        append(Attribute::U16(9)),
        append(Attribute::U16(1)),
        Instruction::Read,
        Instruction::Sort,
        Instruction::Free,
        Instruction::Read,
        Instruction::Send,
    ]);
    assert!(outcome.is_success(), "{:?}", outcome.error);

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Data {
            name: "x".to_string(),
            kind: AttributeKind::U16,
            values: vec![Attribute::U16(9), Attribute::U16(1)],
        }]
    );
}

#[test]
fn send_frames_the_column_that_was_read() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    // Selection moves to `y` after the read; the run still frames `x`.
    let outcome = engine.execute(&[
        create("t"),
        column("x", AttributeKind::U8),
        append(Attribute::U8(7)),
        Instruction::Read,
        column("y", AttributeKind::U8),
        Instruction::Send,
    ]);
    assert!(outcome.is_success(), "{:?}", outcome.error);

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Data {
            name: "x".to_string(),
            kind: AttributeKind::U8,
            values: vec![Attribute::U8(7)],
        }]
    );
}

#[test]
fn open_table_with_no_selection_frames_an_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        open(FrameKind::Payload),
        open(FrameKind::Table),
        close(FrameKind::Table),
        close(FrameKind::Payload),
    ]);
    assert!(outcome.is_success());

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Payload {
            frames: vec![Frame::Table {
                name: String::new(),
                frames: vec![],
            }],
        }]
    );
}

#[test]
fn load_count_picks_up_externally_grown_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        column("x", AttributeKind::U32),
        append(Attribute::U32(1)),
    ]);
    assert!(outcome.is_success());

    // Grow the file outside the engine, then resync and send.
    let path = dir.path().join("t").join("x");
    let mut raw = fs::read(&path).unwrap();
    raw.extend_from_slice(&2u32.to_le_bytes());
    fs::write(&path, raw).unwrap();

    let outcome = engine.execute(&[
        Instruction::SelectTable {
            name: "t".to_string(),
        },
        Instruction::SelectColumn {
            name: "x".to_string(),
        },
        Instruction::LoadCount,
        Instruction::Read,
        Instruction::Send,
    ]);
    assert!(outcome.is_success(), "{:?}", outcome.error);

    let frames = parse_stream(&outcome.payload).unwrap();
    assert_eq!(
        frames,
        vec![Frame::Data {
            name: "x".to_string(),
            kind: AttributeKind::U32,
            values: vec![Attribute::U32(1), Attribute::U32(2)],
        }]
    );
}

#[test]
fn run_to_path_writes_the_artifact_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());
    let artifact = dir.path().join("out.bin");

    let outcome = engine
        .run_to_path(
            &[
                open(FrameKind::Payload),
                close(FrameKind::Payload),
                Instruction::End,
            ],
            &artifact,
        )
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(fs::read(&artifact).unwrap(), outcome.payload);
    assert_eq!(outcome.payload, vec![0, 1]);
}

#[test]
fn run_to_path_flushes_a_partial_payload_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());
    let artifact = dir.path().join("out.bin");

    let outcome = engine
        .run_to_path(
            &[
                open(FrameKind::Payload),
                Instruction::SelectTable {
                    name: "ghost".to_string(),
                },
                close(FrameKind::Payload),
            ],
            &artifact,
        )
        .unwrap();

    assert!(matches!(
        outcome.error,
        Some(EngineError::Store(StoreError::TableNotFound(_)))
    ));
    // The half-built payload still landed on disk.
    assert_eq!(fs::read(&artifact).unwrap(), vec![0]);
}

#[test]
fn second_run_resets_the_registers() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::with_root(dir.path());

    let outcome = engine.execute(&[
        create("t"),
        column("x", AttributeKind::U8),
        append(Attribute::U8(1)),
        Instruction::Read,
    ]);
    assert!(outcome.is_success());

    // The previous run's loaded values and selection are gone.
    let outcome = engine.execute(&[Instruction::Send]);
    assert!(matches!(outcome.error, Some(EngineError::NoTableSelected)));
}
