use std::path::{Path, PathBuf};

use log::{debug, warn};
use tabula_model::{Attribute, AttributeKind};
use tabula_payload::{ControlMessage, PayloadWriter};
use tabula_store::{Store, StoreError};

use crate::artifact;
use crate::sort::ascending_permutation;
use crate::{EngineError, EngineResult, FrameKind, Instruction};

/// The values most recently loaded by `read`, kept together with where they
/// came from so `send` frames the data that was actually read, not whatever
/// happens to be selected later.
#[derive(Debug)]
struct LoadedColumn {
    column: String,
    kind: AttributeKind,
    values: Vec<Attribute>,
}

/// Per-run state. A fresh set is built at the start of every run; nothing
/// carries over between runs except the store itself.
#[derive(Debug, Default)]
struct Registers {
    selected_table: Option<String>,
    selected_column: Option<String>,
    loaded: Option<LoadedColumn>,
    /// Permutation over `loaded` from the last `sort`; `None` = natural order.
    ordering: Option<Vec<usize>>,
    payload: PayloadWriter,
}

impl Registers {
    fn table(&self) -> EngineResult<&str> {
        self.selected_table
            .as_deref()
            .ok_or(EngineError::NoTableSelected)
    }

    fn selection(&self) -> EngineResult<(String, String)> {
        let table = self.table()?.to_string();
        let column = self
            .selected_column
            .clone()
            .ok_or(EngineError::NoColumnSelected)?;
        Ok((table, column))
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// The payload bytes accumulated up to the halt, success or not.
    pub payload: Vec<u8>,
    /// Instructions that completed, including a terminal `end`.
    pub executed: usize,
    /// The first failure, if the run halted on one.
    pub error: Option<EngineError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

enum Flow {
    Continue,
    Halt,
}

/// Executes instruction sequences against a [`Store`].
#[derive(Debug)]
pub struct Engine {
    store: Store,
}

impl Engine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(Store::new(root))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Runs the sequence to completion, `end`, or the first failure.
    ///
    /// Store effects already applied before a failure stay applied; there is
    /// no rollback. The outcome always carries the payload accumulated so
    /// far.
    pub fn execute(&mut self, instructions: &[Instruction]) -> RunOutcome {
        let mut regs = Registers::default();
        let mut executed = 0;
        let mut error = None;

        for instruction in instructions {
            debug!("executing: {instruction}");
            match self.dispatch(instruction, &mut regs) {
                Ok(Flow::Continue) => executed += 1,
                Ok(Flow::Halt) => {
                    executed += 1;
                    break;
                }
                Err(err) => {
                    error = Some(err);
                    break;
                }
            }
        }

        RunOutcome {
            payload: regs.payload.into_bytes(),
            executed,
            error,
        }
    }

    /// [`Engine::execute`], then flush the payload to `artifact`.
    ///
    /// The flush happens whether or not the run failed; a partial payload is
    /// still an artifact. A run error outranks a flush error: if both occur
    /// the flush failure is only logged.
    pub fn run_to_path(
        &mut self,
        instructions: &[Instruction],
        artifact: impl AsRef<Path>,
    ) -> EngineResult<RunOutcome> {
        let artifact = artifact.as_ref();
        let outcome = self.execute(instructions);
        if let Err(source) = artifact::write_bytes(artifact, &outcome.payload) {
            let flush = EngineError::ArtifactWrite {
                path: artifact.to_path_buf(),
                source,
            };
            if outcome.error.is_some() {
                warn!("{flush}");
            } else {
                return Err(flush);
            }
        }
        Ok(outcome)
    }

    fn dispatch(&mut self, instruction: &Instruction, regs: &mut Registers) -> EngineResult<Flow> {
        match instruction {
            Instruction::CreateTable { name } => {
                self.store.create_table(name)?;
                regs.selected_table = Some(name.clone());
                regs.selected_column = None;
            }
            Instruction::CreateColumn { name, kind } => {
                let table = regs.table()?.to_string();
                self.store.create_column(&table, name, *kind)?;
                regs.selected_column = Some(name.clone());
            }
            Instruction::SelectTable { name } => {
                if !self.store.has_table(name) {
                    return Err(StoreError::TableNotFound(name.clone()).into());
                }
                regs.selected_table = Some(name.clone());
                regs.selected_column = None;
            }
            Instruction::SelectColumn { name } => {
                let table = regs.table()?.to_string();
                self.store.column_meta(&table, name)?;
                regs.selected_column = Some(name.clone());
            }
            Instruction::Read => {
                let (table, column) = regs.selection()?;
                let meta = self.store.column_meta(&table, &column)?;
                let values = self.store.read_column(&table, &column)?;
                regs.loaded = Some(LoadedColumn {
                    column,
                    kind: meta.kind,
                    values,
                });
                regs.ordering = None;
            }
            Instruction::Append { value } => {
                let (table, column) = regs.selection()?;
                self.store.append(&table, &column, value)?;
            }
            Instruction::LoadCount => {
                let (table, column) = regs.selection()?;
                self.store.load_count(&table, &column)?;
            }
            Instruction::Sort => {
                let loaded = regs
                    .loaded
                    .as_ref()
                    .ok_or(EngineError::NothingLoaded { op: "sort" })?;
                regs.ordering = Some(ascending_permutation(&loaded.values));
            }
            Instruction::Free => {
                regs.loaded = None;
                regs.ordering = None;
            }
            Instruction::Open { frame } => match frame {
                FrameKind::Payload => regs.payload.control(ControlMessage::StartPayload),
                FrameKind::Table => {
                    // No selection is not an error here: the permissive
                    // writer frames an empty name instead.
                    let name = regs.selected_table.clone().unwrap_or_default();
                    regs.payload.control(ControlMessage::StartTable);
                    regs.payload.write_string(&name);
                }
                FrameKind::Data => regs.payload.control(ControlMessage::StartDataAttribute),
                FrameKind::Reference => {
                    regs.payload.control(ControlMessage::StartReferenceAttribute)
                }
            },
            Instruction::Close { frame } => regs.payload.control(match frame {
                FrameKind::Payload => ControlMessage::EndPayload,
                FrameKind::Table => ControlMessage::EndTable,
                FrameKind::Data => ControlMessage::EndDataAttribute,
                FrameKind::Reference => ControlMessage::EndReferenceAttribute,
            }),
            Instruction::Send => {
                regs.selection()?;
                let loaded = regs
                    .loaded
                    .as_ref()
                    .ok_or(EngineError::NothingLoaded { op: "send" })?;
                match &regs.ordering {
                    Some(ordering) => {
                        if ordering.len() != loaded.values.len() {
                            return Err(EngineError::StaleOrdering {
                                ordering: ordering.len(),
                                loaded: loaded.values.len(),
                            });
                        }
                        regs.payload.attribute_run(
                            &loaded.column,
                            loaded.kind,
                            ordering.iter().map(|&i| &loaded.values[i]),
                        );
                    }
                    None => {
                        regs.payload
                            .attribute_run(&loaded.column, loaded.kind, loaded.values.iter());
                    }
                }
            }
            Instruction::End => return Ok(Flow::Halt),
        }
        Ok(Flow::Continue)
    }
}
