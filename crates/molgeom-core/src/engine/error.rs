use crate::core::models::ids::AtomId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown element '{symbol}': no covalent radius is tabulated and no override was given")]
    UnknownElement { symbol: String },

    #[error("Atom {id:?} is not present in the geometry or bond graph")]
    UnknownAtom { id: AtomId },

    #[error(
        "Source and target geometries cover different atom ids \
         ({only_in_source} only in source, {only_in_target} only in target)"
    )]
    AlignmentIdMismatch {
        only_in_source: usize,
        only_in_target: usize,
    },

    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
