use thiserror::Error;

/// Top-level error type for the ZIR pipeline.
///
/// Parsing is not represented here: syntax problems accumulate as
/// [`ErrorMsg`](crate::ir::ErrorMsg) diagnostics on the parsed module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lowering error: {0}")]
    Lower(#[from] LowerError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Lowering errors
// ---------------------------------------------------------------------------

/// Fatal gaps hit while lowering an analyzed module to ZIR.
///
/// These flag typed-IR categories the emitter cannot express yet; they are
/// compiler gaps rather than user input problems, so they abort lowering.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("emitting a value of type '{ty}' is not yet supported")]
    UnsupportedValue { ty: String },

    #[error("emitting the type '{ty}' is not yet supported")]
    UnsupportedType { ty: String },
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RenderError {
    /// An argument handle was not reachable from the module's declarations,
    /// so the index-assignment pass never numbered it.
    #[error("instruction handle is not reachable from the module's declarations")]
    UnresolvedRef,

    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
