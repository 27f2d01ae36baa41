use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Buffer {buffer} contains struct members, use entries_structs() instead")]
    NotSimple { buffer: String },
    #[error("Struct {name} contains a nested struct, only one level of nesting is supported")]
    NestingTooDeep { name: String },
    #[error("No entry or struct named {0}")]
    UnknownEntry(String),
    #[error("Cannot add {name} after the unbounded array {unbounded}")]
    AfterUnboundedArray { name: String, unbounded: String },
    #[error("{0} uses the struct format, add it with add_struct()")]
    StructAsEntry(String),
    #[error("Unknown format {0}")]
    UnknownFormat(String),
    #[error("Unknown layout {0}, expected std140 or std430")]
    UnknownLayout(String),
    #[error("Unknown buffer type {0}, expected uniform or storage")]
    UnknownBufferType(String),
    #[error("Invalid buffer template: {0}")]
    Builder(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("No variable named {0}")]
    UnknownVariable(String),
    #[error("Index {index} is out of bounds for {name}[{count}]")]
    IndexOutOfBounds { name: String, index: u32, count: u32 },
    #[error("{name} holds {expected} bytes but got {got}")]
    SizeMismatch {
        name: String,
        expected: u32,
        got: usize,
    },
    #[error("Writing {name} ends at byte {end} but the buffer is {len} bytes")]
    OutOfBuffer { name: String, end: usize, len: usize },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("Failed to read declaration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse declaration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
