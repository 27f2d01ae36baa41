mod data;
pub mod declaration;
mod error;
pub mod format;
mod glsl;
pub mod layout;
mod template;
pub mod util;

pub use data::ShaderBufferData;
pub use declaration::{load_template, BufferDeclaration};
pub use error::{DeclarationError, LayoutError, PackError};
pub use format::{Format, ScalarKind};
pub use layout::{Accumulator, Entry, Field, Layout, Placement, Struct};
pub use template::{
    BufferTemplate, BufferTemplateDescriptor, BufferTemplateDescriptorBuilder, FlattenedEntries,
    ShaderBufferType,
};

// Notes:
// A buffer is laid out by adding members in the order they are declared in the shader. Offsets are
// final as soon as a member is added, so a struct is laid out on its own first and then added as a
// whole. The only way to change an existing layout is BufferTemplate::update_count, which lays out
// everything again.
