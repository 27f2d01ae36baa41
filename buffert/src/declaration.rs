//! Buffer declarations stored as RON.
//!
//! ```ron
//! (
//!     name: "Example",
//!     ty: Storage,
//!     layout: Std430,
//!     binding: 1,
//!     fields: [
//!         Entry((name: "a", format: "float32_1")),
//!         Struct((name: "f", count: 2, entries: [(name: "d", format: "int32_1")])),
//!         Entry((name: "rest", format: "float32_4", count: 0)),
//!     ],
//! )
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{DeclarationError, LayoutError};
use crate::format::Format;
use crate::layout::{Layout, Struct};
use crate::template::{BufferTemplate, ShaderBufferType};

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryDeclaration {
    pub name: String,
    pub format: Format,
    #[serde(default = "one")]
    pub count: u32,
}

/// A nested struct. Only leaf entries are allowed as members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructDeclaration {
    pub name: String,
    #[serde(default = "one")]
    pub count: u32,
    pub entries: Vec<EntryDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum FieldDeclaration {
    Entry(EntryDeclaration),
    Struct(StructDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BufferDeclaration {
    pub name: String,
    #[serde(default)]
    pub ty: ShaderBufferType,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub set: u32,
    #[serde(default)]
    pub binding: u32,
    pub fields: Vec<FieldDeclaration>,
}

impl std::str::FromStr for BufferDeclaration {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::from_str(s)?)
    }
}

impl BufferDeclaration {
    pub fn load_file<P>(path: P) -> Result<Self, DeclarationError>
    where
        P: AsRef<Path>,
    {
        log::trace!("Loading buffer declaration from {}", path.as_ref().display());
        let s = std::fs::read_to_string(path)?;
        s.parse()
    }

    /// Lay out all fields in declaration order.
    #[profiling::function]
    pub fn build(&self) -> Result<BufferTemplate, LayoutError> {
        let mut template =
            BufferTemplate::new(&self.name, self.ty, self.layout, self.set, self.binding);

        for field in &self.fields {
            match field {
                FieldDeclaration::Entry(e) => template.add_entry(&e.name, e.format, e.count)?,
                FieldDeclaration::Struct(s) => {
                    let mut nested = Struct::new(&s.name, self.layout, s.count);
                    for e in &s.entries {
                        nested.add_entry(&e.name, e.format, e.count)?;
                    }
                    template.add_struct(nested)?;
                }
            }
        }

        log::debug!(
            "Built {} with {} fields, {} bytes",
            template.name(),
            self.fields.len(),
            template.size()
        );
        Ok(template)
    }
}

/// Load and build the buffer declared in the file at `path`.
pub fn load_template<P>(path: P) -> Result<BufferTemplate, DeclarationError>
where
    P: AsRef<Path>,
{
    Ok(BufferDeclaration::load_file(path)?.build()?)
}
