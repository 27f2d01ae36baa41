use crate::error::LayoutError;
use crate::format::Format;
use crate::layout::{Entry, Field, Layout, Struct};

mod descriptor;


pub use descriptor::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
pub enum ShaderBufferType {
    #[default]
    Uniform,
    Storage,
}

impl ShaderBufferType {
    /// The GLSL block keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            ShaderBufferType::Uniform => "uniform",
            ShaderBufferType::Storage => "buffer",
        }
    }
}

impl std::fmt::Display for ShaderBufferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShaderBufferType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ubo" | "uniform" => Ok(ShaderBufferType::Uniform),
            "ssbo" | "buffer" | "storage" => Ok(ShaderBufferType::Storage),
            _ => Err(LayoutError::UnknownBufferType(s.to_owned())),
        }
    }
}

/// A uniform or storage buffer and the layout of all its members.
///
/// Members are added in declaration order. After that, [`BufferTemplate::update_count`] is the
/// only way to change the layout and it recomputes all of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferTemplate {
    name: String,
    ty: ShaderBufferType,
    layout: Layout,
    set: u32,
    binding: u32,
    top: Struct,
}

impl BufferTemplate {
    pub fn new(
        name: impl Into<String>,
        ty: ShaderBufferType,
        layout: Layout,
        set: u32,
        binding: u32,
    ) -> Self {
        let name = name.into();
        Self {
            top: Struct::new(name.clone(), layout, 1),
            name,
            ty,
            layout,
            set,
            binding,
        }
    }

    pub fn from_descriptor(desc: BufferTemplateDescriptor) -> Self {
        Self::new(desc.name, desc.ty, desc.layout, desc.set, desc.binding)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ShaderBufferType {
        self.ty
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set(&self) -> u32 {
        self.set
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn set_set(&mut self, set: u32) {
        self.set = set;
    }

    pub fn set_binding(&mut self, binding: u32) {
        self.binding = binding;
    }

    pub fn layout_string(&self) -> &'static str {
        self.layout.as_str()
    }

    pub fn type_string(&self) -> &'static str {
        self.ty.as_str()
    }

    /// The buffer always starts at zero.
    pub fn offset(&self) -> u32 {
        0
    }

    /// End of the last member, including any closing padding.
    pub fn size(&self) -> u32 {
        self.top.running_offset()
    }

    pub fn stride(&self) -> u32 {
        self.top.stride()
    }

    pub fn alignment(&self) -> u32 {
        self.top.alignment()
    }

    pub fn top_level(&self) -> &Struct {
        &self.top
    }

    /// An empty struct using the layout of this buffer, to be filled and passed to
    /// [`BufferTemplate::add_struct`].
    pub fn new_struct(&self, name: impl Into<String>, count: u32) -> Struct {
        Struct::new(name, self.layout, count)
    }

    pub fn add_entry(
        &mut self,
        name: impl Into<String>,
        format: Format,
        count: u32,
    ) -> Result<(), LayoutError> {
        self.top.add_entry(name, format, count)
    }

    pub fn add_struct(&mut self, s: Struct) -> Result<(), LayoutError> {
        if s.layout() != self.layout {
            log::warn!(
                "Struct {} uses {} in {} buffer {}",
                s.name(),
                s.layout(),
                self.layout,
                self.name
            );
        }
        self.top.add_struct(s)
    }

    pub fn with_entry(
        mut self,
        name: impl Into<String>,
        format: Format,
        count: u32,
    ) -> Result<Self, LayoutError> {
        self.add_entry(name, format, count)?;
        Ok(self)
    }

    pub fn with_struct(mut self, s: Struct) -> Result<Self, LayoutError> {
        self.add_struct(s)?;
        Ok(self)
    }

    pub fn has_structs(&self) -> bool {
        self.top.has_structs()
    }

    /// The members of a buffer without nested structs.
    pub fn entries(&self) -> Result<impl Iterator<Item = &Entry> + '_, LayoutError> {
        if self.top.has_structs() {
            return Err(LayoutError::NotSimple {
                buffer: self.name.clone(),
            });
        }

        Ok(self.top.fields().iter().map(Field::as_entry))
    }

    /// All members with nested structs flattened. The members of a struct come first, followed
    /// by the struct itself.
    pub fn entries_structs(&self) -> Result<FlattenedEntries<'_>, LayoutError> {
        for f in self.top.fields() {
            if let Field::Struct(s) = f {
                if s.depth() > 0 {
                    return Err(LayoutError::NestingTooDeep {
                        name: s.name().to_owned(),
                    });
                }
            }
        }

        Ok(FlattenedEntries {
            fields: self.top.fields().iter(),
            nested: None,
        })
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries_structs()
            .ok()?
            .find(|e| e.name() == name)
    }

    /// Change the array length of every member called `name` and lay out the whole buffer again.
    ///
    /// The template is left untouched if this fails.
    #[profiling::function]
    pub fn update_count(&mut self, name: &str, count: u32) -> Result<(), LayoutError> {
        if !self.top.contains(name) {
            return Err(LayoutError::UnknownEntry(name.to_owned()));
        }

        log::debug!("{}: rebuilding with {name}[{count}]", self.name);
        let top = self.top.replay(1, name, count)?;
        log::debug!(
            "{}: size {} -> {}",
            self.name,
            self.top.running_offset(),
            top.running_offset()
        );
        self.top = top;

        Ok(())
    }
}

/// Iterator returned by [`BufferTemplate::entries_structs`].
pub struct FlattenedEntries<'a> {
    fields: std::slice::Iter<'a, Field>,
    nested: Option<(&'a Struct, std::slice::Iter<'a, Field>)>,
}

impl<'a> Iterator for FlattenedEntries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((s, members)) = self.nested.as_mut() {
                if let Some(f) = members.next() {
                    return Some(f.as_entry());
                }

                let s: &'a Struct = *s;
                self.nested = None;
                return Some(s.as_entry());
            }

            match self.fields.next()? {
                Field::Entry(e) => return Some(e),
                Field::Struct(s) => self.nested = Some((s, s.fields().iter())),
            }
        }
    }
}
