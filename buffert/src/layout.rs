/*
https://registry.khronos.org/OpenGL/specs/gl/glspec45.core.pdf#page=159
7.6.2.2 Standard Uniform Block Layout

The rules that matter for placing a member, in short:

1-3. Scalars align to their size, two and four component vectors to 2N and 4N,
     three component vectors to 4N.
4.   Arrays of scalars and vectors use the element alignment as both alignment and
     stride, rounded up to a vec4 in std140. The member after an array starts at a
     multiple of the base alignment.
5-6. Column-major matrices are stored as arrays of column vectors.
9.   A struct aligns to the largest alignment of its members, rounded up to a vec4.
     Its members are placed recursively starting at the aligned offset of the struct
     and the member after it starts at a multiple of the struct alignment.
10.  Arrays of structs repeat rule 9 per element.

std430 is the same except that rule 4 and 9 do not round up to a vec4.
 */

// Breaking it down, for what is computed here:
// * Members are placed in declaration order, never re-arranged.
// * The first member starts at zero, every following member starts at the first byte after
//   the previous one, rounded up to its alignment.
//   => Accumulator::offset is the base offset of the next member.
// * Array elements in std140 are aligned to 16 and have a stride of at least 16.
//   => Arrays of scalars waste 12 bytes per element.
// * vec3 elements in an array consume the space of a vec4.
// * Matrices with three rows pad every column to four components.
//   => Format::storage_size.
// * Arrays, and matrices in std140, round the offset after them up to their base alignment.
// * Nested structs are laid out on their own from zero and then moved to their aligned offset.

use crate::error::LayoutError;
use crate::format::Format;
use crate::util::{align16, align_up, max};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
pub enum Layout {
    #[default]
    Std140,
    Std430,
}

impl Layout {
    pub const fn as_str(self) -> &'static str {
        match self {
            Layout::Std140 => "std140",
            Layout::Std430 => "std430",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "std140" => Ok(Layout::Std140),
            "std430" => Ok(Layout::Std430),
            _ => Err(LayoutError::UnknownLayout(s.to_owned())),
        }
    }
}

/// Where a single member ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub offset: u32,
    pub stride: u32,
    pub size: u32,
}

/// Running state while laying out the members of a struct.
///
/// `offset` is where the next member may start at the earliest and `alignment` is the alignment
/// the struct would need if it were embedded in another one. Placing a member consumes the
/// accumulator and returns the updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    offset: u32,
    alignment: u32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub const fn new() -> Self {
        Self {
            offset: 0,
            alignment: 16,
        }
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }

    pub const fn alignment(&self) -> u32 {
        self.alignment
    }

    /// The alignment an array element of `format` is placed with.
    pub const fn effective_alignment(layout: Layout, format: Format, count: u32) -> u32 {
        if count != 1 && matches!(layout, Layout::Std140) {
            16
        } else {
            format.base_alignment()
        }
    }

    pub fn place_entry(self, layout: Layout, format: Format, count: u32) -> (Placement, Self) {
        debug_assert!(!format.is_struct());
        let base_align = format.base_alignment();
        let offset = align_up(self.offset, Self::effective_alignment(layout, format, count));

        let size = format.storage_size();
        let stride = if count != 1 {
            let in_array = if format.is_vec3() { size + 4 } else { size };
            match layout {
                Layout::Std140 => max(16, in_array),
                Layout::Std430 => in_array,
            }
        } else {
            size
        };

        let mut running = offset + stride * max(count, 1);
        if count != 1 || (format.is_matrix() && layout == Layout::Std140) {
            running = align_up(running, base_align);
        }

        let next = Self {
            offset: running,
            alignment: align16(max(self.alignment, base_align)),
        };

        (
            Placement {
                offset,
                stride,
                size,
            },
            next,
        )
    }

    /// Place a struct whose members end at `child_end` relative to its own start. The struct
    /// starts at its own alignment (GL rule 9), and the alignment of `self` is left as is.
    pub fn place_struct(self, child_end: u32, child_alignment: u32, count: u32) -> (Placement, Self) {
        let offset = align_up(self.offset, child_alignment);
        let stride = align_up(child_end, child_alignment);
        let size = stride * max(count, 1);

        let next = Self {
            offset: align16(offset + size),
            alignment: self.alignment,
        };

        (
            Placement {
                offset,
                stride,
                size,
            },
            next,
        )
    }
}

/// A placed leaf member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    format: Format,
    count: u32,
    offset: u32,
    stride: u32,
    size: u32,
}

impl Entry {
    fn placed(name: String, format: Format, count: u32, placement: Placement) -> Self {
        Self {
            name,
            format,
            count,
            offset: placement.offset,
            stride: placement.stride,
            size: placement.size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// 1 for a single value, 0 for an unbounded array.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Absolute offset from the start of the buffer.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_array(&self) -> bool {
        self.count != 1
    }

    pub fn is_unbounded(&self) -> bool {
        self.count == 0
    }

    /// Bytes from `offset` to the end of the last element.
    pub fn footprint(&self) -> u32 {
        self.stride * max(self.count, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Entry(Entry),
    Struct(Struct),
}

impl Field {
    /// The entry for a leaf, or the header entry of a struct.
    pub fn as_entry(&self) -> &Entry {
        match self {
            Field::Entry(e) => e,
            Field::Struct(s) => s.as_entry(),
        }
    }

    pub fn name(&self) -> &str {
        self.as_entry().name()
    }

    fn rebase(&mut self, by: u32) {
        match self {
            Field::Entry(e) => e.offset += by,
            Field::Struct(s) => {
                s.header.offset += by;
                s.rebase(by);
            }
        }
    }
}

/// An ordered list of members laid out with a single [`Layout`].
///
/// A struct is built on its own with offsets relative to zero and is then moved into place by
/// [`Struct::add_struct`] on the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    header: Entry,
    layout: Layout,
    acc: Accumulator,
    fields: Vec<Field>,
    unbounded: Option<String>,
}

impl Struct {
    pub fn new(name: impl Into<String>, layout: Layout, count: u32) -> Self {
        Self {
            header: Entry {
                name: name.into(),
                format: Format::Struct,
                count,
                offset: 0,
                stride: 0,
                size: 0,
            },
            layout,
            acc: Accumulator::new(),
            fields: Vec::new(),
            unbounded: None,
        }
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn count(&self) -> u32 {
        self.header.count()
    }

    pub fn offset(&self) -> u32 {
        self.header.offset()
    }

    /// The running end offset while members are added, the padded element stride once embedded.
    pub fn stride(&self) -> u32 {
        self.header.stride()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Where the next member would start at the earliest.
    pub fn running_offset(&self) -> u32 {
        self.acc.offset()
    }

    pub fn alignment(&self) -> u32 {
        self.acc.alignment()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn as_entry(&self) -> &Entry {
        &self.header
    }

    pub fn has_structs(&self) -> bool {
        self.fields.iter().any(|f| matches!(f, Field::Struct(_)))
    }

    /// Levels of struct nesting below this one.
    pub fn depth(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| match f {
                Field::Struct(s) => Some(1 + s.depth()),
                Field::Entry(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// True if a member with this name exists here or in any nested struct.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| match f {
            Field::Entry(e) => e.name() == name,
            Field::Struct(s) => s.name() == name || s.contains(name),
        })
    }

    fn check_open(&self, name: &str) -> Result<(), LayoutError> {
        match &self.unbounded {
            Some(unbounded) => Err(LayoutError::AfterUnboundedArray {
                name: name.to_owned(),
                unbounded: unbounded.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn add_entry(
        &mut self,
        name: impl Into<String>,
        format: Format,
        count: u32,
    ) -> Result<(), LayoutError> {
        let name = name.into();
        if format.is_struct() {
            return Err(LayoutError::StructAsEntry(name));
        }
        self.check_open(&name)?;

        let (placement, acc) = self.acc.place_entry(self.layout, format, count);
        log::trace!(
            "{}: placed {name} ({format}[{count}]) at {} with stride {}",
            self.name(),
            placement.offset,
            placement.stride
        );

        self.acc = acc;
        self.header.stride = acc.offset();
        if count == 0 {
            self.unbounded = Some(name.clone());
        }
        self.fields
            .push(Field::Entry(Entry::placed(name, format, count, placement)));

        Ok(())
    }

    /// Embed a fully built struct after the current members.
    pub fn add_struct(&mut self, mut child: Struct) -> Result<(), LayoutError> {
        self.check_open(child.name())?;
        if child.fields.is_empty() {
            log::warn!("Adding struct {} without members to {}", child.name(), self.name());
        }

        let count = child.count();
        let (placement, acc) =
            self.acc
                .place_struct(child.running_offset(), child.alignment(), count);
        log::debug!(
            "{}: placed struct {} at {} with stride {}",
            self.name(),
            child.name(),
            placement.offset,
            placement.stride
        );

        child.rebase(placement.offset);
        child.header.offset = placement.offset;
        child.header.stride = placement.stride;
        child.header.size = placement.size;

        self.acc = acc;
        self.header.stride = acc.offset();
        if count == 0 {
            self.unbounded = Some(child.name().to_owned());
        }
        self.fields.push(Field::Struct(child));

        Ok(())
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

    pub fn with_struct(mut self, child: Struct) -> Result<Self, LayoutError> {
        self.add_struct(child)?;
        Ok(self)
    }

    fn rebase(&mut self, by: u32) {
        for f in self.fields.iter_mut() {
            f.rebase(by);
        }
    }

    /// Lay out all members again from scratch, with `count` for this struct and `new_count` for
    /// every member named `target`.
    pub(crate) fn replay(&self, count: u32, target: &str, new_count: u32) -> Result<Self, LayoutError> {
        let mut out = Struct::new(self.name(), self.layout, count);
        for f in &self.fields {
            match f {
                Field::Entry(e) => {
                    let count = if e.name() == target { new_count } else { e.count() };
                    out.add_entry(e.name(), e.format(), count)?;
                }
                Field::Struct(s) => {
                    let count = if s.name() == target { new_count } else { s.count() };
                    out.add_struct(s.replay(count, target, new_count)?)?;
                }
            }
        }

        Ok(out)
    }
}
