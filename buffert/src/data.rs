use std::collections::HashMap;

use crate::error::PackError;
use crate::layout::{Entry, Field};
use crate::template::BufferTemplate;
use crate::util::align16;

/// CPU side storage for the contents of a [`BufferTemplate`], ready to be uploaded as is.
///
/// The byte size is the template size rounded up to 16.
///
/// Variables are looked up by name only. A struct member with the same name as a field declared
/// before it shadows that field.
#[derive(Debug, Clone)]
pub struct ShaderBufferData {
    template: BufferTemplate,
    data: Vec<u8>,
    entries: HashMap<String, Entry>,
}

fn entry_map(template: &BufferTemplate) -> Result<HashMap<String, Entry>, PackError> {
    let mut entries = HashMap::new();
    for e in template.entries_structs()? {
        if entries.insert(e.name().to_owned(), e.clone()).is_some() {
            log::warn!(
                "{}: {} is declared more than once, only the last one can be updated",
                template.name(),
                e.name()
            );
        }
    }
    Ok(entries)
}

// Saturates instead of wrapping, so out of range writes fail in `write`.
fn element_offset(offset: u32, index: u32, stride: u32) -> usize {
    (index as usize)
        .saturating_mul(stride as usize)
        .saturating_add(offset as usize)
}

impl ShaderBufferData {
    pub fn new(template: BufferTemplate) -> Result<Self, PackError> {
        let entries = entry_map(&template)?;
        let data = vec![0; align16(template.size()) as usize];
        log::debug!("Created {} bytes of data for {}", data.len(), template.name());

        Ok(Self {
            template,
            data,
            entries,
        })
    }

    pub fn template(&self) -> &BufferTemplate {
        &self.template
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn entry(&self, name: &str) -> Result<&Entry, PackError> {
        self.entries
            .get(name)
            .ok_or_else(|| PackError::UnknownVariable(name.to_owned()))
    }

    fn write(&mut self, name: &str, start: usize, bytes: &[u8]) -> Result<(), PackError> {
        let end = start.saturating_add(bytes.len());
        let len = self.data.len();
        let dst = self
            .data
            .get_mut(start..end)
            .ok_or_else(|| PackError::OutOfBuffer {
                name: name.to_owned(),
                end,
                len,
            })?;

        log::trace!("{name}: writing {} bytes at {start}", bytes.len());
        dst.copy_from_slice(bytes);
        Ok(())
    }

    fn check_size(e: &Entry, got: usize) -> Result<(), PackError> {
        if got > e.size() as usize {
            return Err(PackError::SizeMismatch {
                name: e.name().to_owned(),
                expected: e.size(),
                got,
            });
        }
        Ok(())
    }

    fn check_index(name: &str, index: u32, count: u32) -> Result<(), PackError> {
        let bounded = count != 0;
        if bounded && index >= count {
            return Err(PackError::IndexOutOfBounds {
                name: name.to_owned(),
                index,
                count,
            });
        }
        Ok(())
    }

    /// Write `value` at the start of the variable `name`.
    pub fn update<T: bytemuck::Pod>(&mut self, name: &str, value: &T) -> Result<(), PackError> {
        let bytes = bytemuck::bytes_of(value);
        let e = self.entry(name)?;
        Self::check_size(e, bytes.len())?;
        let offset = e.offset() as usize;
        self.write(name, offset, bytes)
    }

    /// Write element `index` of the array `name`. Unbounded arrays are only limited by the size
    /// of the buffer.
    pub fn update_indexed<T: bytemuck::Pod>(
        &mut self,
        name: &str,
        index: u32,
        value: &T,
    ) -> Result<(), PackError> {
        let bytes = bytemuck::bytes_of(value);
        let e = self.entry(name)?;
        Self::check_index(name, index, e.count())?;
        if bytes.len() > e.stride() as usize {
            return Err(PackError::SizeMismatch {
                name: name.to_owned(),
                expected: e.stride(),
                got: bytes.len(),
            });
        }
        let offset = element_offset(e.offset(), index, e.stride());
        self.write(name, offset, bytes)
    }

    /// Write `member` of element `index` in the struct array `struct_name`.
    pub fn update_in_struct<T: bytemuck::Pod>(
        &mut self,
        struct_name: &str,
        member: &str,
        index: u32,
        value: &T,
    ) -> Result<(), PackError> {
        let bytes = bytemuck::bytes_of(value);
        let s = self
            .template
            .top_level()
            .fields()
            .iter()
            .find_map(|f| match f {
                Field::Struct(s) if s.name() == struct_name => Some(s),
                _ => None,
            })
            .ok_or_else(|| PackError::UnknownVariable(struct_name.to_owned()))?;
        let m = s
            .fields()
            .iter()
            .map(Field::as_entry)
            .find(|e| e.name() == member)
            .ok_or_else(|| PackError::UnknownVariable(format!("{struct_name}.{member}")))?;

        Self::check_index(struct_name, index, s.count())?;
        Self::check_size(m, bytes.len())?;
        let offset = element_offset(m.offset(), index, s.stride());
        self.write(member, offset, bytes)
    }

    /// Write raw bytes starting `offset` bytes into the variable `name`.
    pub fn update_bytes(&mut self, name: &str, offset: u32, bytes: &[u8]) -> Result<(), PackError> {
        let e = self.entry(name)?;
        let available = e.footprint().saturating_sub(offset);
        if !e.is_unbounded() && bytes.len() > available as usize {
            return Err(PackError::SizeMismatch {
                name: name.to_owned(),
                expected: available,
                got: bytes.len(),
            });
        }
        let offset = (e.offset() as usize).saturating_add(offset as usize);
        self.write(name, offset, bytes)
    }

    /// Change the array length of `name`. The data is reset to zeroes.
    pub fn update_count(&mut self, name: &str, count: u32) -> Result<(), PackError> {
        self.template.update_count(name, count)?;
        self.entries = entry_map(&self.template)?;
        self.data = vec![0; align16(self.template.size()) as usize];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::layout::Layout;
    use crate::template::ShaderBufferType;

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Joint {
        rotation: [f32; 4],
        translation: [f32; 3],
        _pad0: f32,
        scale: [f32; 3],
        _pad1: f32,
    }

    fn read<T: bytemuck::Pod>(data: &ShaderBufferData, offset: usize) -> T {
        bytemuck::pod_read_unaligned(&data.bytes()[offset..offset + std::mem::size_of::<T>()])
    }

    fn lights() -> ShaderBufferData {
        let t = BufferTemplate::new("Lights", ShaderBufferType::Uniform, Layout::Std140, 0, 0)
            .with_entry("count", Format::Uint32_1, 1)
            .and_then(|t| t.with_entry("colors", Format::Float32_3, 4))
            .and_then(|t| t.with_entry("intensity", Format::Float32_1, 1))
            .unwrap();
        ShaderBufferData::new(t).unwrap()
    }

    #[test]
    fn scalars_and_arrays() {
        let mut d = lights();
        // count, 12 bytes padding, 4 * 16 for colors, intensity
        assert_eq!(d.template().size(), 84);
        assert_eq!(d.size(), 96);

        d.update("count", &3u32).unwrap();
        d.update_indexed("colors", 2, &[1.0f32, 0.5, 0.25]).unwrap();
        d.update("intensity", &2.0f32).unwrap();

        assert_eq!(read::<u32>(&d, 0), 3);
        assert_eq!(read::<[f32; 3]>(&d, 16 + 2 * 16), [1.0, 0.5, 0.25]);
        assert_eq!(read::<[f32; 3]>(&d, 16), [0.0; 3]);
        assert_eq!(read::<f32>(&d, 80), 2.0);
    }

    #[test]
    fn errors() {
        let mut d = lights();

        assert_eq!(
            d.update("nope", &1u32),
            Err(PackError::UnknownVariable("nope".to_owned()))
        );
        assert_eq!(
            d.update_indexed("colors", 4, &[0.0f32; 3]),
            Err(PackError::IndexOutOfBounds {
                name: "colors".to_owned(),
                index: 4,
                count: 4
            })
        );
        assert_eq!(
            d.update("intensity", &[0.0f32; 2]),
            Err(PackError::SizeMismatch {
                name: "intensity".to_owned(),
                expected: 4,
                got: 8
            })
        );
        assert!(d.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn struct_arrays() {
        let s = crate::layout::Struct::new("joints", Layout::Std140, 2)
            .with_entry("rotation", Format::Float32_4, 1)
            .and_then(|s| s.with_entry("translation", Format::Float32_3, 1))
            .and_then(|s| s.with_entry("scale", Format::Float32_3, 1))
            .unwrap();
        let t = BufferTemplate::new("Skin", ShaderBufferType::Uniform, Layout::Std140, 2, 0)
            .with_entry("time", Format::Float32_1, 1)
            .and_then(|t| t.with_struct(s))
            .unwrap();
        let mut d = ShaderBufferData::new(t).unwrap();
        assert_eq!(d.size(), 16 + 2 * 48);

        let joint = Joint {
            rotation: [0.0, 0.0, 0.0, 1.0],
            translation: [1.0, 2.0, 3.0],
            _pad0: 0.0,
            scale: [1.0; 3],
            _pad1: 0.0,
        };
        d.update_indexed("joints", 1, &joint).unwrap();
        assert_eq!(read::<Joint>(&d, 16 + 48), joint);

        d.update_in_struct("joints", "translation", 0, &[4.0f32, 5.0, 6.0])
            .unwrap();
        assert_eq!(read::<[f32; 3]>(&d, 16 + 16), [4.0, 5.0, 6.0]);

        assert!(matches!(
            d.update_in_struct("joints", "translation", 2, &[0.0f32; 3]),
            Err(PackError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            d.update_in_struct("joints", "shear", 0, &0.0f32),
            Err(PackError::UnknownVariable(_))
        ));
    }

    #[test]
    fn bytes_and_count() {
        let t = BufferTemplate::new("Particles", ShaderBufferType::Storage, Layout::Std430, 0, 1)
            .with_entry("count", Format::Uint32_1, 1)
            .and_then(|t| t.with_entry("positions", Format::Float32_4, 0))
            .unwrap();
        let mut d = ShaderBufferData::new(t).unwrap();
        assert_eq!(d.size(), 32);

        d.update_count("positions", 4).unwrap();
        assert_eq!(d.size(), 16 + 4 * 16);
        assert_eq!(d.entry("positions").unwrap().count(), 4);

        let positions: Vec<f32> = (0..16).map(|i| i as f32).collect();
        d.update_bytes("positions", 0, bytemuck::cast_slice(&positions))
            .unwrap();
        assert_eq!(read::<[f32; 4]>(&d, 16 + 3 * 16), [12.0, 13.0, 14.0, 15.0]);

        assert!(matches!(
            d.update_bytes("positions", 16, bytemuck::cast_slice(&positions)),
            Err(PackError::SizeMismatch { expected: 48, .. })
        ));
    }

    #[test]
    fn huge_indices_stay_in_buffer() {
        let t = BufferTemplate::new("Particles", ShaderBufferType::Storage, Layout::Std430, 0, 1)
            .with_entry("positions", Format::Float32_4, 0)
            .unwrap();
        let mut d = ShaderBufferData::new(t).unwrap();
        assert_eq!(d.size(), 16);

        for index in [1, 1 << 28, u32::MAX] {
            assert!(
                matches!(
                    d.update_indexed("positions", index, &[9.0f32; 4]),
                    Err(PackError::OutOfBuffer { len: 16, .. })
                ),
                "{index}"
            );
        }
        assert!(matches!(
            d.update_bytes("positions", u32::MAX, &[1u8; 4]),
            Err(PackError::OutOfBuffer { .. })
        ));
        assert!(d.bytes().iter().all(|b| *b == 0));

        d.update_indexed("positions", 0, &[9.0f32; 4]).unwrap();
        assert_eq!(read::<[f32; 4]>(&d, 0), [9.0; 4]);
    }

    #[test]
    fn huge_struct_index() {
        let s = crate::layout::Struct::new("lights", Layout::Std430, 0)
            .with_entry("position", Format::Float32_4, 1)
            .and_then(|s| s.with_entry("radius", Format::Float32_1, 1))
            .unwrap();
        let t = BufferTemplate::new("Lights", ShaderBufferType::Storage, Layout::Std430, 0, 0)
            .with_struct(s)
            .unwrap();
        let mut d = ShaderBufferData::new(t).unwrap();

        assert!(matches!(
            d.update_in_struct("lights", "radius", 1 << 30, &1.0f32),
            Err(PackError::OutOfBuffer { .. })
        ));
        assert!(d.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn shadowed_names() {
        let s = crate::layout::Struct::new("bones", Layout::Std140, 2)
            .with_entry("scale", Format::Float32_4, 1)
            .unwrap();
        let t = BufferTemplate::new("Skin", ShaderBufferType::Uniform, Layout::Std140, 0, 0)
            .with_entry("scale", Format::Float32_1, 1)
            .and_then(|t| t.with_struct(s))
            .unwrap();
        let d = ShaderBufferData::new(t).unwrap();

        let scale = d.entry("scale").unwrap();
        assert_eq!(scale.format(), Format::Float32_4);
        assert_eq!(scale.offset(), 16);
    }
}
