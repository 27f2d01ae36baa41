use derive_builder::Builder;

use super::ShaderBufferType;
use crate::error::LayoutError;
use crate::layout::Layout;

/// Everything about a buffer except its members.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Builder)]
#[builder(pattern = "owned")]
#[builder(build_fn(name = "generated_build"))]
pub struct BufferTemplateDescriptor {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default)]
    pub ty: ShaderBufferType,
    #[builder(default)]
    pub layout: Layout,
    #[builder(default)]
    pub set: u32,
    #[builder(default)]
    pub binding: u32,
}

impl BufferTemplateDescriptorBuilder {
    pub fn build(self) -> Result<BufferTemplateDescriptor, LayoutError> {
        self.generated_build()
            .map_err(|e| LayoutError::Builder(e.to_string()))
    }
}

impl BufferTemplateDescriptor {
    pub fn builder() -> BufferTemplateDescriptorBuilder {
        BufferTemplateDescriptorBuilder::default()
    }
}
