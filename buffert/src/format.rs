use crate::error::LayoutError;

/// The kind of scalar a format is made of. Decides the GLSL keyword family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Half,
    Float,
    Double,
    Uint64,
    Struct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    kind: ScalarKind,
    // Bytes per component
    width: u32,
    columns: u32,
    rows: u32,
}

macro_rules! formats {
    ($($variant:ident => $name:literal, $kind:ident, $width:expr, $columns:expr, $rows:expr;)*) => {
        /// Scalar, vector and matrix formats that can be placed in a shader buffer.
        ///
        /// Matrices are named `<scalar>_<columns>x<rows>`, i.e. `Float32_2x3` is a `mat2x3` with two
        /// columns of three rows each. `Struct` marks the entry that represents a nested struct.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
        #[serde(try_from = "String")]
        pub enum Format {
            $($variant,)*
        }

        impl Format {
            pub const ALL: &'static [Format] = &[$(Format::$variant,)*];

            /// The lower case name, e.g. "float32_3" or "float64_2x3".
            pub const fn name(self) -> &'static str {
                match self {
                    $(Format::$variant => $name,)*
                }
            }

            const fn shape(self) -> Shape {
                match self {
                    $(Format::$variant => Shape {
                        kind: ScalarKind::$kind,
                        width: $width,
                        columns: $columns,
                        rows: $rows,
                    },)*
                }
            }
        }
    };
}

formats! {
    Bool32_1 => "bool32_1", Bool, 4, 1, 1;
    Bool32_2 => "bool32_2", Bool, 4, 1, 2;
    Bool32_3 => "bool32_3", Bool, 4, 1, 3;
    Bool32_4 => "bool32_4", Bool, 4, 1, 4;

    Int16_1 => "int16_1", Int, 2, 1, 1;
    Int16_2 => "int16_2", Int, 2, 1, 2;
    Int16_3 => "int16_3", Int, 2, 1, 3;
    Int16_4 => "int16_4", Int, 2, 1, 4;

    Uint16_1 => "uint16_1", Uint, 2, 1, 1;
    Uint16_2 => "uint16_2", Uint, 2, 1, 2;
    Uint16_3 => "uint16_3", Uint, 2, 1, 3;
    Uint16_4 => "uint16_4", Uint, 2, 1, 4;

    Half16_1 => "half16_1", Half, 2, 1, 1;
    Half16_2 => "half16_2", Half, 2, 1, 2;
    Half16_3 => "half16_3", Half, 2, 1, 3;
    Half16_4 => "half16_4", Half, 2, 1, 4;

    Int32_1 => "int32_1", Int, 4, 1, 1;
    Int32_2 => "int32_2", Int, 4, 1, 2;
    Int32_3 => "int32_3", Int, 4, 1, 3;
    Int32_4 => "int32_4", Int, 4, 1, 4;

    Uint32_1 => "uint32_1", Uint, 4, 1, 1;
    Uint32_2 => "uint32_2", Uint, 4, 1, 2;
    Uint32_3 => "uint32_3", Uint, 4, 1, 3;
    Uint32_4 => "uint32_4", Uint, 4, 1, 4;

    Float32_1 => "float32_1", Float, 4, 1, 1;
    Float32_2 => "float32_2", Float, 4, 1, 2;
    Float32_3 => "float32_3", Float, 4, 1, 3;
    Float32_4 => "float32_4", Float, 4, 1, 4;

    Float64_1 => "float64_1", Double, 8, 1, 1;
    Float64_2 => "float64_2", Double, 8, 1, 2;
    Float64_3 => "float64_3", Double, 8, 1, 3;
    Float64_4 => "float64_4", Double, 8, 1, 4;

    Uint64_1 => "uint64_1", Uint64, 8, 1, 1;
    Uint64_2 => "uint64_2", Uint64, 8, 1, 2;
    Uint64_3 => "uint64_3", Uint64, 8, 1, 3;
    Uint64_4 => "uint64_4", Uint64, 8, 1, 4;

    Float32_2x2 => "float32_2x2", Float, 4, 2, 2;
    Float32_2x3 => "float32_2x3", Float, 4, 2, 3;
    Float32_2x4 => "float32_2x4", Float, 4, 2, 4;
    Float32_3x2 => "float32_3x2", Float, 4, 3, 2;
    Float32_3x3 => "float32_3x3", Float, 4, 3, 3;
    Float32_3x4 => "float32_3x4", Float, 4, 3, 4;
    Float32_4x2 => "float32_4x2", Float, 4, 4, 2;
    Float32_4x3 => "float32_4x3", Float, 4, 4, 3;
    Float32_4x4 => "float32_4x4", Float, 4, 4, 4;

    Float64_2x2 => "float64_2x2", Double, 8, 2, 2;
    Float64_2x3 => "float64_2x3", Double, 8, 2, 3;
    Float64_2x4 => "float64_2x4", Double, 8, 2, 4;
    Float64_3x2 => "float64_3x2", Double, 8, 3, 2;
    Float64_3x3 => "float64_3x3", Double, 8, 3, 3;
    Float64_3x4 => "float64_3x4", Double, 8, 3, 4;
    Float64_4x2 => "float64_4x2", Double, 8, 4, 2;
    Float64_4x3 => "float64_4x3", Double, 8, 4, 3;
    Float64_4x4 => "float64_4x4", Double, 8, 4, 4;

    Struct => "struct", Struct, 0, 0, 0;
}

impl Format {
    pub const fn kind(self) -> ScalarKind {
        self.shape().kind
    }

    /// Number of scalar components, columns * rows for matrices.
    pub const fn component_count(self) -> u32 {
        let s = self.shape();
        s.columns * s.rows
    }

    pub const fn is_matrix(self) -> bool {
        self.shape().columns > 1
    }

    pub const fn is_struct(self) -> bool {
        matches!(self.shape().kind, ScalarKind::Struct)
    }

    /// Three component vectors with 32 bit components. These take up the space of a vec4 when
    /// used as array elements.
    pub const fn is_vec3(self) -> bool {
        let s = self.shape();
        s.columns == 1 && s.rows == 3 && s.width == 4
    }

    /// Rules 1-3 and 5: the base alignment of a scalar/vector, or of the column vector for a
    /// matrix. Three component vectors align like four component ones. Components narrower than
    /// a basic machine unit still consume a full one. Structs align to a vec4.
    pub const fn base_alignment(self) -> u32 {
        let s = self.shape();
        if let ScalarKind::Struct = s.kind {
            return 16;
        }

        let rows = if s.rows == 3 { 4 } else { s.rows };
        let unit = if s.width < 4 { 4 } else { s.width };
        unit * rows
    }

    /// Tightly packed size in bytes, e.g. 36 for a 3x3 float matrix.
    pub const fn raw_size(self) -> u32 {
        let s = self.shape();
        s.width * s.columns * s.rows
    }

    /// Bytes GLSL reserves for one value. Same as [`Format::raw_size`] except for matrices with
    /// three rows, where every column is padded to four components.
    pub const fn storage_size(self) -> u32 {
        let s = self.shape();
        if s.columns > 1 && s.rows == 3 {
            s.width * s.columns * 4
        } else {
            self.raw_size()
        }
    }

    /// The GLSL type keyword, `None` for the struct marker as the struct type name is
    /// derived from the variable name.
    pub const fn glsl_type(self) -> Option<&'static str> {
        use Format::*;
        let keyword = match self {
            Bool32_1 => "bool",
            Bool32_2 => "bvec2",
            Bool32_3 => "bvec3",
            Bool32_4 => "bvec4",

            Int16_1 | Half16_1 | Int32_1 => "int",
            Int16_2 | Half16_2 | Int32_2 => "ivec2",
            Int16_3 | Half16_3 | Int32_3 => "ivec3",
            Int16_4 | Half16_4 | Int32_4 => "ivec4",

            Uint16_1 | Uint32_1 => "uint",
            Uint16_2 | Uint32_2 => "uvec2",
            Uint16_3 | Uint32_3 => "uvec3",
            Uint16_4 | Uint32_4 => "uvec4",

            Float32_1 => "float",
            Float32_2 => "vec2",
            Float32_3 => "vec3",
            Float32_4 => "vec4",

            Float64_1 | Uint64_1 => "double",
            Float64_2 | Uint64_2 => "dvec2",
            Float64_3 | Uint64_3 => "dvec3",
            Float64_4 | Uint64_4 => "dvec4",

            Float32_2x2 => "mat2",
            Float32_2x3 => "mat2x3",
            Float32_2x4 => "mat2x4",
            Float32_3x2 => "mat3x2",
            Float32_3x3 => "mat3",
            Float32_3x4 => "mat3x4",
            Float32_4x2 => "mat4x2",
            Float32_4x3 => "mat4x3",
            Float32_4x4 => "mat4",

            Float64_2x2 => "dmat2",
            Float64_2x3 => "dmat2x3",
            Float64_2x4 => "dmat2x4",
            Float64_3x2 => "dmat3x2",
            Float64_3x3 => "dmat3",
            Float64_3x4 => "dmat3x4",
            Float64_4x2 => "dmat4x2",
            Float64_4x3 => "dmat4x3",
            Float64_4x4 => "dmat4",

            Struct => return None,
        };

        Some(keyword)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Format {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| LayoutError::UnknownFormat(s.to_owned()))
    }
}

impl TryFrom<String> for Format {
    type Error = LayoutError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Format;

    #[test]
    fn base_alignment() {
        let check = |f: Format, e| {
            assert_eq!(f.base_alignment(), e, "{f}");
        };

        check(Format::Float32_1, 4);
        check(Format::Bool32_1, 4);
        check(Format::Int16_1, 4);
        check(Format::Float32_2, 8);
        check(Format::Half16_2, 8);
        check(Format::Float32_3, 16);
        check(Format::Uint32_3, 16);
        check(Format::Int16_3, 16);
        check(Format::Float32_4, 16);
        check(Format::Float64_1, 8);
        check(Format::Float64_2, 16);
        check(Format::Float64_3, 32);
        check(Format::Uint64_4, 32);
        check(Format::Float32_2x2, 8);
        check(Format::Float32_4x2, 8);
        check(Format::Float32_2x3, 16);
        check(Format::Float32_4x4, 16);
        check(Format::Float64_2x2, 16);
        check(Format::Float64_2x3, 32);
        check(Format::Float64_4x4, 32);
        check(Format::Struct, 16);
    }

    #[test]
    fn sizes() {
        let check = |f: Format, raw, storage| {
            assert_eq!(f.raw_size(), raw, "raw size of {f}");
            assert_eq!(f.storage_size(), storage, "storage size of {f}");
        };

        check(Format::Float32_1, 4, 4);
        check(Format::Float32_3, 12, 12);
        check(Format::Half16_3, 6, 6);
        check(Format::Float64_3, 24, 24);
        check(Format::Float32_2x2, 16, 16);
        check(Format::Float32_2x3, 24, 32);
        check(Format::Float32_3x2, 24, 24);
        check(Format::Float32_3x3, 36, 48);
        check(Format::Float32_4x3, 48, 64);
        check(Format::Float32_3x4, 48, 48);
        check(Format::Float32_4x4, 64, 64);
        check(Format::Float64_2x3, 48, 64);
        check(Format::Float64_3x3, 72, 96);
        check(Format::Float64_4x3, 96, 128);
        check(Format::Float64_4x4, 128, 128);
        check(Format::Struct, 0, 0);
    }

    #[test]
    fn classification() {
        assert!(Format::Float32_3.is_vec3());
        assert!(Format::Bool32_3.is_vec3());
        assert!(!Format::Float64_3.is_vec3());
        assert!(!Format::Float32_3x3.is_vec3());
        assert!(!Format::Float32_4.is_vec3());

        assert!(Format::Float32_2x2.is_matrix());
        assert!(Format::Float64_4x3.is_matrix());
        assert!(!Format::Float32_4.is_matrix());
        assert!(!Format::Struct.is_matrix());

        assert_eq!(Format::Float32_2x3.component_count(), 6);
        assert_eq!(Format::Uint32_3.component_count(), 3);
        assert!(Format::Struct.is_struct());
    }

    #[test]
    fn glsl_keywords() {
        assert_eq!(Format::Float32_1.glsl_type(), Some("float"));
        assert_eq!(Format::Bool32_2.glsl_type(), Some("bvec2"));
        assert_eq!(Format::Uint32_3.glsl_type(), Some("uvec3"));
        assert_eq!(Format::Int32_1.glsl_type(), Some("int"));
        assert_eq!(Format::Float64_4.glsl_type(), Some("dvec4"));
        assert_eq!(Format::Float32_2x3.glsl_type(), Some("mat2x3"));
        assert_eq!(Format::Float32_3x3.glsl_type(), Some("mat3"));
        assert_eq!(Format::Float64_3x4.glsl_type(), Some("dmat3x4"));
        assert_eq!(Format::Struct.glsl_type(), None);
    }

    #[test]
    fn parse_names() {
        for f in Format::ALL {
            assert_eq!(f.name().parse::<Format>().unwrap(), *f);
        }

        assert!("float32_5".parse::<Format>().is_err());
        assert!("vec3".parse::<Format>().is_err());
    }
}
