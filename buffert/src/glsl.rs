use crate::layout::{Entry, Field, Struct};
use crate::template::BufferTemplate;
use crate::util::capitalize;

fn array_suffix(count: u32) -> String {
    match count {
        1 => String::new(),
        0 => "[]".to_owned(),
        n => format!("[{n}]"),
    }
}

fn member(f: &Field) -> String {
    let e: &Entry = f.as_entry();
    let ty = match f {
        Field::Struct(s) => capitalize(s.name()),
        Field::Entry(e) => e
            .format()
            .glsl_type()
            .map(str::to_owned)
            .unwrap_or_else(|| capitalize(e.name())),
    };

    format!("\t{ty} {}{};\n", e.name(), array_suffix(e.count()))
}

// Inner structs are declared before the structs that use them.
fn struct_declarations(s: &Struct, out: &mut String) {
    for f in s.fields() {
        if let Field::Struct(nested) = f {
            struct_declarations(nested, out);

            out.push_str(&format!("struct {}\n{{\n", capitalize(nested.name())));
            for m in nested.fields() {
                out.push_str(&member(m));
            }
            out.push_str("};\n\n");
        }
    }
}

impl BufferTemplate {
    /// The GLSL declaration of this buffer, preceded by the declarations of its nested structs.
    /// `qualifier` is put in front of the block keyword, e.g. "readonly".
    #[profiling::function]
    pub fn to_glsl_string(&self, qualifier: Option<&str>) -> String {
        let mut out = String::new();
        struct_declarations(self.top_level(), &mut out);

        let qualifier = qualifier.map(|q| format!("{q} ")).unwrap_or_default();
        out.push_str(&format!(
            "layout({}, set = {}, binding = {}) {qualifier}{} {}\n{{\n",
            self.layout_string(),
            self.set(),
            self.binding(),
            self.type_string(),
            self.name()
        ));
        for f in self.top_level().fields() {
            out.push_str(&member(f));
        }
        out.push_str(&format!("}} in_{};\n", self.name()));

        out
    }
}
