//! Host type-graph boundary.
//!
//! The compiler never looks at source text: it queries an already-resolved graph of
//! declarations and types through [`TypeGraph`]. Every node carries a stable,
//! hashable identity (`TypeId`, `DeclId`, `MemberId`) which is what the decoration
//! cache and the registry key on.
pub mod model;
pub mod platform;
pub mod signature;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// IDENTITIES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId {
    pub owner: DeclId,
    pub index: u32,
}

/// Any node of the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawNode {
    Type(TypeId),
    Decl(DeclId),
    Member(MemberId),
}

impl From<TypeId> for RawNode {
    fn from(id: TypeId) -> Self {
        RawNode::Type(id)
    }
}

impl From<DeclId> for RawNode {
    fn from(id: DeclId) -> Self {
        RawNode::Decl(id)
    }
}

impl From<MemberId> for RawNode {
    fn from(id: MemberId) -> Self {
        RawNode::Member(id)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
}

impl PrimitiveKind {
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "double" => Self::Double,
            "float" => Self::Float,
            "int" => Self::Int,
            "long" => Self::Long,
            "short" => Self::Short,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
        }
    }

    /// Qualified name of the boxed counterpart.
    pub fn boxed(self) -> &'static str {
        match self {
            Self::Boolean => "java.lang.Boolean",
            Self::Byte => "java.lang.Byte",
            Self::Char => "java.lang.Character",
            Self::Double => "java.lang.Double",
            Self::Float => "java.lang.Float",
            Self::Int => "java.lang.Integer",
            Self::Long => "java.lang.Long",
            Self::Short => "java.lang.Short",
        }
    }
}

/// Shape of a type node. Closed: every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Void,
    Array(TypeId),
    Declared { decl: DeclId, args: Vec<TypeId> },
    /// A use of a declared type parameter.
    Variable { name: String, owner: DeclId, bound: Option<TypeId> },
    Wildcard { extends: Option<TypeId>, super_: Option<TypeId> },
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Package,
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Type(TypeId),
    Annotation(Box<Annotation>),
    Array(Vec<AnnotationValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Fully qualified annotation type name.
    pub name: String,
    pub values: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AnnotationValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(AnnotationValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn type_value(&self, key: &str) -> Option<TypeId> {
        match self.values.get(key) {
            Some(AnnotationValue::Type(t)) => Some(*t),
            _ => None,
        }
    }

    /// All type values under `key`, whether given as a single value or an array.
    pub fn type_values(&self, key: &str) -> Vec<TypeId> {
        match self.values.get(key) {
            Some(AnnotationValue::Type(t)) => vec![*t],
            Some(AnnotationValue::Array(xs)) => xs.iter().filter_map(|x| match x {
                AnnotationValue::Type(t) => Some(*t),
                _ => None,
            }).collect(),
            _ => Vec::new(),
        }
    }

    /// Nested annotations under `key` (single or array).
    pub fn annotations(&self, key: &str) -> Vec<&Annotation> {
        match self.values.get(key) {
            Some(AnnotationValue::Annotation(a)) => vec![a.as_ref()],
            Some(AnnotationValue::Array(xs)) => xs.iter().filter_map(|x| match x {
                AnnotationValue::Annotation(a) => Some(a.as_ref()),
                _ => None,
            }).collect(),
            _ => Vec::new(),
        }
    }
}

/// Binding annotation packages recognized for every binding annotation.
const BINDING_PACKAGES: [&str; 2] = ["javax.xml.bind.annotation", "jakarta.xml.bind.annotation"];

/// Whether `name` is the binding annotation `simple` (e.g. `XmlTransient`,
/// `adapters.XmlJavaTypeAdapter`) under either the javax or jakarta namespace.
pub fn is_binding_annotation(name: &str, simple: &str) -> bool {
    BINDING_PACKAGES.iter().any(|pkg| {
        name.len() == pkg.len() + 1 + simple.len()
            && name.starts_with(pkg)
            && name[pkg.len()..].starts_with('.')
            && name.ends_with(simple)
    })
}

/// Find a binding annotation by simple name.
pub fn find_annotation<'a>(annotations: &'a [Annotation], simple: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| is_binding_annotation(&a.name, simple))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Field,
    Property,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub ty: TypeId,
    /// Annotations on the field, or on the getter of a property.
    pub annotations: Vec<Annotation>,
    /// Annotations on the setter of a property.
    pub setter_annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: String,
    pub bound: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub qualified_name: String,
    pub simple_name: String,
    pub package: Option<DeclId>,
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub is_abstract: bool,
    pub members: Vec<Member>,
    pub constants: Vec<EnumConstant>,
    pub annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub position: Option<SourcePosition>,
    /// Supplied by the platform library rather than by the API being compiled.
    pub platform: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// PROVIDER
// ————————————————————————————————————————————————————————————————————————————

/// Pure, synchronous queries over the host type graph.
///
/// `intern` is the one factory: it returns the identity of a (possibly new) type
/// node with the given shape, the same identity for the same shape.
pub trait TypeGraph {
    fn kind(&self, ty: TypeId) -> TypeKind;

    fn declaration(&self, decl: DeclId) -> &Declaration;

    fn find_declaration(&self, qualified_name: &str) -> Option<DeclId>;

    /// Every declaration known to the graph, in load order.
    fn declarations(&self) -> Vec<DeclId>;

    fn intern(&self, kind: TypeKind) -> TypeId;

    /// Superclass then interfaces, as written on the declaration (in terms of the
    /// declaration's own type variables).
    fn direct_supertypes(&self, decl: DeclId) -> Vec<TypeId> {
        let d = self.declaration(decl);
        d.superclass.iter().chain(d.interfaces.iter()).copied().collect()
    }

    fn type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        match self.kind(ty) {
            TypeKind::Declared { args, .. } => args,
            _ => Vec::new(),
        }
    }

    fn annotations_of(&self, node: RawNode) -> &[Annotation] {
        match node {
            RawNode::Decl(d) => &self.declaration(d).annotations,
            RawNode::Member(m) => self
                .declaration(m.owner)
                .members
                .get(m.index as usize)
                .map(|x| x.annotations.as_slice())
                .unwrap_or(&[]),
            RawNode::Type(t) => match self.kind(t) {
                TypeKind::Declared { decl, .. } => &self.declaration(decl).annotations,
                _ => &[],
            },
        }
    }

    fn declaring_package_of(&self, decl: DeclId) -> Option<DeclId> {
        self.declaration(decl).package
    }

    fn qualified_name_of(&self, decl: DeclId) -> &str {
        &self.declaration(decl).qualified_name
    }

    fn member(&self, id: MemberId) -> &Member {
        &self.declaration(id.owner).members[id.index as usize]
    }

    /// Human-readable rendering of a type, for messages.
    fn display(&self, ty: TypeId) -> String {
        match self.kind(ty) {
            TypeKind::Primitive(p) => p.keyword().to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Array(c) => format!("{}[]", self.display(c)),
            TypeKind::Declared { decl, args } => {
                let name = self.qualified_name_of(decl).to_string();
                if args.is_empty() {
                    name
                } else {
                    let args: Vec<String> = args.iter().map(|a| self.display(*a)).collect();
                    format!("{name}<{}>", args.join(", "))
                }
            }
            TypeKind::Variable { name, .. } => name,
            TypeKind::Wildcard { extends: Some(b), .. } => format!("? extends {}", self.display(b)),
            TypeKind::Wildcard { super_: Some(b), .. } => format!("? super {}", self.display(b)),
            TypeKind::Wildcard { .. } => "?".to_string(),
        }
    }

    /// The declaration behind a declared type.
    fn declared(&self, ty: TypeId) -> Option<DeclId> {
        match self.kind(ty) {
            TypeKind::Declared { decl, .. } => Some(decl),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_annotations_match_both_namespaces() {
        assert!(is_binding_annotation("javax.xml.bind.annotation.XmlTransient", "XmlTransient"));
        assert!(is_binding_annotation("jakarta.xml.bind.annotation.XmlTransient", "XmlTransient"));
        assert!(is_binding_annotation(
            "javax.xml.bind.annotation.adapters.XmlJavaTypeAdapter",
            "adapters.XmlJavaTypeAdapter"
        ));
        assert!(!is_binding_annotation("com.acme.XmlTransient", "XmlTransient"));
        assert!(!is_binding_annotation("javax.xml.bind.annotation.XmlTransientX", "XmlTransient"));
    }
}
