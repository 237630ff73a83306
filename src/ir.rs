//! Schema IR: what the registry produces and rendering collaborators consume.
//! Closed variants only; consumers match exhaustively.
pub mod known;

use serde::{Deserialize, Serialize};

use crate::adapters::AdapterType;
use crate::error::ClassificationError;
use crate::graph::{DeclId, MemberId, PrimitiveKind, SourcePosition, TypeId};

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl QName {
    pub fn xsd(name: &str) -> Self {
        Self { name: name.to_string(), namespace: XSD_NAMESPACE.to_string() }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.name)
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Pointer into the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionRef {
    pub decl: DeclId,
    pub qualified_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdapterRef {
    pub decl: DeclId,
    pub qualified_name: String,
}

impl From<&AdapterType> for AdapterRef {
    fn from(a: &AdapterType) -> Self {
        Self { decl: a.adapter, qualified_name: a.adapter_name.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Primitive(PrimitiveKind),
    KnownAtomic(QName),
    Enum(DefinitionRef),
    ClassRef(DefinitionRef),
    Collection(Box<SchemaType>),
    Map { key: Box<SchemaType>, value: Box<SchemaType> },
    Adapted { adapting: Box<SchemaType>, adapter: AdapterRef },
    Any,
}

impl SchemaType {
    pub fn collection(item: SchemaType) -> Self {
        Self::Collection(Box::new(item))
    }

    pub fn map(key: SchemaType, value: SchemaType) -> Self {
        Self::Map { key: Box::new(key), value: Box::new(value) }
    }

    pub fn is_collection(&self) -> bool {
        match self {
            Self::Collection(_) => true,
            Self::Adapted { adapting, .. } => adapting.is_collection(),
            _ => false,
        }
    }

    /// Item type of a collection (through adaptation), else the type itself.
    pub fn item(&self) -> &SchemaType {
        match self {
            Self::Collection(item) => item,
            Self::Adapted { adapting, .. } if adapting.is_collection() => adapting.item(),
            other => other,
        }
    }

    /// What is finally written on the wire, adapters peeled off.
    pub fn base(&self) -> &SchemaType {
        match self {
            Self::Adapted { adapting, .. } => adapting.base(),
            other => other,
        }
    }

    /// Renders to a single text value (attribute, simple content).
    pub fn is_simple(&self) -> bool {
        match self.base() {
            Self::Primitive(_) | Self::KnownAtomic(_) | Self::Enum(_) => true,
            Self::Collection(item) => item.is_simple(),
            Self::ClassRef(_) | Self::Map { .. } | Self::Adapted { .. } | Self::Any => false,
        }
    }

    pub fn definition(&self) -> Option<&DefinitionRef> {
        match self {
            Self::Enum(d) | Self::ClassRef(d) => Some(d),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p.keyword()),
            Self::KnownAtomic(q) => write!(f, "{}", q.name),
            Self::Enum(d) => write!(f, "enum {}", d.qualified_name),
            Self::ClassRef(d) => write!(f, "{}", d.qualified_name),
            Self::Collection(item) => write!(f, "[{item}]"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Adapted { adapting, adapter } => {
                write!(f, "{adapting} via {}", adapter.qualified_name)
            }
            Self::Any => write!(f, "any"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DEFINITIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Complex,
    Simple,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Attribute,
    Element,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub constant: String,
    pub value: String,
}

/// One alternative of a choice element (`XmlElements`).
#[derive(Debug, Clone)]
pub struct Choice {
    pub name: String,
    pub namespace: String,
    pub ty: TypeId,
    pub schema_type: Result<SchemaType, ClassificationError>,
}

#[derive(Debug, Clone)]
pub struct Accessor {
    /// Local name on the wire.
    pub name: String,
    pub member: MemberId,
    pub member_name: String,
    pub kind: AccessorKind,
    /// Declared type, variables resolved in the owner's context.
    pub ty: TypeId,
    pub schema_type: Result<SchemaType, ClassificationError>,
    pub namespace: String,
    pub min_occurs: u32,
    /// `None` is unbounded.
    pub max_occurs: Option<u32>,
    pub required: bool,
    pub nillable: bool,
    pub adapter: Option<AdapterRef>,
    pub choices: Vec<Choice>,
    pub position: Option<SourcePosition>,
    pub doc: Option<String>,
}

impl Accessor {
    /// `Owner.member`, for messages and reference trails.
    pub fn label(&self, owner: &str) -> String {
        format!("{owner}.{}", self.member_name)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub decl: DeclId,
    pub qualified_name: String,
    pub local_name: String,
    pub namespace: String,
    pub anonymous: bool,
    pub kind: DefinitionKind,
    /// Attributes and elements in declaration order (supertype members first when folded).
    pub members: Vec<Accessor>,
    pub value: Option<Accessor>,
    pub enum_values: Vec<EnumValue>,
    pub supertype: Option<DefinitionRef>,
    /// Accessors that led to discovery, outermost first. Empty for roots.
    pub reference_trail: Vec<String>,
    pub position: Option<SourcePosition>,
    pub doc: Option<String>,
}

impl TypeDefinition {
    pub fn attributes(&self) -> impl Iterator<Item = &Accessor> {
        self.members.iter().filter(|a| a.kind == AccessorKind::Attribute)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Accessor> {
        self.members.iter().filter(|a| a.kind == AccessorKind::Element)
    }

    /// Every accessor, value included.
    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        self.members.iter().chain(self.value.iter())
    }

    pub fn qname(&self) -> QName {
        QName { name: self.local_name.clone(), namespace: self.namespace.clone() }
    }

    pub fn reference(&self) -> DefinitionRef {
        DefinitionRef { decl: self.decl, qualified_name: self.qualified_name.clone() }
    }
}
