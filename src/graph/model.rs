//! In-memory [`TypeGraph`] loaded from JSON model documents.
//!
//! Loading is two-phase: every declaration name is assigned a `DeclId` first
//! (platform library, then the documents in order), then signatures and
//! annotation values are resolved against that table.
use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use tracing::debug;

use crate::error::ModelError;
use crate::graph::signature::{self, Signature};
use crate::graph::{
    platform, Annotation, AnnotationValue, DeclId, DeclKind, Declaration, EnumConstant, Member,
    MemberKind, SourcePosition, TypeGraph, TypeId, TypeKind, TypeParameter,
};

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT FORMAT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default)]
    pub declarations: Vec<DeclarationDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationDoc {
    pub kind: DeclKind,
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationDoc>,
    #[serde(default)]
    pub members: Vec<MemberDoc>,
    #[serde(default)]
    pub constants: Vec<ConstantDoc>,
    pub doc: Option<String>,
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default)]
    pub annotations: Vec<AnnotationDoc>,
    #[serde(default)]
    pub setter_annotations: Vec<AnnotationDoc>,
    pub doc: Option<String>,
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConstantDoc {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        annotations: Vec<AnnotationDoc>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationDoc {
    pub name: String,
    #[serde(default)]
    pub values: IndexMap<String, ValueDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValueDoc {
    Bool(bool),
    Int(i64),
    Str(String),
    Type {
        #[serde(rename = "type")]
        ty: String,
    },
    Annotation { annotation: AnnotationDoc },
    Array(Vec<ValueDoc>),
}

// ————————————————————————————————————————————————————————————————————————————
// GRAPH
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub struct ModelGraph {
    decls: Vec<Declaration>,
    by_name: HashMap<String, DeclId>,
    types: RefCell<IndexSet<TypeKind>>,
}

impl ModelGraph {
    /// Platform library only.
    pub fn platform() -> Result<Self, ModelError> {
        Self::load(Vec::new())
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ModelError> {
        let doc: ModelDocument = crate::path_de::from_value_with_path(value)?;
        Self::load(vec![doc])
    }

    pub fn from_json_str(src: &str) -> Result<Self, ModelError> {
        let doc: ModelDocument = crate::path_de::from_str_with_path(src)?;
        Self::load(vec![doc])
    }

    pub fn load(documents: Vec<ModelDocument>) -> Result<Self, ModelError> {
        let platform_doc: ModelDocument =
            crate::path_de::from_value_with_path(platform::PLATFORM_DOCUMENT.clone())?;
        let platform_len = platform_doc.declarations.len();
        let all: Vec<DeclarationDoc> = platform_doc
            .declarations
            .into_iter()
            .chain(documents.into_iter().flat_map(|d| d.declarations))
            .collect();
        let mut loader = Loader::default();
        loader.declare(&all, platform_len)?;
        loader.resolve(&all)?;
        debug!(declarations = loader.decls.len(), types = loader.types.len(), "model graph loaded");
        Ok(Self {
            decls: loader.decls,
            by_name: loader.by_name,
            types: RefCell::new(loader.types),
        })
    }
}

impl TypeGraph for ModelGraph {
    fn kind(&self, ty: TypeId) -> TypeKind {
        self.types
            .borrow()
            .get_index(ty.0 as usize)
            .cloned()
            .unwrap_or(TypeKind::Void)
    }

    fn declaration(&self, decl: DeclId) -> &Declaration {
        &self.decls[decl.0 as usize]
    }

    fn find_declaration(&self, qualified_name: &str) -> Option<DeclId> {
        self.by_name.get(qualified_name).copied()
    }

    fn declarations(&self) -> Vec<DeclId> {
        (0..self.decls.len() as u32).map(DeclId).collect()
    }

    fn intern(&self, kind: TypeKind) -> TypeId {
        let (index, _) = self.types.borrow_mut().insert_full(kind);
        TypeId(index as u32)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LOADER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
struct Loader {
    decls: Vec<Declaration>,
    by_name: HashMap<String, DeclId>,
    types: IndexSet<TypeKind>,
}

/// Names visible while resolving signatures inside one declaration.
#[derive(Clone, Copy)]
struct Scope<'a> {
    owner: DeclId,
    package: Option<&'a str>,
    params: &'a [TypeParameter],
    from: &'a str,
}

impl Loader {
    fn intern(&mut self, kind: TypeKind) -> TypeId {
        TypeId(self.types.insert_full(kind).0 as u32)
    }

    fn add_decl(
        &mut self,
        kind: DeclKind,
        name: &str,
        platform: bool,
    ) -> Result<DeclId, ModelError> {
        if self.by_name.contains_key(name) {
            return Err(ModelError::Duplicate(name.to_string()));
        }
        let id = DeclId(self.decls.len() as u32);
        let simple_name = name.rsplit('.').next().unwrap_or(name).to_string();
        self.decls.push(Declaration {
            kind,
            qualified_name: name.to_string(),
            simple_name,
            package: None,
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            members: Vec::new(),
            constants: Vec::new(),
            annotations: Vec::new(),
            doc: None,
            position: None,
            platform,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Phase 1: assign identities, creating implicit packages.
    fn declare(&mut self, docs: &[DeclarationDoc], platform_len: usize) -> Result<(), ModelError> {
        for (i, doc) in docs.iter().enumerate() {
            let platform = i < platform_len;
            if doc.kind == DeclKind::Package {
                // explicit package docs may follow an implicit creation
                if !self.by_name.contains_key(&doc.name) {
                    self.add_decl(DeclKind::Package, &doc.name, platform)?;
                }
                continue;
            }
            self.add_decl(doc.kind, &doc.name, platform)?;
            if let Some((pkg, _)) = doc.name.rsplit_once('.') {
                if !self.by_name.contains_key(pkg) {
                    self.add_decl(DeclKind::Package, pkg, platform)?;
                }
            }
        }
        for decl in 0..self.decls.len() {
            if self.decls[decl].kind == DeclKind::Package {
                continue;
            }
            let package = self.decls[decl]
                .qualified_name
                .rsplit_once('.')
                .and_then(|(pkg, _)| self.by_name.get(pkg).copied());
            self.decls[decl].package = package;
        }
        Ok(())
    }

    /// Phase 2: resolve signatures and annotations.
    fn resolve(&mut self, docs: &[DeclarationDoc]) -> Result<(), ModelError> {
        let object = self.by_name.get(platform::OBJECT).copied();
        for doc in docs {
            let id = self.by_name[&doc.name];
            let package_name = match doc.kind {
                DeclKind::Package => Some(doc.name.clone()),
                _ => doc.name.rsplit_once('.').map(|(p, _)| p.to_string()),
            };

            // type parameters: names first, then bounds with the names in scope
            let mut params: Vec<TypeParameter> = Vec::new();
            let mut raw_bounds = Vec::new();
            for p in &doc.type_parameters {
                let (name, bound) = match p.split_once(" extends ") {
                    Some((n, b)) => (n.trim().to_string(), Some(b.trim().to_string())),
                    None => (p.trim().to_string(), None),
                };
                params.push(TypeParameter { name, bound: None });
                raw_bounds.push(bound);
            }
            let mut bounded = params.clone();
            for (i, bound) in raw_bounds.iter().enumerate() {
                if let Some(b) = bound {
                    let package = package_name.as_deref();
                    let scope = Scope { owner: id, package, params: &params, from: &doc.name };
                    bounded[i].bound = Some(self.resolve_signature(b, &scope)?);
                }
            }
            let params = bounded;

            let package = package_name.as_deref();
            let scope = Scope { owner: id, package, params: &params, from: &doc.name };
            let mut superclass = match &doc.superclass {
                Some(s) => Some(self.resolve_signature(s, &scope)?),
                None => None,
            };
            if superclass.is_none() && doc.kind == DeclKind::Class && doc.name != platform::OBJECT {
                if let Some(object) = object {
                    let object = TypeKind::Declared { decl: object, args: Vec::new() };
                    superclass = Some(self.intern(object));
                }
            }
            let mut interfaces = Vec::new();
            for i in &doc.interfaces {
                interfaces.push(self.resolve_signature(i, &scope)?);
            }
            let mut members = Vec::new();
            for m in &doc.members {
                let from = format!("{}.{}", doc.name, m.name);
                let member_scope = Scope { from: &from, ..scope };
                members.push(Member {
                    name: m.name.clone(),
                    kind: m.kind,
                    ty: self.resolve_signature(&m.ty, &member_scope)?,
                    annotations: self.resolve_annotations(&m.annotations, &member_scope)?,
                    setter_annotations: self
                        .resolve_annotations(&m.setter_annotations, &member_scope)?,
                    doc: m.doc.clone(),
                    position: m.position.clone(),
                });
            }
            let mut constants = Vec::new();
            for c in &doc.constants {
                constants.push(match c {
                    ConstantDoc::Name(name) => {
                        EnumConstant { name: name.clone(), annotations: Vec::new() }
                    }
                    ConstantDoc::Full { name, annotations } => EnumConstant {
                        name: name.clone(),
                        annotations: self.resolve_annotations(annotations, &scope)?,
                    },
                });
            }
            let annotations = self.resolve_annotations(&doc.annotations, &scope)?;

            let d = &mut self.decls[id.0 as usize];
            d.type_parameters = params.clone();
            d.superclass = superclass;
            d.interfaces = interfaces;
            d.is_abstract = doc.is_abstract;
            d.members = members;
            d.constants = constants;
            d.annotations = annotations;
            d.doc = doc.doc.clone();
            d.position = doc.position.clone();
        }
        Ok(())
    }

    fn resolve_annotations(
        &mut self,
        docs: &[AnnotationDoc],
        scope: &Scope<'_>,
    ) -> Result<Vec<Annotation>, ModelError> {
        docs.iter().map(|a| self.resolve_annotation(a, scope)).collect()
    }

    fn resolve_annotation(
        &mut self,
        doc: &AnnotationDoc,
        scope: &Scope<'_>,
    ) -> Result<Annotation, ModelError> {
        let mut values = IndexMap::new();
        for (k, v) in &doc.values {
            values.insert(k.clone(), self.resolve_value(v, scope)?);
        }
        Ok(Annotation { name: doc.name.clone(), values })
    }

    fn resolve_value(
        &mut self,
        doc: &ValueDoc,
        scope: &Scope<'_>,
    ) -> Result<AnnotationValue, ModelError> {
        Ok(match doc {
            ValueDoc::Bool(b) => AnnotationValue::Bool(*b),
            ValueDoc::Int(i) => AnnotationValue::Int(*i),
            ValueDoc::Str(s) => AnnotationValue::Str(s.clone()),
            ValueDoc::Type { ty } => AnnotationValue::Type(self.resolve_signature(ty, scope)?),
            ValueDoc::Annotation { annotation } => {
                AnnotationValue::Annotation(Box::new(self.resolve_annotation(annotation, scope)?))
            }
            ValueDoc::Array(xs) => AnnotationValue::Array(
                xs.iter().map(|x| self.resolve_value(x, scope)).collect::<Result<_, _>>()?,
            ),
        })
    }

    fn resolve_signature(&mut self, src: &str, scope: &Scope<'_>) -> Result<TypeId, ModelError> {
        let sig = signature::parse(src)?;
        self.resolve_sig(&sig, scope)
    }

    fn resolve_sig(&mut self, sig: &Signature, scope: &Scope<'_>) -> Result<TypeId, ModelError> {
        Ok(match sig {
            Signature::Void => self.intern(TypeKind::Void),
            Signature::Primitive(p) => self.intern(TypeKind::Primitive(*p)),
            Signature::Array(c) => {
                let c = self.resolve_sig(c, scope)?;
                self.intern(TypeKind::Array(c))
            }
            Signature::Wildcard { extends, super_ } => {
                let extends = match extends {
                    Some(b) => Some(self.resolve_sig(b, scope)?),
                    None => None,
                };
                let super_ = match super_ {
                    Some(b) => Some(self.resolve_sig(b, scope)?),
                    None => None,
                };
                self.intern(TypeKind::Wildcard { extends, super_ })
            }
            Signature::Name { name, args } => {
                if args.is_empty() && !name.contains('.') {
                    if let Some(p) = scope.params.iter().find(|p| &p.name == name) {
                        return Ok(self.intern(TypeKind::Variable {
                            name: p.name.clone(),
                            owner: scope.owner,
                            bound: p.bound,
                        }));
                    }
                }
                let decl = self.lookup(name, scope).ok_or_else(|| ModelError::UnknownType {
                    name: name.clone(),
                    from: scope.from.to_string(),
                })?;
                let mut resolved = Vec::with_capacity(args.len());
                for a in args {
                    resolved.push(self.resolve_sig(a, scope)?);
                }
                self.intern(TypeKind::Declared { decl, args: resolved })
            }
        })
    }

    /// Exact qualified name, then same package, then `java.lang`.
    fn lookup(&self, name: &str, scope: &Scope<'_>) -> Option<DeclId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        if let Some(pkg) = scope.package {
            if let Some(id) = self.by_name.get(&format!("{pkg}.{name}")) {
                return Some(*id);
            }
        }
        self.by_name.get(&format!("java.lang.{name}")).copied()
    }
}
