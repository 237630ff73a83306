//! Type signatures as written in model documents.
//!
//! ```text
//! type     := 'void' | wildcard | base ('[' ']')*
//! wildcard := '?' (('extends' | 'super') type)?
//! base     := primitive | name ('<' type (',' type)* '>')?
//! ```
//!
//! Parsing is purely syntactic; names are resolved by the loader.
use crate::error::ModelError;
use crate::graph::PrimitiveKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    Void,
    Primitive(PrimitiveKind),
    Name { name: String, args: Vec<Signature> },
    Array(Box<Signature>),
    Wildcard { extends: Option<Box<Signature>>, super_: Option<Box<Signature>> },
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Lt,
    Gt,
    Comma,
    Brackets,
    Question,
}

fn tokenize(src: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => { chars.next(); }
            '<' => { chars.next(); out.push(Tok::Lt); }
            '>' => { chars.next(); out.push(Tok::Gt); }
            ',' => { chars.next(); out.push(Tok::Comma); }
            '?' => { chars.next(); out.push(Tok::Question); }
            '[' => {
                chars.next();
                while chars.peek().is_some_and(|c| c.is_whitespace()) { chars.next(); }
                if chars.next() != Some(']') {
                    return Err("expected `]`".into());
                }
                out.push(Tok::Brackets);
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if ident.ends_with('.') || ident.contains("..") {
                    return Err(format!("bad name `{ident}`"));
                }
                out.push(Tok::Ident(ident));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(out)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn ty(&mut self) -> Result<Signature, String> {
        match self.next() {
            Some(Tok::Question) => {
                let bound = match self.peek() {
                    Some(Tok::Ident(kw)) if kw == "extends" || kw == "super" => {
                        let is_extends = kw == "extends";
                        self.pos += 1;
                        Some((is_extends, Box::new(self.ty()?)))
                    }
                    _ => None,
                };
                Ok(match bound {
                    Some((true, b)) => Signature::Wildcard { extends: Some(b), super_: None },
                    Some((false, b)) => Signature::Wildcard { extends: None, super_: Some(b) },
                    None => Signature::Wildcard { extends: None, super_: None },
                })
            }
            Some(Tok::Ident(name)) if name == "void" => Ok(Signature::Void),
            Some(Tok::Ident(name)) => {
                let mut base = match PrimitiveKind::from_keyword(&name) {
                    Some(p) => Signature::Primitive(p),
                    None => {
                        let mut args = Vec::new();
                        if self.peek() == Some(&Tok::Lt) {
                            self.pos += 1;
                            loop {
                                args.push(self.ty()?);
                                match self.next() {
                                    Some(Tok::Comma) => continue,
                                    Some(Tok::Gt) => break,
                                    _ => return Err("expected `,` or `>`".into()),
                                }
                            }
                        }
                        Signature::Name { name, args }
                    }
                };
                while self.peek() == Some(&Tok::Brackets) {
                    self.pos += 1;
                    base = Signature::Array(Box::new(base));
                }
                Ok(base)
            }
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of signature".into()),
        }
    }
}

pub fn parse(src: &str) -> Result<Signature, ModelError> {
    let err = |reason: String| ModelError::Signature { signature: src.to_string(), reason };
    let toks = tokenize(src).map_err(err)?;
    let mut p = Parser { toks, pos: 0 };
    let sig = p.ty().map_err(err)?;
    if p.pos != p.toks.len() {
        return Err(err("trailing input".into()));
    }
    Ok(sig)
}
