//! Node annotations
//!
//! Side table from [`NodeId`] to the facts the semantic passes attach to a
//! node: its scope, its type and whether it denotes an assignable location.
//! Each fact is written at most once per node.

use std::collections::HashMap;

use crate::ast::NodeId;
use crate::error::{AnnotationField, AslError, AslResult};
use crate::semantic::ScopeId;
use crate::types::Type;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub scope: Option<ScopeId>,
    pub ty: Option<Type>,
    pub is_lvalue: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    nodes: HashMap<NodeId, Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<&Annotation> {
        self.nodes.get(&node)
    }

    /// Number of annotated nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn put_scope(&mut self, node: NodeId, scope: ScopeId) -> AslResult<()> {
        write_once(
            &mut self.nodes.entry(node).or_default().scope,
            scope,
            node,
            AnnotationField::Scope,
        )
    }

    pub fn put_type(&mut self, node: NodeId, ty: Type) -> AslResult<()> {
        write_once(
            &mut self.nodes.entry(node).or_default().ty,
            ty,
            node,
            AnnotationField::Type,
        )
    }

    pub fn put_is_lvalue(&mut self, node: NodeId, is_lvalue: bool) -> AslResult<()> {
        write_once(
            &mut self.nodes.entry(node).or_default().is_lvalue,
            is_lvalue,
            node,
            AnnotationField::IsLValue,
        )
    }

    pub fn scope(&self, node: NodeId) -> Option<ScopeId> {
        self.get(node).and_then(|a| a.scope)
    }

    pub fn ty(&self, node: NodeId) -> Option<&Type> {
        self.get(node).and_then(|a| a.ty.as_ref())
    }

    pub fn is_lvalue(&self, node: NodeId) -> Option<bool> {
        self.get(node).and_then(|a| a.is_lvalue)
    }

    pub(crate) fn expect_scope(&self, node: NodeId) -> AslResult<ScopeId> {
        self.scope(node).ok_or(AslError::MissingAnnotation {
            node,
            field: AnnotationField::Scope,
        })
    }

    pub(crate) fn expect_is_lvalue(&self, node: NodeId) -> AslResult<bool> {
        self.is_lvalue(node).ok_or(AslError::MissingAnnotation {
            node,
            field: AnnotationField::IsLValue,
        })
    }
}

fn write_once<T>(
    slot: &mut Option<T>,
    value: T,
    node: NodeId,
    field: AnnotationField,
) -> AslResult<()> {
    if slot.is_some() {
        return Err(AslError::AnnotationRewritten { node, field });
    }
    *slot = Some(value);
    Ok(())
}
