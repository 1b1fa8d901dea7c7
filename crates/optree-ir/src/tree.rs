use optree_syntax::{ExprId, Local, LocalId, StmtId};
use optree_types::{Span, Type};
use std::collections::HashMap;
use std::sync::Arc;

use crate::operation::{OpId, Operation};

/// Syntax node an operation was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxNode {
    Expr(ExprId),
    Stmt(StmtId),
}

/// An immutable arena of operations rooted at one body.
///
/// Parent links live in a side table filled once, top-down, when the tree is
/// finished. Nodes never own their parent.
#[derive(Debug, Clone)]
pub struct OperationTree {
    root: OpId,
    ops: Vec<Operation>,
    has_errors: Vec<bool>,
    parents: Vec<Option<OpId>>,
    syntax: HashMap<SyntaxNode, OpId>,
    locals: Vec<Local>,
    source: Arc<str>,
}

impl OperationTree {
    #[must_use]
    pub fn root(&self) -> OpId {
        self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` belongs to another tree and is out of range.
    #[must_use]
    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.idx()]
    }

    #[must_use]
    pub fn get(&self, id: OpId) -> Option<&Operation> {
        self.ops.get(id.idx())
    }

    #[must_use]
    pub fn children(&self, id: OpId) -> Vec<OpId> {
        self.op(id).children()
    }

    #[must_use]
    pub fn parent(&self, id: OpId) -> Option<OpId> {
        self.parents.get(id.idx()).copied().flatten()
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, id: OpId) -> impl Iterator<Item = OpId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// `id` and everything below it, in pre-order.
    #[must_use]
    pub fn descendants(&self, id: OpId) -> Vec<OpId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Whether `id` or any of its descendants is invalid.
    #[must_use]
    pub fn has_errors(&self, id: OpId) -> bool {
        self.has_errors.get(id.idx()).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn local(&self, id: LocalId) -> &Local {
        &self.locals[id.idx()]
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text covered by `span`, or `""` when out of bounds.
    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// The operation built for a syntax expression, if it produced one.
    ///
    /// Type names used as static receivers produce no operation.
    #[must_use]
    pub fn operation_for_expr(&self, expr: ExprId) -> Option<OpId> {
        self.syntax.get(&SyntaxNode::Expr(expr)).copied()
    }

    #[must_use]
    pub fn operation_for_stmt(&self, stmt: StmtId) -> Option<OpId> {
        self.syntax.get(&SyntaxNode::Stmt(stmt)).copied()
    }

    /// Every operation in allocation order (children before parents).
    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.ops
            .iter()
            .enumerate()
            .map(|(idx, op)| (OpId::from_raw(idx as u32), op))
    }
}

/// Bottom-up allocator used while lowering a body.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    ops: Vec<Operation>,
    has_errors: Vec<bool>,
    syntax: HashMap<SyntaxNode, OpId>,
}

impl TreeBuilder {
    /// Allocates `op`. Children must already be allocated.
    ///
    /// A type containing [`Type::Error`] marks the operation invalid while
    /// keeping its shape.
    pub(crate) fn alloc(&mut self, mut op: Operation) -> OpId {
        if op.ty.as_ref().is_some_and(Type::contains_error) {
            op.is_invalid = true;
        }
        let has_errors = op.is_invalid
            || op
                .data
                .children()
                .iter()
                .any(|child| self.has_errors[child.idx()]);
        let id = OpId::from_raw(self.ops.len() as u32);
        self.ops.push(op);
        self.has_errors.push(has_errors);
        id
    }

    pub(crate) fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.idx()]
    }

    pub(crate) fn ty(&self, id: OpId) -> Option<&Type> {
        self.ops[id.idx()].ty.as_ref()
    }

    pub(crate) fn record(&mut self, node: SyntaxNode, op: OpId) {
        self.syntax.entry(node).or_insert(op);
    }

    pub(crate) fn finish(self, root: OpId, locals: Vec<Local>, source: &str) -> OperationTree {
        let parents = link_parents(&self.ops, root);
        OperationTree {
            root,
            ops: self.ops,
            has_errors: self.has_errors,
            parents,
            syntax: self.syntax,
            locals,
            source: Arc::from(source),
        }
    }
}

/// Assigns every reachable operation its parent, walking down from `root`.
///
/// Each operation has at most one parent; the walk never revisits a node.
fn link_parents(ops: &[Operation], root: OpId) -> Vec<Option<OpId>> {
    let mut parents = vec![None; ops.len()];
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        for child in ops[current.idx()].children() {
            debug_assert!(
                parents[child.idx()].is_none(),
                "operation {child:?} reachable from two parents"
            );
            parents[child.idx()] = Some(current);
            stack.push(child);
        }
    }
    parents
}
