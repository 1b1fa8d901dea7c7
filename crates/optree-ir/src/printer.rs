//! Canonical text form of an operation tree, used for golden tests.
//!
//! One line per operation, two spaces of indentation per level:
//!
//! ```text
//! Invocation (void P.M(int x)) (Type: null) (Syntax: 'M(1)')
//!   Instance Receiver:
//!     InstanceReference (Type: P, IsImplicit) (Syntax: 'M(1)')
//!   Arguments(1):
//!     [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
//!       Literal (Type: int, Constant: 1) (Syntax: '1')
//! ```
//!
//! The output depends only on the tree, so printing the same tree twice is
//! byte-identical.

use optree_syntax::LocalId;
use optree_types::{Conversion, SignatureKind};

use crate::operation::{OpId, Operation, OperationData};
use crate::tree::OperationTree;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Append ` [start..end]` to every line.
    pub show_spans: bool,
}

#[must_use]
pub fn dump(tree: &OperationTree) -> String {
    dump_with(tree, &DumpOptions::default())
}

#[must_use]
pub fn dump_with(tree: &OperationTree, options: &DumpOptions) -> String {
    dump_op_with(tree, tree.root(), options)
}

/// Prints the subtree rooted at `op`.
#[must_use]
pub fn dump_op(tree: &OperationTree, op: OpId) -> String {
    dump_op_with(tree, op, &DumpOptions::default())
}

#[must_use]
pub fn dump_op_with(tree: &OperationTree, op: OpId, options: &DumpOptions) -> String {
    let mut printer = Printer {
        tree,
        options,
        out: String::new(),
    };
    printer.node(op, 0, None);
    printer.out
}

struct Printer<'a> {
    tree: &'a OperationTree,
    options: &'a DumpOptions,
    out: String,
}

impl Printer<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, id: OpId, depth: usize, index: Option<usize>) {
        let tree = self.tree;
        let op = tree.op(id);

        let mut header = String::new();
        if let Some(index) = index {
            header.push_str(&format!("[{index}] "));
        }
        header.push_str(op.kind().name());
        if let Some(detail) = self.detail(op) {
            header.push_str(&format!(" ({detail})"));
        }

        let mut props = match &op.ty {
            Some(ty) => format!("Type: {ty}"),
            None => "Type: null".to_string(),
        };
        if let Some(constant) = &op.constant {
            props.push_str(&format!(", Constant: {constant}"));
        }
        if tree.has_errors(id) {
            props.push_str(", IsInvalid");
        }
        if op.is_implicit {
            props.push_str(", IsImplicit");
        }
        header.push_str(&format!(
            " ({props}) (Syntax: '{}')",
            normalize_whitespace(tree.text(op.span))
        ));
        if self.options.show_spans {
            header.push_str(&format!(" [{}..{}]", op.span.start, op.span.end));
        }
        self.line(depth, &header);
        self.slots(op, depth);
    }

    fn detail(&self, op: &Operation) -> Option<String> {
        match &op.data {
            OperationData::VariableDeclarator { local, .. } => {
                Some(format!("Symbol: {}", self.local(*local)))
            }
            OperationData::ForEachLoop { element_type, .. } => {
                Some(format!("ElementType: {element_type}"))
            }
            OperationData::LocalReference {
                local,
                is_declaration,
            } => {
                let name = &self.tree.local(*local).name;
                Some(if *is_declaration {
                    format!("Local: {name}, IsDeclaration: True")
                } else {
                    format!("Local: {name}")
                })
            }
            OperationData::ParameterReference { name } => Some(format!("Parameter: {name}")),
            OperationData::FieldReference { field, .. } => Some(format!(
                "Field: {} {}.{}",
                field.ty, field.container, field.name
            )),
            OperationData::PropertyReference { signature, .. } => {
                Some(format!("Property: {signature}"))
            }
            OperationData::Invocation { signature, .. } => Some(signature.to_string()),
            OperationData::ObjectCreation { constructor, .. } => {
                Some(format!("Constructor: {constructor}"))
            }
            OperationData::Argument {
                kind, parameter, ..
            } => Some(format!(
                "{}, Parameter: {}",
                kind.name(),
                parameter.as_ref().map_or("null", |p| p.name.as_str())
            )),
            OperationData::Conversion { conversion, .. } => {
                Some(format!("Conversion: {conversion}"))
            }
            OperationData::CompoundAssignment { op, .. }
            | OperationData::Binary { op, .. } => Some(format!("Operator: {}", op.name())),
            OperationData::Increment {
                is_decrement,
                is_postfix,
                ..
            } => {
                let fixity = if *is_postfix { "Postfix" } else { "Prefix" };
                Some(if *is_decrement {
                    format!("{fixity}, Decrement")
                } else {
                    fixity.to_string()
                })
            }
            OperationData::Invalid { .. }
            | OperationData::Block { .. }
            | OperationData::ExpressionStatement { .. }
            | OperationData::VariableDeclarationGroup { .. }
            | OperationData::Return { .. }
            | OperationData::Empty
            | OperationData::ForLoop { .. }
            | OperationData::WhileLoop { .. }
            | OperationData::Literal
            | OperationData::InstanceReference
            | OperationData::ConditionalAccess { .. }
            | OperationData::ConditionalAccessInstance
            | OperationData::ArrayCreation { .. }
            | OperationData::ArrayInitializer { .. }
            | OperationData::DefaultValue
            | OperationData::SimpleAssignment { .. }
            | OperationData::Tuple { .. }
            | OperationData::DeclarationExpression { .. }
            | OperationData::ArgList => None,
        }
    }

    fn slots(&mut self, op: &Operation, depth: usize) {
        match &op.data {
            OperationData::Invalid { children } => self.list(depth, "Children", children),
            OperationData::Block { statements, locals } => {
                self.locals(depth, locals);
                self.list(depth, "Statements", statements);
            }
            OperationData::ExpressionStatement { operation } => self.node(*operation, depth + 1, None),
            OperationData::VariableDeclarationGroup { declarators } => {
                self.list(depth, "Declarators", declarators)
            }
            OperationData::VariableDeclarator { initializer, .. } => {
                self.slot(depth, "Initializer", *initializer)
            }
            OperationData::Return { value } => self.slot(depth, "ReturnedValue", *value),
            OperationData::ForLoop {
                locals,
                before,
                condition,
                at_loop_bottom,
                body,
            } => {
                self.locals(depth, locals);
                self.list(depth, "Before", before);
                self.slot(depth, "Condition", *condition);
                self.list(depth, "AtLoopBottom", at_loop_bottom);
                self.slot(depth, "Body", Some(*body));
            }
            OperationData::ForEachLoop {
                locals,
                loop_control_variable,
                collection,
                element_conversion,
                body,
                ..
            } => {
                self.locals(depth, locals);
                self.slot(depth, "LoopControlVariable", Some(*loop_control_variable));
                self.slot(depth, "Collection", Some(*collection));
                self.conversion(depth, "ElementConversion", element_conversion);
                self.slot(depth, "Body", Some(*body));
            }
            OperationData::WhileLoop { condition, body } => {
                self.slot(depth, "Condition", Some(*condition));
                self.slot(depth, "Body", Some(*body));
            }
            OperationData::FieldReference { instance, .. } => {
                self.slot(depth, "Instance Receiver", *instance)
            }
            OperationData::PropertyReference {
                signature,
                instance,
                arguments,
            } => {
                self.slot(depth, "Instance Receiver", *instance);
                if signature.kind == SignatureKind::Indexer {
                    self.list(depth, "Arguments", arguments);
                }
            }
            OperationData::Invocation {
                instance,
                arguments,
                ..
            } => {
                self.slot(depth, "Instance Receiver", *instance);
                self.list(depth, "Arguments", arguments);
            }
            OperationData::ObjectCreation { arguments, .. } => {
                self.list(depth, "Arguments", arguments)
            }
            OperationData::Argument {
                value,
                in_conversion,
                out_conversion,
                ..
            } => {
                self.node(*value, depth + 1, None);
                self.conversion(depth, "InConversion", in_conversion);
                self.conversion(depth, "OutConversion", out_conversion);
            }
            OperationData::Conversion { operand, .. } => self.slot(depth, "Operand", Some(*operand)),
            OperationData::ConditionalAccess {
                operation,
                when_not_null,
            } => {
                self.slot(depth, "Operation", Some(*operation));
                self.slot(depth, "WhenNotNull", Some(*when_not_null));
            }
            OperationData::ArrayCreation {
                dimension_sizes,
                initializer,
            } => {
                self.list(depth, "Dimension Sizes", dimension_sizes);
                self.slot(depth, "Initializer", *initializer);
            }
            OperationData::ArrayInitializer { elements } => {
                self.list(depth, "Element Values", elements)
            }
            OperationData::SimpleAssignment { target, value }
            | OperationData::CompoundAssignment { target, value, .. } => {
                self.slot(depth, "Left", Some(*target));
                self.slot(depth, "Right", Some(*value));
            }
            OperationData::Increment { target, .. } => self.slot(depth, "Target", Some(*target)),
            OperationData::Binary { lhs, rhs, .. } => {
                self.slot(depth, "Left", Some(*lhs));
                self.slot(depth, "Right", Some(*rhs));
            }
            OperationData::Tuple { elements } => self.list(depth, "Elements", elements),
            OperationData::DeclarationExpression { expression } => {
                self.node(*expression, depth + 1, None)
            }
            OperationData::Empty
            | OperationData::Literal
            | OperationData::LocalReference { .. }
            | OperationData::ParameterReference { .. }
            | OperationData::InstanceReference
            | OperationData::ConditionalAccessInstance
            | OperationData::DefaultValue
            | OperationData::ArgList => {}
        }
    }

    fn slot(&mut self, depth: usize, name: &str, child: Option<OpId>) {
        match child {
            Some(child) => {
                self.line(depth + 1, &format!("{name}:"));
                self.node(child, depth + 2, None);
            }
            None => self.line(depth + 1, &format!("{name}: null")),
        }
    }

    fn list(&mut self, depth: usize, name: &str, items: &[OpId]) {
        if items.is_empty() {
            self.line(depth + 1, &format!("{name}(0)"));
            return;
        }
        self.line(depth + 1, &format!("{name}({}):", items.len()));
        for (index, &item) in items.iter().enumerate() {
            self.node(item, depth + 2, Some(index));
        }
    }

    fn locals(&mut self, depth: usize, locals: &[LocalId]) {
        if locals.is_empty() {
            return;
        }
        let rendered: Vec<String> = locals.iter().map(|&local| self.local(local)).collect();
        self.line(depth + 1, &format!("Locals: {}", rendered.join(", ")));
    }

    fn conversion(&mut self, depth: usize, name: &str, conversion: &Conversion) {
        if !conversion.is_identity() {
            self.line(depth + 1, &format!("{name}: {conversion}"));
        }
    }

    fn local(&self, local: LocalId) -> String {
        let local = self.tree.local(local);
        format!("{} {}", local.ty, local.name)
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
