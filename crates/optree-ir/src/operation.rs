use optree_syntax::{BinaryOp, LocalId};
use optree_types::{ConstValue, Conversion, FieldSymbol, Parameter, Signature, Span, Type};
use std::fmt;

use crate::kind::OperationKind;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u32);

impl OpId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        OpId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({})", self.0)
    }
}

/// How an argument slot was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// Written at the call site (or the receiver of an extension call).
    Explicit,
    /// Filled from the parameter's declared default.
    DefaultValue,
    /// Expanded-form params array synthesized from zero or more arguments.
    ParamArray,
}

impl ArgumentKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ArgumentKind::Explicit => "Explicit",
            ArgumentKind::DefaultValue => "DefaultValue",
            ArgumentKind::ParamArray => "ParamArray",
        }
    }
}

/// Kind-specific payload of an [`Operation`].
///
/// Child operations are referenced by [`OpId`] and are always allocated before
/// their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationData {
    /// A construct that could not be bound; keeps whatever did bind.
    Invalid {
        children: Vec<OpId>,
    },
    Block {
        statements: Vec<OpId>,
        locals: Vec<LocalId>,
    },
    ExpressionStatement {
        operation: OpId,
    },
    VariableDeclarationGroup {
        declarators: Vec<OpId>,
    },
    VariableDeclarator {
        local: LocalId,
        initializer: Option<OpId>,
    },
    Return {
        value: Option<OpId>,
    },
    Empty,
    ForLoop {
        locals: Vec<LocalId>,
        before: Vec<OpId>,
        /// `None` means the loop condition is always true.
        condition: Option<OpId>,
        at_loop_bottom: Vec<OpId>,
        body: OpId,
    },
    ForEachLoop {
        locals: Vec<LocalId>,
        loop_control_variable: OpId,
        /// Always an implicit [`OperationKind::Conversion`] to the enumerable
        /// type actually used.
        collection: OpId,
        element_type: Type,
        element_conversion: Conversion,
        body: OpId,
    },
    WhileLoop {
        condition: OpId,
        body: OpId,
    },
    Literal,
    LocalReference {
        local: LocalId,
        is_declaration: bool,
    },
    ParameterReference {
        name: String,
    },
    InstanceReference,
    FieldReference {
        field: FieldSymbol,
        instance: Option<OpId>,
    },
    /// A property or indexer access; `arguments` is empty for properties.
    PropertyReference {
        signature: Signature,
        instance: Option<OpId>,
        arguments: Vec<OpId>,
    },
    Invocation {
        signature: Signature,
        instance: Option<OpId>,
        arguments: Vec<OpId>,
    },
    ObjectCreation {
        constructor: Signature,
        arguments: Vec<OpId>,
    },
    Argument {
        kind: ArgumentKind,
        /// `None` for vararg extras and the vararg sentinel.
        parameter: Option<Parameter>,
        value: OpId,
        in_conversion: Conversion,
        out_conversion: Conversion,
    },
    Conversion {
        conversion: Conversion,
        operand: OpId,
    },
    ConditionalAccess {
        operation: OpId,
        when_not_null: OpId,
    },
    /// Stands for the already-evaluated tested value of the nearest enclosing
    /// [`OperationData::ConditionalAccess`].
    ConditionalAccessInstance,
    ArrayCreation {
        dimension_sizes: Vec<OpId>,
        initializer: Option<OpId>,
    },
    ArrayInitializer {
        elements: Vec<OpId>,
    },
    DefaultValue,
    SimpleAssignment {
        target: OpId,
        value: OpId,
    },
    CompoundAssignment {
        op: BinaryOp,
        target: OpId,
        value: OpId,
    },
    Increment {
        target: OpId,
        is_decrement: bool,
        is_postfix: bool,
    },
    Binary {
        op: BinaryOp,
        lhs: OpId,
        rhs: OpId,
    },
    Tuple {
        elements: Vec<OpId>,
    },
    DeclarationExpression {
        expression: OpId,
    },
    /// The `__arglist` sentinel closing a vararg argument list.
    ArgList,
}

impl OperationData {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationData::Invalid { .. } => OperationKind::Invalid,
            OperationData::Block { .. } => OperationKind::Block,
            OperationData::ExpressionStatement { .. } => OperationKind::ExpressionStatement,
            OperationData::VariableDeclarationGroup { .. } => {
                OperationKind::VariableDeclarationGroup
            }
            OperationData::VariableDeclarator { .. } => OperationKind::VariableDeclarator,
            OperationData::Return { .. } => OperationKind::Return,
            OperationData::Empty => OperationKind::Empty,
            OperationData::ForLoop { .. } => OperationKind::ForLoop,
            OperationData::ForEachLoop { .. } => OperationKind::ForEachLoop,
            OperationData::WhileLoop { .. } => OperationKind::WhileLoop,
            OperationData::Literal => OperationKind::Literal,
            OperationData::LocalReference { .. } => OperationKind::LocalReference,
            OperationData::ParameterReference { .. } => OperationKind::ParameterReference,
            OperationData::InstanceReference => OperationKind::InstanceReference,
            OperationData::FieldReference { .. } => OperationKind::FieldReference,
            OperationData::PropertyReference { .. } => OperationKind::PropertyReference,
            OperationData::Invocation { .. } => OperationKind::Invocation,
            OperationData::ObjectCreation { .. } => OperationKind::ObjectCreation,
            OperationData::Argument { .. } => OperationKind::Argument,
            OperationData::Conversion { .. } => OperationKind::Conversion,
            OperationData::ConditionalAccess { .. } => OperationKind::ConditionalAccess,
            OperationData::ConditionalAccessInstance => OperationKind::ConditionalAccessInstance,
            OperationData::ArrayCreation { .. } => OperationKind::ArrayCreation,
            OperationData::ArrayInitializer { .. } => OperationKind::ArrayInitializer,
            OperationData::DefaultValue => OperationKind::DefaultValue,
            OperationData::SimpleAssignment { .. } => OperationKind::SimpleAssignment,
            OperationData::CompoundAssignment { .. } => OperationKind::CompoundAssignment,
            OperationData::Increment { .. } => OperationKind::Increment,
            OperationData::Binary { .. } => OperationKind::Binary,
            OperationData::Tuple { .. } => OperationKind::Tuple,
            OperationData::DeclarationExpression { .. } => OperationKind::DeclarationExpression,
            OperationData::ArgList => OperationKind::ArgList,
        }
    }

    /// Child operations in canonical order (the order the printer uses).
    #[must_use]
    pub fn children(&self) -> Vec<OpId> {
        let mut out = Vec::new();
        match self {
            OperationData::Invalid { children } => out.extend_from_slice(children),
            OperationData::Block { statements, .. } => out.extend_from_slice(statements),
            OperationData::ExpressionStatement { operation } => out.push(*operation),
            OperationData::VariableDeclarationGroup { declarators } => {
                out.extend_from_slice(declarators)
            }
            OperationData::VariableDeclarator { initializer, .. } => out.extend(*initializer),
            OperationData::Return { value } => out.extend(*value),
            OperationData::ForLoop {
                before,
                condition,
                at_loop_bottom,
                body,
                ..
            } => {
                out.extend_from_slice(before);
                out.extend(*condition);
                out.extend_from_slice(at_loop_bottom);
                out.push(*body);
            }
            OperationData::ForEachLoop {
                loop_control_variable,
                collection,
                body,
                ..
            } => {
                out.push(*loop_control_variable);
                out.push(*collection);
                out.push(*body);
            }
            OperationData::WhileLoop { condition, body } => {
                out.push(*condition);
                out.push(*body);
            }
            OperationData::FieldReference { instance, .. } => out.extend(*instance),
            OperationData::PropertyReference {
                instance,
                arguments,
                ..
            }
            | OperationData::Invocation {
                instance,
                arguments,
                ..
            } => {
                out.extend(*instance);
                out.extend_from_slice(arguments);
            }
            OperationData::ObjectCreation { arguments, .. } => out.extend_from_slice(arguments),
            OperationData::Argument { value, .. } => out.push(*value),
            OperationData::Conversion { operand, .. } => out.push(*operand),
            OperationData::ConditionalAccess {
                operation,
                when_not_null,
            } => {
                out.push(*operation);
                out.push(*when_not_null);
            }
            OperationData::ArrayCreation {
                dimension_sizes,
                initializer,
            } => {
                out.extend_from_slice(dimension_sizes);
                out.extend(*initializer);
            }
            OperationData::ArrayInitializer { elements } | OperationData::Tuple { elements } => {
                out.extend_from_slice(elements)
            }
            OperationData::SimpleAssignment { target, value }
            | OperationData::CompoundAssignment { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            OperationData::Increment { target, .. } => out.push(*target),
            OperationData::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            OperationData::DeclarationExpression { expression } => out.push(*expression),
            OperationData::Empty
            | OperationData::Literal
            | OperationData::LocalReference { .. }
            | OperationData::ParameterReference { .. }
            | OperationData::InstanceReference
            | OperationData::ConditionalAccessInstance
            | OperationData::DefaultValue
            | OperationData::ArgList => {}
        }
        out
    }
}

/// One node of an [`crate::OperationTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub data: OperationData,
    /// `None` when the operation produces no value.
    pub ty: Option<Type>,
    pub constant: Option<ConstValue>,
    pub span: Span,
    pub is_implicit: bool,
    pub is_invalid: bool,
}

impl Operation {
    pub fn new(data: OperationData, ty: Option<Type>, span: Span) -> Self {
        Self {
            data,
            ty,
            constant: None,
            span,
            is_implicit: false,
            is_invalid: false,
        }
    }

    #[must_use]
    pub fn implicit(mut self) -> Self {
        self.is_implicit = true;
        self
    }

    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.is_invalid = true;
        self
    }

    #[must_use]
    pub fn with_constant(mut self, constant: ConstValue) -> Self {
        self.constant = Some(constant);
        self
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.data.kind()
    }

    #[must_use]
    pub fn children(&self) -> Vec<OpId> {
        self.data.children()
    }
}
