use std::fmt;

/// The closed set of operation kinds.
///
/// Every [`crate::OperationData`] variant maps to exactly one kind. Consumers
/// that `match` without a wildcard arm stop compiling when a kind is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Invalid,
    Block,
    ExpressionStatement,
    VariableDeclarationGroup,
    VariableDeclarator,
    Return,
    Empty,
    ForLoop,
    ForEachLoop,
    WhileLoop,
    Literal,
    LocalReference,
    ParameterReference,
    InstanceReference,
    FieldReference,
    PropertyReference,
    Invocation,
    ObjectCreation,
    Argument,
    Conversion,
    ConditionalAccess,
    ConditionalAccessInstance,
    ArrayCreation,
    ArrayInitializer,
    DefaultValue,
    SimpleAssignment,
    CompoundAssignment,
    Increment,
    Binary,
    Tuple,
    DeclarationExpression,
    ArgList,
}

impl OperationKind {
    pub const ALL: [OperationKind; 32] = [
        OperationKind::Invalid,
        OperationKind::Block,
        OperationKind::ExpressionStatement,
        OperationKind::VariableDeclarationGroup,
        OperationKind::VariableDeclarator,
        OperationKind::Return,
        OperationKind::Empty,
        OperationKind::ForLoop,
        OperationKind::ForEachLoop,
        OperationKind::WhileLoop,
        OperationKind::Literal,
        OperationKind::LocalReference,
        OperationKind::ParameterReference,
        OperationKind::InstanceReference,
        OperationKind::FieldReference,
        OperationKind::PropertyReference,
        OperationKind::Invocation,
        OperationKind::ObjectCreation,
        OperationKind::Argument,
        OperationKind::Conversion,
        OperationKind::ConditionalAccess,
        OperationKind::ConditionalAccessInstance,
        OperationKind::ArrayCreation,
        OperationKind::ArrayInitializer,
        OperationKind::DefaultValue,
        OperationKind::SimpleAssignment,
        OperationKind::CompoundAssignment,
        OperationKind::Increment,
        OperationKind::Binary,
        OperationKind::Tuple,
        OperationKind::DeclarationExpression,
        OperationKind::ArgList,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Invalid => "Invalid",
            OperationKind::Block => "Block",
            OperationKind::ExpressionStatement => "ExpressionStatement",
            OperationKind::VariableDeclarationGroup => "VariableDeclarationGroup",
            OperationKind::VariableDeclarator => "VariableDeclarator",
            OperationKind::Return => "Return",
            OperationKind::Empty => "Empty",
            OperationKind::ForLoop => "ForLoop",
            OperationKind::ForEachLoop => "ForEachLoop",
            OperationKind::WhileLoop => "WhileLoop",
            OperationKind::Literal => "Literal",
            OperationKind::LocalReference => "LocalReference",
            OperationKind::ParameterReference => "ParameterReference",
            OperationKind::InstanceReference => "InstanceReference",
            OperationKind::FieldReference => "FieldReference",
            OperationKind::PropertyReference => "PropertyReference",
            OperationKind::Invocation => "Invocation",
            OperationKind::ObjectCreation => "ObjectCreation",
            OperationKind::Argument => "Argument",
            OperationKind::Conversion => "Conversion",
            OperationKind::ConditionalAccess => "ConditionalAccess",
            OperationKind::ConditionalAccessInstance => "ConditionalAccessInstance",
            OperationKind::ArrayCreation => "ArrayCreation",
            OperationKind::ArrayInitializer => "ArrayInitializer",
            OperationKind::DefaultValue => "DefaultValue",
            OperationKind::SimpleAssignment => "SimpleAssignment",
            OperationKind::CompoundAssignment => "CompoundAssignment",
            OperationKind::Increment => "Increment",
            OperationKind::Binary => "Binary",
            OperationKind::Tuple => "Tuple",
            OperationKind::DeclarationExpression => "DeclarationExpression",
            OperationKind::ArgList => "ArgList",
        }
    }

    /// Statements never produce a value.
    #[must_use]
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            OperationKind::Block
                | OperationKind::ExpressionStatement
                | OperationKind::VariableDeclarationGroup
                | OperationKind::Return
                | OperationKind::Empty
                | OperationKind::ForLoop
                | OperationKind::ForEachLoop
                | OperationKind::WhileLoop
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
