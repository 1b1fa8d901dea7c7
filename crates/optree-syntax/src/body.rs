use optree_types::{
    CallResolution, ConstValue, Conversion, MemberResolution, RefKind, Span, Type,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprId(u32);

impl ExprId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ExprId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StmtId(u32);

impl StmtId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        StmtId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(u32);

impl LocalId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        LocalId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arena<T> {
    data: Vec<T>,
}

impl<T> Arena<T> {
    pub fn alloc(&mut self, value: T) -> u32 {
        let idx = self.data.len() as u32;
        self.data.push(value);
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (i as u32, v))
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.data.get(idx)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { data: Vec::new() }
    }
}

impl<T> std::ops::Index<ExprId> for Arena<T> {
    type Output = T;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

impl<T> std::ops::Index<StmtId> for Arena<T> {
    type Output = T;

    fn index(&self, index: StmtId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

impl<T> std::ops::Index<LocalId> for Arena<T> {
    type Output = T;

    fn index(&self, index: LocalId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

/// A method body after parsing and symbol resolution.
///
/// Every call site carries the resolver's [`CallResolution`]; member accesses
/// carry a [`MemberResolution`]. Operation-tree construction consumes this and
/// never consults any other symbol information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxBody {
    pub source: String,
    /// Type of `this` inside the body; `None` in static contexts.
    #[serde(default)]
    pub this_type: Option<Type>,
    pub root: StmtId,
    pub stmts: Arena<Stmt>,
    pub exprs: Arena<Expr>,
    pub locals: Arena<Local>,
}

impl SyntaxBody {
    #[must_use]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    #[must_use]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    #[must_use]
    pub fn local(&self, id: LocalId) -> &Local {
        &self.locals[id]
    }

    /// Source text covered by `span`, or `""` when the span is out of bounds.
    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Local {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Expr(ExprId),
    LocalDecl(Vec<Declarator>),
    Return(Option<ExprId>),
    Empty,
    For {
        /// `int i = 0, j = 1` in `for (int i = 0, j = 1; ...)`.
        #[serde(default)]
        declaration: Option<StmtId>,
        /// `i = 0, j = 1` in `for (i = 0, j = 1; ...)`.
        #[serde(default)]
        initializers: Vec<ExprId>,
        #[serde(default)]
        condition: Option<ExprId>,
        #[serde(default)]
        incrementors: Vec<ExprId>,
        body: StmtId,
    },
    ForEach {
        variable: ForEachVariable,
        collection: ExprId,
        enumeration: Enumeration,
        body: StmtId,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub local: LocalId,
    #[serde(default)]
    pub initializer: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForEachVariable {
    /// `foreach (char c in s)`.
    Local(LocalId),
    /// `foreach (var (a, b) in pairs)`.
    Deconstruction(Pattern),
    /// `foreach ((a, b) in pairs)` with `a` and `b` declared outside the loop.
    Existing(ExprId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Local(LocalId),
    Tuple { elements: Vec<Pattern>, span: Span },
}

/// How the resolver decided to enumerate a `foreach` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumeration {
    /// The enumerable type actually used: an interface, the collection's own
    /// declared type, or `dynamic`.
    pub collection_type: Type,
    #[serde(default)]
    pub collection_conversion: Conversion,
    pub element_type: Type,
    #[serde(default)]
    pub element_conversion: Conversion,
}

impl Enumeration {
    pub fn identity(collection_type: Type, element_type: Type) -> Self {
        Self {
            collection_type,
            collection_conversion: Conversion::identity(),
            element_type,
            element_conversion: Conversion::identity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ref_kind: RefKind,
    pub value: ExprId,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equals,
    NotEquals,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Subtract",
            BinaryOp::Mul => "Multiply",
            BinaryOp::Div => "Divide",
            BinaryOp::LessThan => "LessThan",
            BinaryOp::LessThanOrEqual => "LessThanOrEqual",
            BinaryOp::GreaterThan => "GreaterThan",
            BinaryOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryOp::Equals => "Equals",
            BinaryOp::NotEquals => "NotEquals",
            BinaryOp::And => "ConditionalAnd",
            BinaryOp::Or => "ConditionalOr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    /// `ty` is `None` for the `null` literal.
    Literal {
        value: ConstValue,
        ty: Option<Type>,
    },
    Local(LocalId),
    Parameter {
        name: String,
        ty: Type,
    },
    This,
    /// A type used as the receiver of a static member access.
    TypeName(Type),
    /// An identifier the resolver could not bind.
    Name(String),
    /// Placeholder produced by the parser for missing syntax.
    Missing,
    MemberAccess {
        receiver: Option<ExprId>,
        name: String,
        member: MemberResolution,
    },
    Invocation {
        receiver: Option<ExprId>,
        name: String,
        args: Vec<Argument>,
        resolution: CallResolution,
    },
    ElementAccess {
        receiver: ExprId,
        args: Vec<Argument>,
        resolution: CallResolution,
    },
    ObjectCreation {
        ty: Type,
        args: Vec<Argument>,
        resolution: CallResolution,
    },
    ArrayCreation {
        element: Type,
        elements: Vec<ExprId>,
    },
    /// `receiver?.<when_not_null>`; the continuation refers back to the
    /// receiver through [`ExprKind::ConditionalReceiver`].
    ConditionalAccess {
        receiver: ExprId,
        when_not_null: ExprId,
    },
    ConditionalReceiver,
    /// `target = value`, or `target op= value` when `op` is set.
    Assignment {
        target: ExprId,
        value: ExprId,
        #[serde(default)]
        op: Option<BinaryOp>,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        ty: Type,
    },
    Increment {
        target: ExprId,
        #[serde(default)]
        is_decrement: bool,
        #[serde(default)]
        is_postfix: bool,
    },
    Cast {
        ty: Type,
        operand: ExprId,
        conversion: Conversion,
    },
    Tuple(Vec<ExprId>),
}
