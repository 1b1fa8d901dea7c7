use optree_types::{CallResolution, ConstValue, Span, Type};

use crate::body::{
    Arena, Argument, Expr, ExprId, ExprKind, Local, LocalId, Stmt, StmtId, StmtKind, SyntaxBody,
};

/// Programmatic construction of a [`SyntaxBody`].
///
/// Spans are located by searching the source for a snippet. Snippets that
/// start or end with an identifier character only match on word boundaries,
/// so `span("2")` in `M2(2)` finds the argument, not the digit in the name.
#[derive(Debug)]
pub struct SyntaxBuilder {
    source: String,
    this_type: Option<Type>,
    stmts: Arena<Stmt>,
    exprs: Arena<Expr>,
    locals: Arena<Local>,
}

impl SyntaxBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            this_type: None,
            stmts: Arena::default(),
            exprs: Arena::default(),
            locals: Arena::default(),
        }
    }

    #[must_use]
    pub fn with_this_type(mut self, ty: Type) -> Self {
        self.this_type = Some(ty);
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Span of the first occurrence of `snippet`.
    ///
    /// # Panics
    ///
    /// Panics if `snippet` does not occur in the source.
    #[must_use]
    pub fn span(&self, snippet: &str) -> Span {
        self.span_nth(snippet, 0)
    }

    /// Span of the `nth` (zero-based) occurrence of `snippet`.
    ///
    /// # Panics
    ///
    /// Panics if there are fewer than `nth + 1` occurrences.
    #[must_use]
    pub fn span_nth(&self, snippet: &str, nth: usize) -> Span {
        find_snippet(&self.source, snippet, nth).unwrap_or_else(|| {
            panic!(
                "snippet `{snippet}` (occurrence {nth}) not found in `{}`",
                self.source
            )
        })
    }

    pub fn local(&mut self, name: impl Into<String>, ty: Type, span: Span) -> LocalId {
        LocalId::from_raw(self.locals.alloc(Local {
            name: name.into(),
            ty,
            span,
        }))
    }

    pub fn expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        ExprId::from_raw(self.exprs.alloc(Expr { kind, span }))
    }

    pub fn stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        StmtId::from_raw(self.stmts.alloc(Stmt { kind, span }))
    }

    #[must_use]
    pub fn expr_span(&self, expr: ExprId) -> Span {
        self.exprs[expr].span
    }

    /// A literal typed with the constant's natural type.
    pub fn literal(&mut self, value: ConstValue, span: Span) -> ExprId {
        let ty = value.natural_type();
        self.expr(ExprKind::Literal { value, ty }, span)
    }

    pub fn int(&mut self, value: i64, span: Span) -> ExprId {
        self.literal(ConstValue::Int(value), span)
    }

    pub fn local_ref(&mut self, local: LocalId, span: Span) -> ExprId {
        self.expr(ExprKind::Local(local), span)
    }

    /// A positional argument spanning its value.
    #[must_use]
    pub fn arg(&self, value: ExprId) -> Argument {
        Argument {
            name: None,
            ref_kind: Default::default(),
            value,
            span: self.exprs[value].span,
        }
    }

    #[must_use]
    pub fn named_arg(&self, name: impl Into<String>, value: ExprId, span: Span) -> Argument {
        Argument {
            name: Some(name.into()),
            ref_kind: Default::default(),
            value,
            span,
        }
    }

    pub fn call(
        &mut self,
        receiver: Option<ExprId>,
        name: impl Into<String>,
        args: Vec<Argument>,
        resolution: CallResolution,
        span: Span,
    ) -> ExprId {
        self.expr(
            ExprKind::Invocation {
                receiver,
                name: name.into(),
                args,
                resolution,
            },
            span,
        )
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        let span = self.exprs[expr].span;
        self.stmt(StmtKind::Expr(expr), span)
    }

    pub fn block(&mut self, statements: Vec<StmtId>, span: Span) -> StmtId {
        self.stmt(StmtKind::Block(statements), span)
    }

    #[must_use]
    pub fn finish(self, root: StmtId) -> SyntaxBody {
        SyntaxBody {
            source: self.source,
            this_type: self.this_type,
            root,
            stmts: self.stmts,
            exprs: self.exprs,
            locals: self.locals,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn find_snippet(source: &str, snippet: &str, nth: usize) -> Option<Span> {
    let starts_ident = snippet.chars().next().is_some_and(is_ident_char);
    let ends_ident = snippet.chars().next_back().is_some_and(is_ident_char);

    source
        .match_indices(snippet)
        .map(|(start, _)| Span::new(start, start + snippet.len()))
        .filter(|span| {
            let before_ok = !starts_ident
                || source[..span.start]
                    .chars()
                    .next_back()
                    .map_or(true, |c| !is_ident_char(c));
            let after_ok = !ends_ident
                || source[span.end..]
                    .chars()
                    .next()
                    .map_or(true, |c| !is_ident_char(c));
            before_ok && after_ok
        })
        .nth(nth)
}
