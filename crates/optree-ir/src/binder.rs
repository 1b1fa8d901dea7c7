//! Matching call-site arguments to the parameters of a resolved signature.
//!
//! The binder is pure: it sees the signature plus a summary of each call-site
//! argument and returns one [`ArgumentSlot`] per Argument node the caller
//! should build. It never panics; every malformed call is a [`BindError`].

use optree_types::{ParamsForm, Parameter, RefKind, Signature, Type};
use thiserror::Error;

use crate::diagnostics::ArgumentOrder;

/// What the binder needs to know about one call-site argument.
#[derive(Debug, Clone, Copy)]
pub struct CallArg<'a> {
    pub name: Option<&'a str>,
    pub ref_kind: RefKind,
    /// Type of the bound value; `None` for the `null` literal and for values
    /// without a type.
    pub ty: Option<&'a Type>,
    /// Parse-error placeholder (`M(1,)`); exempt from conversion checks.
    pub is_missing: bool,
    /// Whether the resolver found a conversion into the parameter.
    pub converts: bool,
}

impl<'a> CallArg<'a> {
    pub fn positional(ty: Option<&'a Type>) -> Self {
        Self {
            name: None,
            ref_kind: RefKind::None,
            ty,
            is_missing: false,
            converts: true,
        }
    }

    pub fn named(name: &'a str, ty: Option<&'a Type>) -> Self {
        Self {
            name: Some(name),
            ..Self::positional(ty)
        }
    }
}

/// One argument node to build, referring to call-site arguments and
/// signature parameters by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSlot {
    /// The receiver of an extension method called with instance syntax.
    Receiver { param: usize },
    Explicit { arg: usize, param: usize },
    DefaultValue { param: usize },
    /// Expanded params array over `elements` (possibly none).
    ParamArray { param: usize, elements: Vec<usize> },
    /// Extra argument of a vararg call; binds to no parameter.
    Vararg { arg: usize },
    /// The trailing `__arglist` sentinel of a vararg call.
    ArgListSentinel,
}

impl ArgumentSlot {
    /// Parameter ordinal the slot binds to.
    #[must_use]
    pub fn param(&self) -> Option<usize> {
        match self {
            ArgumentSlot::Receiver { param }
            | ArgumentSlot::Explicit { param, .. }
            | ArgumentSlot::DefaultValue { param }
            | ArgumentSlot::ParamArray { param, .. } => Some(*param),
            ArgumentSlot::Vararg { .. } | ArgumentSlot::ArgListSentinel => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("too many arguments: expected at most {expected}, found {found}")]
    TooManyArguments { expected: usize, found: usize },
    #[error("no argument given for required parameter `{parameter}`")]
    MissingArgument { parameter: String },
    #[error("no parameter named `{name}`")]
    UnknownNamedArgument { name: String },
    #[error("parameter `{parameter}` is given more than one argument")]
    DuplicateArgument { parameter: String },
    #[error("named argument `{name}` is out of position and followed by positional arguments")]
    NamedArgumentOutOfPosition { name: String },
    #[error("argument {} cannot be converted to parameter `{parameter}`", .arg + 1)]
    ArgumentMismatch { arg: usize, parameter: String },
    #[error(
        "argument {} must be passed with `{}` for parameter `{parameter}`",
        .arg + 1,
        .expected.prefix().trim_end()
    )]
    RefKindMismatch {
        arg: usize,
        parameter: String,
        expected: RefKind,
    },
    #[error("extension method has no parameter to receive the instance")]
    MissingReceiver,
}

/// Per-call inputs to [`bind_arguments`] beyond the signature and arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    /// Parameter 0 receives the call receiver and call-site arguments start
    /// at parameter 1.
    pub receiver_is_argument: bool,
    pub order: ArgumentOrder,
    /// The resolver's normal/expanded decision for a params parameter. When
    /// absent, a lone argument is checked against the parameter type.
    pub params_form: Option<ParamsForm>,
}

impl BindOptions {
    pub fn new(order: ArgumentOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_receiver(mut self) -> Self {
        self.receiver_is_argument = true;
        self
    }

    #[must_use]
    pub fn with_params_form(mut self, form: Option<ParamsForm>) -> Self {
        self.params_form = form;
        self
    }
}

/// Binds `args` to the parameters of `signature`.
///
/// Slots refer to parameters by their position in `signature.params`; the
/// stored [`Parameter::ordinal`] is not trusted.
pub fn bind_arguments(
    signature: &Signature,
    args: &[CallArg<'_>],
    options: BindOptions,
) -> Result<Vec<ArgumentSlot>, BindError> {
    let params = &signature.params;
    if options.receiver_is_argument && params.is_empty() {
        return Err(BindError::MissingReceiver);
    }
    let first_param = usize::from(options.receiver_is_argument);
    // The receiver slot never absorbs call-site arguments.
    let params_index = params
        .last()
        .filter(|param| param.is_params)
        .map(|_| params.len() - 1)
        .filter(|&index| index >= first_param);
    let last_positional = args.iter().rposition(|arg| arg.name.is_none());

    let mut positional: Vec<Option<usize>> = vec![None; params.len()];
    let mut named: Vec<Option<usize>> = vec![None; params.len()];
    let mut expanded = Vec::new();
    let mut overflow = Vec::new();

    for (idx, arg) in args.iter().enumerate() {
        let position = idx + first_param;
        let Some(name) = arg.name else {
            if params_index.is_some_and(|index| position >= index) {
                expanded.push(idx);
            } else if position < params.len() {
                positional[position] = Some(idx);
            } else {
                overflow.push(idx);
            }
            continue;
        };

        let Some(target) = params
            .iter()
            .skip(first_param)
            .position(|p| p.name == name)
            .map(|offset| offset + first_param)
        else {
            return Err(BindError::UnknownNamedArgument {
                name: name.to_string(),
            });
        };
        if last_positional.is_some_and(|last| last > idx) && target != position {
            return Err(BindError::NamedArgumentOutOfPosition {
                name: name.to_string(),
            });
        }
        if named[target].replace(idx).is_some() {
            return Err(BindError::DuplicateArgument {
                parameter: params[target].name.clone(),
            });
        }
    }

    let mut slots = Vec::with_capacity(params.len() + overflow.len() + 1);
    if options.receiver_is_argument {
        slots.push(ArgumentSlot::Receiver { param: 0 });
    }

    for (index, param) in params.iter().enumerate().skip(first_param) {
        if Some(index) == params_index {
            let binding = ParamsBinding {
                param,
                index,
                named: named[index],
                expanded: &expanded,
                form: options.params_form,
                first_param,
            };
            slots.push(binding.bind(args)?);
            continue;
        }
        let slot = match (positional[index], named[index]) {
            (Some(_), Some(_)) => {
                return Err(BindError::DuplicateArgument {
                    parameter: param.name.clone(),
                })
            }
            (Some(arg), None) | (None, Some(arg)) => ArgumentSlot::Explicit { arg, param: index },
            (None, None) if param.default.is_some() => ArgumentSlot::DefaultValue { param: index },
            (None, None) => {
                return Err(BindError::MissingArgument {
                    parameter: param.name.clone(),
                })
            }
        };
        slots.push(slot);
    }

    if signature.is_vararg {
        slots.extend(overflow.iter().map(|&arg| ArgumentSlot::Vararg { arg }));
        slots.push(ArgumentSlot::ArgListSentinel);
    } else if !overflow.is_empty() {
        return Err(BindError::TooManyArguments {
            expected: params.len() - first_param,
            found: args.len(),
        });
    }

    check_values(params, args, &slots)?;

    if options.order == ArgumentOrder::Evaluation {
        slots.sort_by_key(evaluation_key);
    }
    tracing::trace!(
        target: "optree.binder",
        member = %signature.name,
        args = args.len(),
        slots = slots.len(),
        "bound arguments"
    );
    Ok(slots)
}

struct ParamsBinding<'a> {
    param: &'a Parameter,
    index: usize,
    named: Option<usize>,
    expanded: &'a [usize],
    form: Option<ParamsForm>,
    first_param: usize,
}

impl ParamsBinding<'_> {
    fn bind(&self, args: &[CallArg<'_>]) -> Result<ArgumentSlot, BindError> {
        let param = self.index;
        if let Some(arg) = self.named {
            if !self.expanded.is_empty() {
                return Err(BindError::DuplicateArgument {
                    parameter: self.param.name.clone(),
                });
            }
            return Ok(ArgumentSlot::Explicit { arg, param });
        }
        let normal = match (self.form, self.expanded) {
            (Some(ParamsForm::Normal), [single]) => Some(*single),
            (Some(ParamsForm::Normal), []) => {
                return Err(BindError::MissingArgument {
                    parameter: self.param.name.clone(),
                })
            }
            (Some(ParamsForm::Normal), _) => {
                return Err(BindError::TooManyArguments {
                    expected: param + 1 - self.first_param,
                    found: args.len(),
                })
            }
            (Some(ParamsForm::Expanded), _) => None,
            (None, [single]) => is_normal_form(&args[*single], self.param).then_some(*single),
            (None, _) => None,
        };
        Ok(match normal {
            Some(arg) => ArgumentSlot::Explicit { arg, param },
            None => ArgumentSlot::ParamArray {
                param,
                elements: self.expanded.to_vec(),
            },
        })
    }
}

/// Without a resolver decision, a lone argument is passed to a params
/// parameter as the array itself when it already is a compatible array, or
/// the `null` literal.
fn is_normal_form(arg: &CallArg<'_>, param: &Parameter) -> bool {
    if arg.is_missing {
        return false;
    }
    match arg.ty {
        None => true,
        Some(ty) => ty == &param.ty || ty.is_array_assignable_to(&param.ty),
    }
}

fn check_values(
    params: &[Parameter],
    args: &[CallArg<'_>],
    slots: &[ArgumentSlot],
) -> Result<(), BindError> {
    let mut bound: Vec<(usize, Option<&Parameter>)> = Vec::new();
    for slot in slots {
        match slot {
            ArgumentSlot::Explicit { arg, param } => bound.push((*arg, Some(&params[*param]))),
            ArgumentSlot::ParamArray { param, elements } => {
                bound.extend(elements.iter().map(|&arg| (arg, Some(&params[*param]))))
            }
            ArgumentSlot::Vararg { arg } => bound.push((*arg, None)),
            ArgumentSlot::Receiver { .. }
            | ArgumentSlot::DefaultValue { .. }
            | ArgumentSlot::ArgListSentinel => {}
        }
    }
    bound.sort_by_key(|(arg, _)| *arg);

    for (arg, param) in bound {
        let call_arg = &args[arg];
        if call_arg.is_missing {
            continue;
        }
        let parameter = param.map_or_else(|| "__arglist".to_string(), |p| p.name.clone());
        if !call_arg.converts {
            return Err(BindError::ArgumentMismatch { arg, parameter });
        }
        let expected = param.map_or(RefKind::None, |p| p.ref_kind);
        if !call_arg.ref_kind.is_compatible_with(expected) {
            return Err(BindError::RefKindMismatch {
                arg,
                parameter,
                expected,
            });
        }
    }
    Ok(())
}

fn evaluation_key(slot: &ArgumentSlot) -> (u8, usize) {
    match slot {
        ArgumentSlot::Receiver { .. } => (0, 0),
        ArgumentSlot::Explicit { arg, .. } | ArgumentSlot::Vararg { arg } => (1, *arg),
        ArgumentSlot::ParamArray { param, elements } => match elements.first() {
            Some(first) => (1, *first),
            None => (2, *param),
        },
        ArgumentSlot::DefaultValue { param } => (2, *param),
        ArgumentSlot::ArgListSentinel => (3, 0),
    }
}
