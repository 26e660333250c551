//! Parameter routing.
//!
//! Maps the arguments of a wrapper call onto the parameter list of an origin
//! method. Two shapes are supported:
//!
//! - **passthrough**: wrapper argument `i` feeds origin parameter `i`;
//! - **routed**: each [`ParameterSource`] picks the first still-unbound origin
//!   parameter its [`ParamFilter`] accepts, in declaration order.
//!
//! Origin parameters left unbound take their declared default or fail
//! synthesis with `UnboundParameter`. All checks run once per origin type;
//! at call time a [`RoutePlan`] only indexes and translates.

use adapter_types::{
    MethodDescriptor, OperationSignature, OriginType, ParamDescriptor, TypeHierarchy, Value,
    ValueType,
};
use serde::{Deserialize, Serialize};

use crate::error::{Site, SynthesisError, SynthesisResult, TranslationResult};
use crate::translator::{Translation, TranslatorRegistry};

/// Which origin parameters a source may bind to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFilter {
    /// Any remaining parameter.
    Any,
    /// Only the parameter at this position.
    Position(usize),
    /// Parameters carrying a marker with this key.
    Marker(String),
    /// Parameters whose declared type is this type or a subtype of it.
    DeclaredType(ValueType),
}

impl ParamFilter {
    pub fn accepts(&self, index: usize, param: &ParamDescriptor, hierarchy: &TypeHierarchy) -> bool {
        match self {
            Self::Any => true,
            Self::Position(p) => *p == index,
            Self::Marker(key) => param.markers.contains(key),
            Self::DeclaredType(ty) => hierarchy.is_subtype(&param.value_type, ty),
        }
    }
}

impl std::fmt::Display for ParamFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Position(p) => write!(f, "position {}", p),
            Self::Marker(key) => write!(f, "@{}", key),
            Self::DeclaredType(ty) => write!(f, "type {}", ty),
        }
    }
}

/// Binds one wrapper argument to one origin parameter.
#[derive(Clone, Debug)]
pub struct ParameterSource {
    pub wrapper_arg: usize,
    pub filter: ParamFilter,
    /// Converts the wrapper argument into the origin parameter's type.
    pub translators: TranslatorRegistry,
}

impl ParameterSource {
    /// Route wrapper argument `wrapper_arg` to any remaining parameter.
    pub fn new(wrapper_arg: usize) -> Self {
        Self {
            wrapper_arg,
            filter: ParamFilter::Any,
            translators: TranslatorRegistry::new(),
        }
    }

    pub fn at_position(mut self, index: usize) -> Self {
        self.filter = ParamFilter::Position(index);
        self
    }

    pub fn at_marker(mut self, key: impl Into<String>) -> Self {
        self.filter = ParamFilter::Marker(key.into());
        self
    }

    pub fn at_type(mut self, ty: ValueType) -> Self {
        self.filter = ParamFilter::DeclaredType(ty);
        self
    }

    pub fn translators(mut self, translators: TranslatorRegistry) -> Self {
        self.translators = translators;
        self
    }
}

// ── Route Plan ───────────────────────────────────────────────────────

/// Where one origin argument comes from.
#[derive(Clone, Debug)]
pub enum ArgBinding {
    Wrapper {
        wrapper_arg: usize,
        translation: Translation,
    },
    Default(Value),
}

/// One binding per origin parameter, in origin parameter order.
#[derive(Clone, Debug, Default)]
pub struct RoutePlan {
    bindings: Vec<ArgBinding>,
}

impl RoutePlan {
    pub fn bindings(&self) -> &[ArgBinding] {
        &self.bindings
    }

    /// Build the origin argument list from wrapper arguments. A wrapper
    /// argument that was not supplied reads as `Null`.
    pub fn arguments(&self, args: &[Value]) -> TranslationResult<Vec<Value>> {
        self.bindings
            .iter()
            .map(|binding| match binding {
                ArgBinding::Wrapper {
                    wrapper_arg,
                    translation,
                } => translation.apply(args.get(*wrapper_arg).cloned().unwrap_or(Value::Null)),
                ArgBinding::Default(value) => Ok(value.clone()),
            })
            .collect()
    }
}

// ── Router ───────────────────────────────────────────────────────────

/// Builds [`RoutePlan`]s against one type hierarchy.
#[derive(Clone, Copy, Debug)]
pub struct ParameterRouter<'a> {
    hierarchy: &'a TypeHierarchy,
    implicit_identity: bool,
}

impl<'a> ParameterRouter<'a> {
    pub fn new(hierarchy: &'a TypeHierarchy, implicit_identity: bool) -> Self {
        Self {
            hierarchy,
            implicit_identity,
        }
    }

    /// Routed when `sources` is non-empty, positional otherwise. `fallback`
    /// translates positional arguments.
    pub fn plan(
        &self,
        origin: &OriginType,
        operation: &OperationSignature,
        method: &MethodDescriptor,
        sources: &[ParameterSource],
        fallback: &TranslatorRegistry,
    ) -> SynthesisResult<RoutePlan> {
        let site = Site {
            origin: origin.name(),
            operation: &operation.name,
        };
        if sources.is_empty() {
            self.passthrough(site, method, &operation.params, fallback)
        } else {
            self.route(site, method, &operation.params, sources)
        }
    }

    pub(crate) fn passthrough(
        &self,
        site: Site<'_>,
        method: &MethodDescriptor,
        wrapper_params: &[ValueType],
        translators: &TranslatorRegistry,
    ) -> SynthesisResult<RoutePlan> {
        if wrapper_params.len() > method.params.len() {
            return Err(site.alien(
                &method.name,
                format!(
                    "takes {} parameter(s), operation supplies {}",
                    method.params.len(),
                    wrapper_params.len()
                ),
            ));
        }
        let mut bound: Vec<Option<ArgBinding>> = Vec::with_capacity(method.params.len());
        for (i, param) in method.params.iter().enumerate() {
            match wrapper_params.get(i) {
                Some(wrapper_ty) => {
                    let translation = self.translate(site, method, param, wrapper_ty, translators)?;
                    bound.push(Some(ArgBinding::Wrapper {
                        wrapper_arg: i,
                        translation,
                    }));
                }
                None => bound.push(None),
            }
        }
        self.finish(site, method, bound)
    }

    pub(crate) fn route(
        &self,
        site: Site<'_>,
        method: &MethodDescriptor,
        wrapper_params: &[ValueType],
        sources: &[ParameterSource],
    ) -> SynthesisResult<RoutePlan> {
        let mut bound: Vec<Option<ArgBinding>> = vec![None; method.params.len()];
        for source in sources {
            let wrapper_ty = wrapper_params.get(source.wrapper_arg).ok_or_else(|| {
                site.alien(
                    &method.name,
                    format!("wrapper argument {} does not exist", source.wrapper_arg),
                )
            })?;
            let target = method
                .params
                .iter()
                .enumerate()
                .position(|(i, p)| {
                    bound[i].is_none() && source.filter.accepts(i, p, self.hierarchy)
                })
                .ok_or_else(|| {
                    site.alien(
                        &method.name,
                        format!(
                            "no free parameter matches {} for wrapper argument {}",
                            source.filter, source.wrapper_arg
                        ),
                    )
                })?;
            let param = &method.params[target];
            let translation = self.translate(site, method, param, wrapper_ty, &source.translators)?;
            bound[target] = Some(ArgBinding::Wrapper {
                wrapper_arg: source.wrapper_arg,
                translation,
            });
        }
        self.finish(site, method, bound)
    }

    fn translate(
        &self,
        site: Site<'_>,
        method: &MethodDescriptor,
        param: &ParamDescriptor,
        wrapper_ty: &ValueType,
        translators: &TranslatorRegistry,
    ) -> SynthesisResult<Translation> {
        translators
            .plan(wrapper_ty, &param.value_type, self.hierarchy, self.implicit_identity)
            .ok_or_else(|| {
                site.no_translator(
                    &format!("parameter '{}' of '{}'", param.name, method.name),
                    wrapper_ty,
                    &param.value_type,
                )
            })
    }

    fn finish(
        &self,
        site: Site<'_>,
        method: &MethodDescriptor,
        bound: Vec<Option<ArgBinding>>,
    ) -> SynthesisResult<RoutePlan> {
        let bindings = bound
            .into_iter()
            .zip(&method.params)
            .map(|(binding, param)| match (binding, &param.default) {
                (Some(binding), _) => Ok(binding),
                (None, Some(default)) => Ok(ArgBinding::Default(default.clone())),
                (None, None) => Err(SynthesisError::UnboundParameter {
                    origin: site.origin.to_string(),
                    operation: site.operation.to_string(),
                    member: method.name.clone(),
                    parameter: param.name.clone(),
                }),
            })
            .collect::<SynthesisResult<Vec<_>>>()?;
        Ok(RoutePlan { bindings })
    }
}
