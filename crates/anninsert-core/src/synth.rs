//! Insertion synthesis: walk a scene and produce ordered insertions.
//!
//! The walk mirrors the nesting of the scene. Each level appends one
//! criterion to its parent's [`CriteriaList`], and every annotated element is
//! turned into insertions by [`Synthesizer::visit_element`]:
//!
//! - annotations with no type path on a receiver are merged into one
//!   receiver insertion, likewise for `new` expressions;
//! - annotations on an element that carries a concrete type are merged into
//!   one cast (plus its closing parenthesis);
//! - everything else becomes a plain annotation insertion.
//!
//! Annotations aimed at the implicit no-argument constructor of a class that
//! has no explicit one are collected into a single synthesized constructor
//! per class.
//!
//! ## Ordering
//!
//! Packages come first, then classes in scene order. Within a class: the
//! class declaration, type parameter bounds, extends/implements, AST-path
//! insertions, fields, methods, static initializers, instance initializers,
//! field initializers. Within a method: declaration, receiver, return type,
//! bounds, parameters, AST-path insertions, body. Nested type positions are
//! visited before the type that contains them.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::ambiguity::AmbiguityPolicy;
use crate::config::{SynthesisConfig, UnknownConstructorPolicy};
use crate::criteria::{Criteria, CriteriaList, Criterion};
use crate::error::InsertError;
use crate::format::{AnnotationFormatter, FormattedAnnotation};
use crate::insertion::{
    AnnotationInsertion, Insertion, InsertionArena, InsertionId, InsertionSources,
};
use crate::jtype::JavaType;
use crate::location::{AstPath, RelativeLocation, TypePath};
use crate::merge;
use crate::oracle::{ConstructorKnowledge, ConstructorOracle};
use crate::scene::{
    Annotation, BlockElement, ClassElement, ElementRef, ExpressionElement, FieldElement,
    MethodElement, Scene, TypeElement, TypedElement, PACKAGE_INFO_SUFFIX,
};

/// Method name used in the criteria of lambda parameters.
const ANONYMOUS_METHOD: &str = "(anonymous)";

/// Builds the criterion for one kind of sub-expression.
type ExpressionCriterion = fn(String, RelativeLocation) -> Criterion;

// ============================================================================
// Results
// ============================================================================

/// Kind of a non-fatal problem met during synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The constructor oracle could not answer for a class.
    BytecodeUnavailable,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::BytecodeUnavailable => write!(f, "bytecode-unavailable"),
        }
    }
}

/// A non-fatal problem, tied to the class where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub class_name: String,
    pub message: String,
}

/// Everything a synthesis run produces.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    arena: InsertionArena,
    order: Vec<InsertionId>,
    sources: InsertionSources,
    policy: AmbiguityPolicy,
    imports: IndexSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl SynthesisResult {
    /// Every insertion created, including ones reachable only through a
    /// constructor, receiver or `new`.
    pub fn arena(&self) -> &InsertionArena {
        &self.arena
    }

    /// Ids of the top-level insertions, in output order.
    pub fn order(&self) -> &[InsertionId] {
        &self.order
    }

    /// Top-level insertions in output order.
    pub fn insertions(&self) -> impl Iterator<Item = (InsertionId, &Insertion)> {
        self.order
            .iter()
            .filter_map(|id| self.arena.get(*id).map(|insertion| (*id, insertion)))
    }

    pub fn get(&self, id: InsertionId) -> Option<&Insertion> {
        self.arena.get(id)
    }

    pub fn sources(&self) -> &InsertionSources {
        &self.sources
    }

    pub fn policy(&self) -> &AmbiguityPolicy {
        &self.policy
    }

    /// Qualified names that simple-name renderings rely on, first use first.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Source text of one insertion.
    pub fn render(&self, id: InsertionId) -> Result<String, InsertError> {
        self.arena.render(id)
    }

    /// Source text of every top-level insertion, in output order.
    pub fn rendered(&self) -> Result<Vec<String>, InsertError> {
        self.order.iter().map(|id| self.arena.render(*id)).collect()
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Synthesize the insertions for `scene`.
///
/// The ambiguity policy is computed from the scene's definitions first.
pub fn synthesize(
    scene: &Scene,
    oracle: &dyn ConstructorOracle,
    config: &SynthesisConfig,
) -> Result<SynthesisResult, InsertError> {
    let policy = AmbiguityPolicy::resolve(&scene.definitions);
    synthesize_with_policy(scene, oracle, config, policy)
}

/// Synthesize with a precomputed ambiguity policy.
pub fn synthesize_with_policy(
    scene: &Scene,
    oracle: &dyn ConstructorOracle,
    config: &SynthesisConfig,
    policy: AmbiguityPolicy,
) -> Result<SynthesisResult, InsertError> {
    let parts = {
        let mut synthesizer = Synthesizer::new(scene, oracle, config, &policy);
        synthesizer.visit_scene()?;
        synthesizer.finish()
    };
    debug!(
        insertions = parts.order.len(),
        created = parts.arena.len(),
        diagnostics = parts.diagnostics.len(),
        "synthesis complete"
    );
    Ok(SynthesisResult {
        arena: parts.arena,
        order: parts.order,
        sources: parts.sources,
        policy,
        imports: parts.imports,
        diagnostics: parts.diagnostics,
    })
}

// ============================================================================
// Synthesizer
// ============================================================================

struct Parts {
    arena: InsertionArena,
    order: Vec<InsertionId>,
    sources: InsertionSources,
    imports: IndexSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// How the outer position of a type element is addressed and whether its
/// nested insertions are emitted on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeContext {
    /// A declared type: outer position is `atLocation()`.
    Declared,
    /// An extends/implements clause: no `atLocation` on the outer position.
    Supertype,
    /// An AST-path insertion: nested insertions are withheld and handed to
    /// the outer position.
    Cast,
}

/// Insertions made for the nested positions of the element being visited.
#[derive(Debug, Clone, Copy)]
struct Nested<'n> {
    ids: &'n [InsertionId],
    /// True if `ids` were not placed in the output order.
    withheld: bool,
}

impl Nested<'_> {
    fn none() -> Self {
        Nested {
            ids: &[],
            withheld: false,
        }
    }
}

/// Which insertion an element's annotations turn into.
#[derive(Debug, Clone, Copy)]
enum TargetForm<'e> {
    Receiver,
    New,
    Cast(&'e JavaType),
    Plain,
}

impl<'e> TargetForm<'e> {
    fn classify(criteria: &Criteria, element: ElementRef<'e>) -> Self {
        let bare = !criteria.has_type_path();
        if bare && criteria.targets_receiver() {
            TargetForm::Receiver
        } else if bare && criteria.targets_new() {
            TargetForm::New
        } else if let Some(ty) = element.concrete_type() {
            TargetForm::Cast(ty)
        } else {
            TargetForm::Plain
        }
    }
}

/// A merged insertion under construction for one element.
struct SpecialForm {
    /// The receiver, `new` or cast, followed by the close parenthesis for
    /// casts.
    ids: Vec<InsertionId>,
    absorbed: bool,
}

impl SpecialForm {
    fn primary(&self) -> InsertionId {
        self.ids[0]
    }
}

struct Synthesizer<'a> {
    scene: &'a Scene,
    oracle: &'a dyn ConstructorOracle,
    config: &'a SynthesisConfig,
    formatter: AnnotationFormatter<'a>,
    arena: InsertionArena,
    order: Vec<InsertionId>,
    sources: InsertionSources,
    imports: IndexSet<String>,
    diagnostics: Vec<Diagnostic>,
    /// Name and constructor knowledge of the class being visited.
    class_name: String,
    knowledge: ConstructorKnowledge,
    /// The class's synthesized constructor, once created.
    constructor: Option<InsertionId>,
}

impl<'a> Synthesizer<'a> {
    fn new(
        scene: &'a Scene,
        oracle: &'a dyn ConstructorOracle,
        config: &'a SynthesisConfig,
        policy: &'a AmbiguityPolicy,
    ) -> Self {
        Synthesizer {
            scene,
            oracle,
            config,
            formatter: AnnotationFormatter::new(&scene.definitions, policy),
            arena: InsertionArena::new(),
            order: Vec::new(),
            sources: InsertionSources::default(),
            imports: IndexSet::new(),
            diagnostics: Vec::new(),
            class_name: String::new(),
            knowledge: ConstructorKnowledge::Unknown,
            constructor: None,
        }
    }

    fn finish(self) -> Parts {
        Parts {
            arena: self.arena,
            order: self.order,
            sources: self.sources,
            imports: self.imports,
            diagnostics: self.diagnostics,
        }
    }

    fn visit_scene(&mut self) -> Result<(), InsertError> {
        let root = CriteriaList::empty();
        let scene = self.scene;

        for (name, package) in &scene.packages {
            self.visit_package(&root, name, &package.annotations)?;
        }

        for (name, class) in &scene.classes {
            match name.strip_suffix(PACKAGE_INFO_SUFFIX) {
                Some("") => {
                    return Err(InsertError::malformed(format!(
                        "class '{}' names no package",
                        name
                    )))
                }
                Some(package) => self.visit_package(&root, package, &class.annotations)?,
                None => self.visit_class(&root, name, class)?,
            }
        }
        Ok(())
    }

    fn visit_package(
        &mut self,
        clist: &CriteriaList,
        name: &str,
        annotations: &[Annotation],
    ) -> Result<(), InsertError> {
        let clist = clist.add(Criterion::package_decl(name));
        self.visit_element(&clist, ElementRef::Package(annotations), Nested::none(), false)?;
        Ok(())
    }

    fn constructor_knowledge(&mut self, class_name: &str) -> ConstructorKnowledge {
        if !self.config.read_bytecode {
            return ConstructorKnowledge::Unknown;
        }
        match self.oracle.constructors(class_name) {
            Ok(knowledge) => knowledge,
            Err(err) => {
                warn!(class = %class_name, error = %err, "no constructor information for class");
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::BytecodeUnavailable,
                    class_name: class_name.to_string(),
                    message: err.to_string(),
                });
                ConstructorKnowledge::Unknown
            }
        }
    }

    fn visit_class(
        &mut self,
        root: &CriteriaList,
        name: &str,
        class: &ClassElement,
    ) -> Result<(), InsertError> {
        self.constructor = None;
        self.class_name = name.to_string();
        self.knowledge = self.constructor_knowledge(name);
        debug!(class = %name, knowledge = ?self.knowledge, "visiting class");

        let class_clist = root.add(Criterion::is_class(name));
        self.visit_element(&class_clist, ElementRef::Class(class), Nested::none(), false)?;

        let clist = root.add(Criterion::in_class(name, true));
        for (loc, bound) in &class.bounds {
            let bound_clist = clist.add(Criterion::ClassBound {
                class_name: name.to_string(),
                bound: *loc,
            });
            self.visit_type_element(&bound_clist, ElementRef::TypeUse(bound), TypeContext::Declared)?;
        }

        let clist = clist.add(Criterion::in_class(name, false));
        for (index, supertype) in &class.extends_implements {
            let ext_clist = clist.add(Criterion::ExtImpls {
                class_name: name.to_string(),
                index: *index,
            });
            self.visit_type_element(
                &ext_clist,
                ElementRef::TypeUse(supertype),
                TypeContext::Supertype,
            )?;
        }

        self.visit_ast_insertions(&clist, &class.insert_annotations, &class.insert_typecasts)?;

        for (field_name, field) in &class.fields {
            self.visit_field(&clist, field_name, field)?;
        }
        for (method_name, method) in &class.methods {
            self.visit_method(&clist, name, method_name, method)?;
        }
        for (block, init) in &class.static_inits {
            let init_clist = clist.add(Criterion::InStaticInit { block: *block });
            self.visit_block(&init_clist, &format!("static init number {}()", block), init)?;
        }
        for (block, init) in &class.instance_inits {
            let init_clist = clist.add(Criterion::InInstanceInit { block: *block });
            self.visit_block(&init_clist, &format!("instance init number {}()", block), init)?;
        }
        for (field_name, init) in &class.field_inits {
            let init_clist = clist.add(Criterion::InFieldInit {
                field: field_name.clone(),
            });
            self.visit_expressions(&init_clist, &format!("init for field {}()", field_name), init)?;
        }

        debug!(class = %name, "class done");
        Ok(())
    }

    fn visit_field(
        &mut self,
        clist: &CriteriaList,
        name: &str,
        field: &FieldElement,
    ) -> Result<(), InsertError> {
        let decl_clist = clist.add(Criterion::field(name, true));
        self.visit_element(&decl_clist, ElementRef::Field(field), Nested::none(), false)?;

        let type_clist = clist.add(Criterion::field(name, false));
        self.visit_type_element(&type_clist, ElementRef::TypeUse(&field.ty), TypeContext::Declared)?;
        self.visit_ast_insertions(&type_clist, &field.insert_annotations, &field.insert_typecasts)
    }

    fn visit_method(
        &mut self,
        clist: &CriteriaList,
        class_name: &str,
        name: &str,
        method: &MethodElement,
    ) -> Result<(), InsertError> {
        let clist = clist.add(Criterion::in_method(name));
        self.visit_element(&clist, ElementRef::Method(method), Nested::none(), false)?;

        let receiver_clist = clist.add(Criterion::Receiver {
            method: name.to_string(),
        });
        self.visit_type_element(
            &receiver_clist,
            ElementRef::TypeUse(&method.receiver),
            TypeContext::Declared,
        )?;

        let return_clist = clist.add(Criterion::ReturnType {
            class_name: class_name.to_string(),
            method: name.to_string(),
        });
        self.visit_type_element(
            &return_clist,
            ElementRef::TypeUse(&method.return_type),
            TypeContext::Declared,
        )?;

        for (loc, bound) in &method.bounds {
            let bound_clist = clist.add(Criterion::MethodBound {
                method: name.to_string(),
                bound: *loc,
            });
            self.visit_type_element(&bound_clist, ElementRef::TypeUse(bound), TypeContext::Declared)?;
        }

        // Only the parameter types; parameter declaration annotations are
        // not inserted.
        for (index, param) in &method.parameters {
            let param_clist = clist.add(Criterion::Param {
                method: name.to_string(),
                index: *index,
            });
            self.visit_type_element(&param_clist, ElementRef::TypeUse(&param.ty), TypeContext::Declared)?;
        }

        self.visit_ast_insertions(&clist, &method.insert_annotations, &method.insert_typecasts)?;
        self.visit_block(&clist, name, &method.body)
    }

    fn visit_block(
        &mut self,
        clist: &CriteriaList,
        method: &str,
        block: &BlockElement,
    ) -> Result<(), InsertError> {
        for (loc, var) in &block.locals {
            let var_clist = clist.add(Criterion::Local {
                method: method.to_string(),
                location: loc.clone(),
            });
            self.visit_element(&var_clist, ElementRef::Field(var), Nested::none(), false)?;
            self.visit_type_element(&var_clist, ElementRef::TypeUse(&var.ty), TypeContext::Declared)?;
        }
        self.visit_expressions(clist, method, &block.expressions)
    }

    fn visit_expressions(
        &mut self,
        clist: &CriteriaList,
        method: &str,
        expressions: &ExpressionElement,
    ) -> Result<(), InsertError> {
        let groups: [(&IndexMap<RelativeLocation, TypeElement>, ExpressionCriterion); 5] = [
            (&expressions.typecasts, |method, location| Criterion::Cast {
                method,
                location,
            }),
            (&expressions.news, |method, location| Criterion::New { method, location }),
            (&expressions.instanceofs, |method, location| {
                Criterion::InstanceOf { method, location }
            }),
            (&expressions.member_refs, |method, location| {
                Criterion::MemberReference { method, location }
            }),
            (&expressions.calls, |method, location| Criterion::MethodCall {
                method,
                location,
            }),
        ];
        for (elements, criterion) in groups {
            for (loc, element) in elements {
                let expr_clist = clist.add(criterion(method.to_string(), *loc));
                self.visit_type_element(&expr_clist, ElementRef::TypeUse(element), TypeContext::Declared)?;
            }
        }

        for (loc, lambda) in &expressions.lambdas {
            let lambda_clist = clist.add(Criterion::Lambda {
                method: method.to_string(),
                location: *loc,
            });
            self.visit_lambda(&lambda_clist, method, lambda)?;
        }
        Ok(())
    }

    fn visit_lambda(
        &mut self,
        clist: &CriteriaList,
        method: &str,
        lambda: &MethodElement,
    ) -> Result<(), InsertError> {
        for (index, param) in &lambda.parameters {
            let param_clist = clist.add(Criterion::Param {
                method: ANONYMOUS_METHOD.to_string(),
                index: *index,
            });
            self.visit_type_element(&param_clist, ElementRef::TypeUse(&param.ty), TypeContext::Declared)?;
            self.visit_ast_insertions(&param_clist, &param.insert_annotations, &param.insert_typecasts)?;
        }
        self.visit_block(clist, method, &lambda.body)
    }

    fn visit_ast_insertions(
        &mut self,
        clist: &CriteriaList,
        insert_annotations: &IndexMap<AstPath, TypeElement>,
        insert_typecasts: &IndexMap<AstPath, TypedElement>,
    ) -> Result<(), InsertError> {
        for (path, element) in insert_annotations {
            let path_clist = clist.add(Criterion::ast_path(path.clone()));
            self.visit_type_element(&path_clist, ElementRef::TypeUse(element), TypeContext::Cast)?;
        }
        for (path, element) in insert_typecasts {
            let path_clist = clist.add(Criterion::ast_path(path.clone()));
            self.visit_type_element(
                &path_clist,
                ElementRef::TypeUseWithType(element),
                TypeContext::Cast,
            )?;
        }
        Ok(())
    }

    /// Visit the nested positions of a type element, then the element itself.
    fn visit_type_element(
        &mut self,
        clist: &CriteriaList,
        element: ElementRef<'_>,
        context: TypeContext,
    ) -> Result<(), InsertError> {
        let withhold = context == TypeContext::Cast;
        let mut inner = Vec::new();
        if let Some(inner_types) = element.inner_types() {
            self.visit_inner_types(clist, inner_types, &TypePath::root(), withhold, &mut inner)?;
        }

        let outer_clist = match context {
            TypeContext::Declared => clist.add(Criterion::at_outer_type()),
            TypeContext::Supertype | TypeContext::Cast => clist.clone(),
        };
        let nested = Nested {
            ids: &inner,
            withheld: withhold,
        };
        self.visit_element(&outer_clist, element, nested, false)?;
        Ok(())
    }

    fn visit_inner_types(
        &mut self,
        clist: &CriteriaList,
        inner_types: &IndexMap<TypePath, TypeElement>,
        prefix: &TypePath,
        withhold: bool,
        out: &mut Vec<InsertionId>,
    ) -> Result<(), InsertError> {
        for (path, element) in inner_types {
            let full = prefix.join(path);
            self.visit_inner_types(clist, &element.inner_types, &full, withhold, out)?;

            let inner_clist = clist.add(Criterion::at_location(full));
            let made = self.visit_element(&inner_clist, ElementRef::TypeUse(element), Nested::none(), withhold)?;
            out.extend(made);
        }
        Ok(())
    }

    /// Turn one element's direct annotations into insertions.
    ///
    /// Returns the plain annotation insertions made. With `withhold` set
    /// they are not placed in the output order; the caller hands them to
    /// the enclosing type's insertion instead.
    fn visit_element(
        &mut self,
        clist: &CriteriaList,
        element: ElementRef<'_>,
        nested: Nested<'_>,
        withhold: bool,
    ) -> Result<Vec<InsertionId>, InsertError> {
        let criteria = clist.criteria();
        let form = TargetForm::classify(&criteria, element);
        let annotations = self
            .format_annotations(element.annotations())
            .map_err(|e| e.at(clist))?;

        trace!(
            kind = %element.kind(),
            criteria = %clist,
            annotations = annotations.len(),
            nested = nested.ids.len(),
            "visiting element"
        );

        // Only a cast writes nested annotations into its own text.
        if nested.withheld && !matches!(form, TargetForm::Cast(_)) {
            self.order.extend_from_slice(nested.ids);
        }

        let mut special: Option<SpecialForm> = None;
        if annotations.is_empty() {
            match form {
                TargetForm::Cast(ty) => {
                    let (cast, close) =
                        merge::cast_pair(&mut self.arena, ty, None, nested.ids, clist)?;
                    special = Some(SpecialForm {
                        ids: vec![cast, close],
                        absorbed: false,
                    });
                }
                TargetForm::Receiver if !nested.ids.is_empty() => {
                    let id = merge::receiver(&mut self.arena, None, clist, nested.ids);
                    special = Some(SpecialForm {
                        ids: vec![id],
                        absorbed: false,
                    });
                }
                TargetForm::New if !nested.ids.is_empty() => {
                    let id = merge::new_object(&mut self.arena, None, clist, nested.ids);
                    special = Some(SpecialForm {
                        ids: vec![id],
                        absorbed: false,
                    });
                }
                _ => {}
            }
        }

        let mut plain = Vec::new();
        for (formatted, annotation) in annotations {
            let type_only = self
                .formatter
                .definition(annotation)
                .map_err(|e| e.at(clist))?
                .is_only_type_annotation();
            let text = formatted.text;
            self.imports.extend(formatted.imports);

            let mut made: Vec<InsertionId> = Vec::new();
            match form {
                TargetForm::Receiver | TargetForm::New | TargetForm::Cast(_) => {
                    match &special {
                        Some(existing) => {
                            self.arena.add_type_annotation(existing.primary(), text.as_str())?;
                        }
                        None => {
                            let ids = match form {
                                TargetForm::Receiver => vec![merge::receiver(
                                    &mut self.arena,
                                    Some(text.as_str()),
                                    clist,
                                    nested.ids,
                                )],
                                TargetForm::New => vec![merge::new_object(
                                    &mut self.arena,
                                    Some(text.as_str()),
                                    clist,
                                    nested.ids,
                                )],
                                TargetForm::Cast(ty) => {
                                    let (cast, close) = merge::cast_pair(
                                        &mut self.arena,
                                        ty,
                                        Some(text.as_str()),
                                        nested.ids,
                                        clist,
                                    )?;
                                    vec![cast, close]
                                }
                                TargetForm::Plain => Vec::new(),
                            };
                            made.extend_from_slice(&ids);
                            special = Some(SpecialForm {
                                ids,
                                absorbed: false,
                            });
                        }
                    }
                    if let Some(existing) = &special {
                        self.sources.put(existing.primary(), annotation);
                    }
                }
                TargetForm::Plain => {
                    let mut insertion_clist = clist.clone();
                    if let Some(loc) = criteria.cast_relative_location() {
                        if loc.type_index > 0 {
                            insertion_clist = insertion_clist
                                .add(Criterion::IntersectionTypeLocation { location: loc });
                        }
                    }
                    let id = self.arena.push(Insertion::Annotation(AnnotationInsertion {
                        text: text.clone(),
                        criteria: insertion_clist,
                        separate_line: !type_only,
                        annotation: annotation.clone(),
                    }));
                    trace!(id = %id, text = %text, "annotation insertion");
                    if !withhold {
                        self.order.push(id);
                        made.push(id);
                    }
                    plain.push(id);
                    self.sources.put(id, annotation);
                }
            }

            if !criteria.has_type_path() && self.is_on_implicit_constructor(&criteria) {
                let ctor = self.ensure_constructor(clist)?;
                self.absorb_into_constructor(ctor, &made, &mut special, &criteria, &text, type_only)?;
            }
        }

        if let Some(form) = special {
            if !form.absorbed {
                self.order.extend(form.ids);
            }
        }
        Ok(plain)
    }

    /// Format an element's annotations, dropping exact duplicates.
    fn format_annotations<'e>(
        &self,
        annotations: &'e [Annotation],
    ) -> Result<Vec<(FormattedAnnotation, &'e Annotation)>, InsertError> {
        let mut result: Vec<(FormattedAnnotation, &'e Annotation)> = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let formatted = self.formatter.format(annotation)?;
            let seen = result
                .iter()
                .any(|(f, a)| f.text == formatted.text && *a == annotation);
            if !seen {
                result.push((formatted, annotation));
            }
        }
        Ok(result)
    }

    fn is_on_implicit_constructor(&self, criteria: &Criteria) -> bool {
        if !criteria.targets_implicit_constructor() {
            return false;
        }
        match self.knowledge {
            ConstructorKnowledge::ImplicitOnly => true,
            ConstructorKnowledge::Explicit => false,
            ConstructorKnowledge::Unknown => {
                self.config.unknown_constructors == UnknownConstructorPolicy::Synthesize
            }
        }
    }

    /// The class's constructor insertion, created on first use.
    fn ensure_constructor(&mut self, clist: &CriteriaList) -> Result<InsertionId, InsertError> {
        if let Some(ctor) = self.constructor {
            debug!(
                class = %self.class_name,
                criteria = %clist,
                id = %ctor,
                "reusing synthesized constructor"
            );
            return Ok(ctor);
        }
        let ctor = merge::constructor(&mut self.arena, clist)?;
        debug!(class = %self.class_name, id = %ctor, "synthesized constructor");
        self.order.push(ctor);
        self.constructor = Some(ctor);
        Ok(ctor)
    }

    /// Move the insertions just made for one annotation into the constructor.
    fn absorb_into_constructor(
        &mut self,
        ctor: InsertionId,
        made: &[InsertionId],
        special: &mut Option<SpecialForm>,
        criteria: &Criteria,
        text: &str,
        type_only: bool,
    ) -> Result<(), InsertError> {
        if made.is_empty() {
            return Ok(());
        }
        let is_receiver = matches!(self.arena.get(made[0]), Some(Insertion::Receiver(_)));
        if is_receiver {
            let kept = merge::attach_receiver(&mut self.arena, ctor, made[0])?;
            if kept != made[0] {
                for annotation in self.sources.get(made[0]).to_vec() {
                    self.sources.put(kept, &annotation);
                }
            }
        } else if criteria.is_on_return_type() {
            // Folded into the constructor's type and dropped from the output,
            // like every other absorbed insertion.
            self.arena.add_type_annotation(ctor, text)?;
        } else if !type_only {
            for id in made {
                merge::attach_declaration(&mut self.arena, ctor, *id)?;
            }
        } else {
            return Ok(());
        }

        for id in made {
            if let Some(pos) = self.order.iter().rposition(|o| o == id) {
                self.order.remove(pos);
            }
        }
        if let Some(form) = special.as_mut() {
            if form.ids.iter().any(|id| made.contains(id)) {
                form.absorbed = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insertion::InsertionKind;
    use crate::oracle::{ConstructorTable, NoBytecode, OracleError};
    use crate::scene::{AnnotationDef, ElementTarget};

    fn defs(scene: &mut Scene) {
        scene.define(AnnotationDef::new("a.Decl"));
        scene.define(
            AnnotationDef::new("a.Type")
                .with_targets(vec![ElementTarget::TypeUse]),
        );
    }

    fn run(scene: &Scene) -> SynthesisResult {
        synthesize(scene, &NoBytecode, &SynthesisConfig::default()).unwrap()
    }

    fn kinds(result: &SynthesisResult) -> Vec<InsertionKind> {
        result.insertions().map(|(_, i)| i.kind()).collect()
    }

    struct FailingOracle;

    impl ConstructorOracle for FailingOracle {
        fn constructors(&self, class_name: &str) -> Result<ConstructorKnowledge, OracleError> {
            Err(OracleError::Unreadable {
                class_name: class_name.to_string(),
                reason: "truncated".to_string(),
            })
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn packages_precede_classes() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene.class_mut("a.C").annotate(Annotation::new("a.Decl"));
            scene
                .class_mut("p.package-info")
                .annotate(Annotation::new("a.Decl"));
            scene.package_mut("q").annotations.push(Annotation::new("a.Decl"));

            let result = run(&scene);
            let criteria: Vec<String> = result
                .insertions()
                .map(|(_, i)| i.criteria().to_string())
                .collect();
            assert_eq!(
                criteria,
                vec![
                    "[packageDecl(q)]",
                    "[is(CLASS, a.C)]",
                    "[packageDecl(p)]",
                ]
            );
        }

        #[test]
        fn nested_positions_precede_outer_type() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let field = scene.class_mut("a.C").field_mut("f");
            field.ty.annotate(Annotation::new("a.Type"));
            field
                .ty
                .inner_mut("0;".parse().unwrap())
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            let criteria: Vec<String> = result
                .insertions()
                .map(|(_, i)| i.criteria().to_string())
                .collect();
            assert_eq!(
                criteria,
                vec![
                    "[inClass(a.C, exact), inClass(a.C), field(f), atLocation(0;)]",
                    "[inClass(a.C, exact), inClass(a.C), field(f), atLocation()]",
                ]
            );
        }

        #[test]
        fn deeper_positions_concatenate_paths() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .field_mut("f")
                .ty
                .inner_mut("0;".parse().unwrap())
                .inner_mut("[".parse().unwrap())
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            let (_, insertion) = result.insertions().next().unwrap();
            let criteria = insertion.criteria().criteria();
            assert_eq!(
                criteria.generic_array_location().unwrap().to_string(),
                "0;["
            );
        }
    }

    fn criteria_of(result: &SynthesisResult) -> Vec<String> {
        result
            .insertions()
            .map(|(_, i)| i.criteria().to_string())
            .collect()
    }

    mod contexts {
        use super::*;
        use crate::location::{BoundLocation, LocalLocation, TypeIndexLocation};

        const IN_C: &str = "inClass(a.C, exact), inClass(a.C)";

        #[test]
        fn class_members_follow_fixed_order() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let class = scene.class_mut("a.C");
            // Built in reverse so the output order cannot come from insertion order.
            class
                .field_init_mut("g")
                .call_mut(RelativeLocation::index(0))
                .annotate(Annotation::new("a.Type"));
            class
                .instance_init_mut(1)
                .expressions
                .instanceof_mut(RelativeLocation::offset(5))
                .annotate(Annotation::new("a.Type"));
            class
                .static_init_mut(0)
                .expressions
                .typecast_mut(RelativeLocation::offset(3))
                .annotate(Annotation::new("a.Type"));
            class.method_mut("m()V").annotate(Annotation::new("a.Decl"));
            class.field_mut("f").annotate(Annotation::new("a.Decl"));
            class
                .extends_implements_mut(TypeIndexLocation(-1))
                .annotate(Annotation::new("a.Type"));
            class
                .bound_mut(BoundLocation::new(0, 1))
                .annotate(Annotation::new("a.Type"));
            class.annotate(Annotation::new("a.Decl"));

            let result = run(&scene);
            assert_eq!(
                criteria_of(&result),
                vec![
                    "[is(CLASS, a.C)]".to_string(),
                    "[inClass(a.C, exact), classBound(a.C, 0&1), atLocation()]".to_string(),
                    format!("[{}, extImpls(a.C, -1)]", IN_C),
                    format!("[{}, field(f, declaration)]", IN_C),
                    format!("[{}, inMethod(m()V)]", IN_C),
                    format!(
                        "[{}, inStaticInit(0), cast(static init number 0(), #3), atLocation()]",
                        IN_C
                    ),
                    format!(
                        "[{}, inInstanceInit(1), instanceOf(instance init number 1(), #5), atLocation()]",
                        IN_C
                    ),
                    format!(
                        "[{}, inFieldInit(g), methodCall(init for field g(), *0), atLocation()]",
                        IN_C
                    ),
                ]
            );
        }

        #[test]
        fn method_members_follow_fixed_order() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let method = scene.class_mut("a.C").method_mut("m()V");
            method
                .body
                .local_mut(LocalLocation::named("x", 0))
                .ty
                .annotate(Annotation::new("a.Type"));
            method
                .insert_annotation_mut("Method.type".parse().unwrap())
                .annotate(Annotation::new("a.Type"));
            method.parameter_mut(0).ty.annotate(Annotation::new("a.Type"));
            method
                .bound_mut(BoundLocation::new(0, 0))
                .annotate(Annotation::new("a.Type"));
            method.return_type.annotate(Annotation::new("a.Type"));
            method.receiver.annotate(Annotation::new("a.Type"));
            method.annotate(Annotation::new("a.Decl"));

            let result = run(&scene);
            let m = format!("{}, inMethod(m()V)", IN_C);
            assert_eq!(
                criteria_of(&result),
                vec![
                    format!("[{}]", m),
                    format!("[{}, receiver(m()V), atLocation()]", m),
                    format!("[{}, returnType(a.C, m()V), atLocation()]", m),
                    format!("[{}, methodBound(m()V, 0&0), atLocation()]", m),
                    format!("[{}, param(m()V, 0), atLocation()]", m),
                    format!("[{}, astPath(Method.type)]", m),
                    format!("[{}, local(m()V, x*0), atLocation()]", m),
                ]
            );
            assert_eq!(kinds(&result)[1], InsertionKind::Receiver);
        }

        #[test]
        fn local_declaration_precedes_its_type() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let local = scene
                .class_mut("a.C")
                .method_mut("m()V")
                .body
                .local_mut(LocalLocation::scoped(1, 0, 10));
            local.ty.annotate(Annotation::new("a.Type"));
            local.annotate(Annotation::new("a.Decl"));

            let result = run(&scene);
            let m = format!("{}, inMethod(m()V)", IN_C);
            assert_eq!(
                criteria_of(&result),
                vec![
                    format!("[{}, local(m()V, #1#0+10)]", m),
                    format!("[{}, local(m()V, #1#0+10), atLocation()]", m),
                ]
            );
            assert_eq!(result.rendered().unwrap(), vec!["@Decl", "@Type"]);
        }

        #[test]
        fn expressions_are_grouped_by_kind() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let expressions = &mut scene.class_mut("a.C").method_mut("m()V").body.expressions;
            expressions
                .lambda_mut(RelativeLocation::offset(9))
                .parameter_mut(0)
                .ty
                .annotate(Annotation::new("a.Type"));
            expressions
                .call_mut(RelativeLocation::offset(8))
                .annotate(Annotation::new("a.Type"));
            expressions
                .member_ref_mut(RelativeLocation::index(1))
                .annotate(Annotation::new("a.Type"));
            expressions
                .instanceof_mut(RelativeLocation::offset(6))
                .annotate(Annotation::new("a.Type"));
            expressions
                .typecast_mut(RelativeLocation::offset(4))
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            let m = format!("{}, inMethod(m()V)", IN_C);
            assert_eq!(
                criteria_of(&result),
                vec![
                    format!("[{}, cast(m()V, #4), atLocation()]", m),
                    format!("[{}, instanceOf(m()V, #6), atLocation()]", m),
                    format!("[{}, memberReference(m()V, *1), atLocation()]", m),
                    format!("[{}, methodCall(m()V, #8), atLocation()]", m),
                    format!(
                        "[{}, lambda(m()V, #9), param((anonymous), 0), atLocation()]",
                        m
                    ),
                ]
            );
            assert!(kinds(&result)
                .iter()
                .all(|kind| *kind == InsertionKind::Annotation));
        }

        #[test]
        fn lambda_body_uses_enclosing_method_name() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .method_mut("m()V")
                .body
                .expressions
                .lambda_mut(RelativeLocation::offset(9))
                .body
                .local_mut(LocalLocation::named("y", 0))
                .ty
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            assert_eq!(
                criteria_of(&result),
                vec![format!(
                    "[{}, inMethod(m()V), lambda(m()V, #9), local(m()V, y*0), atLocation()]",
                    IN_C
                )]
            );
        }

        #[test]
        fn implements_clause_has_no_outer_location() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let supertype = scene
                .class_mut("a.C")
                .extends_implements_mut(TypeIndexLocation(0));
            supertype.annotate(Annotation::new("a.Type"));
            supertype
                .inner_mut("0;".parse().unwrap())
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            assert_eq!(
                criteria_of(&result),
                vec![
                    format!("[{}, extImpls(a.C, 0), atLocation(0;)]", IN_C),
                    format!("[{}, extImpls(a.C, 0)]", IN_C),
                ]
            );
            let criteria = result.insertions().nth(1).unwrap().1.criteria().criteria();
            assert!(criteria.generic_array_location().is_none());
        }

        #[test]
        fn initializer_blocks_visit_locals_and_expressions() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let class = scene.class_mut("a.C");
            let block = class.instance_init_mut(0);
            block
                .expressions
                .new_mut(RelativeLocation::offset(2))
                .annotate(Annotation::new("a.Type"));
            block
                .local_mut(LocalLocation::named("z", 0))
                .annotate(Annotation::new("a.Decl"));
            class
                .static_init_mut(0)
                .expressions
                .member_ref_mut(RelativeLocation::offset(1))
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            assert_eq!(
                criteria_of(&result),
                vec![
                    format!(
                        "[{}, inStaticInit(0), memberReference(static init number 0(), #1), atLocation()]",
                        IN_C
                    ),
                    format!(
                        "[{}, inInstanceInit(0), local(instance init number 0(), z*0)]",
                        IN_C
                    ),
                    format!(
                        "[{}, inInstanceInit(0), new(instance init number 0(), #2), atLocation()]",
                        IN_C
                    ),
                ]
            );
            assert_eq!(
                kinds(&result),
                vec![
                    InsertionKind::Annotation,
                    InsertionKind::Annotation,
                    InsertionKind::New,
                ]
            );
        }
    }

    mod classification {
        use super::*;

        #[test]
        fn declaration_annotations_go_on_separate_lines() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let method = scene.class_mut("a.C").method_mut("m()V");
            method.annotate(Annotation::new("a.Decl"));
            method.return_type.annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            let lines: Vec<bool> = result.insertions().map(|(_, i)| i.separate_line()).collect();
            assert_eq!(lines, vec![true, false]);
        }

        #[test]
        fn intersection_cast_component_gets_extra_criterion() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .method_mut("m()V")
                .body
                .expressions
                .typecast_mut(crate::location::RelativeLocation::offset(4).with_type_index(1))
                .annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            let (_, insertion) = result.insertions().next().unwrap();
            let last = insertion.criteria().iter().last().unwrap().to_string();
            assert_eq!(last, "intersectionTypeLocation(#4,1)");
        }

        #[test]
        fn new_expression_annotations_merge() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene.define(AnnotationDef::new("a.Other").with_targets(vec![ElementTarget::TypeUse]));
            let news = scene
                .class_mut("a.C")
                .method_mut("m()V")
                .body
                .expressions
                .new_mut(crate::location::RelativeLocation::offset(2));
            news.annotate(Annotation::new("a.Type"));
            news.annotate(Annotation::new("a.Other"));

            let result = run(&scene);
            assert_eq!(kinds(&result), vec![InsertionKind::New]);
            let (id, _) = result.insertions().next().unwrap();
            assert_eq!(result.render(id).unwrap(), "@Type @Other");
            assert_eq!(result.sources().get(id).len(), 2);
        }

        #[test]
        fn duplicate_annotations_are_emitted_once() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .annotations
                .extend([Annotation::new("a.Decl"), Annotation::new("a.Decl")]);
            assert_eq!(run(&scene).len(), 1);
        }
    }

    mod ast_paths {
        use super::*;

        #[test]
        fn withheld_nested_insertions_are_flushed_for_plain_outer() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let element = scene
                .class_mut("a.C")
                .method_mut("m()V")
                .insert_annotation_mut("Method.type".parse().unwrap());
            element
                .inner_mut("0;".parse().unwrap())
                .annotate(Annotation::new("a.Type"));
            element.annotate(Annotation::new("a.Decl"));

            let result = run(&scene);
            let texts = result.rendered().unwrap();
            assert_eq!(texts, vec!["@Type", "@Decl"]);
        }

        #[test]
        fn receiver_by_ast_path_keeps_nested() {
            let mut scene = Scene::new();
            defs(&mut scene);
            let element = scene
                .class_mut("a.C")
                .method_mut("m()V")
                .insert_annotation_mut("Method.parameter -1".parse().unwrap());
            element
                .inner_mut("0;".parse().unwrap())
                .annotate(Annotation::new("a.Type"));
            element.annotate(Annotation::new("a.Type"));

            let result = run(&scene);
            assert_eq!(
                kinds(&result),
                vec![InsertionKind::Annotation, InsertionKind::Receiver]
            );
            assert_eq!(result.rendered().unwrap(), vec!["@Type", "@Type C this"]);
            let (nested, _) = result.insertions().next().unwrap();
            let (_, receiver) = result.insertions().nth(1).unwrap();
            assert_eq!(receiver.inner(), &[nested]);
        }
    }

    mod constructors {
        use super::*;

        fn implicit_ctor_scene() -> Scene {
            let mut scene = Scene::new();
            defs(&mut scene);
            let ctor = scene.class_mut("a.C").method_mut("<init>()V");
            ctor.annotate(Annotation::new("a.Decl"));
            ctor.receiver.annotate(Annotation::new("a.Type"));
            ctor.return_type.annotate(Annotation::new("a.Type"));
            scene
        }

        #[test]
        fn implicit_constructor_absorbs_annotations() {
            let scene = implicit_ctor_scene();
            let oracle = ConstructorTable::new().with("a.C", false);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();

            assert_eq!(kinds(&result), vec![InsertionKind::Constructor]);
            let (id, _) = result.insertions().next().unwrap();
            assert_eq!(
                result.render(id).unwrap(),
                "@Decl\npublic @Type C(@Type C this) { super(); }"
            );
            assert!(result.diagnostics().is_empty());
        }

        #[test]
        fn receivers_from_separate_elements_share_one_parameter() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene.define(AnnotationDef::new("a.Other").with_targets(vec![ElementTarget::TypeUse]));
            let ctor = scene.class_mut("a.C").method_mut("<init>()V");
            ctor.receiver.annotate(Annotation::new("a.Type"));
            ctor.insert_annotation_mut("Method.parameter -1".parse().unwrap())
                .annotate(Annotation::new("a.Other"));
            let oracle = ConstructorTable::new().with("a.C", false);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();

            assert_eq!(kinds(&result), vec![InsertionKind::Constructor]);
            assert_eq!(
                result.rendered().unwrap(),
                vec!["public C(@Type @Other C this) { super(); }"]
            );
            let Some(Insertion::Constructor(constructor)) = result.insertions().next().map(|(_, i)| i)
            else {
                panic!("expected a constructor");
            };
            let receiver = constructor.receiver.unwrap();
            assert_eq!(result.sources().get(receiver).len(), 2);
            assert!(result.diagnostics().is_empty());
        }

        #[test]
        fn return_type_annotation_leaves_the_output() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .method_mut("<init>()V")
                .return_type
                .annotate(Annotation::new("a.Type"));
            let oracle = ConstructorTable::new().with("a.C", false);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();
            assert_eq!(
                result.rendered().unwrap(),
                vec!["public @Type C() { super(); }"]
            );
        }

        #[test]
        fn explicit_constructor_leaves_annotations_in_place() {
            let scene = implicit_ctor_scene();
            let oracle = ConstructorTable::new().with("a.C", true);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();
            assert_eq!(
                kinds(&result),
                vec![
                    InsertionKind::Annotation,
                    InsertionKind::Receiver,
                    InsertionKind::Annotation,
                ]
            );
        }

        #[test]
        fn unknown_constructor_follows_policy() {
            let scene = implicit_ctor_scene();

            let suppressed = synthesize(&scene, &NoBytecode, &SynthesisConfig::default()).unwrap();
            assert!(!kinds(&suppressed).contains(&InsertionKind::Constructor));

            let config = SynthesisConfig {
                unknown_constructors: UnknownConstructorPolicy::Synthesize,
                read_bytecode: true,
            };
            let synthesized = synthesize(&scene, &NoBytecode, &config).unwrap();
            assert_eq!(kinds(&synthesized), vec![InsertionKind::Constructor]);
        }

        #[test]
        fn oracle_failure_is_a_diagnostic() {
            let scene = implicit_ctor_scene();
            let result = synthesize(&scene, &FailingOracle, &SynthesisConfig::default()).unwrap();
            assert_eq!(
                result.diagnostics()[0].kind,
                DiagnosticKind::BytecodeUnavailable
            );
            assert!(!kinds(&result).contains(&InsertionKind::Constructor));
        }

        #[test]
        fn disabled_bytecode_skips_oracle() {
            let scene = implicit_ctor_scene();
            let config = SynthesisConfig {
                read_bytecode: false,
                ..SynthesisConfig::default()
            };
            let result = synthesize(&scene, &FailingOracle, &config).unwrap();
            assert!(result.diagnostics().is_empty());
        }

        #[test]
        fn type_only_annotation_stays_in_place() {
            let mut scene = Scene::new();
            defs(&mut scene);
            scene
                .class_mut("a.C")
                .method_mut("<init>()V")
                .parameter_mut(0)
                .ty
                .annotate(Annotation::new("a.Type"));
            let oracle = ConstructorTable::new().with("a.C", false);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();
            assert_eq!(
                kinds(&result),
                vec![InsertionKind::Annotation, InsertionKind::Constructor]
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn unknown_definition_is_fatal() {
            let mut scene = Scene::new();
            scene.class_mut("a.C").annotate(Annotation::new("a.Nope"));
            let err = synthesize(&scene, &NoBytecode, &SynthesisConfig::default()).unwrap_err();
            assert!(matches!(err.root(), InsertError::UnknownDefinition { .. }));
        }

        #[test]
        fn annotation_errors_name_their_element() {
            let mut scene = Scene::new();
            scene
                .class_mut("a.C")
                .method_mut("m()V")
                .annotate(Annotation::new("a.Nope"));
            let err = synthesize(&scene, &NoBytecode, &SynthesisConfig::default()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "unknown annotation definition 'a.Nope' at [inClass(a.C, exact), inClass(a.C), inMethod(m()V)]"
            );
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn bare_package_info_is_malformed() {
            let mut scene = Scene::new();
            scene.class_mut(".package-info");
            let err = synthesize(&scene, &NoBytecode, &SynthesisConfig::default()).unwrap_err();
            assert!(matches!(err, InsertError::MalformedScene { .. }));
        }
    }
}
