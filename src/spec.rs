use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::fetch::{FetchMethod, ModelFetch};
use crate::input::{InputError, ScrubInput};
use crate::object::{validate_object, Outcome};
use crate::parsers::Parser;
use crate::types::Predicate;

/// An object specification: declared fields, in order, plus the unknown-key policy.
///
/// Specs are immutable once built and can be shared freely (including
/// across threads); validation never writes to them.
///
/// # Example
/// ```
/// use scrub::types;
/// use serde_json::json;
///
/// let spec = scrub::object()
///     .field("name", scrub::field(types::string()).required().not_null())
///     .field("age", scrub::field(types::number()));
///
/// let outcome = spec.validate_value(&json!({"name": "Ada", "extra": 1})).unwrap();
/// assert!(outcome.is_valid());
/// assert_eq!(outcome.parsed_value(), Some(json!({"name": "Ada"})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Spec {
    fields: Vec<(String, FieldSpec)>,
    fail_on_unknown_fields: bool,
}

impl Spec {
    pub fn new() -> Self {
        Self {
            fields: vec![],
            fail_on_unknown_fields: false,
        }
    }

    /// Declare a field. Declaring the same name twice replaces the earlier
    /// rules but keeps the original position.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<FieldSpec>) -> Self {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    /// Abort validation when the input carries a key that is not declared.
    pub fn fail_on_unknown_fields(mut self) -> Self {
        self.fail_on_unknown_fields = true;
        self
    }

    pub fn fails_on_unknown_fields(&self) -> bool {
        self.fail_on_unknown_fields
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a JSON value, which must be an object.
    pub fn validate_value(&self, value: &Value) -> Result<Outcome, InputError> {
        match value {
            Value::Object(obj) => Ok(validate_object(obj, self)),
            other => Err(InputError::NotAnObject {
                found: crate::input::value_type_name(other),
            }),
        }
    }

    /// Validate any supported input (JSON text, bytes, file path, `Value`).
    pub fn validate<I: ScrubInput + ?Sized>(&self, input: &I) -> Result<Outcome, InputError> {
        let json = input.to_json_value()?;
        self.validate_value(&json)
    }
}

/// Rules for one declared field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) required: bool,
    pub(crate) not_null: bool,
    pub(crate) kind: FieldKind,
}

/// What a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A value checked against a type predicate.
    Leaf(Box<LeafRules>),
    /// A nested object validated against a sub-spec.
    Object(Spec),
    /// An open-ended object whose every value is validated against a sub-spec.
    Map(Spec),
}

impl FieldSpec {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            required: false,
            not_null: false,
            kind,
        }
    }

    /// A container field: the value is an object validated against `spec`.
    pub fn nested(spec: Spec) -> Self {
        Self::with_kind(FieldKind::Object(spec))
    }

    /// A map field: every value of the input object is validated against
    /// `spec`. Scalar values are checked against `spec`'s
    /// [`RAW_VALUE`](crate::map::RAW_VALUE) field.
    pub fn values(spec: Spec) -> Self {
        Self::with_kind(FieldKind::Map(spec))
    }

    /// The key must be present.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value must not be `null`.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// Leaf-field rules, applied in order: delimiter, parser, type check, then
/// either a record fetch or object-array validation.
#[derive(Debug, Clone)]
pub struct LeafRules {
    pub(crate) type_check: Predicate,
    pub(crate) delimiter: Option<String>,
    pub(crate) parser: Option<Parser>,
    pub(crate) ensure_array: bool,
    pub(crate) fetch: Option<FetchRules>,
    pub(crate) object_array: Option<Spec>,
}

impl LeafRules {
    pub fn type_check(&self) -> &Predicate {
        &self.type_check
    }

    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    pub fn parser(&self) -> Option<&Parser> {
        self.parser.as_ref()
    }

    pub fn ensures_array(&self) -> bool {
        self.ensure_array
    }
}

/// How a leaf field resolves its value against a record store.
#[derive(Clone)]
pub struct FetchRules {
    pub(crate) model: Arc<dyn ModelFetch>,
    pub(crate) method: Option<FetchMethod>,
    pub(crate) many: bool,
    pub(crate) must_exist: bool,
}

impl fmt::Debug for FetchRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRules")
            .field("method", &self.method)
            .field("many", &self.many)
            .field("must_exist", &self.must_exist)
            .finish_non_exhaustive()
    }
}

/// Builder for a leaf field. Created via [`scrub::field()`](crate::field).
///
/// # Example
/// ```
/// use scrub::{parsers, types};
///
/// let ids = scrub::field(types::number())
///     .required()
///     .delimiter(",")
///     .parser(parsers::string_to_int());
/// ```
#[derive(Debug, Clone)]
pub struct Leaf {
    required: bool,
    not_null: bool,
    rules: LeafRules,
    lookup: Lookup,
}

/// Fetch settings collected by the builder. Turned into [`FetchRules`] once a
/// model is set, so modifiers may be chained in any order.
#[derive(Clone, Default)]
struct Lookup {
    model: Option<Arc<dyn ModelFetch>>,
    method: Option<FetchMethod>,
    many: bool,
    must_exist: bool,
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("model", &self.model.is_some())
            .field("method", &self.method)
            .field("many", &self.many)
            .field("must_exist", &self.must_exist)
            .finish()
    }
}

impl Leaf {
    pub fn new(type_check: Predicate) -> Self {
        Self {
            required: false,
            not_null: false,
            rules: LeafRules {
                type_check,
                delimiter: None,
                parser: None,
                ensure_array: false,
                fetch: None,
                object_array: None,
            },
            lookup: Lookup::default(),
        }
    }

    /// The key must be present.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value must not be `null`.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Split string input on `delimiter` into a sequence.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.rules.delimiter = Some(delimiter.into());
        self
    }

    /// Convert string input (or each delimited part or array element) before
    /// the type check.
    pub fn parser(mut self, parser: Parser) -> Self {
        self.rules.parser = Some(parser);
        self
    }

    /// The value must be a sequence.
    pub fn ensure_array(mut self) -> Self {
        self.rules.ensure_array = true;
        self
    }

    /// Replace the validated key(s) with records from `model`.
    pub fn fetch<M: ModelFetch + 'static>(self, model: M) -> Self {
        self.fetch_shared(Arc::new(model))
    }

    /// Like [`fetch()`](Self::fetch), sharing an existing store.
    pub fn fetch_shared(mut self, model: Arc<dyn ModelFetch>) -> Self {
        self.lookup.model = Some(model);
        self
    }

    /// Treat the value as a sequence of keys even without a delimiter.
    /// No effect unless a fetch is configured.
    pub fn many(mut self) -> Self {
        self.lookup.many = true;
        self
    }

    /// Override which lookup is performed.
    /// No effect unless a fetch is configured.
    pub fn fetch_method(mut self, method: FetchMethod) -> Self {
        self.lookup.method = Some(method);
        self
    }

    /// Fail unless every requested key resolves to a record.
    /// No effect unless a fetch is configured.
    pub fn must_exist(mut self) -> Self {
        self.lookup.must_exist = true;
        self
    }

    /// Validate every element of the sequence as an object against `spec`.
    /// Ignored when a fetch is configured.
    pub fn object_array(mut self, spec: Spec) -> Self {
        self.rules.object_array = Some(spec);
        self
    }
}

impl From<Leaf> for FieldSpec {
    fn from(leaf: Leaf) -> Self {
        let Lookup {
            model,
            method,
            many,
            must_exist,
        } = leaf.lookup;
        let mut rules = leaf.rules;
        rules.fetch = model.map(|model| FetchRules {
            model,
            method,
            many,
            must_exist,
        });
        FieldSpec {
            required: leaf.required,
            not_null: leaf.not_null,
            kind: FieldKind::Leaf(Box::new(rules)),
        }
    }
}
