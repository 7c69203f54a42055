// crates/formwork-core/src/core/descriptor.rs
// ============================================================================
// Module: Formwork Descriptors
// Description: Property, processor, and catalog schema types.
// Purpose: Describe the fields a form renders and the variants an instance selects.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`DescriptorCatalog`] is an ordered list of [`ProcessorDescriptor`]
//! variants, each an ordered list of [`PropertyDescriptor`] fields. Catalogs
//! arrive from an external source as JSON with camelCase keys and are treated
//! as immutable snapshots for an editing session.
//!
//! Object-typed properties carry exactly one level of nested children. Deeper
//! nesting is rejected by [`DescriptorCatalog::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while fetching, decoding, or checking a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No catalog exists for the requested identifier.
    #[error("catalog not found: {0}")]
    NotFound(String),
    /// The catalog source failed.
    #[error("catalog source error: {0}")]
    Source(String),
    /// The catalog payload could not be decoded.
    #[error("catalog decode error: {0}")]
    Decode(String),
    /// The catalog violates a structural rule.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Property Types
// ============================================================================

/// Declared type of a property.
///
/// # Invariants
/// - Names compare case-insensitively; the canonical spelling is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Free text.
    String,
    /// 32-bit style integer (at most ten digits).
    Integer,
    /// Integer of any length.
    Long,
    /// Decimal number with optional exponent.
    Double,
    /// `true` / `false`.
    Boolean,
    /// One of a fixed list of options.
    Enum,
    /// List of strings.
    Array,
    /// Group of nested child properties.
    Object,
}

impl PropertyType {
    /// Every property type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Integer,
        Self::Long,
        Self::Double,
        Self::Boolean,
        Self::Enum,
        Self::Array,
        Self::Object,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Returns true for integer, long, and double.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Double)
    }

    /// Looks up a type by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_name(value)
            .ok_or_else(|| CatalogError::Invalid(format!("unknown property type `{value}`")))
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Validation Rules
// ============================================================================

/// Rule kinds understood by the validation engine.
const EXPRESSION_RULE_KINDS: [&str; 2] = ["expr", "expression"];

/// Returns the rule kind assumed when a catalog omits it.
fn default_rule_kind() -> String {
    EXPRESSION_RULE_KINDS[0].to_string()
}

/// User-authored validation rule attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    /// Boolean rule expression over the bound `value`.
    pub expression: String,
    /// Rule language tag.
    #[serde(default = "default_rule_kind")]
    pub rule_kind: String,
    /// Message reported when the rule evaluates to false.
    #[serde(default)]
    pub message: String,
}

impl ValidationRule {
    /// Creates an expression rule.
    #[must_use]
    pub fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            rule_kind: default_rule_kind(),
            message: message.into(),
        }
    }

    /// Returns true when the rule kind names the expression language.
    #[must_use]
    pub fn is_expression_kind(&self) -> bool {
        EXPRESSION_RULE_KINDS.iter().any(|kind| kind.eq_ignore_ascii_case(self.rule_kind.trim()))
    }
}

// ============================================================================
// SECTION: Property Descriptors
// ============================================================================

/// Schema for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Field name, unique within its owning scope.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Help text.
    #[serde(default)]
    pub description: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Whether the field may be absent from an instance.
    #[serde(default)]
    pub optional: bool,
    /// Untyped default literal; `null` counts as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Options for enum fields, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Suggestion hint token (for example `tags`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    /// Whether the field renders as multi-line text.
    #[serde(default)]
    pub multiline: bool,
    /// Validation rules, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,
    /// Nested children; only meaningful for object fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
}

impl PropertyDescriptor {
    /// Creates a required property with empty metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            description: String::new(),
            property_type,
            optional: false,
            default_value: None,
            options: Vec::new(),
            autocomplete: None,
            multiline: false,
            validations: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Marks the property optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the default literal.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets enum options.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Appends an expression validation rule.
    #[must_use]
    pub fn with_rule(mut self, expression: impl Into<String>, message: impl Into<String>) -> Self {
        self.validations.push(ValidationRule::expression(expression, message));
        self
    }

    /// Sets nested children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.properties = children;
        self
    }

    /// Finds a nested child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.properties.iter().find(|child| child.name == name)
    }
}

// ============================================================================
// SECTION: Processor Descriptors
// ============================================================================

/// Named schema variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorDescriptor {
    /// Variant name matched against `Instance::name`.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Help text.
    #[serde(default)]
    pub description: String,
    /// Top-level properties, in display order.
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

impl ProcessorDescriptor {
    /// Creates a variant with the given properties.
    #[must_use]
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            description: String::new(),
            properties,
        }
    }

    /// Resolves a top-level key or a `parent.child` path to its descriptor.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyDescriptor> {
        match key.split_once('.') {
            Some((parent, child)) => self
                .properties
                .iter()
                .find(|property| property.name == parent && property.property_type == PropertyType::Object)
                .and_then(|property| property.child(child)),
            None => self
                .properties
                .iter()
                .find(|property| property.name == key && property.property_type != PropertyType::Object),
        }
    }

    /// Returns every addressable key, nested children as `parent.child`.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for property in &self.properties {
            if property.property_type == PropertyType::Object {
                for child in &property.properties {
                    keys.push(format!("{}.{}", property.name, child.name));
                }
            } else {
                keys.push(property.name.clone());
            }
        }
        keys
    }
}

// ============================================================================
// SECTION: Catalogs
// ============================================================================

/// Ordered list of schema variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorCatalog(Vec<ProcessorDescriptor>);

impl DescriptorCatalog {
    /// Wraps the variants without checking them.
    #[must_use]
    pub const fn new(variants: Vec<ProcessorDescriptor>) -> Self {
        Self(variants)
    }

    /// Decodes a JSON catalog and checks its structure.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Decode`] for malformed JSON or unknown property
    /// types and [`CatalogError::Invalid`] for structural violations.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_slice(bytes).map_err(|err| CatalogError::Decode(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Returns the variants in declaration order.
    #[must_use]
    pub fn variants(&self) -> &[ProcessorDescriptor] {
        &self.0
    }

    /// Returns true when the catalog has no variants.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of variants.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Finds a variant by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ProcessorDescriptor> {
        self.0.iter().find(|variant| variant.name == name)
    }

    /// Checks the structural rules the projection engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] naming the first violation found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut variant_names = BTreeSet::new();
        for variant in &self.0 {
            if variant.name.trim().is_empty() {
                return Err(CatalogError::Invalid("variant name must be non-empty".to_string()));
            }
            if !variant_names.insert(variant.name.as_str()) {
                return Err(CatalogError::Invalid(format!("duplicate variant `{}`", variant.name)));
            }
            validate_scope(&variant.name, &variant.properties, false)?;
        }
        Ok(())
    }
}

/// Checks one property scope (a variant's top level or an object's children).
fn validate_scope(
    scope: &str,
    properties: &[PropertyDescriptor],
    nested: bool,
) -> Result<(), CatalogError> {
    let mut names = BTreeSet::new();
    for property in properties {
        let path = format!("{scope}.{}", property.name);
        if property.name.trim().is_empty() || property.name.contains('.') {
            return Err(CatalogError::Invalid(format!(
                "property name `{path}` must be non-empty and must not contain `.`"
            )));
        }
        if !nested && property.name == "name" {
            return Err(CatalogError::Invalid(format!(
                "property `{path}` collides with the instance variant name"
            )));
        }
        if !names.insert(property.name.as_str()) {
            return Err(CatalogError::Invalid(format!("duplicate property `{path}`")));
        }
        match (property.property_type, nested) {
            (PropertyType::Object, true) => {
                return Err(CatalogError::Invalid(format!(
                    "property `{path}` nests an object inside an object"
                )));
            }
            (PropertyType::Object, false) => validate_scope(&path, &property.properties, true)?,
            (_, _) if !property.properties.is_empty() => {
                return Err(CatalogError::Invalid(format!(
                    "property `{path}` has children but is not an object"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
