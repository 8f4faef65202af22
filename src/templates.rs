//! Template registry
//!
//! Each page names a template that decides which field-set and renderer
//! apply. Field shapes live with the host, not here: a template registers a
//! constructor turning the page's opaque JSON field bag into its own typed
//! value, plus an optional validation hook run during write validation.
//!
//! Registry keys are the normalized form of the template name (see
//! [`crate::page::template_key`]), the same form the view registry uses.

use std::any::Any;
use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::error::{PageError, PageResult};
use crate::page::{Page, template_key};

/// Typed field values constructed from a page's field bag
pub trait TemplateFields: Send + Sync {
	/// Name of the template these fields belong to
	fn template_name(&self) -> &str;

	/// Downcast support for hosts retrieving their concrete field struct
	fn as_any(&self) -> &dyn Any;
}

/// Factory turning the opaque JSON field bag into typed fields
type FieldsConstructor = Box<dyn Fn(JsonValue) -> PageResult<Box<dyn TemplateFields>> + Send + Sync>;

/// Per-template validation hook run during write validation
type TemplateValidator = Box<dyn Fn(&Page) -> PageResult<()> + Send + Sync>;

/// Everything registered for one template
pub struct TemplateDefinition {
	label: String,
	constructor: Option<FieldsConstructor>,
	validator: Option<TemplateValidator>,
}

impl TemplateDefinition {
	/// Create a definition with a human-readable label and no hooks
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			constructor: None,
			validator: None,
		}
	}

	/// Attach the typed-fields constructor
	pub fn with_fields<F>(mut self, constructor: F) -> Self
	where
		F: Fn(JsonValue) -> PageResult<Box<dyn TemplateFields>> + Send + Sync + 'static,
	{
		self.constructor = Some(Box::new(constructor));
		self
	}

	/// Attach a validation hook
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&Page) -> PageResult<()> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	/// The human-readable label
	pub fn label(&self) -> &str {
		&self.label
	}
}

/// Registry of available templates, keyed by normalized name
pub struct TemplateRegistry {
	templates: HashMap<String, TemplateDefinition>,
}

impl TemplateRegistry {
	/// Create a registry holding only the `default` template
	pub fn new() -> Self {
		let mut registry = Self {
			templates: HashMap::new(),
		};
		registry.register("default", TemplateDefinition::new("Default"));
		registry
	}

	/// Register a template definition under its normalized name
	pub fn register(&mut self, name: &str, definition: TemplateDefinition) {
		self.templates.insert(template_key(name), definition);
	}

	/// Get a template definition by (unnormalized) name
	pub fn get(&self, name: &str) -> Option<&TemplateDefinition> {
		self.templates.get(&template_key(name))
	}

	/// Registered template names, sorted
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Construct the typed fields for a page from its field bag.
	///
	/// An unregistered template is [`PageError::UnknownTemplate`]; a
	/// registered template without a constructor yields `None`.
	pub fn fields_for(&self, page: &Page) -> PageResult<Option<Box<dyn TemplateFields>>> {
		let definition = self
			.get(&page.template)
			.ok_or_else(|| PageError::UnknownTemplate(page.template.clone()))?;

		match &definition.constructor {
			Some(constructor) => constructor(page.fields.clone()).map(Some),
			None => Ok(None),
		}
	}

	/// Run the template's validation hook against a page, if one is
	/// registered. Unknown templates are rejected here too, so writes
	/// cannot attach a page to a template that does not exist.
	pub fn validate(&self, page: &Page) -> PageResult<()> {
		let definition = self
			.get(&page.template)
			.ok_or_else(|| PageError::UnknownTemplate(page.template.clone()))?;

		match &definition.validator {
			Some(validator) => validator(page),
			None => Ok(()),
		}
	}
}

impl Default for TemplateRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, Deserialize)]
	struct ContactFields {
		shop_address: String,
	}

	impl TemplateFields for ContactFields {
		fn template_name(&self) -> &str {
			"contact"
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn contact_registry() -> TemplateRegistry {
		let mut registry = TemplateRegistry::new();
		registry.register(
			"Contact",
			TemplateDefinition::new("Contact").with_fields(|value| {
				let fields: ContactFields = serde_json::from_value(value)
					.map_err(|e| PageError::Serialization(e.to_string()))?;
				Ok(Box::new(fields) as Box<dyn TemplateFields>)
			}),
		);
		registry
	}

	#[test]
	fn test_new_registry_has_default_template() {
		let registry = TemplateRegistry::new();
		assert!(registry.get("default").is_some());
		assert!(registry.get("Default").is_some());
	}

	#[test]
	fn test_lookup_is_name_normalized() {
		let registry = contact_registry();
		assert!(registry.get("  CONTACT ").is_some());
		assert!(registry.get("landing").is_none());
	}

	#[test]
	fn test_fields_for_constructs_typed_value() {
		let registry = contact_registry();
		let page = Page::new("Contact Us", "Contact")
			.with_fields(serde_json::json!({ "shop_address": "1 Main St" }));

		let fields = registry.fields_for(&page).unwrap().unwrap();
		let contact = fields.as_any().downcast_ref::<ContactFields>().unwrap();

		assert_eq!(contact.shop_address, "1 Main St");
	}

	#[test]
	fn test_fields_for_unknown_template() {
		let registry = TemplateRegistry::new();
		let page = Page::new("X", "missing");

		let result = registry.fields_for(&page);

		assert!(matches!(result, Err(PageError::UnknownTemplate(_))));
	}

	#[test]
	fn test_validate_runs_hook() {
		let mut registry = TemplateRegistry::new();
		registry.register(
			"strict",
			TemplateDefinition::new("Strict").with_validator(|page| {
				if page.fields.is_null() {
					Err(PageError::Store("fields required".to_string()))
				} else {
					Ok(())
				}
			}),
		);

		let bare = Page::new("X", "strict");
		assert!(registry.validate(&bare).is_err());

		let filled = Page::new("X", "strict").with_fields(serde_json::json!({ "ok": true }));
		assert!(registry.validate(&filled).is_ok());
	}

	#[test]
	fn test_names_sorted() {
		let mut registry = TemplateRegistry::new();
		registry.register("Landing Page", TemplateDefinition::new("Landing Page"));
		registry.register("About", TemplateDefinition::new("About"));

		assert_eq!(registry.names(), vec!["about", "default", "landing-page"]);
	}
}
