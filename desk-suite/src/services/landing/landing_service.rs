use anyhow::Result;
use async_trait::async_trait;
use desk_core::query::Page;
use desk_core::{ActorContext, ResourceService};
use desk_schema::SchemaErrors;
use serde_json::{Map, Value};

use crate::services::adapters::ScopedCrudService;
use crate::services::{SuiteParams, SuiteState};

use super::landing_shared;
use super::variants;

/// Landing pages: scoped CRUD plus section handling.
///
/// Section lists are validated against the variant registry at write
/// time; `get` returns fully-merged sections so the page component
/// never sees partial props.
pub struct LandingService {
    crud: ScopedCrudService,
}

impl LandingService {
    pub fn new(state: &SuiteState) -> Self {
        Self {
            crud: ScopedCrudService::new(state, &landing_shared::DESCRIPTOR),
        }
    }

    fn validate(data: &Value) -> Result<()> {
        let mut errors = SchemaErrors::default();

        for field in ["title", "slug"] {
            let present = data
                .get(field)
                .and_then(|v| v.as_str())
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !present {
                errors.push_field(field, "is required");
            }
        }

        match data.get("sections") {
            None | Some(Value::Null) => {}
            Some(Value::Array(sections)) => {
                for (i, section) in sections.iter().enumerate() {
                    Self::validate_section(&mut errors, i, section);
                }
            }
            Some(_) => errors.push_field("sections", "must be a list"),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into_unprocessable_anyhow("Landing page validation failed"))
        }
    }

    fn validate_section(errors: &mut SchemaErrors, index: usize, section: &Value) {
        let field = |name: &str| format!("sections[{index}].{name}");

        let Some(obj) = section.as_object() else {
            errors.push_field(&format!("sections[{index}]"), "must be an object");
            return;
        };

        let kind = obj.get("kind").and_then(|v| v.as_str()).unwrap_or("");
        let variant = obj.get("variant").and_then(|v| v.as_str()).unwrap_or("");

        if kind.is_empty() {
            errors.push_field(&field("kind"), "is required");
        }
        if variant.is_empty() {
            errors.push_field(&field("variant"), "is required");
        }

        if !kind.is_empty()
            && !variant.is_empty()
            && variants::variant_defaults(kind, variant).is_none()
        {
            errors.push_field(
                &field("variant"),
                format!("unknown section variant: {kind}/{variant}"),
            );
        }

        if let Some(props) = obj.get("props") {
            if !props.is_object() && !props.is_null() {
                errors.push_field(&field("props"), "must be an object");
            }
        }
    }

    /// Merge every stored section's props over its variant defaults.
    fn resolve_sections(mut record: Value) -> Value {
        let Some(sections) = record.get_mut("sections").and_then(|v| v.as_array_mut()) else {
            return record;
        };

        for section in sections.iter_mut() {
            let Some(obj) = section.as_object() else {
                continue;
            };

            let kind = obj.get("kind").and_then(|v| v.as_str()).unwrap_or("");
            let variant = obj.get("variant").and_then(|v| v.as_str()).unwrap_or("");

            if let Some(merged) = variants::merge_props(kind, variant, obj.get("props")) {
                let mut out = Map::new();
                out.insert("kind".to_string(), Value::String(kind.to_string()));
                out.insert("variant".to_string(), Value::String(variant.to_string()));
                out.insert("props".to_string(), merged);
                *section = Value::Object(out);
            }
        }

        record
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for LandingService {
    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        self.crud._find(ctx, &params).await
    }

    async fn get(&self, ctx: &ActorContext, id: &str, _params: SuiteParams) -> Result<Value> {
        let record = self.crud._get(ctx, id).await?;
        Ok(Self::resolve_sections(record))
    }

    async fn create(&self, ctx: &ActorContext, data: Value, _params: SuiteParams) -> Result<Value> {
        Self::validate(&data)?;
        self.crud._create(ctx, data).await
    }

    async fn update(
        &self,
        ctx: &ActorContext,
        id: &str,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        Self::validate(&data)?;
        self.crud._update(ctx, id, data).await
    }

    async fn patch(
        &self,
        ctx: &ActorContext,
        id: Option<&str>,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        if let Some(sections) = data.get("sections") {
            let mut errors = SchemaErrors::default();
            match sections {
                Value::Array(list) => {
                    for (i, section) in list.iter().enumerate() {
                        Self::validate_section(&mut errors, i, section);
                    }
                }
                Value::Null => {}
                _ => errors.push_field("sections", "must be a list"),
            }
            if !errors.is_empty() {
                return Err(errors.into_unprocessable_anyhow("Landing page validation failed"));
            }
        }

        self.crud._patch(ctx, id, data).await
    }

    async fn remove(&self, ctx: &ActorContext, id: Option<&str>, _params: SuiteParams) -> Result<Value> {
        self.crud._remove(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_variants_are_rejected_with_indexed_fields() {
        let err = LandingService::validate(&json!({
            "title": "Home",
            "slug": "home",
            "sections": [
                {"kind": "hero", "variant": "centered"},
                {"kind": "hero", "variant": "spiral"}
            ]
        }))
        .unwrap_err();

        let desk = desk_core::errors::DeskError::from_anyhow(&err).unwrap();
        let errors = desk.errors.as_ref().unwrap();
        assert!(errors.get("sections[1].variant").is_some());
        assert!(errors.get("sections[0].variant").is_none());
    }

    #[test]
    fn resolve_merges_stored_props_over_defaults() {
        let record = json!({
            "id": "landing:1",
            "sections": [
                {"kind": "hero", "variant": "centered", "props": {"headline": "Welcome"}}
            ]
        });

        let resolved = LandingService::resolve_sections(record);
        let props = &resolved["sections"][0]["props"];
        assert_eq!(props["headline"], "Welcome");
        assert_eq!(props["cta_href"], "/signup");
    }
}
