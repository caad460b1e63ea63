use crate::error::CatalogError;
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A catalog row type together with the request body that creates or
/// replaces it.
pub trait Resource: Serialize + Send + 'static {
    type Draft: Draft;

    /// Human-readable name used in error messages ("Recipe not found").
    const LABEL: &'static str;
}

/// Request body for create and full-replacement update.
pub trait Draft: DeserializeOwned + Send + 'static {
    /// Rejects drafts the database would accept but the catalog should not.
    fn validate(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ingredient {
    pub ingredient_id: i32,
    pub ingredient_name: String,
    pub ingredient_description: Option<String>,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct IngredientDraft {
    pub ingredient_name: String,
    #[serde(default)]
    pub ingredient_description: Option<String>,
}

impl Resource for Ingredient {
    type Draft = IngredientDraft;
    const LABEL: &'static str = "Ingredient";
}

impl Draft for IngredientDraft {
    fn validate(&self) -> Result<(), CatalogError> {
        require_text("ingredient_name", &self.ingredient_name)
    }
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub recipe_id: i32,
    pub recipe_name: String,
    pub recipe_description: Option<String>,
    /// Minutes
    pub cook_time: Option<i32>,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeDraft {
    pub recipe_name: String,
    #[serde(default)]
    pub recipe_description: Option<String>,
    #[serde(default)]
    pub cook_time: Option<i32>,
}

impl Resource for Recipe {
    type Draft = RecipeDraft;
    const LABEL: &'static str = "Recipe";
}

impl Draft for RecipeDraft {
    fn validate(&self) -> Result<(), CatalogError> {
        require_text("recipe_name", &self.recipe_name)
    }
}

// Link between a recipe and one of its ingredients. The same pair may
// appear more than once.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: i32,
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub quantity: f64,
    pub measurement: Option<String>,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeIngredientDraft {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub quantity: f64,
    #[serde(default)]
    pub measurement: Option<String>,
}

impl Resource for RecipeIngredient {
    type Draft = RecipeIngredientDraft;
    const LABEL: &'static str = "Recipe ingredient";
}

impl Draft for RecipeIngredientDraft {}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipe_steps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeStep {
    pub recipe_step_id: i32,
    pub recipe_id: i32,
    /// Ordering key within the recipe; neither unique nor contiguous.
    pub step_number: i32,
    pub step_description: String,
}

#[derive(Insertable, AsChangeset, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::recipe_steps)]
pub struct RecipeStepDraft {
    pub recipe_id: i32,
    pub step_number: i32,
    pub step_description: String,
}

impl Resource for RecipeStep {
    type Draft = RecipeStepDraft;
    const LABEL: &'static str = "Recipe step";
}

impl Draft for RecipeStepDraft {
    fn validate(&self) -> Result<(), CatalogError> {
        require_text("step_description", &self.step_description)
    }
}
