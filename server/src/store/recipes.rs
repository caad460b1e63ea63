use super::{deleted, found, storage_error, PgCatalog, Repository};
use crate::error::CatalogError;
use crate::models::{Recipe, RecipeDraft, Resource};
use crate::schema::recipes;
use diesel::prelude::*;

impl Repository<Recipe> for PgCatalog {
    fn create(&self, draft: RecipeDraft) -> Result<Recipe, CatalogError> {
        let mut conn = self.conn()?;
        diesel::insert_into(recipes::table)
            .values(&draft)
            .returning(Recipe::as_returning())
            .get_result(&mut conn)
            .map_err(storage_error("Failed to create recipe"))
    }

    fn get(&self, id: i32) -> Result<Recipe, CatalogError> {
        let mut conn = self.conn()?;
        let recipe = recipes::table
            .find(id)
            .select(Recipe::as_select())
            .first(&mut conn)
            .optional()
            .map_err(storage_error("Failed to fetch recipe"))?;
        found(recipe, Recipe::LABEL)
    }

    fn list(&self) -> Result<Vec<Recipe>, CatalogError> {
        let mut conn = self.conn()?;
        recipes::table
            .order(recipes::recipe_id.asc())
            .select(Recipe::as_select())
            .load(&mut conn)
            .map_err(storage_error("Failed to fetch recipes"))
    }

    // Existence is decided by the UPDATE itself, so a concurrent delete
    // between check and write cannot slip through.
    fn update(&self, id: i32, draft: RecipeDraft) -> Result<Recipe, CatalogError> {
        let mut conn = self.conn()?;
        let recipe = diesel::update(recipes::table.find(id))
            .set(&draft)
            .returning(Recipe::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(storage_error("Failed to update recipe"))?;
        found(recipe, Recipe::LABEL)
    }

    /// Links and steps of the recipe are removed by `ON DELETE CASCADE`.
    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(recipes::table.find(id))
            .execute(&mut conn)
            .map_err(storage_error("Failed to delete recipe"))?;
        deleted(affected, Recipe::LABEL)
    }
}
