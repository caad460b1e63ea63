use super::{deleted, found, storage_error, PgCatalog, Repository};
use crate::error::CatalogError;
use crate::models::{RecipeStep, RecipeStepDraft, Resource};
use crate::schema::recipe_steps;
use diesel::prelude::*;

impl Repository<RecipeStep> for PgCatalog {
    fn create(&self, draft: RecipeStepDraft) -> Result<RecipeStep, CatalogError> {
        let mut conn = self.conn()?;
        diesel::insert_into(recipe_steps::table)
            .values(&draft)
            .returning(RecipeStep::as_returning())
            .get_result(&mut conn)
            .map_err(storage_error("Failed to create recipe step"))
    }

    fn get(&self, id: i32) -> Result<RecipeStep, CatalogError> {
        let mut conn = self.conn()?;
        let step = recipe_steps::table
            .find(id)
            .select(RecipeStep::as_select())
            .first(&mut conn)
            .optional()
            .map_err(storage_error("Failed to fetch recipe step"))?;
        found(step, RecipeStep::LABEL)
    }

    // Not routed over HTTP, kept so the store contract is uniform.
    fn list(&self) -> Result<Vec<RecipeStep>, CatalogError> {
        let mut conn = self.conn()?;
        recipe_steps::table
            .order(recipe_steps::recipe_step_id.asc())
            .select(RecipeStep::as_select())
            .load(&mut conn)
            .map_err(storage_error("Failed to fetch recipe steps"))
    }

    fn update(&self, id: i32, draft: RecipeStepDraft) -> Result<RecipeStep, CatalogError> {
        let mut conn = self.conn()?;
        let step = diesel::update(recipe_steps::table.find(id))
            .set(&draft)
            .returning(RecipeStep::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(storage_error("Failed to update recipe step"))?;
        found(step, RecipeStep::LABEL)
    }

    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(recipe_steps::table.find(id))
            .execute(&mut conn)
            .map_err(storage_error("Failed to delete recipe step"))?;
        deleted(affected, RecipeStep::LABEL)
    }
}
