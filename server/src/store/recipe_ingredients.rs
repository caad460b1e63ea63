use super::{deleted, found, storage_error, PgCatalog, Repository};
use crate::error::CatalogError;
use crate::models::{RecipeIngredient, RecipeIngredientDraft, Resource};
use crate::schema::recipe_ingredients;
use diesel::prelude::*;

// recipe_id / ingredient_id are not checked here; the foreign keys reject
// dangling references and that surfaces as a storage error.
impl Repository<RecipeIngredient> for PgCatalog {
    fn create(&self, draft: RecipeIngredientDraft) -> Result<RecipeIngredient, CatalogError> {
        let mut conn = self.conn()?;
        diesel::insert_into(recipe_ingredients::table)
            .values(&draft)
            .returning(RecipeIngredient::as_returning())
            .get_result(&mut conn)
            .map_err(storage_error("Failed to create recipe ingredient"))
    }

    fn get(&self, id: i32) -> Result<RecipeIngredient, CatalogError> {
        let mut conn = self.conn()?;
        let link = recipe_ingredients::table
            .find(id)
            .select(RecipeIngredient::as_select())
            .first(&mut conn)
            .optional()
            .map_err(storage_error("Failed to fetch recipe ingredient"))?;
        found(link, RecipeIngredient::LABEL)
    }

    fn list(&self) -> Result<Vec<RecipeIngredient>, CatalogError> {
        let mut conn = self.conn()?;
        recipe_ingredients::table
            .order(recipe_ingredients::recipe_ingredient_id.asc())
            .select(RecipeIngredient::as_select())
            .load(&mut conn)
            .map_err(storage_error("Failed to fetch recipe ingredients"))
    }

    fn update(
        &self,
        id: i32,
        draft: RecipeIngredientDraft,
    ) -> Result<RecipeIngredient, CatalogError> {
        let mut conn = self.conn()?;
        let link = diesel::update(recipe_ingredients::table.find(id))
            .set(&draft)
            .returning(RecipeIngredient::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(storage_error("Failed to update recipe ingredient"))?;
        found(link, RecipeIngredient::LABEL)
    }

    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(recipe_ingredients::table.find(id))
            .execute(&mut conn)
            .map_err(storage_error("Failed to delete recipe ingredient"))?;
        deleted(affected, RecipeIngredient::LABEL)
    }
}
