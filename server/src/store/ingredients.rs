use super::{deleted, found, storage_error, PgCatalog, Repository};
use crate::error::CatalogError;
use crate::models::{Ingredient, IngredientDraft, Resource};
use crate::schema::ingredients;
use diesel::prelude::*;

const LABEL: &str = Ingredient::LABEL;

impl Repository<Ingredient> for PgCatalog {
    fn create(&self, draft: IngredientDraft) -> Result<Ingredient, CatalogError> {
        let mut conn = self.conn()?;
        diesel::insert_into(ingredients::table)
            .values(&draft)
            .returning(Ingredient::as_returning())
            .get_result(&mut conn)
            .map_err(storage_error("Failed to create ingredient"))
    }

    fn get(&self, id: i32) -> Result<Ingredient, CatalogError> {
        let mut conn = self.conn()?;
        let row = ingredients::table
            .find(id)
            .select(Ingredient::as_select())
            .first(&mut conn)
            .optional()
            .map_err(storage_error("Failed to fetch ingredient"))?;
        found(row, LABEL)
    }

    fn list(&self) -> Result<Vec<Ingredient>, CatalogError> {
        let mut conn = self.conn()?;
        ingredients::table
            .order(ingredients::ingredient_id.asc())
            .select(Ingredient::as_select())
            .load(&mut conn)
            .map_err(storage_error("Failed to fetch ingredients"))
    }

    fn update(&self, id: i32, draft: IngredientDraft) -> Result<Ingredient, CatalogError> {
        let mut conn = self.conn()?;
        let row = diesel::update(ingredients::table.find(id))
            .set(&draft)
            .returning(Ingredient::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(storage_error("Failed to update ingredient"))?;
        found(row, LABEL)
    }

    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(ingredients::table.find(id))
            .execute(&mut conn)
            .map_err(storage_error("Failed to delete ingredient"))?;
        deleted(affected, LABEL)
    }
}
