//! In-process catalog for handler tests.
//!
//! Mirrors what the PostgreSQL schema enforces: serial ids starting at 1,
//! foreign keys on links and steps, and cascading deletes.

use super::Repository;
use crate::error::{CatalogError, TIMED_OUT};
use crate::models::{
    Ingredient, IngredientDraft, Recipe, RecipeDraft, RecipeIngredient, RecipeIngredientDraft,
    RecipeStep, RecipeStepDraft, Resource,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryCatalog {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
}

impl MemoryCatalog {
    /// Number of repository operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> MutexGuard<'_, Tables> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tables.lock().unwrap()
    }
}

#[derive(Default)]
struct Tables {
    ingredients: Table<Ingredient>,
    recipes: Table<Recipe>,
    recipe_ingredients: Table<RecipeIngredient>,
    recipe_steps: Table<RecipeStep>,
}

struct Table<R> {
    next_id: i32,
    rows: BTreeMap<i32, R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Table {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

trait MemoryRow: Resource + Clone {
    fn table(tables: &mut Tables) -> &mut Table<Self>;

    fn build(id: i32, draft: Self::Draft) -> Self;

    fn check_references(_tables: &Tables, _draft: &Self::Draft) -> Result<(), String> {
        Ok(())
    }

    fn cascade(_tables: &mut Tables, _id: i32) {}
}

fn context(verb: &str, label: &str) -> String {
    format!("Failed to {} {}", verb, label.to_lowercase())
}

impl<R: MemoryRow> Repository<R> for MemoryCatalog {
    fn create(&self, draft: R::Draft) -> Result<R, CatalogError> {
        let mut tables = self.begin();
        R::check_references(&tables, &draft)
            .map_err(|detail| CatalogError::storage(context("create", R::LABEL), detail))?;

        let table = R::table(&mut tables);
        let id = table.next_id;
        table.next_id += 1;
        let row = R::build(id, draft);
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    fn get(&self, id: i32) -> Result<R, CatalogError> {
        let mut tables = self.begin();
        R::table(&mut tables)
            .rows
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(R::LABEL))
    }

    fn list(&self) -> Result<Vec<R>, CatalogError> {
        let mut tables = self.begin();
        Ok(R::table(&mut tables).rows.values().cloned().collect())
    }

    fn update(&self, id: i32, draft: R::Draft) -> Result<R, CatalogError> {
        let mut tables = self.begin();
        if !R::table(&mut tables).rows.contains_key(&id) {
            return Err(CatalogError::NotFound(R::LABEL));
        }
        R::check_references(&tables, &draft)
            .map_err(|detail| CatalogError::storage(context("update", R::LABEL), detail))?;

        let row = R::build(id, draft);
        R::table(&mut tables).rows.insert(id, row.clone());
        Ok(row)
    }

    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut tables = self.begin();
        if R::table(&mut tables).rows.remove(&id).is_none() {
            return Err(CatalogError::NotFound(R::LABEL));
        }
        R::cascade(&mut tables, id);
        Ok(())
    }
}

impl MemoryRow for Ingredient {
    fn table(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.ingredients
    }

    fn build(id: i32, draft: IngredientDraft) -> Self {
        Ingredient {
            ingredient_id: id,
            ingredient_name: draft.ingredient_name,
            ingredient_description: draft.ingredient_description,
        }
    }

    fn cascade(tables: &mut Tables, id: i32) {
        tables
            .recipe_ingredients
            .rows
            .retain(|_, link| link.ingredient_id != id);
    }
}

impl MemoryRow for Recipe {
    fn table(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.recipes
    }

    fn build(id: i32, draft: RecipeDraft) -> Self {
        Recipe {
            recipe_id: id,
            recipe_name: draft.recipe_name,
            recipe_description: draft.recipe_description,
            cook_time: draft.cook_time,
        }
    }

    fn cascade(tables: &mut Tables, id: i32) {
        tables
            .recipe_ingredients
            .rows
            .retain(|_, link| link.recipe_id != id);
        tables.recipe_steps.rows.retain(|_, step| step.recipe_id != id);
    }
}

impl MemoryRow for RecipeIngredient {
    fn table(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.recipe_ingredients
    }

    fn build(id: i32, draft: RecipeIngredientDraft) -> Self {
        RecipeIngredient {
            recipe_ingredient_id: id,
            recipe_id: draft.recipe_id,
            ingredient_id: draft.ingredient_id,
            quantity: draft.quantity,
            measurement: draft.measurement,
        }
    }

    fn check_references(tables: &Tables, draft: &RecipeIngredientDraft) -> Result<(), String> {
        if !tables.recipes.rows.contains_key(&draft.recipe_id) {
            return Err(format!("recipe {} does not exist", draft.recipe_id));
        }
        if !tables.ingredients.rows.contains_key(&draft.ingredient_id) {
            return Err(format!("ingredient {} does not exist", draft.ingredient_id));
        }
        Ok(())
    }
}

impl MemoryRow for RecipeStep {
    fn table(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.recipe_steps
    }

    fn build(id: i32, draft: RecipeStepDraft) -> Self {
        RecipeStep {
            recipe_step_id: id,
            recipe_id: draft.recipe_id,
            step_number: draft.step_number,
            step_description: draft.step_description,
        }
    }

    fn check_references(tables: &Tables, draft: &RecipeStepDraft) -> Result<(), String> {
        if !tables.recipes.rows.contains_key(&draft.recipe_id) {
            return Err(format!("recipe {} does not exist", draft.recipe_id));
        }
        Ok(())
    }
}

/// A `MemoryCatalog` behind a slow link with a statement limit, acting the
/// way Postgres does under `statement_timeout`: a statement that would run
/// past the limit is cancelled and changes nothing.
pub struct SlowCatalog {
    pub inner: Arc<MemoryCatalog>,
    pub latency: Duration,
    pub statement_limit: Duration,
}

impl SlowCatalog {
    fn run<T>(&self, op: impl FnOnce() -> Result<T, CatalogError>) -> Result<T, CatalogError> {
        if self.latency > self.statement_limit {
            std::thread::sleep(self.statement_limit);
            return Err(CatalogError::storage(
                TIMED_OUT,
                "canceling statement due to statement timeout",
            ));
        }
        std::thread::sleep(self.latency);
        op()
    }
}

impl<R: MemoryRow> Repository<R> for SlowCatalog {
    fn create(&self, draft: R::Draft) -> Result<R, CatalogError> {
        self.run(|| Repository::<R>::create(&*self.inner, draft))
    }

    fn get(&self, id: i32) -> Result<R, CatalogError> {
        self.run(|| Repository::<R>::get(&*self.inner, id))
    }

    fn list(&self) -> Result<Vec<R>, CatalogError> {
        self.run(|| Repository::<R>::list(&*self.inner))
    }

    fn update(&self, id: i32, draft: R::Draft) -> Result<R, CatalogError> {
        self.run(|| Repository::<R>::update(&*self.inner, id, draft))
    }

    fn delete(&self, id: i32) -> Result<(), CatalogError> {
        self.run(|| Repository::<R>::delete(&*self.inner, id))
    }
}

/// A catalog whose every call blocks longer than any sane request timeout.
pub struct StalledCatalog {
    pub delay: Duration,
}

impl<R: Resource> Repository<R> for StalledCatalog {
    fn create(&self, _draft: R::Draft) -> Result<R, CatalogError> {
        std::thread::sleep(self.delay);
        Err(CatalogError::storage("stalled", "gave up"))
    }

    fn get(&self, _id: i32) -> Result<R, CatalogError> {
        std::thread::sleep(self.delay);
        Err(CatalogError::NotFound(R::LABEL))
    }

    fn list(&self) -> Result<Vec<R>, CatalogError> {
        std::thread::sleep(self.delay);
        Ok(Vec::new())
    }

    fn update(&self, _id: i32, _draft: R::Draft) -> Result<R, CatalogError> {
        std::thread::sleep(self.delay);
        Err(CatalogError::NotFound(R::LABEL))
    }

    fn delete(&self, _id: i32) -> Result<(), CatalogError> {
        std::thread::sleep(self.delay);
        Ok(())
    }
}
