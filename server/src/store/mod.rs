//! Persistence for the four catalog resources.
//!
//! Every repository follows the same contract:
//! - `update` and `delete` are single statements; zero affected rows means
//!   the id does not exist and is reported as `NotFound`.
//! - `update` replaces every field; optional fields absent from the draft
//!   are stored as NULL.
//! - `list` returns rows in id order, which is insertion order.

#[cfg(test)]
pub mod memory;

mod ingredients;
mod recipe_ingredients;
mod recipe_steps;
mod recipes;

use crate::db::DbPool;
use crate::error::{CatalogError, TIMED_OUT};
use crate::models::{Ingredient, Recipe, RecipeIngredient, RecipeStep, Resource};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;

pub trait Repository<R: Resource>: Send + Sync {
    fn create(&self, draft: R::Draft) -> Result<R, CatalogError>;
    fn get(&self, id: i32) -> Result<R, CatalogError>;
    fn list(&self) -> Result<Vec<R>, CatalogError>;
    fn update(&self, id: i32, draft: R::Draft) -> Result<R, CatalogError>;
    fn delete(&self, id: i32) -> Result<(), CatalogError>;
}

/// One store serving every resource. Handlers hold it as `Arc<dyn Catalog>`.
pub trait Catalog:
    Repository<Ingredient> + Repository<Recipe> + Repository<RecipeIngredient> + Repository<RecipeStep>
{
}

impl<T> Catalog for T where
    T: Repository<Ingredient>
        + Repository<Recipe>
        + Repository<RecipeIngredient>
        + Repository<RecipeStep>
{
}

pub struct PgCatalog {
    pool: DbPool,
}

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        PgCatalog { pool }
    }

    fn conn(&self) -> Result<PgPooled, CatalogError> {
        self.pool
            .get()
            .map_err(|e| CatalogError::storage("Database connection failed", e))
    }
}

/// Map a diesel failure to the storage error for `context`.
///
/// Constraint violations get their own wording so the log says why the
/// statement was refused. A statement cancelled by `statement_timeout` was
/// rolled back and is reported as a timeout.
fn storage_error(context: &str) -> impl FnOnce(DieselError) -> CatalogError + '_ {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            CatalogError::storage(
                context,
                format!("foreign key constraint violated: {}", info.message()),
            )
        }
        DieselError::DatabaseError(_, info) if info.message().contains("statement timeout") => {
            CatalogError::storage(TIMED_OUT, format!("{}: {}", context, info.message()))
        }
        other => CatalogError::storage(context, other),
    }
}

// Zero-row outcomes are the only way absence is detected.
fn found<T>(row: Option<T>, label: &'static str) -> Result<T, CatalogError> {
    row.ok_or(CatalogError::NotFound(label))
}

fn deleted(affected: usize, label: &'static str) -> Result<(), CatalogError> {
    if affected == 0 {
        Err(CatalogError::NotFound(label))
    } else {
        Ok(())
    }
}
