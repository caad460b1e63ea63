pub mod crud;

use crate::config::CORS_ALLOWED_ORIGINS;
use crate::models::{Ingredient, Recipe, RecipeIngredient, RecipeStep, Resource};
use crate::store::{Catalog, Repository};
use crate::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::routing::MethodRouter;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// What a resource exposes over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::List,
        Operation::Get,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn method(self) -> Method {
        match self {
            Operation::Create => Method::POST,
            Operation::List | Operation::Get => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Collection operations live on `/things`, the rest on `/things/{id}`.
    fn on_collection(self) -> bool {
        matches!(self, Operation::Create | Operation::List)
    }
}

/// Builds the router while recording which methods it serves, so the CORS
/// policy can never drift from what is actually routed.
pub struct RouteTable {
    router: Router<AppState>,
    methods: Vec<Method>,
}

impl RouteTable {
    pub fn new() -> Self {
        RouteTable {
            router: Router::new(),
            methods: Vec::new(),
        }
    }

    pub fn mount<R>(mut self, path: &str, operations: &[Operation]) -> Self
    where
        R: Resource,
        dyn Catalog: Repository<R>,
    {
        let mut collection: MethodRouter<AppState> = MethodRouter::new();
        let mut item: MethodRouter<AppState> = MethodRouter::new();

        for &operation in operations {
            match operation {
                Operation::Create => collection = collection.post(crud::create::<R>),
                Operation::List => collection = collection.get(crud::list::<R>),
                Operation::Get => item = item.get(crud::get::<R>),
                Operation::Update => item = item.put(crud::update::<R>),
                Operation::Delete => item = item.delete(crud::delete::<R>),
            }

            let method = operation.method();
            if !self.methods.contains(&method) {
                self.methods.push(method);
            }
        }

        if operations.iter().any(|op| op.on_collection()) {
            self.router = self.router.route(path, collection);
        }
        if operations.iter().any(|op| !op.on_collection()) {
            self.router = self.router.route(&format!("{}/{{id}}", path), item);
        }

        self
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn into_router(self) -> Router<AppState> {
        let cors = cors_layer(&self.methods);
        self.router.layer(cors)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

fn cors_layer(methods: &[Method]) -> CorsLayer {
    let origins: Vec<HeaderValue> = CORS_ALLOWED_ORIGINS
        .iter()
        .map(|&origin| HeaderValue::from_static(origin))
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods.to_vec())
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn route_table() -> RouteTable {
    use Operation::*;

    RouteTable::new()
        .mount::<Ingredient>("/ingredients", &Operation::ALL)
        .mount::<Recipe>("/recipes", &Operation::ALL)
        .mount::<RecipeIngredient>("/recipe-ingredients", &Operation::ALL)
        // Steps are only reachable one at a time.
        .mount::<RecipeStep>("/recipe-steps", &[Create, Get, Update, Delete])
}
