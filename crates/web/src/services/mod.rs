//! Business logic services.
//!
//! - `session` - token sync, refresh and sign-out for the cookie session
//! - `auth` - password sign-in, sign-up and reset
//! - `pantry` - create/rename/update/delete across the hierarchy
//! - `dashboard` - counts, recent activity, items per location
//! - `recipes` - ingredient-based recipe search

pub mod auth;
pub mod dashboard;
pub mod pantry;
pub mod recipes;
pub mod session;

pub use auth::{AuthError, AuthService, Credentials, SignUp};
pub use dashboard::{Dashboard, DashboardService, ItemsPerLocation};
pub use pantry::{BulkDeleteFailure, BulkDeleteReport, PantryService, Rename, SyncError};
pub use recipes::{RecipeError, RecipeService, RecipeSource, RecipeSummary, SpoonacularClient};
pub use session::{SessionBridge, SessionError, TokenRefresher};
