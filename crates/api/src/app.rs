use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_auth, require_group, require_group_admin,
    require_system_admin, security_headers_middleware, trace_id,
};
use crate::routes::{admin, auth, foods, fridge, groups, health, meal_plans, recipes, shopping, users};
use crate::services::{AuthService, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub email: EmailService,
}

impl AppState {
    /// Builds an AuthService over this state's pool and configuration.
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.pool.clone(), &self.config.jwt, self.email.clone())
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let email = EmailService::new(config.email.clone());

    let state = AppState {
        pool,
        config: config.clone(),
        email,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/api/user", post(auth::register))
        .route("/api/user/login", post(auth::login))
        .route("/api/user/refresh-token", post(auth::refresh_token))
        .route(
            "/api/user/send-verification-code",
            post(auth::send_verification_code),
        )
        .route("/api/user/verify-email", post(auth::verify_email))
        .route("/api/health", get(health::health_check))
        .route("/metrics", get(metrics_handler));

    // Authenticated routes with no group requirement
    let account_routes = Router::new()
        .route(
            "/api/user",
            get(users::get_profile)
                .put(users::update_profile)
                .delete(users::delete_account),
        )
        .route("/api/user/logout", post(auth::logout))
        .route("/api/user/change-password", post(users::change_password))
        .route(
            "/api/user/group",
            post(groups::create_group).get(groups::get_group_members),
        )
        .route("/api/user/group/leave", post(groups::leave_group))
        .route("/api/food/categories", get(foods::get_categories))
        .route("/api/food/units", get(foods::get_units))
        .route("/api/admin/category", get(admin::get_categories))
        .route("/api/admin/unit", get(admin::get_units))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Group-scoped routes: authenticate, then require membership
    let member_routes = Router::new()
        .route(
            "/api/food",
            get(foods::get_foods)
                .post(foods::create_food)
                .put(foods::update_food)
                .delete(foods::delete_food),
        )
        .route(
            "/api/fridge",
            get(fridge::get_fridge_items)
                .post(fridge::create_fridge_item)
                .put(fridge::update_fridge_item)
                .delete(fridge::delete_fridge_item),
        )
        .route("/api/fridge/:id", get(fridge::get_fridge_item))
        .route(
            "/api/shopping/list",
            get(shopping::get_shopping_lists).post(shopping::create_shopping_list),
        )
        .route("/api/shopping/task/:listId", get(shopping::get_tasks))
        .route("/api/meal-plan", get(meal_plans::get_meal_plans))
        .route(
            "/api/recipe",
            get(recipes::get_recipes)
                .post(recipes::create_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        // Membership gate runs after auth
        .route_layer(middleware::from_fn(require_group))
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Group-admin routes: authenticate, then the admin gate alone (it
    // implies membership; the plain membership gate is not stacked on top)
    let group_admin_routes = Router::new()
        .route("/api/user/group/add", post(groups::add_member))
        .route("/api/user/group", delete(groups::remove_member))
        .route("/api/user/group/delete", delete(groups::delete_group))
        .route("/api/shopping/list", delete(shopping::delete_shopping_list))
        .route(
            "/api/shopping/task",
            post(shopping::create_task)
                .put(shopping::update_task)
                .delete(shopping::delete_task),
        )
        .route(
            "/api/meal-plan",
            post(meal_plans::create_meal_plan)
                .put(meal_plans::update_meal_plan)
                .delete(meal_plans::delete_meal_plan),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_group_admin,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // System-admin routes
    let system_admin_routes = Router::new()
        .route(
            "/api/admin/category",
            post(admin::create_category)
                .put(admin::edit_category)
                .delete(admin::delete_category),
        )
        .route(
            "/api/admin/unit",
            post(admin::create_unit)
                .put(admin::edit_unit)
                .delete(admin::delete_unit),
        )
        .route("/api/admin/logs", get(admin::get_logs))
        .route("/api/admin/users", get(admin::get_all_users))
        .route(
            "/api/admin/users/:id",
            get(admin::get_user_by_id).delete(admin::delete_user_by_admin),
        )
        .route("/api/admin/users/:id/role", put(admin::update_user_role))
        .route("/api/admin/stats", get(admin::get_stats))
        .route_layer(middleware::from_fn(require_system_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(member_routes)
        .merge(group_admin_routes)
        .merge(system_admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
