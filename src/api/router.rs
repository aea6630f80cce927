//! HTTP router.
//!
//! Returns a composable `Router` mounted under `/api/v1`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Cache-Control header → 2. Auth validator (protected only) → 3. Audit logger

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::entities::{self, Resource};
use crate::api::endpoints::{auth, lookups, payments, users};
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::auth::AuthService;
use crate::db::{
    BuildingColumn, ConsultCategoryColumn, DepartmentColumn, DepartmentRelation, MedicineColumn,
    MedicineRelation, PatientColumn, PatientRelation, PrescriptionColumn, PrescriptionRelation,
    Store, TreatmentColumn,
};
use crate::models::*;

pub const API_PREFIX: &str = "/api/v1";

/// Build the API router over a store and an auth service.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(store: Store, auth: AuthService) -> Router {
    build_router(ApiContext::new(store, auth))
}

/// CRUD routes for one entity under `/<plural>`.
fn resource<T: Resource>(router: Router<ApiContext>, plural: &str) -> Router<ApiContext> {
    router
        .route(&format!("/{plural}/all"), get(entities::list::<T>))
        .route(&format!("/{plural}"), post(entities::create::<T>))
        .route(
            &format!("/{plural}/:id"),
            get(entities::detail::<T>)
                .put(entities::update::<T>)
                .delete(entities::delete::<T>),
        )
}

/// `GET /<plural>/<field>?<field>=` over one text column of `T`.
fn lookup<T: Resource>(
    router: Router<ApiContext>,
    plural: &str,
    field: &'static str,
    column: T::Column,
    include: &'static [T::Relation],
) -> Router<ApiContext> {
    router.route(
        &format!("/{plural}/{field}"),
        get(
            move |State(ctx): State<ApiContext>,
                  Query(params): Query<HashMap<String, String>>| {
                lookups::find_one::<T>(ctx, params, field, column, include)
            },
        ),
    )
}

/// `GET /<plural>/user/:user_id` over the owning-user column of `T`.
fn owned<T: Resource>(
    router: Router<ApiContext>,
    plural: &str,
    column: T::Column,
    include: &'static [T::Relation],
) -> Router<ApiContext> {
    router.route(
        &format!("/{plural}/user/:user_id"),
        get(
            move |State(ctx): State<ApiContext>, Path(user_id): Path<String>| {
                lookups::owned_by::<T>(ctx, user_id, column, include)
            },
        ),
    )
}

fn build_router(ctx: ApiContext) -> Router {
    let mut protected = Router::new()
        .route("/users", post(users::create))
        .route("/users/all", get(entities::list::<ApplicationUser>))
        .route("/users/email", get(users::by_email))
        .route(
            "/users/:id",
            get(entities::detail::<ApplicationUser>).put(users::update),
        )
        .route(
            "/expenses/payment-status",
            put(payments::update_status::<Expense>),
        )
        .route(
            "/consultations/payment-status",
            put(payments::update_status::<Consultation>),
        )
        .route(
            "/test-results/payment-status",
            put(payments::update_status::<TestResult>),
        )
        .route(
            "/prescriptions/payment-status",
            put(payments::update_status::<Prescription>),
        );

    protected = resource::<Building>(protected, "buildings");
    protected = resource::<Floor>(protected, "floors");
    protected = resource::<Department>(protected, "departments");
    protected = resource::<Specialization>(protected, "specializations");
    protected = resource::<Designation>(protected, "designations");
    protected = resource::<DoctorDetails>(protected, "doctors");
    protected = resource::<PatientDetails>(protected, "patients");
    protected = resource::<ConsultCategory>(protected, "consult-categories");
    protected = resource::<Consultation>(protected, "consultations");
    protected = resource::<Treatment>(protected, "treatments");
    protected = resource::<TestCategory>(protected, "test-categories");
    protected = resource::<Prescription>(protected, "prescriptions");
    protected = resource::<TestResult>(protected, "test-results");
    protected = resource::<Vendor>(protected, "vendors");
    protected = resource::<Medicine>(protected, "medicines");
    protected = resource::<Vaccine>(protected, "vaccines");
    protected = resource::<VaccineAppointment>(protected, "vaccine-appointments");
    protected = resource::<Expense>(protected, "expenses");

    protected = lookup::<Building>(protected, "buildings", "name", BuildingColumn::Name, &[]);
    protected = lookup::<Building>(protected, "buildings", "code", BuildingColumn::Code, &[]);
    protected = lookup::<Department>(
        protected,
        "departments",
        "name",
        DepartmentColumn::Name,
        &[DepartmentRelation::Floor],
    );
    protected = lookup::<ConsultCategory>(
        protected,
        "consult-categories",
        "name",
        ConsultCategoryColumn::Name,
        &[],
    );
    protected = lookup::<Medicine>(
        protected,
        "medicines",
        "name",
        MedicineColumn::Name,
        &[MedicineRelation::Vendor],
    );
    protected = lookup::<Treatment>(protected, "treatments", "name", TreatmentColumn::Name, &[]);
    protected = owned::<PatientDetails>(
        protected,
        "patients",
        PatientColumn::UserId,
        &[PatientRelation::User],
    );
    protected = owned::<Prescription>(
        protected,
        "prescriptions",
        PrescriptionColumn::UserId,
        &[
            PrescriptionRelation::User,
            PrescriptionRelation::Treatment,
            PrescriptionRelation::Test,
        ],
    );

    // Layers are applied from bottom (innermost) to top (outermost).
    let protected = protected
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/assign-role", post(auth::assign_role))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest(API_PREFIX, protected)
        .nest(API_PREFIX, unprotected)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
