//! SeaORM-based school repository
//!
//! Every user-supplied value goes through the query builder's parameter
//! binding; limit/offset are bound as integers, never interpolated into
//! SQL text.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

use crate::entities::{prelude::Schools, schools};
use crate::errors::{AppError, AppResult};
use crate::models::{School, SchoolFields};

/// Detect whether a database error corresponds to the unique index on
/// `email_id`. A string probe over the formatted error avoids depending on
/// driver-specific error variant shapes across SQLite/Postgres/MySQL.
fn is_email_unique_violation(err: &DbErr) -> bool {
    let m = err.to_string().to_lowercase();
    (m.contains("unique") || m.contains("duplicate")) && m.contains("email")
}

/// SeaORM-based repository for school records
#[derive(Clone)]
pub struct SchoolRepository {
    connection: Arc<DatabaseConnection>,
}

impl SchoolRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Insert a new school row. A storage-level unique violation on the
    /// email column is surfaced as a conflict, which makes the constraint
    /// the authoritative duplicate guard even under concurrent creates.
    pub async fn create(&self, fields: &SchoolFields, image_url: &str) -> AppResult<School> {
        let now = chrono::Utc::now();

        let active_model = schools::ActiveModel {
            name: Set(fields.name.clone()),
            address: Set(fields.address.clone()),
            city: Set(fields.city.clone()),
            state: Set(fields.state.clone()),
            contact: Set(fields.contact.clone()),
            image: Set(image_url.to_string()),
            email_id: Set(fields.email_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&*self.connection)
            .await
            .map_err(|e| {
                if is_email_unique_violation(&e) {
                    AppError::conflict("A school with this email already exists")
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(Self::model_to_domain(model))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<School>> {
        let model = Schools::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Self::model_to_domain))
    }

    /// Exact match on the normalized email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<School>> {
        let model = Schools::find()
            .filter(schools::Column::EmailId.eq(email))
            .one(&*self.connection)
            .await?;
        Ok(model.map(Self::model_to_domain))
    }

    /// Overwrite all mutable scalar fields plus the resolved image URL,
    /// refreshing `updated_at`. `created_at` is never touched.
    pub async fn update(
        &self,
        id: i32,
        fields: &SchoolFields,
        image_url: &str,
    ) -> AppResult<School> {
        let model = Schools::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("School", id))?;

        let mut active_model: schools::ActiveModel = model.into();
        active_model.name = Set(fields.name.clone());
        active_model.address = Set(fields.address.clone());
        active_model.city = Set(fields.city.clone());
        active_model.state = Set(fields.state.clone());
        active_model.contact = Set(fields.contact.clone());
        active_model.image = Set(image_url.to_string());
        active_model.email_id = Set(fields.email_id.clone());
        active_model.updated_at = Set(chrono::Utc::now());

        let updated = active_model.update(&*self.connection).await.map_err(|e| {
            if is_email_unique_violation(&e) {
                AppError::conflict("A school with this email already exists")
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(Self::model_to_domain(updated))
    }

    /// Delete a school row. Returns `false` when no row matched.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = Schools::delete_by_id(id).exec(&*self.connection).await?;
        Ok(result.rows_affected > 0)
    }

    /// Paginated listing, newest first, with optional case-insensitive
    /// substring search across name, city, and state. Returns the page of
    /// rows plus the total count of rows matching the filter.
    pub async fn list(
        &self,
        search: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<School>, u64)> {
        let mut query = Schools::find();

        if let Some(term) = search {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(schools::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(schools::Column::City)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(schools::Column::State))).like(pattern),
                    ),
            );
        }

        let total = query.clone().count(&*self.connection).await?;

        let models = query
            .order_by_desc(schools::Column::CreatedAt)
            .order_by_desc(schools::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&*self.connection)
            .await?;

        Ok((
            models.into_iter().map(Self::model_to_domain).collect(),
            total,
        ))
    }

    fn model_to_domain(model: schools::Model) -> School {
        School {
            id: model.id,
            name: model.name,
            address: model.address,
            city: model.city,
            state: model.state,
            contact: model.contact,
            image: model.image,
            email_id: model.email_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
