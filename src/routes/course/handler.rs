use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use super::model::CourseForm;
use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::{AdminId, UserId},
    models::{CourseChanges, CourseImage, NewCourse},
    store::StoreError,
};

fn course_not_found() -> AppError {
    AppError::NotFound("Course not found".into())
}

/// 非法 id 与不存在的课程同样返回 404
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| course_not_found())
}

/// 清理媒体托管上的旧图片，失败只记录日志
async fn discard_image(state: &AppState, public_id: &str) {
    if let Err(e) = state.media.destroy(public_id).await {
        tracing::warn!("failed to remove image {}: {}", public_id, e);
    }
}

#[axum::debug_handler]
pub async fn create_course(
    Extension(AdminId(admin_id)): Extension<AdminId>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = CourseForm::read(multipart).await?;
    let details = form.details()?;
    let image = form.required_image()?;

    let image = CourseImage::from(state.media.upload(image).await?);

    let course = match state
        .store
        .insert_course(NewCourse {
            title: details.title,
            description: details.description,
            price: details.price,
            image: image.clone(),
            creator_id: admin_id,
        })
        .await
    {
        Ok(course) => course,
        Err(e) => {
            discard_image(&state, &image.public_id).await;
            return Err(e.into());
        }
    };

    tracing::info!("admin {} created course {}", admin_id, course.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Course created successfully", "course": course })),
    ))
}

#[axum::debug_handler]
pub async fn update_course(
    Extension(AdminId(admin_id)): Extension<AdminId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let mut form = CourseForm::read(multipart).await?;
    let details = form.details()?;
    let image = form.optional_image()?;

    // 先确认归属，避免为别人的课程上传图片；最终以带 creator 过滤的更新为准
    let existing = state
        .store
        .find_course(id)
        .await?
        .filter(|c| c.creator_id == admin_id)
        .ok_or_else(course_not_found)?;

    let new_image = match image {
        Some(image) => Some(CourseImage::from(state.media.upload(image).await?)),
        None => None,
    };

    let changes = CourseChanges {
        title: details.title,
        description: details.description,
        price: details.price,
        image: new_image.clone(),
    };
    let updated = state
        .store
        .update_owned_course(id, admin_id, changes)
        .await;

    let course = match updated {
        Ok(Some(course)) => course,
        other => {
            if let Some(image) = &new_image {
                discard_image(&state, &image.public_id).await;
            }
            return Err(match other {
                Err(e) => e.into(),
                Ok(_) => course_not_found(),
            });
        }
    };

    if new_image.is_some() && existing.image.public_id != course.image.public_id {
        discard_image(&state, &existing.image.public_id).await;
    }

    tracing::info!("admin {} updated course {}", admin_id, course.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Course updated successfully", "course": course })),
    ))
}

#[axum::debug_handler]
pub async fn delete_course(
    Extension(AdminId(admin_id)): Extension<AdminId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let course = state
        .store
        .delete_owned_course(id, admin_id)
        .await?
        .ok_or_else(course_not_found)?;

    discard_image(&state, &course.image.public_id).await;

    tracing::info!("admin {} deleted course {}", admin_id, course.id);
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Course deleted successfully" })),
    ))
}

#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let courses = state.store.list_courses().await?;
    Ok((StatusCode::CREATED, Json(json!({ "courses": courses }))))
}

#[axum::debug_handler]
pub async fn course_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let course = state
        .store
        .find_course(id)
        .await?
        .ok_or_else(course_not_found)?;
    Ok(Json(json!({ "course": course })))
}

#[axum::debug_handler]
pub async fn buy_course(
    Extension(UserId(user_id)): Extension<UserId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    if state.store.find_course(id).await?.is_none() {
        return Err(course_not_found());
    }

    let purchase = state
        .store
        .insert_purchase(user_id, id)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => AppError::Conflict("Course already purchased".into()),
            other => other.into(),
        })?;

    tracing::info!("user {} purchased course {}", user_id, id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Course purchased successfully", "purchase": purchase })),
    ))
}
