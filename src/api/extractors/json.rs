use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render through `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
