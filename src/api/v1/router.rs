use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::UserId;
use crate::logger::debug;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const MAX_JSON_BODY: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(bearer_token())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(bearer_token())
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let me = warp::get()
        .and(warp::path("users"))
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::current_user);

    signup.or(login).or(refresh).or(logout).or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_JSON_BODY).and(warp::body::json())
}

/// The raw token from `Authorization: Bearer <token>`.
fn bearer_token() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(
        |header: Option<String>| async move {
            header
                .as_deref()
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .ok_or_else(|| reject::custom(ApiErrorCode::MissingToken))
        },
    )
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    bearer_token().and_then(move |token: String| {
        let auth_service = auth_service.clone();
        async move {
            let user_id = auth_service
                .authorize(&token)
                .await
                .map_err(|e| {
                    if e.is_token_error() {
                        debug!(error = %e, "bearer token rejected");
                    }
                    ApiErrorCode::from(e)
                })
                .map_err(reject::custom)?;
            Ok::<_, warp::Rejection>(user_id)
        }
    })
}
