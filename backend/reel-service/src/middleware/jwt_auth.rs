/// JWT authentication middleware for Bearer token validation.
/// Extracts the user ID from token claims and adds it to request extensions.
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::error::AppError;
use crate::security::tokens::TokenManager;

/// Authenticated user ID extracted from the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

/// JWT authentication middleware factory
pub struct JwtAuth {
    tokens: TokenManager,
}

impl JwtAuth {
    pub fn new(tokens: TokenManager) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthService<S> {
    service: Rc<S>,
    tokens: TokenManager,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            // Read headers before touching extensions_mut so no RefCell
            // borrow is still live when we insert.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => {
                        return Err(
                            AppError::Unauthorized("Invalid Authorization header".into()).into()
                        );
                    }
                },
                None => {
                    return Err(
                        AppError::Unauthorized("Missing Authorization header".into()).into()
                    );
                }
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Err(AppError::Unauthorized(
                        "Invalid Authorization scheme, expected Bearer".into(),
                    )
                    .into());
                }
            };

            let user_id = match tokens.verify(token) {
                Ok(id) => id,
                Err(e) => {
                    tracing::debug!("token validation failed: {}", e);
                    return Err(
                        AppError::Unauthorized("Invalid or expired token".into()).into()
                    );
                }
            };

            req.extensions_mut().insert(UserId(user_id));

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => ready(Err(AppError::Unauthorized(
                "User ID missing in request extensions".into(),
            )
            .into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    fn test_manager() -> TokenManager {
        TokenManager::new("test-secret".to_string(), 24)
    }

    async fn echo_user(user_id: UserId) -> actix_web::Result<HttpResponse> {
        Ok(HttpResponse::Ok().body(user_id.0.to_string()))
    }

    #[actix_web::test]
    async fn test_valid_token_allows_access() {
        let tokens = test_manager();
        let app = test::init_service(
            App::new()
                .wrap(JwtAuth::new(tokens.clone()))
                .route("/me", web::get().to(echo_user)),
        )
        .await;

        let token = tokens.issue(123).unwrap();
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body = test::read_body(resp).await;
        assert_eq!(body, "123");
    }

    #[actix_web::test]
    async fn test_missing_header_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuth::new(test_manager()))
                .route("/me", web::get().to(echo_user)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::try_call_service(&app, req).await;
        let err = resp.expect_err("anonymous request should be rejected");
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_expired_token_rejected() {
        let issuer = TokenManager::new("test-secret".to_string(), -1);
        let app = test::init_service(
            App::new()
                .wrap(JwtAuth::new(test_manager()))
                .route("/me", web::get().to(echo_user)),
        )
        .await;

        let token = issuer.issue(123).unwrap();
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::try_call_service(&app, req).await;
        let err = resp.expect_err("expired token should be rejected");
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuth::new(test_manager()))
                .route("/me", web::get().to(echo_user)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();

        let resp = test::try_call_service(&app, req).await;
        let err = resp.expect_err("basic auth should be rejected");
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
