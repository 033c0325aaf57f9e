use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use sweetshop_shared::UserRole;
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::jwt::{Claims, JwtService};

/// Shopper or admin identity extracted from a validated access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        if claims.role == UserRole::Partner {
            return Err(AppError::Forbidden(
                "Partner sessions cannot use customer endpoints".to_string(),
            ));
        }

        Ok(Self {
            user_id: claims.subject_id()?,
            name: claims.name.clone(),
            role: claims.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with `Forbidden` unless the caller is an admin or superadmin
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                sweetshop_shared::ERROR_ADMIN_REQUIRED.to_string(),
            ))
        }
    }

    pub fn require_superadmin(&self) -> Result<(), AppError> {
        if self.role == UserRole::Superadmin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                sweetshop_shared::ERROR_SUPERADMIN_REQUIRED.to_string(),
            ))
        }
    }
}

/// Delivery partner identity extracted from a partner session token
#[derive(Debug, Clone)]
pub struct AuthenticatedPartner {
    pub partner_id: Uuid,
    pub name: String,
}

impl AuthenticatedPartner {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        if claims.role != UserRole::Partner {
            return Err(AppError::Forbidden("Not a partner session".to_string()));
        }

        Ok(Self {
            partner_id: claims.subject_id()?,
            name: claims.name.clone(),
        })
    }
}

fn session_claims(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Authentication("Authorization token is required".to_string()))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(session_claims(req).and_then(|claims| AuthenticatedUser::from_claims(&claims)))
    }
}

impl FromRequest for AuthenticatedPartner {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(session_claims(req).and_then(|claims| AuthenticatedPartner::from_claims(&claims)))
    }
}

/// Validates bearer tokens and attaches their claims to the request.
///
/// Requests without an `Authorization` header pass through untouched; the
/// extractors above reject them on protected routes.
pub struct AuthMiddleware {
    jwt_service: Rc<JwtService>,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            jwt_service: Rc::new(jwt_service),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: Rc<JwtService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get("Authorization")
                .map(|h| {
                    h.to_str()
                        .ok()
                        .and_then(|h| h.strip_prefix("Bearer "))
                        .map(str::to_string)
                });

            match header {
                None => {}
                Some(Some(token)) => match jwt_service.validate_token(&token) {
                    Ok(claims) => {
                        req.extensions_mut().insert(claims);
                    }
                    Err(e) => {
                        tracing::debug!("Rejected bearer token: {}", e);
                        let response = e.error_response();
                        return Ok(req.into_response(response).map_into_right_body());
                    }
                },
                Some(None) => {
                    let response = AppError::Authentication(
                        "Malformed Authorization header".to_string(),
                    )
                    .error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
