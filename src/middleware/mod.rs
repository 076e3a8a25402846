/// HTTP middleware
///
/// Bearer-token authentication for the `/api/v1` scope. The middleware runs
/// before any business handler: it extracts the token, verifies it, resolves
/// the subject to a live user and attaches that identity to the request
/// extensions. Every failure short-circuits with the structured 401 envelope;
/// the route handler is never invoked.
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::security::TokenCodec;

/// Resolved identity stored in request extensions after authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated.into()),
        )
    }
}

/// Routes reachable without a token: sign-up and credential exchange.
fn is_public(req: &ServiceRequest) -> bool {
    req.method() == Method::POST
        && matches!(req.path(), "/api/v1/users" | "/api/v1/users/authenticate")
}

pub struct BearerAuthMiddleware {
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
}

impl BearerAuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>, users: Arc<dyn UserRepository>) -> Self {
        Self { codec, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddlewareService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            users: self.users.clone(),
        }))
    }
}

pub struct BearerAuthMiddlewareService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddlewareService<S>
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

        // Public routes proceed with an empty identity.
        if is_public(&req) {
            return Box::pin(async move { service.call(req).await });
        }

        // At most one resolution per request; a second pass is a no-op.
        if req.extensions().get::<AuthenticatedUser>().is_some() {
            return Box::pin(async move { service.call(req).await });
        }

        let codec = self.codec.clone();
        let users = self.users.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or(AppError::Unauthenticated)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(AppError::Unauthenticated)?;

            // Verification failures keep their kind (invalid vs expired) so
            // the envelope reports what actually went wrong.
            let subject = codec.verify(token).map_err(|e| {
                tracing::warn!(path = %req.path(), "token rejected: {}", e);
                e
            })?;

            // A token naming a deleted or unknown user is a 401, not a 500.
            let user = users
                .find_by_username(&subject)
                .await?
                .ok_or(AppError::Unauthenticated)?;

            req.extensions_mut().insert(AuthenticatedUser(user));

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::Result as AppResult;
    use crate::models::NewUser;

    /// Single-user directory that counts lookups.
    struct SingleUserRepo {
        user: User,
        lookups: AtomicUsize,
    }

    impl SingleUserRepo {
        fn with_username(username: &str) -> Arc<Self> {
            Arc::new(Self {
                user: User {
                    user_id: 1,
                    username: username.to_string(),
                    password: "hash".to_string(),
                    profile: None,
                    description: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    deleted_at: None,
                },
                lookups: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl UserRepository for SingleUserRepo {
        async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((username == self.user.username).then(|| self.user.clone()))
        }

        async fn find_all(&self) -> AppResult<Vec<User>> {
            Ok(vec![self.user.clone()])
        }

        async fn find_by_username_containing(&self, _fragment: &str) -> AppResult<Vec<User>> {
            Ok(vec![self.user.clone()])
        }

        async fn create(&self, _user: &NewUser) -> AppResult<User> {
            unimplemented!("not used by middleware tests")
        }

        async fn update(&self, user: &User) -> AppResult<User> {
            Ok(user.clone())
        }

        async fn soft_delete(&self, _user: &User) -> AppResult<()> {
            Ok(())
        }
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.0.username)
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(b"middleware-test-signing-key-32b!", 3600))
    }

    #[actix_web::test]
    async fn valid_token_resolves_identity() {
        let users = SingleUserRepo::with_username("admin");
        let codec = codec();
        let token = codec.issue("admin").unwrap();

        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec, users.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "admin");
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let users = SingleUserRepo::with_username("admin");
        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec(), users.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        // Rejected before identity resolution.
        assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let users = SingleUserRepo::with_username("admin");
        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec(), users))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Basic YWRtaW46YWRtaW4="))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn expired_token_is_unauthorized() {
        let users = SingleUserRepo::with_username("admin");
        let codec = codec();
        let expired = TokenCodec::new(b"middleware-test-signing-key-32b!", -3600)
            .issue("admin")
            .unwrap();

        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec, users))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", expired)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn token_for_unknown_user_is_unauthorized() {
        let users = SingleUserRepo::with_username("admin");
        let codec = codec();
        let token = codec.issue("ghost").unwrap();

        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec, users))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn stacked_middleware_resolves_identity_once() {
        let users = SingleUserRepo::with_username("admin");
        let codec = codec();
        let token = codec.issue("admin").unwrap();

        let app = test::init_service(
            App::new()
                .wrap(BearerAuthMiddleware::new(codec.clone(), users.clone()))
                .wrap(BearerAuthMiddleware::new(codec, users.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(users.lookups.load(Ordering::SeqCst), 1);
    }
}
