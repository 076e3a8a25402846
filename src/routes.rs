/// Route wiring shared by the binary and the integration tests.
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web;

use crate::config::CorsConfig;
use crate::handlers;
use crate::middleware::BearerAuthMiddleware;
use crate::AppState;

/// Registers the health probe and the authenticated `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig, state: AppState) {
    let auth = BearerAuthMiddleware::new(state.codec.clone(), state.users.clone());

    cfg.app_data(web::Data::new(state))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api/v1")
                .wrap(auth)
                .route(
                    "/users/authenticate",
                    web::post().to(handlers::users::authenticate),
                )
                .service(
                    web::resource("/users")
                        .route(web::post().to(handlers::users::sign_up))
                        .route(web::get().to(handlers::users::get_users)),
                )
                .route(
                    "/users/{username}/posts",
                    web::get().to(handlers::users::get_user_posts),
                )
                .service(
                    web::resource("/users/{username}")
                        .route(web::get().to(handlers::users::get_user))
                        .route(web::patch().to(handlers::users::update_user)),
                )
                .service(
                    web::resource("/posts")
                        .route(web::get().to(handlers::posts::get_posts))
                        .route(web::post().to(handlers::posts::create_post)),
                )
                .service(
                    web::resource("/posts/{post_id}")
                        .route(web::get().to(handlers::posts::get_post))
                        .route(web::patch().to(handlers::posts::update_post))
                        .route(web::delete().to(handlers::posts::delete_post)),
                ),
        );
}

/// Browser policy: explicit origins, the four verbs the API serves, and the
/// Authorization header.
pub fn cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_header(header::AUTHORIZATION)
        .max_age(3600);

    for origin in config.origins() {
        cors = cors.allowed_origin(&origin);
    }

    cors
}
