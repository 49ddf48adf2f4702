use std::sync::Arc;

use framework::{AppRouter, Context, CtxSchema, FieldType, Shape};
use serde_json::json;
use service::errors::ServiceError;
use service::user::UserService;

fn user_params_schema() -> CtxSchema {
    CtxSchema::new().params(Shape::new().field("id", FieldType::String))
}

pub fn router(service: Arc<UserService>) -> AppRouter {
    AppRouter::new().get_with("/users/:id", user_params_schema(), move |ctx: Arc<Context>| {
        let svc = Arc::clone(&service);
        async move {
            let id = ctx.params.get("id").cloned().unwrap_or_default();
            match svc.get_user(&id).await {
                Ok(user) => Ok(Some(serde_json::to_value(user)?)),
                Err(ServiceError::NotFound(_)) => {
                    ctx.response(404, json!({ "message": "user not found" }));
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        }
    })
}
