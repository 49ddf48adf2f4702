use std::sync::Arc;

use framework::{AppRouter, Context, CtxSchema, FieldType, Shape};
use models::product::ProductInput;
use serde_json::json;
use service::errors::ServiceError;
use service::product::ProductService;

pub fn product_body_schema() -> CtxSchema {
    CtxSchema::new().body(
        Shape::new()
            .field("name", FieldType::String)
            .field("detail", FieldType::String)
            .field("price", FieldType::Number)
            .field("quantity", FieldType::Integer),
    )
}

fn list_query_schema() -> CtxSchema {
    CtxSchema::new().query(Shape::new().optional("search", FieldType::String))
}

pub fn router(service: Arc<ProductService>) -> AppRouter {
    let list_svc = Arc::clone(&service);
    let create_svc = Arc::clone(&service);
    let get_svc = Arc::clone(&service);
    let update_svc = Arc::clone(&service);
    let delete_svc = service;

    AppRouter::new()
        .get_with("/products", list_query_schema(), move |ctx: Arc<Context>| {
            let svc = Arc::clone(&list_svc);
            async move {
                let search = ctx.query.get("search").map(String::as_str);
                let products = svc.list_products(search).await?;
                if products.is_empty() {
                    ctx.response(404, json!([]));
                    return Ok(None);
                }
                ctx.response(200, serde_json::to_value(products)?);
                Ok(None)
            }
        })
        .post_with("/products", product_body_schema(), move |ctx: Arc<Context>| {
            let svc = Arc::clone(&create_svc);
            async move {
                let input: ProductInput = serde_json::from_value(ctx.body.clone())?;
                match svc.create_product(input).await {
                    Ok(product) => {
                        ctx.set_status(201);
                        Ok(Some(serde_json::to_value(product)?))
                    }
                    Err(ServiceError::Model(e)) => {
                        ctx.response(400, json!({ "message": e.to_string() }));
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
        .get("/products/:id", move |ctx: Arc<Context>| {
            let svc = Arc::clone(&get_svc);
            async move {
                let id = ctx.params.get("id").cloned().unwrap_or_default();
                match svc.get_product(&id).await {
                    Ok(product) => Ok(Some(serde_json::to_value(product)?)),
                    Err(ServiceError::NotFound(_)) => {
                        ctx.response(404, json!({}));
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
        .put_with("/products/:id", product_body_schema(), move |ctx: Arc<Context>| {
            let svc = Arc::clone(&update_svc);
            async move {
                let id = ctx.params.get("id").cloned().unwrap_or_default();
                let input: ProductInput = serde_json::from_value(ctx.body.clone())?;
                match svc.update_product(&id, input).await {
                    Ok(product) => Ok(Some(serde_json::to_value(product)?)),
                    Err(ServiceError::NotFound(_)) => {
                        ctx.response(404, json!({}));
                        Ok(None)
                    }
                    Err(ServiceError::Model(e)) => {
                        ctx.response(400, json!({ "message": e.to_string() }));
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
        .delete("/products/:id", move |ctx: Arc<Context>| {
            let svc = Arc::clone(&delete_svc);
            async move {
                let id = ctx.params.get("id").cloned().unwrap_or_default();
                match svc.delete_product(&id).await {
                    Ok(product) => Ok(Some(serde_json::to_value(product)?)),
                    Err(ServiceError::NotFound(_)) => {
                        ctx.response(404, json!({}));
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
}
