//! Request logging middleware
//!
//! 为每个请求生成 UUID 注入 tracing span，并在结束时记录状态码和耗时。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// 请求 ID，可从 request extensions 中取出
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

#[derive(Clone, Default)]
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let start = Instant::now();

        let request_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(RequestId(request_id.clone()));

        // cron 路径里带着 token，不写进日志
        let path = if req.path().starts_with("/cron/") {
            "/cron/***".to_string()
        } else {
            req.path().to_string()
        };
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %path,
        );

        Box::pin(
            async move {
                let result = srv.call(req).await;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                match result {
                    Ok(mut response) => {
                        let status = response.status();
                        if status.is_server_error() {
                            warn!(status = status.as_u16(), elapsed_ms, "request failed");
                        } else {
                            info!(status = status.as_u16(), elapsed_ms, "request completed");
                        }
                        if let Ok(value) = HeaderValue::from_str(&request_id) {
                            response
                                .headers_mut()
                                .insert(HeaderName::from_static("x-request-id"), value);
                        }
                        Ok(response)
                    }
                    Err(e) => {
                        warn!(elapsed_ms, "request errored: {}", e);
                        Err(e)
                    }
                }
            }
            .instrument(span),
        )
    }
}
