use crate::{error::Error, RequestData, ResponseData, StubServer};
use hyper::{
    body,
    header::{HeaderName, HeaderValue},
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::mpsc, thread};
use tokio::runtime::Runtime;

/// Spawn the server thread and wait until it is bound to an OS-assigned port.
pub(crate) fn start() -> Result<SocketAddr, Error> {
    let (sender, receiver) = mpsc::channel::<Result<SocketAddr, Error>>();

    thread::Builder::new()
        .name(String::from("stub-server"))
        .spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = sender.send(Err(e.into()));
                    return;
                }
            };

            runtime.block_on(async move {
                let addr = SocketAddr::from(([127, 0, 0, 1], 0));

                let builder = match Server::try_bind(&addr) {
                    Ok(builder) => builder,
                    Err(e) => {
                        let _ = sender.send(Err(e.into()));
                        return;
                    }
                };

                let server = builder.serve(make_service_fn(|_| async {
                    Ok::<_, Infallible>(service_fn(|req| async move {
                        match handle_request(req).await {
                            Ok(response) => Ok(response),
                            Err(err) => {
                                StubServer::with_instance(|server| server.record_error(err));
                                Ok::<Response<Body>, Infallible>(internal_error())
                            }
                        }
                    }))
                }));

                let _ = sender.send(Ok(server.local_addr()));

                if let Err(e) = server.await {
                    eprintln!("Stub server error: {}", e);
                }
            });
        })?;

    receiver.recv().map_err(|_| {
        Error::ServerStartFailed(String::from("the server thread exited before binding"))
    })?
}

async fn handle_request(mut request: Request<Body>) -> Result<Response<Body>, Error> {
    let request_data = read_request_data(&mut request).await?;
    let response_data =
        StubServer::with_instance(|server| server.handle_request(request_data))?;

    into_response(response_data)
}

async fn read_request_data(request: &mut Request<Body>) -> Result<RequestData, Error> {
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    // header values with opaque characters are skipped
    let headers = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect::<HashMap<_, _>>();

    let body = body::to_bytes(request.body_mut())
        .await
        .map_err(|_| Error::InvalidBody)?;

    Ok(RequestData {
        method,
        uri,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}

fn into_response(response_data: ResponseData) -> Result<Response<Body>, Error> {
    let mut response_builder = Response::builder().status(response_data.status_code);

    if let Some(header_map) = response_builder.headers_mut() {
        for (key, value) in &response_data.headers {
            header_map.append(
                HeaderName::from_lowercase(key.to_lowercase().as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
    }

    Ok(response_builder.body(response_data.body.into())?)
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
