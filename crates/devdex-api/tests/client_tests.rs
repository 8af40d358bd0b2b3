// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use devdex_api::{CATALOG_PATH, CatalogFetcher, CatalogSource, Client};
use devdex_app::{CatalogError, DeviceId};
use devdex_testkit::{DeviceFaker, catalog_json};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

fn serve(responses: Vec<(u16, String)>) -> Result<(String, thread::JoinHandle<Vec<String>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut accepts = Vec::new();
        for (status, body) in responses {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), CATALOG_PATH);
            let accept = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Accept"))
                .map(|header| header.value.as_str().to_owned())
                .unwrap_or_default();
            accepts.push(accept);
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(json_header());
            request.respond(response).expect("response should succeed");
        }
        accepts
    });
    Ok((addr, handle))
}

#[test]
fn fetch_decodes_catalog_and_sends_accept_header() -> Result<()> {
    let catalog = DeviceFaker::new(1).catalog(12);
    let (addr, handle) = serve(vec![(200, catalog_json(&catalog)?)])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let fetched = client.fetch().map_err(|error| anyhow!("{error}"))?;
    assert_eq!(fetched, catalog);

    let accepts = handle.join().expect("server thread should join");
    assert_eq!(accepts, vec!["application/json".to_owned()]);
    Ok(())
}

#[test]
fn server_error_surfaces_status_code() -> Result<()> {
    let (addr, handle) = serve(vec![(500, "oops".to_owned())])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client.fetch().expect_err("500 should fail");
    assert_eq!(error, CatalogError::Response { status: 500 });
    assert!(error.to_string().contains("500"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_body_is_a_decode_error() -> Result<()> {
    let (addr, handle) = serve(vec![
        (200, "{\"devices\": [".to_owned()),
        (200, "{\"devices\": [{\"id\": 3}]}".to_owned()),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    assert!(matches!(client.fetch(), Err(CatalogError::Decode(_))));
    assert!(matches!(client.fetch(), Err(CatalogError::Decode(_))));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_endpoint_is_a_transport_error() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
    let error = client.fetch().expect_err("nothing listens on port 1");
    assert!(matches!(error, CatalogError::Transport(_)));
    assert!(error.to_string().contains("retry"));
    Ok(())
}

#[test]
fn fetcher_issues_one_request_per_cache_lifetime() -> Result<()> {
    let catalog = DeviceFaker::new(2).catalog(5);
    let body = catalog_json(&catalog)?;
    let (addr, handle) = serve(vec![(200, body.clone()), (200, body)])?;

    let mut fetcher = CatalogFetcher::new(Client::new(&addr, Duration::from_secs(2))?);
    for _ in 0..3 {
        let loaded = fetcher.load().map_err(|error| anyhow!("{error}"))?;
        assert_eq!(loaded.len(), 5);
    }

    let first = &catalog.devices[0];
    let device = fetcher
        .device(&first.id)
        .map_err(|error| anyhow!("{error}"))?;
    assert_eq!(&device, first);
    assert!(
        fetcher
            .device(&DeviceId::from("nope"))
            .expect_err("unknown id")
            .is_not_found()
    );

    fetcher.invalidate();
    fetcher.load().map_err(|error| anyhow!("{error}"))?;

    let accepts = handle.join().expect("server thread should join");
    assert_eq!(accepts.len(), 2);
    Ok(())
}
