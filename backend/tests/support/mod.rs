//! Fake S3-compatible object store for integration tests.
//!
//! Serves `ListObjectsV2`, `HEAD`, and `GET` for a single export per bucket
//! and counts body downloads so caching behaviour can be asserted.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::Value;

/// One stored export.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub etag: String,
    pub last_modified: String,
    pub body: Value,
}

/// Shared contents of the fake store, keyed by bucket.
#[derive(Debug, Default)]
pub struct FakeStore {
    buckets: Mutex<HashMap<String, Vec<StoredObject>>>,
    downloads: AtomicUsize,
}

impl FakeStore {
    pub fn put(&self, bucket: &str, object: StoredObject) {
        let mut buckets = self.buckets.lock().expect("store lock");
        let objects = buckets.entry(bucket.to_owned()).or_default();
        objects.retain(|existing| existing.key != object.key);
        objects.push(object);
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn list(&self, bucket: &str) -> Vec<StoredObject> {
        self.buckets
            .lock()
            .expect("store lock")
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }

    fn find(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.list(bucket).into_iter().find(|object| object.key == key)
    }
}

fn listing_xml(bucket: &str, objects: &[StoredObject]) -> String {
    let contents: String = objects
        .iter()
        .map(|object| {
            format!(
                "<Contents><Key>{}</Key><ETag>&quot;{}&quot;</ETag></Contents>",
                object.key, object.etag
            )
        })
        .collect();
    let count = objects.len();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{bucket}</Name><KeyCount>{count}</KeyCount>\
         <IsTruncated>false</IsTruncated>{contents}</ListBucketResult>"
    )
}

fn percent_decode(raw: &str) -> String {
    url::form_urlencoded::parse(format!("k={}", raw.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

async fn serve_object(request: HttpRequest, store: web::Data<FakeStore>) -> HttpResponse {
    let path = request.path().trim_start_matches('/');
    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    let key = percent_decode(key);

    if key.is_empty() {
        let objects = store.list(bucket);
        if objects.is_empty() && !request.query_string().contains("list-type=2") {
            return HttpResponse::NotFound().finish();
        }
        return HttpResponse::Ok()
            .content_type("application/xml")
            .body(listing_xml(bucket, &objects));
    }

    let Some(object) = store.find(bucket, &key) else {
        return HttpResponse::NotFound().body("<Error><Code>NoSuchKey</Code></Error>");
    };
    let mut response = HttpResponse::Ok();
    response
        .insert_header((header::ETAG, format!("\"{}\"", object.etag)))
        .insert_header((header::LAST_MODIFIED, object.last_modified.clone()));
    if request.method() == Method::HEAD {
        return response.finish();
    }
    store.downloads.fetch_add(1, Ordering::SeqCst);
    response.json(object.body)
}

/// Running fake store.
pub struct FakeObjectStore {
    pub endpoint: url::Url,
    pub store: web::Data<FakeStore>,
    handle: ServerHandle,
}

impl FakeObjectStore {
    /// Start the store on an ephemeral port inside the current actix system.
    pub fn start() -> Self {
        let store = web::Data::new(FakeStore::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake store");
        let addr = listener.local_addr().expect("local addr");
        let app_store = store.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_store.clone())
                .default_service(web::to(serve_object))
        })
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            endpoint: url::Url::parse(&format!("http://{addr}/")).expect("endpoint url"),
            store,
            handle,
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
