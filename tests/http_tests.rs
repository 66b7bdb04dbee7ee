use actix_web::{
    body::to_bytes,
    http::{header, StatusCode},
    test, web, App,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use job_board::api::job::{handlers::not_found, JobService};
use job_board::api::validation;
use job_board::db::job_repository::JobRepository;
use job_board::db::memory::InMemoryJobRepository;
use job_board::db::models::NewJob;
use job_board::routes;
use job_board::storage::LogoStore;

type Service = web::Data<JobService<InMemoryJobRepository>>;

/// Build the real app around an in-memory store
macro_rules! init_app {
    ($service:expr, $logos:expr) => {
        test::init_service(
            App::new()
                .app_data($service.clone())
                .app_data(web::Data::new($logos.clone()))
                .app_data(validation::query_config())
                .app_data(validation::form_config(1024 * 1024))
                .configure(routes::<InMemoryJobRepository>)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn job(slug: &str, title: &str, location_type: &str, approved: bool) -> NewJob {
    NewJob {
        slug: slug.into(),
        title: title.into(),
        job_type: "Full-time".into(),
        location_type: location_type.into(),
        location: (location_type != "Remote").then(|| "Berlin".to_string()),
        description: Some("Line one\nLine two".into()),
        salary: 90000,
        company_name: "Acme".into(),
        application_email: Some("jobs@acme.com".into()),
        application_url: None,
        company_logo_url: None,
        approved,
    }
}

fn service_with(jobs: &[NewJob]) -> Service {
    let repo = InMemoryJobRepository::new();
    for (i, job) in jobs.iter().enumerate() {
        repo.insert_at(job, base_time() + Duration::hours(i as i64)).unwrap();
    }
    web::Data::new(JobService::new(repo))
}

fn logo_store() -> (LogoStore, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "job-board-http-{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    (LogoStore::new(&dir), dir)
}

async fn body_string(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const BOUNDARY: &str = "----jobboardtestboundary";

fn multipart(fields: &[(&str, &str)], logo: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = logo {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"company_logo\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn posting(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut fields = vec![
        ("title", "Engineer"),
        ("job_type", "Full-time"),
        ("company_name", "Acme"),
        ("location_type", "Remote"),
        ("location", ""),
        ("application_email", "jobs@acme.com"),
        ("application_url", ""),
        ("description", ""),
        ("salary", "120000"),
    ];
    for &(key, value) in extra {
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => field.1 = value,
            None => fields.push((key, value)),
        }
    }
    fields
}

#[actix_web::test]
async fn listing_shows_approved_jobs_newest_first() {
    let service = service_with(&[
        job("acme-old", "Old Role", "Remote", true),
        job("acme-hidden", "Hidden Role", "Remote", false),
        job("acme-new", "New Role", "On-site", true),
    ]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;

    assert!(!body.contains("Hidden Role"));
    let new_at = body.find("New Role").unwrap();
    let old_at = body.find("Old Role").unwrap();
    assert!(new_at < old_at);
    assert!(body.contains("All developer jobs"));
}

#[actix_web::test]
async fn listing_applies_remote_and_search_filters() {
    let service = service_with(&[
        job("acme-remote-rust", "Rust Engineer", "Remote", true),
        job("acme-onsite-rust", "Rust Developer", "On-site", true),
        job("acme-remote-go", "Go Engineer", "Remote", true),
    ]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::get().uri("/?q=rust&remote=true").to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains("Rust Engineer"));
    assert!(!body.contains("Rust Developer"));
    assert!(!body.contains("Go Engineer"));

    let req = test::TestRequest::get().uri("/?q=%20%20&type=&location=").to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    for title in ["Rust Engineer", "Rust Developer", "Go Engineer"] {
        assert!(body.contains(title), "{} missing", title);
    }

    let req = test::TestRequest::get().uri("/?type=Contract").to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains("No jobs found. Try adjusting your search filters."));
}

#[actix_web::test]
async fn repeated_query_parameter_is_rejected() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::get().uri("/?q=a&q=b").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn filter_form_redirects_to_bookmarkable_listing() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::post()
        .uri("/filter")
        .set_form([("q", "  senior rust "), ("type", ""), ("location", "Berlin"), ("remote", "on")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/?q=senior+rust&location=Berlin&remote=true"
    );

    let req = test::TestRequest::post()
        .uri("/filter")
        .set_form([("q", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[actix_web::test]
async fn detail_page_resolution() {
    let mut no_contact = job("acme-ghost", "Ghost", "Remote", true);
    no_contact.application_email = None;
    let service = service_with(&[
        job("acme-engineer", "Engineer", "Remote", true),
        job("acme-draft", "Draft", "Remote", false),
        no_contact,
    ]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::get().uri("/jobs/acme-engineer").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("mailto:jobs@acme.com"));
    assert!(body.contains("<title>Engineer | Flow Jobs</title>"));

    // unapproved jobs stay reachable by slug
    let req = test::TestRequest::get().uri("/jobs/acme-draft").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for uri in ["/jobs/acme-ghost", "/jobs/does-not-exist", "/no/such/page"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(body_string(resp).await.contains("Not Found"));
    }
}

#[actix_web::test]
async fn posting_a_job_stores_it_unapproved() {
    let service = service_with(&[]);
    let (logos, dir) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::post()
        .uri("/jobs/new")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(&posting(&[]), Some(("acme.png", "image/png", b"\x89PNG\r\n"))))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/job-submitted");

    let stored = service.repository().find_by_slug("acme-engineer").await.unwrap().unwrap();
    assert!(!stored.approved);
    assert_eq!(stored.salary, 120000);
    assert_eq!(stored.location, None);
    let logo_url = stored.company_logo_url.unwrap();
    assert!(logo_url.starts_with("/uploads/logos/"));

    let resp = test::call_service(&app, test::TestRequest::get().uri(&logo_url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");

    // still hidden from the listing until moderated
    let body = body_string(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
    assert!(!body.contains("acme-engineer"));
    service.repository().set_approved("acme-engineer", true);
    let body = body_string(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
    assert!(body.contains("/jobs/acme-engineer"));

    // same company and title again collides on the slug
    let req = test::TestRequest::post()
        .uri("/jobs/new")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(&posting(&[]), Some(("other.png", "image/png", b"\x89PNG\r\n"))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(service.repository().len(), 1);
    // the rejected posting's logo is not left behind
    assert_eq!(logos.count().unwrap(), 1);

    let _ = std::fs::remove_dir_all(dir);
}

fn post_job(fields: &[(&str, &str)]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/jobs/new")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(fields, None))
}

#[actix_web::test]
async fn non_ascii_postings_get_distinct_reachable_slugs() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let first = posting(&[("company_name", "株式会社"), ("title", "エンジニア")]);
    let second = posting(&[("company_name", "東京"), ("title", "デザイナー")]);
    for fields in [first, second] {
        let resp = test::call_service(&app, post_job(&fields).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
    assert_eq!(service.repository().len(), 2);

    let stored = service
        .repository()
        .find_by_slug("株式会社-エンジニア")
        .await
        .unwrap()
        .unwrap();
    let path: String = url::form_urlencoded::byte_serialize(stored.slug.as_bytes()).collect();
    let req = test::TestRequest::get().uri(&format!("/jobs/{}", path)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("エンジニア"));
}

#[actix_web::test]
async fn title_length_is_checked_after_trimming() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let padded = format!("   {}   ", "a".repeat(100));
    let fields = posting(&[]);
    let mut fields: Vec<(&str, &str)> = fields.into_iter().collect();
    fields.retain(|(k, _)| *k != "title");
    fields.push(("title", padded.as_str()));

    let resp = test::call_service(&app, post_job(&fields).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let slug = format!("acme-{}", "a".repeat(100));
    let stored = service.repository().find_by_slug(&slug).await.unwrap().unwrap();
    assert_eq!(stored.title, "a".repeat(100));
}

#[actix_web::test]
async fn type_and_location_filters_match_exactly() {
    let mut contract_berlin = job("acme-contract-berlin", "Berlin Contractor", "On-site", true);
    contract_berlin.job_type = "Contract".into();
    let mut contract_paris = job("acme-contract-paris", "Paris Contractor", "Hybrid", true);
    contract_paris.job_type = "Contract".into();
    contract_paris.location = Some("Paris".into());
    let mut staff_paris = job("acme-staff-paris", "Paris Staff", "On-site", true);
    staff_paris.location = Some("Paris".into());
    let mut hidden = job("acme-contract-hidden", "Hidden Contractor", "On-site", false);
    hidden.job_type = "Contract".into();
    let remote_staff = job("acme-remote-staff", "Remote Staff", "Remote", true);

    let service = service_with(&[contract_berlin, contract_paris, staff_paris, hidden, remote_staff]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    for (uri, expected) in [
        ("/?type=Contract", &["Berlin Contractor", "Paris Contractor"][..]),
        ("/?location=Paris", &["Paris Contractor", "Paris Staff"][..]),
        ("/?type=Contract&location=Paris", &["Paris Contractor"][..]),
        ("/?type=Full-time&location=Berlin", &[][..]),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body = body_string(test::call_service(&app, req).await).await;
        for title in [
            "Berlin Contractor",
            "Paris Contractor",
            "Paris Staff",
            "Hidden Contractor",
            "Remote Staff",
        ] {
            assert_eq!(body.contains(title), expected.contains(&title), "{} for {}", title, uri);
        }
    }

    let contract = job_board::api::job::JobFilterValues {
        job_type: Some("Contract".into()),
        ..Default::default()
    };
    let rows = service.find_jobs(&contract).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.job_type == "Contract" && row.approved));
}

#[actix_web::test]
async fn detail_renders_markdown_description() {
    let mut listed = job("acme-engineer", "Engineer", "Remote", true);
    listed.description = Some("Perks:\n\n- [equity](https://acme.com/equity)\n- <b>lunch</b>".into());
    let service = service_with(&[listed]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let req = test::TestRequest::get().uri("/jobs/acme-engineer").to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains(r#"<a href="https://acme.com/equity" target="_blank" rel="noopener noreferrer">equity</a>"#));
    assert!(body.contains("<ul>"));
    assert!(body.contains("&lt;b&gt;lunch&lt;/b&gt;"));
}

#[actix_web::test]
async fn invalid_posting_rerenders_form_and_stores_nothing() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    let fields = posting(&[("application_email", ""), ("location_type", "On-site")]);
    let req = test::TestRequest::post()
        .uri("/jobs/new")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(&fields, Some(("notes.pdf", "application/pdf", b"%PDF"))))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains("Email or url is required"));
    assert!(body.contains("Location is required for on-site jobs"));
    assert!(body.contains("Must be an image file"));
    assert!(body.contains(r#"value="Engineer""#));
    assert!(service.repository().is_empty());
}

#[actix_web::test]
async fn static_pages_and_health_checks() {
    let service = service_with(&[]);
    let (logos, _) = logo_store();
    let app = init_app!(service, logos);

    for uri in ["/jobs/new", "/job-submitted", "/live", "/health", "/ready"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK, "{}", uri);
    }
}
