use diesel::prelude::*;
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use upload_audit_core::config::default_sources;
use upload_audit_core::{AppConfig, AuditEngine, AuditReport, Catalog, Error, SilentReporter};

const SCHEMA: &[&str] = &[
    "CREATE TABLE products \
     (id INTEGER PRIMARY KEY, image_url TEXT, model_url TEXT, thumbnail_urls TEXT)",
    "CREATE TABLE product_variations (id INTEGER PRIMARY KEY, image_url TEXT)",
    "CREATE TABLE project_items (id INTEGER PRIMARY KEY, main_image_url TEXT)",
    "CREATE TABLE project_thumbnails (id INTEGER PRIMARY KEY, image_url TEXT)",
    "CREATE TABLE testimonials (id INTEGER PRIMARY KEY, image_url TEXT)",
    "CREATE TABLE hero_banners (id INTEGER PRIMARY KEY, image_urls TEXT)",
];

fn execute_all(conn: &mut SqliteConnection, statements: &[&str]) {
    for statement in statements {
        sql_query(*statement).execute(conn).unwrap();
    }
}

fn seeded_catalog(statements: &[&str]) -> Catalog {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    execute_all(&mut conn, statements);
    Catalog::Sqlite(conn)
}

fn write_files(public_root: &Path, keys: &[&str]) {
    for key in keys {
        let path = public_root.join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, key.as_bytes()).unwrap();
    }
}

fn config_for(public_root: &Path) -> AppConfig {
    AppConfig {
        public_root: public_root.to_string_lossy().into_owned(),
        ..AppConfig::default()
    }
}

fn assert_invariants(report: &AuditReport) {
    let counts = &report.counts;
    assert_eq!(
        counts.missing_count + counts.matched_count,
        counts.referenced_url_count
    );
    assert_eq!(
        counts.orphan_count + counts.matched_count,
        counts.filesystem_file_count
    );
}

#[test]
fn test_unreferenced_file_reported_as_orphan() {
    let tmp = tempdir().unwrap();
    write_files(
        tmp.path(),
        &["uploads/products/a.jpg", "uploads/products/b.jpg"],
    );
    let mut statements = SCHEMA.to_vec();
    statements.push("INSERT INTO products (image_url) VALUES ('/uploads/products/a.jpg')");
    let mut catalog = seeded_catalog(&statements);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.orphans_preview, vec!["uploads/products/b.jpg"]);
    assert!(report.missing.is_empty());
    assert_eq!(report.counts.matched_count, 1);
    assert_invariants(&report);
}

#[test]
fn test_csv_resolves_findings_to_disk_paths() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/products/b.jpg"]);
    let mut statements = SCHEMA.to_vec();
    statements.push("INSERT INTO products (image_url) VALUES ('/uploads/products/c.jpg')");
    let mut catalog = seeded_catalog(&statements);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    let orphan_on_disk = fs::canonicalize(tmp.path().join("uploads/products/b.jpg")).unwrap();
    let missing_on_disk = tmp.path().join("uploads").join("products").join("c.jpg");
    assert_eq!(report.disk_paths["uploads/products/b.jpg"], orphan_on_disk);
    assert_eq!(report.disk_paths["uploads/products/c.jpg"], missing_on_disk);

    let csv_path = tmp.path().join("findings.csv");
    assert_eq!(report.write_csv(&csv_path).unwrap(), 2);
    let contents = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "kind,path,disk_path");
    assert_eq!(
        lines[1],
        format!("missing,uploads/products/c.jpg,{}", missing_on_disk.display())
    );
    assert_eq!(
        lines[2],
        format!("orphan,uploads/products/b.jpg,{}", orphan_on_disk.display())
    );
}

#[test]
fn test_absent_file_reported_as_missing() {
    let tmp = tempdir().unwrap();
    let mut statements = SCHEMA.to_vec();
    statements.push("INSERT INTO product_variations (image_url) VALUES ('/uploads/products/c.jpg')");
    let mut catalog = seeded_catalog(&statements);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.missing, vec!["uploads/products/c.jpg"]);
    assert_eq!(report.counts.filesystem_file_count, 0);
    assert_invariants(&report);
}

#[test]
fn test_missing_optional_table_does_not_stop_the_run() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/testimonials/t1.jpg"]);
    // Only two of the configured tables exist.
    let mut catalog = seeded_catalog(&[
        "CREATE TABLE testimonials (id INTEGER PRIMARY KEY, image_url TEXT)",
        "INSERT INTO testimonials (image_url) VALUES ('/uploads/testimonials/t1.jpg')",
        "CREATE TABLE products (id INTEGER PRIMARY KEY, image_url TEXT)",
        "INSERT INTO products (image_url) VALUES ('/uploads/products/gone.jpg')",
    ]);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.counts.referenced_url_count, 2);
    assert_eq!(report.counts.matched_count, 1);
    assert_eq!(report.missing, vec!["uploads/products/gone.jpg"]);

    let failed: Vec<String> = report
        .failed_sources()
        .map(|o| format!("{}.{}", o.table, o.column))
        .collect();
    assert_eq!(
        failed,
        vec![
            "products.model_url",
            "products.thumbnail_urls",
            "product_variations.image_url",
            "project_items.main_image_url",
            "project_thumbnails.image_url",
            "hero_banners.image_urls",
        ]
    );
    assert_eq!(report.sources.len(), default_sources().len());
    assert_invariants(&report);
}

#[test]
fn test_external_and_malformed_references_contribute_nothing() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/hero/one.webp", "uploads/hero/two.webp"]);
    let mut statements = SCHEMA.to_vec();
    statements.extend_from_slice(&[
        "INSERT INTO products (image_url, thumbnail_urls) VALUES ('https://cdn.example.com/x.png', '[\"/uploads/thumbs/1.jpg\"')",
        "INSERT INTO hero_banners (image_urls) VALUES ('[\"/uploads/hero/one.webp\", \"https://cdn.example.com/hero.webp\"]')",
        "INSERT INTO hero_banners (image_urls) VALUES ('not json at all')",
    ]);
    let mut catalog = seeded_catalog(&statements);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.counts.raw_url_count, 3);
    assert_eq!(report.counts.excluded_url_count, 2);
    assert_eq!(report.counts.referenced_url_count, 1);
    assert!(report.missing.is_empty());
    assert_eq!(report.orphans_preview, vec!["uploads/hero/two.webp"]);
    assert!(report.failed_sources().next().is_none());
    assert_invariants(&report);
}

#[test]
fn test_windows_style_references_match_files() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/projects/main.png"]);
    let mut statements = SCHEMA.to_vec();
    statements.push("INSERT INTO project_items (main_image_url) VALUES ('\\uploads\\projects\\main.png')");
    let mut catalog = seeded_catalog(&statements);

    let report = AuditEngine::new(config_for(tmp.path()))
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.counts.matched_count, 1);
    assert!(report.missing.is_empty());
    assert!(report.orphans_preview.is_empty());
}

#[test]
fn test_repeated_runs_are_identical() {
    let tmp = tempdir().unwrap();
    write_files(
        tmp.path(),
        &["uploads/p/a.jpg", "uploads/p/b.jpg", "uploads/q/c.jpg"],
    );
    let mut statements = SCHEMA.to_vec();
    statements.extend_from_slice(&[
        "INSERT INTO products (image_url, thumbnail_urls) VALUES ('/uploads/p/a.jpg', '[\"/uploads/p/z.jpg\"]')",
        "INSERT INTO testimonials (image_url) VALUES ('/uploads/q/c.jpg')",
    ]);
    let mut catalog = seeded_catalog(&statements);
    let engine = AuditEngine::new(config_for(tmp.path()));

    let first = engine.run_with_catalog(&mut catalog, &SilentReporter).unwrap();
    let second = engine.run_with_catalog(&mut catalog, &SilentReporter).unwrap();

    assert_eq!(first.counts, second.counts);
    assert_eq!(first.missing, second.missing);
    assert_eq!(first.orphans, second.orphans);
    assert_eq!(first.sources, second.sources);
}

#[test]
fn test_orphan_preview_is_capped() {
    let tmp = tempdir().unwrap();
    let keys: Vec<String> = (0..8).map(|i| format!("uploads/bulk/{:02}.jpg", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    write_files(tmp.path(), &key_refs);
    let mut catalog = seeded_catalog(SCHEMA);

    let report = AuditEngine::new(config_for(tmp.path()))
        .with_orphan_preview_limit(3)
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.counts.orphan_count, 8);
    assert_eq!(
        report.orphans_preview,
        vec!["uploads/bulk/00.jpg", "uploads/bulk/01.jpg", "uploads/bulk/02.jpg"]
    );
    assert!(report.orphans_truncated);
    assert_eq!(report.orphans.len(), 8);
}

#[test]
fn test_ignore_patterns_hide_placeholder_files() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/.gitkeep", "uploads/p/a.jpg"]);
    let mut catalog = seeded_catalog(SCHEMA);
    let config = AppConfig {
        ignore_patterns: vec!["**/.gitkeep".to_string()],
        ..config_for(tmp.path())
    };

    let report = AuditEngine::new(config)
        .run_with_catalog(&mut catalog, &SilentReporter)
        .unwrap();

    assert_eq!(report.orphans_preview, vec!["uploads/p/a.jpg"]);
}

#[test]
fn test_run_opens_sqlite_file() {
    let tmp = tempdir().unwrap();
    write_files(tmp.path(), &["uploads/t/a.jpg"]);
    let db_path = tmp.path().join("store.db");
    {
        let mut conn = SqliteConnection::establish(db_path.to_str().unwrap()).unwrap();
        execute_all(&mut conn, SCHEMA);
        execute_all(
            &mut conn,
            &["INSERT INTO project_thumbnails (image_url) VALUES ('/uploads/t/a.jpg')"],
        );
    }

    let config = AppConfig {
        database_url: format!("sqlite://{}", db_path.display()),
        ..config_for(tmp.path())
    };
    let report = AuditEngine::new(config).run(&SilentReporter).unwrap();

    assert_eq!(report.counts.matched_count, 1);
    assert!(report.missing.is_empty());
    assert!(report.orphans_preview.is_empty());
}

#[test]
fn test_unreachable_database_is_fatal() {
    let tmp = tempdir().unwrap();
    let config = AppConfig {
        database_url: format!("sqlite://{}", tmp.path().join("absent.db").display()),
        ..config_for(tmp.path())
    };

    let result = AuditEngine::new(config).run(&SilentReporter);
    assert!(matches!(result, Err(Error::Connection { .. })));
}
